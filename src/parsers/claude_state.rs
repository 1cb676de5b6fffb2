// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude-Code state detector (priority 100).
//!
//! Grounded on the teacher's `driver/claude/screen.rs`: dialog-screen
//! signal matching, startup-prompt text matching, and bottom-up
//! numbered-option parsing, adapted from the teacher's `AgentState`/
//! `PromptContext` model to this crate's `SessionState`/`ConfirmInfo`.
//! The helper functions here (`parse_options_from_screen` and friends) are
//! `pub(crate)` so [`super::confirm_claude`] can reuse them when building
//! the full [`crate::types::ConfirmInfo`] for a detected dialog.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::context::ParserContext;
use crate::parser::{ParserMeta, StateDetection, StateParser};
use crate::types::{SessionState, ToolRef};

pub struct ClaudeStateDetector {
    meta: ParserMeta,
}

impl Default for ClaudeStateDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeStateDetector {
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("claude-state", 100)
                .with_description("Claude Code screen/dialog/prompt state detector"),
        }
    }
}

impl StateParser for ClaudeStateDetector {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn detect_state(&self, ctx: &ParserContext) -> Option<StateDetection> {
        if let Some(kind) = classify_interactive_dialog(&ctx.last_lines) {
            return Some(match kind {
                DialogKind::ToolPermission => StateDetection::new(SessionState::Confirming, 0.9)
                    .with_meta(json!({ "dialog": "tool_permission" })),
                DialogKind::Trust => StateDetection::new(SessionState::Confirming, 0.95)
                    .with_meta(json!({ "needs_trust_confirm": true })),
                DialogKind::Setup(subtype) => StateDetection::new(SessionState::Confirming, 0.9)
                    .with_meta(json!({ "setup": subtype })),
            });
        }

        if let Some(startup) = detect_startup_prompt(&ctx.last_lines) {
            let subtype = match startup {
                StartupPrompt::WorkspaceTrust => "startup_trust",
                StartupPrompt::BypassPermissions => "startup_bypass",
                StartupPrompt::LoginRequired => "startup_login",
            };
            return Some(
                StateDetection::new(SessionState::Confirming, 0.85)
                    .with_meta(json!({ "setup": subtype })),
            );
        }

        if ctx.last_lines.iter().any(|l| l.contains("esc to interrupt")) {
            let joined = ctx.last_lines.join("\n");
            return Some(if joined.contains('⏺') && joined.contains('│') {
                StateDetection::new(SessionState::ToolRunning, 0.85)
            } else {
                StateDetection::new(SessionState::Thinking, 0.75)
            });
        }

        if contains_yn_bracket(&ctx.last_lines) || numbered_options_block(&ctx.last_lines) {
            return Some(StateDetection::new(SessionState::Confirming, 0.85));
        }

        if let Some(last) = ctx.last_non_empty_line() {
            let trimmed = last.trim_start();
            if trimmed.starts_with('\u{276f}') || trimmed.starts_with('>') {
                return Some(StateDetection::new(SessionState::Idle, 0.9));
            }
        }

        if ctx.last_lines.iter().any(|l| l.contains("Error:") || l.contains('✖')) {
            return Some(StateDetection::new(SessionState::Error, 0.85));
        }

        None
    }
}

fn contains_yn_bracket(lines: &[String]) -> bool {
    lines.iter().any(|l| l.contains("[Y/n]") || l.contains("[y/N]") || l.contains("[y/n]"))
}

fn numbered_options_block(lines: &[String]) -> bool {
    let has_hint = lines.iter().any(|l| is_hint_line(l.trim()));
    let has_option = lines.iter().any(|l| parse_numbered_option(l.trim()).is_some());
    has_hint && has_option
}

/// Classification of an interactive dialog screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogKind {
    /// Tool permission dialog.
    ToolPermission,
    /// Workspace trust confirmation.
    Trust,
    /// Onboarding/setup dialog, tagged with its subtype.
    Setup(&'static str),
}

type DialogScreen = (DialogKind, &'static [(&'static str, bool)]);

const DIALOG_SCREENS: &[DialogScreen] = &[
    (
        DialogKind::Setup("security_notes"),
        &[
            ("Security notes:", false),
            ("Claude can make mistakes", false),
            ("Press Enter to continue", false),
        ],
    ),
    (
        DialogKind::Setup("login_success"),
        &[("Login successful", false), ("Logged in as", false), ("Press Enter to continue", false)],
    ),
    (
        DialogKind::Setup("oauth_login"),
        &[("Paste code here if prompted", false), ("oauth/authorize", false)],
    ),
    (
        DialogKind::Setup("login_method"),
        &[
            ("Select login method:", false),
            ("Claude account with subscription", false),
            ("Anthropic Console account", false),
        ],
    ),
    (
        DialogKind::Trust,
        &[
            ("Accessing workspace:", false),
            ("Yes, I trust this folder", false),
            ("enter to confirm", true),
        ],
    ),
    (
        DialogKind::Setup("terminal_setup"),
        &[
            ("Use Claude Code's terminal setup?", false),
            ("Yes, use recommended settings", false),
            ("enter to confirm", true),
        ],
    ),
    (
        DialogKind::Setup("theme_picker"),
        &[("Choose the text style", false), ("Dark mode", false), ("enter to confirm", true)],
    ),
    (
        DialogKind::Setup("settings_error"),
        &[
            ("Settings Error", false),
            ("Continue without these settings", false),
            ("Exit and fix manually", false),
        ],
    ),
    (
        DialogKind::ToolPermission,
        &[
            ("Do you want to proceed?", false),
            ("Yes, and don't ask again", false),
            ("Esc to cancel", false),
        ],
    ),
];

const DIALOG_SIGNAL_THRESHOLD: usize = 2;

fn classify_interactive_dialog(lines: &[String]) -> Option<DialogKind> {
    for (kind, signals) in DIALOG_SCREENS {
        let mut hits = 0;
        for &(phrase, ci) in *signals {
            let found = lines.iter().any(|line| {
                let trimmed = line.trim();
                if ci {
                    trimmed.to_lowercase().contains(phrase)
                } else {
                    trimmed.contains(phrase)
                }
            });
            if found {
                hits += 1;
                if hits >= DIALOG_SIGNAL_THRESHOLD {
                    return Some(*kind);
                }
            }
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartupPrompt {
    WorkspaceTrust,
    BypassPermissions,
    LoginRequired,
}

fn detect_startup_prompt(lines: &[String]) -> Option<StartupPrompt> {
    let trimmed: Vec<&str> = lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()).collect();
    if trimmed.is_empty() {
        return None;
    }
    let tail = if trimmed.len() >= 5 { &trimmed[trimmed.len() - 5..] } else { &trimmed[..] };
    let lower = tail.join(" ").to_lowercase();

    if lower.contains("trust the files")
        || lower.contains("do you trust")
        || lower.contains("trust this folder")
        || lower.contains("trust this workspace")
    {
        return Some(StartupPrompt::WorkspaceTrust);
    }
    if lower.contains("skip permissions")
        || lower.contains("dangerously-skip-permissions")
        || lower.contains("allow tool use without prompting")
        || lower.contains("bypass permissions")
    {
        return Some(StartupPrompt::BypassPermissions);
    }
    if lower.contains("please sign in")
        || lower.contains("please log in")
        || lower.contains("login required")
        || lower.contains("sign in to continue")
        || lower.contains("authenticate")
    {
        return Some(StartupPrompt::LoginRequired);
    }
    None
}

/// Parse numbered option labels bottom-up from screen lines. Shared with
/// [`super::confirm_claude`] for building the confirm dialog's option list.
pub(crate) fn parse_options_from_screen(lines: &[String]) -> Vec<String> {
    let mut options: Vec<(u32, String)> = Vec::new();
    let mut found_any = false;

    for line in lines.iter().rev() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_hint_line(trimmed) {
            continue;
        }
        if is_separator_line(trimmed) {
            continue;
        }
        if let Some((num, label)) = parse_numbered_option(trimmed) {
            options.push((num, label));
            found_any = true;
        } else if found_any {
            if is_description_line(line) {
                continue;
            }
            break;
        }
    }

    options.sort_by_key(|(num, _)| *num);
    options.into_iter().map(|(_, label)| label).collect()
}

pub(crate) fn parse_numbered_option(trimmed: &str) -> Option<(u32, String)> {
    let s = trimmed.strip_prefix('❯').unwrap_or(trimmed);
    let s = s.trim_start_matches([' ', '\u{00A0}']);

    let digit_end = s.find(|c: char| !c.is_ascii_digit())?;
    if digit_end == 0 {
        return None;
    }
    let num: u32 = s[..digit_end].parse().ok()?;
    let rest = s[digit_end..].strip_prefix(". ")?;
    if rest.is_empty() {
        return None;
    }
    let label = rest.trim_end().trim_end_matches(['✔', '✓']).trim_end().to_string();
    if label.is_empty() {
        return None;
    }
    Some((num, label))
}

/// Parse a `server - tool_name(k: "v", …)` tool-reference line, optionally
/// suffixed `(MCP)`. Shared with [`super::confirm_claude`] for attaching a
/// [`ToolRef`] to a detected dialog's [`crate::types::ConfirmInfo`].
pub(crate) fn parse_tool_ref(lines: &[String]) -> Option<ToolRef> {
    lines.iter().find_map(|l| parse_tool_line(l.trim()))
}

fn parse_tool_line(trimmed: &str) -> Option<ToolRef> {
    let trimmed = trimmed.trim_end().trim_end_matches("(MCP)").trim_end();
    let (head, rest) = trimmed.split_once(" - ")?;
    let mcp_server = head.trim();
    if mcp_server.is_empty() {
        return None;
    }
    let rest = rest.trim();
    let open = rest.find('(')?;
    let name = rest[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let close = rest.rfind(')')?;
    if close <= open {
        return None;
    }
    let args = &rest[open + 1..close];
    Some(ToolRef {
        name: name.to_string(),
        mcp_server: Some(mcp_server.to_string()),
        params: parse_tool_params(args),
    })
}

fn parse_tool_params(args: &str) -> HashMap<String, Value> {
    let mut params = HashMap::new();
    for part in split_top_level_commas(args) {
        if let Some((key, value)) = part.split_once(':') {
            params.insert(key.trim().to_string(), parse_tool_value(value.trim()));
        }
    }
    params
}

/// Split on commas that are not nested inside quotes or brackets.
fn split_top_level_commas(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut cur = String::new();
    for c in s.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                cur.push(c);
            }
            '(' | '[' | '{' if !in_quotes => {
                depth += 1;
                cur.push(c);
            }
            ')' | ']' | '}' if !in_quotes => {
                depth -= 1;
                cur.push(c);
            }
            ',' if !in_quotes && depth == 0 => {
                parts.push(cur.trim().to_string());
                cur.clear();
            }
            _ => cur.push(c),
        }
    }
    if !cur.trim().is_empty() {
        parts.push(cur.trim().to_string());
    }
    parts
}

fn parse_tool_value(raw: &str) -> Value {
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return parsed;
    }
    let unquoted = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(raw);
    Value::String(unquoted.to_string())
}

pub(crate) fn is_separator_line(trimmed: &str) -> bool {
    !trimmed.is_empty() && trimmed.chars().all(|c| matches!(c, '─' | '╌' | '━' | '═' | '│' | '┃'))
}

pub(crate) fn is_hint_line(trimmed: &str) -> bool {
    trimmed.contains("Esc to cancel")
        || trimmed.contains("Enter to select")
        || trimmed.contains("Enter to confirm")
        || trimmed.contains("Tab to amend")
        || trimmed.contains("Arrow keys to navigate")
}

fn is_description_line(raw_line: &str) -> bool {
    let leading = raw_line.len() - raw_line.trim_start().len();
    if leading < 5 {
        return false;
    }
    let first_non_space = raw_line.trim_start().chars().next();
    !matches!(first_non_space, Some('0'..='9') | Some('❯') | None)
}

#[cfg(test)]
#[path = "claude_state_tests.rs"]
mod tests;
