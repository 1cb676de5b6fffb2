// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude-Code options-dialog confirmation detector (priority 100).
//!
//! Detects a numbered-options block (the shape Claude uses for tool
//! permission, workspace trust, and setup dialogs) and encodes the
//! caller's choice as arrow-key navigation plus Enter, matching how a
//! human would drive the same TUI. Arrow-key navigation was chosen over
//! digit entry since Claude's options dialogs accept arrows unconditionally
//! while digit shortcuts are not offered on every screen.

use crate::context::ParserContext;
use crate::parser::{ConfirmParser, ParserMeta};
use crate::types::{ConfirmAction, ConfirmInfo, ConfirmKind, ConfirmOption, ConfirmResponse};

use super::claude_state::{
    is_hint_line, is_separator_line, parse_numbered_option, parse_options_from_screen, parse_tool_ref,
};

pub struct ClaudeConfirmParser {
    meta: ParserMeta,
}

impl Default for ClaudeConfirmParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeConfirmParser {
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("confirm-claude", 100)
                .with_description("Claude Code numbered-options dialog confirmation detector"),
        }
    }
}

fn highlighted_option(lines: &[String]) -> Option<u32> {
    lines.iter().find_map(|line| {
        let trimmed = line.trim();
        if !trimmed.starts_with('❯') {
            return None;
        }
        parse_numbered_option(trimmed).map(|(num, _)| num)
    })
}

impl ConfirmParser for ClaudeConfirmParser {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn detect_confirm(&self, ctx: &ParserContext) -> Option<ConfirmInfo> {
        let lines = &ctx.last_lines;
        let has_hint = lines.iter().any(|l| is_hint_line(l.trim()));
        if !has_hint {
            return None;
        }
        let labels = parse_options_from_screen(lines);
        if labels.is_empty() {
            return None;
        }

        let highlighted = highlighted_option(lines).unwrap_or(1);
        let options: Vec<ConfirmOption> = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                let key = (i + 1) as u32;
                ConfirmOption { key, label, is_default: key == highlighted }
            })
            .collect();

        let prompt = lines
            .iter()
            .map(|l| l.trim())
            .find(|t| {
                !t.is_empty()
                    && parse_numbered_option(t).is_none()
                    && !is_hint_line(t)
                    && !is_separator_line(t)
            })
            .unwrap_or("")
            .to_string();

        Some(ConfirmInfo {
            kind: ConfirmKind::Options,
            prompt,
            options,
            tool: parse_tool_ref(lines),
            raw_prompt: lines.join("\n"),
        })
    }

    fn format_response(&self, info: &ConfirmInfo, response: &ConfirmResponse) -> Vec<u8> {
        let highlighted = info.options.iter().find(|o| o.is_default).map(|o| o.key).unwrap_or(1);

        let target = match response.action {
            ConfirmAction::Select => response.option.unwrap_or(highlighted),
            ConfirmAction::Confirm => highlighted,
            ConfirmAction::Deny => info
                .options
                .iter()
                .find(|o| o.label.to_lowercase().contains("no"))
                .map(|o| o.key)
                .unwrap_or(highlighted),
            ConfirmAction::Input => return response.value.clone().unwrap_or_default().into_bytes(),
        };

        let delta = target as i64 - highlighted as i64;
        let mut bytes = Vec::new();
        if delta > 0 {
            for _ in 0..delta {
                bytes.extend_from_slice(b"\x1b[B");
            }
        } else if delta < 0 {
            for _ in 0..(-delta) {
                bytes.extend_from_slice(b"\x1b[A");
            }
        }
        bytes.extend_from_slice(b"\r");
        bytes
    }
}

#[cfg(test)]
#[path = "confirm_claude_tests.rs"]
mod tests;
