// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic-shell state detector (priority 10).
//!
//! Recognises common prompt tails as idle, `...`/braille spinners as
//! tool_running, and common shell error prefixes as error. Grounded on the
//! teacher's priority-ordered `classify()` (error > prompt > working).

use regex::Regex;

use crate::context::ParserContext;
use crate::parser::{ParserMeta, StateDetection, StateParser};
use crate::types::SessionState;

pub struct ShellStateDetector {
    meta: ParserMeta,
    prompt_tail: Regex,
    spinner: Regex,
    error_text: Regex,
    error_prefix: Regex,
}

impl Default for ShellStateDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellStateDetector {
    /// Static patterns below are compile-time constants verified to be valid regex.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("shell-state", 10)
                .with_description("generic shell prompt/spinner/error detector"),
            // ❯ $ # > % and a trailing user@host:~$ shape.
            prompt_tail: Regex::new(r"(❯|\$|#|>|%)\s*$").expect("static pattern"),
            spinner: Regex::new(r"(\.\.\.$|[⠁-⣿])").expect("static pattern"),
            error_text: Regex::new(
                r"(?i)command not found|no such file or directory|permission denied",
            )
            .expect("static pattern"),
            // Anchored at line start, requiring `: ` then a non-empty tail
            // that doesn't itself look like a prompt (see SPEC_FULL §9 open
            // question resolution — avoids misclassifying `root@host: ~#`).
            error_prefix: Regex::new(r"^(bash|zsh|sh): (.+)$").expect("static pattern"),
        }
    }
}

fn looks_like_prompt_tail(s: &str) -> bool {
    let trimmed = s.trim_end();
    trimmed.ends_with(['$', '#', '>', '%', '❯'])
}

impl StateParser for ShellStateDetector {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn detect_state(&self, ctx: &ParserContext) -> Option<StateDetection> {
        for line in &ctx.last_lines {
            if self.error_text.is_match(line) {
                return Some(StateDetection::new(SessionState::Error, 0.8));
            }
            if let Some(caps) = self.error_prefix.captures(line) {
                let tail = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                if !tail.trim().is_empty() && !looks_like_prompt_tail(tail) {
                    return Some(StateDetection::new(SessionState::Error, 0.8));
                }
            }
        }

        if let Some(last) = ctx.last_non_empty_line() {
            if self.prompt_tail.is_match(last) {
                return Some(StateDetection::new(SessionState::Idle, 0.7));
            }
        }

        for line in &ctx.last_lines {
            if self.spinner.is_match(line) {
                return Some(StateDetection::new(SessionState::ToolRunning, 0.6));
            }
        }

        None
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
