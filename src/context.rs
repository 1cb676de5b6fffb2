// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser context: the sole input every parser sees.

use crate::types::SessionState;

/// Read-only bundle of screen, last-N lines, and state hints passed to
/// every parser call. Parsers never see anything beyond this struct.
#[derive(Debug, Clone)]
pub struct ParserContext {
    /// Full visible screen + scrollback as plain text, newline-separated,
    /// no terminal control sequences.
    pub screen_text: String,
    /// Ordered sequence of the last N lines (default 10; configurable).
    pub last_lines: Vec<String>,
    /// Current session-state hint, if known.
    pub current_state: Option<SessionState>,
    /// Previous session-state hint, if known.
    pub previous_state: Option<SessionState>,
    /// Formatted-with-control-codes variant, if a parser needs it.
    pub raw_screen: Option<String>,
    /// Operating-system-command terminal title, if one was set.
    pub terminal_title: Option<String>,
}

impl ParserContext {
    pub fn new(screen_text: impl Into<String>, last_lines: Vec<String>) -> Self {
        Self {
            screen_text: screen_text.into(),
            last_lines,
            current_state: None,
            previous_state: None,
            raw_screen: None,
            terminal_title: None,
        }
    }

    pub fn with_states(
        mut self,
        current: Option<SessionState>,
        previous: Option<SessionState>,
    ) -> Self {
        self.current_state = current;
        self.previous_state = previous;
        self
    }

    pub fn with_raw_screen(mut self, raw: impl Into<String>) -> Self {
        self.raw_screen = Some(raw.into());
        self
    }

    pub fn with_terminal_title(mut self, title: impl Into<String>) -> Self {
        self.terminal_title = Some(title.into());
        self
    }

    /// The last non-empty line, if any — a common lookup for prompt
    /// detectors anchoring on the terminal's final rendered line.
    pub fn last_non_empty_line(&self) -> Option<&str> {
        self.last_lines.iter().rev().map(|l| l.as_str()).find(|l| !l.trim().is_empty())
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
