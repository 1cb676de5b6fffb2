// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude-Code status-line classifier (priority 95).
//!
//! Claude renders a one-line status indicator while it is thinking or
//! running a tool: a spinner glyph, a present-participle verb, and an
//! `(esc to interrupt)` suffix that optionally names the phase, e.g.
//! `· Precipitating… (esc to interrupt · thinking)`. Grounded on the
//! spinner/cadence vocabulary the teacher's `ClaudeScreenDetector` polls
//! for, generalised into an [`OutputParser`].

use regex::Regex;

use crate::context::ParserContext;
use crate::parser::{OutputParser, ParserMeta};
use crate::types::{OutputPayload, SemanticOutput};

pub struct ClaudeStatusParser {
    meta: ParserMeta,
    pattern: Regex,
}

impl Default for ClaudeStatusParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeStatusParser {
    /// Static patterns below are compile-time constants verified to be valid regex.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("claude-status", 95)
                .with_description("Claude Code spinner/status-line classifier"),
            pattern: Regex::new(
                r"^([·✻✽✶✳✢])\s+(\S+…?)\s*\((?:esc|ESC)\s+to\s+interrupt(?:\s*·\s*(\w+))?\)",
            )
            .expect("static pattern"),
        }
    }
}

impl OutputParser for ClaudeStatusParser {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn can_parse(&self, ctx: &ParserContext) -> bool {
        ctx.last_lines.iter().any(|l| self.pattern.is_match(l))
    }

    fn parse(&self, ctx: &ParserContext) -> Option<SemanticOutput> {
        let line = ctx.last_lines.iter().find(|l| self.pattern.is_match(l))?;
        let caps = self.pattern.captures(line)?;
        let spinner = caps.get(1)?.as_str().to_string();
        let status_text = caps.get(2)?.as_str().to_string();
        let phase = caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_else(|| "thinking".to_string());

        Some(SemanticOutput {
            raw: line.clone(),
            data: OutputPayload::ClaudeStatus { spinner, status_text, phase, interruptible: true },
            confidence: 0.95,
            parser_name: self.meta.name.clone(),
        })
    }
}

#[cfg(test)]
#[path = "claude_status_tests.rs"]
mod tests;
