// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude-Code assistant-content collector (priority 90).
//!
//! Collects the plain response text Claude streams back once a prompt has
//! been answered — everything that isn't a tool header, status spinner, or
//! box-drawing separator. Completion is inferred from the reappearance of
//! the idle prompt (`❯`) below the collected block.

use regex::Regex;

use crate::context::ParserContext;
use crate::parser::{OutputParser, ParserMeta};
use crate::types::{OutputPayload, SemanticOutput};

pub struct ClaudeContentParser {
    meta: ParserMeta,
    spinner: Regex,
    tool_header: Regex,
}

impl Default for ClaudeContentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeContentParser {
    /// Static patterns below are compile-time constants verified to be valid regex.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("claude-content", 90)
                .with_description("Claude Code assistant response-text collector"),
            spinner: Regex::new(r"^[⠁-⣿✳]\s").expect("static pattern"),
            tool_header: Regex::new(r"^⏺").expect("static pattern"),
        }
    }

    fn is_content_line(&self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return false;
        }
        if self.spinner.is_match(trimmed) || self.tool_header.is_match(trimmed) {
            return false;
        }
        if trimmed.starts_with('❯') || trimmed.starts_with('⎿') {
            return false;
        }
        if super::claude_state::is_separator_line(trimmed) || super::claude_state::is_hint_line(trimmed)
        {
            return false;
        }
        true
    }
}

impl OutputParser for ClaudeContentParser {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn can_parse(&self, ctx: &ParserContext) -> bool {
        ctx.last_lines.iter().any(|l| self.is_content_line(l))
    }

    fn parse(&self, ctx: &ParserContext) -> Option<SemanticOutput> {
        let content_lines: Vec<&str> = ctx
            .last_lines
            .iter()
            .map(|l| l.as_str())
            .filter(|l| self.is_content_line(l))
            .collect();
        if content_lines.is_empty() {
            return None;
        }
        let content = content_lines.join("\n");
        let is_complete = ctx.last_lines.iter().any(|l| l.trim_start().starts_with('❯'));

        Some(SemanticOutput {
            raw: content.clone(),
            data: OutputPayload::ClaudeContent {
                role: "assistant".to_string(),
                content,
                is_complete,
            },
            confidence: 0.6,
            parser_name: self.meta.name.clone(),
        })
    }
}

#[cfg(test)]
#[path = "claude_content_tests.rs"]
mod tests;
