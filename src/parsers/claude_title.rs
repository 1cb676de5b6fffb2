// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude-Code terminal-title classifier (priority 85).
//!
//! Claude Code sets the terminal title (OSC 0/2) to a short task summary
//! while it is working, e.g. `✳ Refactoring parser… - myproject`. Parses
//! [`ParserContext::terminal_title`] rather than the screen body.

use regex::Regex;

use crate::context::ParserContext;
use crate::parser::{OutputParser, ParserMeta};
use crate::types::{OutputPayload, SemanticOutput};

pub struct ClaudeTitleParser {
    meta: ParserMeta,
    pattern: Regex,
}

impl Default for ClaudeTitleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeTitleParser {
    /// Static patterns below are compile-time constants verified to be valid regex.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("claude-title", 85)
                .with_description("Claude Code OSC terminal-title classifier"),
            pattern: Regex::new(r"^([⠁-⣿✳])\s+(.+?)(?:\s*-\s*\S+)?$").expect("static pattern"),
        }
    }
}

impl OutputParser for ClaudeTitleParser {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn can_parse(&self, ctx: &ParserContext) -> bool {
        ctx.terminal_title.as_deref().is_some_and(|t| self.pattern.is_match(t))
    }

    fn parse(&self, ctx: &ParserContext) -> Option<SemanticOutput> {
        let title = ctx.terminal_title.as_deref()?;
        let caps = self.pattern.captures(title)?;
        let spinner = caps.get(1)?.as_str().to_string();
        let task_name = caps.get(2)?.as_str().trim().to_string();

        Some(SemanticOutput {
            raw: title.to_string(),
            data: OutputPayload::ClaudeTitle { spinner, task_name, is_processing: true },
            confidence: 0.75,
            parser_name: self.meta.name.clone(),
        })
    }
}

#[cfg(test)]
#[path = "claude_title_tests.rs"]
mod tests;
