// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic yes/no confirmation detector (priority 10).
//!
//! Matches the common `[Y/n]`, `[y/N]`, `[y/n]`, and `(y/n)` prompt
//! conventions shared by shell tools, package managers, and installers.
//! Lowest priority among the confirm parsers so a more specific detector
//! (e.g. Claude's options dialogs) always gets first refusal.

use regex::Regex;

use crate::context::ParserContext;
use crate::parser::{ConfirmParser, ParserMeta};
use crate::types::{ConfirmAction, ConfirmInfo, ConfirmKind, ConfirmResponse};

pub struct GenericConfirmParser {
    meta: ParserMeta,
    pattern: Regex,
}

impl Default for GenericConfirmParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GenericConfirmParser {
    /// Static patterns below are compile-time constants verified to be valid regex.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("confirm-generic", 10)
                .with_description("generic [y/n]-style confirmation prompt detector"),
            pattern: Regex::new(r"(?i)(.*?)[\[\(]\s*y\s*/\s*n\s*[\]\)]\s*:?\s*$").expect("static pattern"),
        }
    }
}

impl ConfirmParser for GenericConfirmParser {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn detect_confirm(&self, ctx: &ParserContext) -> Option<ConfirmInfo> {
        let line = ctx.last_lines.iter().rev().find(|l| self.pattern.is_match(l))?;
        let caps = self.pattern.captures(line)?;
        let prompt = caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
        let prompt = if prompt.is_empty() { line.trim().to_string() } else { prompt };

        Some(ConfirmInfo {
            kind: ConfirmKind::YesNo,
            prompt,
            options: vec![],
            tool: None,
            raw_prompt: line.clone(),
        })
    }

    fn format_response(&self, _info: &ConfirmInfo, response: &ConfirmResponse) -> Vec<u8> {
        match response.action {
            ConfirmAction::Confirm => b"y\r".to_vec(),
            ConfirmAction::Deny => b"n\r".to_vec(),
            ConfirmAction::Select | ConfirmAction::Input => {
                response.value.clone().unwrap_or_default().into_bytes()
            }
        }
    }
}

#[cfg(test)]
#[path = "confirm_generic_tests.rs"]
mod tests;
