// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser registry: holds the three sorted parser families and dispatches
//! detection against a [`ParserContext`].

use crate::context::ParserContext;
use crate::types::{ConfirmInfo, SemanticOutput};

use super::{swallow_panics, ConfirmParser, OutputParser, StateDetection, StateParser};

/// Holds three priority-sorted parser collections and dispatches detection
/// across each family.
#[derive(Default)]
pub struct ParserRegistry {
    state: Vec<Box<dyn StateParser>>,
    output: Vec<Box<dyn OutputParser>>,
    confirm: Vec<Box<dyn ConfirmParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_state(&mut self, parser: Box<dyn StateParser>) {
        self.state.push(parser);
        self.state.sort_by(|a, b| b.meta().priority.cmp(&a.meta().priority));
    }

    pub fn register_output(&mut self, parser: Box<dyn OutputParser>) {
        self.output.push(parser);
        self.output.sort_by(|a, b| b.meta().priority.cmp(&a.meta().priority));
    }

    pub fn register_confirm(&mut self, parser: Box<dyn ConfirmParser>) {
        self.confirm.push(parser);
        self.confirm.sort_by(|a, b| b.meta().priority.cmp(&a.meta().priority));
    }

    pub fn unregister(&mut self, name: &str) {
        self.state.retain(|p| p.meta().name != name);
        self.output.retain(|p| p.meta().name != name);
        self.confirm.retain(|p| p.meta().name != name);
    }

    pub fn clear(&mut self) {
        self.state.clear();
        self.output.clear();
        self.confirm.clear();
    }

    pub fn state_parsers(&self) -> &[Box<dyn StateParser>] {
        &self.state
    }

    pub fn output_parsers(&self) -> &[Box<dyn OutputParser>] {
        &self.output
    }

    pub fn confirm_parsers(&self) -> &[Box<dyn ConfirmParser>] {
        &self.confirm
    }

    /// Try every state parser and keep the one with the highest confidence.
    /// Ties are broken by the pre-sorted priority order (the first parser
    /// reached at a given confidence wins).
    pub fn detect_state(&self, ctx: &ParserContext) -> Option<StateDetection> {
        let mut best: Option<StateDetection> = None;
        for parser in &self.state {
            let Some(detection) = swallow_panics(|| parser.detect_state(ctx)) else {
                continue;
            };
            match &best {
                Some(current) if detection.confidence <= current.confidence => {}
                _ => best = Some(detection),
            }
        }
        best
    }

    /// Try every output parser whose `can_parse` returns true and keep the
    /// one with the highest confidence. Panicking parsers are skipped.
    pub fn classify_output(&self, ctx: &ParserContext) -> Option<SemanticOutput> {
        let mut best: Option<SemanticOutput> = None;
        for parser in &self.output {
            let can = swallow_panics(|| Some(parser.can_parse(ctx))).unwrap_or(false);
            if !can {
                continue;
            }
            let Some(output) = swallow_panics(|| parser.parse(ctx)) else {
                continue;
            };
            match &best {
                Some(current) if output.confidence <= current.confidence => {}
                _ => best = Some(output),
            }
        }
        best
    }

    /// First positive detection wins, in priority order. Returns the info
    /// plus the index of the parser that produced it, so the caller can
    /// remember which parser formats the eventual response.
    pub fn detect_confirm(&self, ctx: &ParserContext) -> Option<(usize, ConfirmInfo)> {
        for (idx, parser) in self.confirm.iter().enumerate() {
            if let Some(info) = swallow_panics(|| parser.detect_confirm(ctx)) {
                return Some((idx, info));
            }
        }
        None
    }

    /// Format a response using the confirm parser at `idx` (as returned by
    /// [`Self::detect_confirm`]).
    pub fn format_confirm_response(
        &self,
        idx: usize,
        info: &ConfirmInfo,
        response: &crate::types::ConfirmResponse,
    ) -> Option<Vec<u8>> {
        self.confirm.get(idx).map(|p| p.format_response(info, response))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
