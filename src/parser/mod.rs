// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser contracts: the three pluggable families (state detectors, output
//! classifiers, confirmation detectors) and their shared metadata.

pub mod registry;

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;

use crate::context::ParserContext;
use crate::types::{ConfirmInfo, ConfirmResponse, SemanticOutput, SessionState};

/// Metadata every parser exposes, independent of which family it belongs
/// to.
#[derive(Debug, Clone)]
pub struct ParserMeta {
    pub name: String,
    pub description: Option<String>,
    pub priority: i32,
    pub version: Option<String>,
}

impl ParserMeta {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self { name: name.into(), description: None, priority, version: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Result of a state detector's detection attempt.
#[derive(Debug, Clone)]
pub struct StateDetection {
    pub state: SessionState,
    pub confidence: f64,
    pub meta: Option<Value>,
}

impl StateDetection {
    pub fn new(state: SessionState, confidence: f64) -> Self {
        Self { state, confidence, meta: None }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Detects which [`SessionState`] the terminal is currently in.
pub trait StateParser: Send + Sync {
    fn meta(&self) -> &ParserMeta;
    fn detect_state(&self, ctx: &ParserContext) -> Option<StateDetection>;
}

/// Classifies the semantic shape of output produced since a command was
/// submitted (or of the current screen, for passive classifiers).
pub trait OutputParser: Send + Sync {
    fn meta(&self) -> &ParserMeta;
    fn can_parse(&self, ctx: &ParserContext) -> bool;
    fn parse(&self, ctx: &ParserContext) -> Option<SemanticOutput>;
}

/// Detects a pending confirmation and formats the caller's response into
/// the bytes the originating CLI expects.
pub trait ConfirmParser: Send + Sync {
    fn meta(&self) -> &ParserMeta;
    fn detect_confirm(&self, ctx: &ParserContext) -> Option<ConfirmInfo>;
    fn format_response(&self, info: &ConfirmInfo, response: &ConfirmResponse) -> Vec<u8>;
}

/// Run `f`, converting a panic into `None` so a malformed parser can never
/// take down the pipeline. Parsers that return `Result` should map the
/// error to `None` themselves before reaching this wrapper; this guards
/// only against outright panics.
pub fn swallow_panics<T>(f: impl FnOnce() -> Option<T>) -> Option<T> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or(None)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
