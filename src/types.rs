// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core data model shared across the engine: session state, messages,
//! semantic output, confirmation info, and the severity/suggestion model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Finite session state. Exactly one value per session at any time.
/// Initial value `Starting`; `Exited` is an absorbing terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Starting,
    Idle,
    Thinking,
    Responding,
    ToolRunning,
    Confirming,
    Error,
    Exited,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Idle => "idle",
            Self::Thinking => "thinking",
            Self::Responding => "responding",
            Self::ToolRunning => "tool_running",
            Self::Confirming => "confirming",
            Self::Error => "error",
            Self::Exited => "exited",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exited)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversation role for a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A conversation record attached to a session. Order preserved, never
/// mutated. Appended on `send` (user) and `record_response` (assistant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: u64,
}

/// Current Unix epoch time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Point-in-time capture of the screen, for external callers who only want
/// a cheap textual view rather than the full `ScreenSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenView {
    pub text: String,
    pub cursor_x: u16,
    pub cursor_y: u16,
    pub state: SessionState,
}

/// Tagged variant of a semantic output's payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutputPayload {
    Text { content: String },
    Table { headers: Vec<String>, rows: Vec<HashMap<String, String>> },
    Json { data: serde_json::Value },
    Tree { root: serde_json::Value },
    Diff { file: Option<String>, hunks: Vec<DiffHunk> },
    List { items: Vec<String> },
    Error { message: String },
    ClaudeStatus { spinner: String, status_text: String, phase: String, interruptible: bool },
    ClaudeContent { role: String, content: String, is_complete: bool },
    ClaudeTitle { spinner: String, task_name: String, is_processing: bool },
    ClaudeTool {
        tool_name: String,
        params: HashMap<String, serde_json::Value>,
        output: Option<String>,
        duration_ms: Option<u64>,
        status: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffHunk {
    pub header: String,
    pub changes: Vec<DiffChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffChange {
    pub kind: DiffChangeKind,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffChangeKind {
    Add,
    Remove,
    Context,
}

/// A semantic output record produced by an output classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticOutput {
    pub raw: String,
    pub data: OutputPayload,
    pub confidence: f64,
    pub parser_name: String,
}

/// Severity bucket assigned by the enricher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

/// Kind of remediation a [`Suggestion`] proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Retry,
    Fix,
    Investigate,
    Skip,
}

/// An actionable hint attached to an [`EnhancedOutput`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub action: String,
    pub description: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub automated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,
}

/// Execution metadata attached to an [`EnhancedOutput`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputMetadata {
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// A semantic output augmented with severity, suggestions, and execution
/// metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedOutput {
    pub raw: String,
    pub data: OutputPayload,
    pub confidence: f64,
    pub parser_name: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
    pub metadata: OutputMetadata,
}

/// Kind of confirmation a [`ConfirmInfo`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmKind {
    YesNo,
    Options,
    Input,
}

/// A tool invocation a confirmation is gating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server: Option<String>,
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

/// One selectable option within an `options`-kind confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmOption {
    pub key: u32,
    pub label: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A terminal-displayed question that must be answered with bytes written
/// back to the PTY.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmInfo {
    #[serde(rename = "type")]
    pub kind: ConfirmKind,
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<ConfirmOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolRef>,
    pub raw_prompt: String,
}

/// The action half of a [`ConfirmResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmAction {
    Confirm,
    Deny,
    Select,
    Input,
}

/// Caller's answer to a pending confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub action: ConfirmAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Decision returned by a [`PermissionChecker`] for a pending tool
/// confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Allow,
    Deny,
    Confirm,
}

/// Optional hook consulted when a confirmation carries a tool reference.
/// `allow`/`deny` auto-write the corresponding response; `confirm` falls
/// through to the external caller.
pub trait PermissionChecker: Send + Sync {
    fn check(&self, tool: &ToolRef) -> PermissionDecision;
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
