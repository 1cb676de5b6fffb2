// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claude-Code tool-invocation parser (priority 92).
//!
//! Claude renders a tool call in one of two header shapes: box (`⏺ Name` or
//! `⏺ Name (completed in Xs)`, body lines prefixed `│`) or inline (`⏺
//! Name(args…)`, output lines prefixed `⎿`). Box-mode `│ key: value` lines
//! are parsed as parameters (JSON-parsed where possible, else quote-stripped
//! strings); everything else under `│`/`⎿` is collected as tool output.
//! Grounded on the same `⏺`/`│` tool-call markers the teacher's screen
//! detector uses to disambiguate tool_running from thinking.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use crate::context::ParserContext;
use crate::parser::{OutputParser, ParserMeta};
use crate::types::{OutputPayload, SemanticOutput};

/// Tools that earn the higher 0.95 confidence; anything else still parses,
/// just at 0.8.
const KNOWN_TOOLS: &[&str] = &[
    "Bash",
    "Read",
    "Edit",
    "Write",
    "Glob",
    "Grep",
    "WebFetch",
    "WebSearch",
    "Task",
    "LSP",
    "NotebookEdit",
    "TodoRead",
    "TodoWrite",
];

pub struct ClaudeToolParser {
    meta: ParserMeta,
    inline_header: Regex,
    box_header: Regex,
    box_param: Regex,
    box_body: Regex,
    inline_output: Regex,
    duration: Regex,
}

impl Default for ClaudeToolParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaudeToolParser {
    /// Static patterns below are compile-time constants verified to be valid regex.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("claude-tool", 92)
                .with_description("Claude Code tool-call header/output parser"),
            inline_header: Regex::new(r"^⏺\s+([A-Za-z][A-Za-z0-9_]*)\((.*)\)\s*$")
                .expect("static pattern"),
            box_header: Regex::new(r"^⏺\s+([A-Za-z][A-Za-z0-9_]*)(?:\s+\(completed in ([\d.]+)s\))?\s*$")
                .expect("static pattern"),
            box_param: Regex::new(r"^\s*│\s*([A-Za-z_][A-Za-z0-9_]*):\s*(.*)$").expect("static pattern"),
            box_body: Regex::new(r"^\s*│\s?(.*)$").expect("static pattern"),
            inline_output: Regex::new(r"^\s*⎿\s?(.*)$").expect("static pattern"),
            duration: Regex::new(r"\((\d+(?:\.\d+)?)s\)").expect("static pattern"),
        }
    }

    fn header_index(&self, lines: &[String]) -> Option<usize> {
        lines.iter().position(|l| self.inline_header.is_match(l) || self.box_header.is_match(l))
    }

    fn parse_param_value(raw: &str) -> Value {
        let trimmed = raw.trim();
        if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
            return parsed;
        }
        let unquoted = trimmed.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(trimmed);
        Value::String(unquoted.to_string())
    }
}

impl OutputParser for ClaudeToolParser {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn can_parse(&self, ctx: &ParserContext) -> bool {
        self.header_index(&ctx.last_lines).is_some()
    }

    fn parse(&self, ctx: &ParserContext) -> Option<SemanticOutput> {
        let idx = self.header_index(&ctx.last_lines)?;
        let header_line = &ctx.last_lines[idx];
        let body = &ctx.last_lines[idx + 1..];

        let (tool_name, params, output, duration_ms) =
            if let Some(caps) = self.inline_header.captures(header_line) {
                let tool_name = caps.get(1)?.as_str().to_string();
                let args = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
                let mut params = HashMap::new();
                if !args.is_empty() {
                    params.insert("args".to_string(), Value::String(args));
                }
                self.parse_inline_body(body, tool_name, params)
            } else {
                let caps = self.box_header.captures(header_line)?;
                let tool_name = caps.get(1)?.as_str().to_string();
                let header_duration_ms = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                    .map(|secs| (secs * 1000.0) as u64);
                self.parse_box_body(body, tool_name, header_duration_ms)
            };

        let status = if duration_ms.is_some() { "completed".to_string() } else { "running".to_string() };

        let confidence = if KNOWN_TOOLS.contains(&tool_name.as_str()) { 0.95 } else { 0.8 };

        Some(SemanticOutput {
            raw: ctx.last_lines[idx..].join("\n"),
            data: OutputPayload::ClaudeTool { tool_name, params, output, duration_ms, status },
            confidence,
            parser_name: self.meta.name.clone(),
        })
    }
}

impl ClaudeToolParser {
    #[allow(clippy::type_complexity)]
    fn parse_inline_body(
        &self,
        body: &[String],
        tool_name: String,
        params: HashMap<String, Value>,
    ) -> (String, HashMap<String, Value>, Option<String>, Option<u64>) {
        let mut output_lines = Vec::new();
        let mut duration_ms = None;
        for line in body {
            if let Some(caps) = self.inline_output.captures(line) {
                output_lines.push(caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string());
                continue;
            }
            if let Some(caps) = self.duration.captures(line) {
                if let Ok(secs) = caps[1].parse::<f64>() {
                    duration_ms = Some((secs * 1000.0) as u64);
                }
                continue;
            }
            if !line.trim().is_empty() && !output_lines.is_empty() {
                output_lines.push(line.trim().to_string());
            }
        }
        let output = if output_lines.is_empty() { None } else { Some(output_lines.join("\n")) };
        (tool_name, params, output, duration_ms)
    }

    fn parse_box_body(
        &self,
        body: &[String],
        tool_name: String,
        header_duration_ms: Option<u64>,
    ) -> (String, HashMap<String, Value>, Option<String>, Option<u64>) {
        let mut params = HashMap::new();
        let mut output_lines = Vec::new();
        for line in body {
            if let Some(caps) = self.box_param.captures(line) {
                let key = caps[1].to_string();
                let value = Self::parse_param_value(&caps[2]);
                params.insert(key, value);
                continue;
            }
            if let Some(caps) = self.box_body.captures(line) {
                let text = caps.get(1).map(|m| m.as_str()).unwrap_or("").trim();
                if !text.is_empty() {
                    output_lines.push(text.to_string());
                }
            }
        }
        let output = if output_lines.is_empty() { None } else { Some(output_lines.join("\n")) };
        (tool_name, params, output, header_duration_ms)
    }
}

#[cfg(test)]
#[path = "claude_tool_tests.rs"]
mod tests;
