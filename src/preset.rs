// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named bundles of parsers + default session options, tailored to a
//! particular CLI. Grounded on §4.9 and the teacher's `config.rs` options
//! struct; `Preset::resolve` is the manager's `shell|claude-code|docker`
//! name resolution.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ManagerError;
use crate::parser::registry::ParserRegistry;
use crate::parser::{ConfirmParser, OutputParser, StateParser};
use crate::parsers::{
    claude_content::ClaudeContentParser, claude_state::ClaudeStateDetector,
    claude_status::ClaudeStatusParser, claude_title::ClaudeTitleParser,
    claude_tool::ClaudeToolParser, confirm_claude::ClaudeConfirmParser,
    confirm_generic::GenericConfirmParser, diff_output::DiffOutputParser, docker::DockerStateDetector,
    json_output::JsonOutputParser, shell::ShellStateDetector, table_output::TableOutputParser,
};

/// Default terminal width/height used when a caller doesn't specify one —
/// large enough that most CLI UIs don't wrap in ways that confuse the
/// line-oriented parsers.
pub const DEFAULT_COLS: u16 = 120;
pub const DEFAULT_ROWS: u16 = 40;
pub const DEFAULT_TAIL_LINES: usize = 10;
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Per-session knobs the driver consults at `start` and thereafter.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub cols: u16,
    pub rows: u16,
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    /// How many lines of `last_lines` a `ParserContext` carries by default.
    pub tail_lines: usize,
    /// Interval of the change-gated evaluation tick.
    pub tick_interval: Duration,
    /// Optional advisory session log path.
    pub log_path: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            cwd: None,
            env: HashMap::new(),
            tail_lines: DEFAULT_TAIL_LINES,
            tick_interval: DEFAULT_TICK_INTERVAL,
            log_path: None,
        }
    }
}

/// A named bundle of parsers, default session options, and the command
/// the session should spawn when none is supplied explicitly.
pub struct Preset {
    pub name: String,
    pub state_parsers: Vec<Box<dyn StateParser>>,
    pub output_parsers: Vec<Box<dyn OutputParser>>,
    pub confirm_parsers: Vec<Box<dyn ConfirmParser>>,
    pub session_options: SessionOptions,
    pub command: Vec<String>,
}

impl Preset {
    /// Generic interactive shell: prompt/spinner/error state detection,
    /// JSON/table/diff output classification, and a Y/N confirm detector.
    pub fn shell() -> Self {
        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string());
        Self {
            name: "shell".to_string(),
            state_parsers: vec![Box::new(ShellStateDetector::new())],
            output_parsers: vec![
                Box::new(JsonOutputParser::new()),
                Box::new(TableOutputParser::new()),
                Box::new(DiffOutputParser::new()),
            ],
            confirm_parsers: vec![Box::new(GenericConfirmParser::new())],
            session_options: SessionOptions::default(),
            command: vec![shell, "-l".to_string()],
        }
    }

    /// Docker CLI: the shell bundle's output classifiers plus the Docker
    /// phase-aware state detector, layered over the generic shell detector
    /// so plain prompts between `docker` invocations still resolve to
    /// `idle`.
    pub fn docker() -> Self {
        let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string());
        Self {
            name: "docker".to_string(),
            state_parsers: vec![
                Box::new(DockerStateDetector::new()),
                Box::new(ShellStateDetector::new()),
            ],
            output_parsers: vec![
                Box::new(JsonOutputParser::new()),
                Box::new(TableOutputParser::new()),
                Box::new(DiffOutputParser::new()),
            ],
            confirm_parsers: vec![Box::new(GenericConfirmParser::new())],
            session_options: SessionOptions::default(),
            command: vec![shell, "-l".to_string()],
        }
    }

    /// Claude Code: the full claude-specific parser family plus the
    /// generic shell detector as a fallback for the plain shell prompt
    /// claude drops back to between turns.
    pub fn claude_code() -> Self {
        Self {
            name: "claude-code".to_string(),
            state_parsers: vec![Box::new(ClaudeStateDetector::new()), Box::new(ShellStateDetector::new())],
            output_parsers: vec![
                Box::new(ClaudeStatusParser::new()),
                Box::new(ClaudeToolParser::new()),
                Box::new(ClaudeContentParser::new()),
                Box::new(ClaudeTitleParser::new()),
                Box::new(JsonOutputParser::new()),
                Box::new(TableOutputParser::new()),
                Box::new(DiffOutputParser::new()),
            ],
            confirm_parsers: vec![Box::new(ClaudeConfirmParser::new()), Box::new(GenericConfirmParser::new())],
            session_options: SessionOptions::default(),
            command: vec!["claude".to_string()],
        }
    }

    /// Resolve a preset by name, per §4.9's `shell|claude-code|docker` set.
    pub fn resolve(name: &str) -> Result<Self, ManagerError> {
        match name {
            "shell" => Ok(Self::shell()),
            "docker" => Ok(Self::docker()),
            "claude-code" => Ok(Self::claude_code()),
            other => Err(ManagerError::UnknownPreset { name: other.to_string() }),
        }
    }

    /// Consume the preset into a freshly populated [`ParserRegistry`],
    /// its session options, and its default command.
    pub fn into_parts(self) -> (ParserRegistry, SessionOptions, Vec<String>) {
        let mut registry = ParserRegistry::new();
        for p in self.state_parsers {
            registry.register_state(p);
        }
        for p in self.output_parsers {
            registry.register_output(p);
        }
        for p in self.confirm_parsers {
            registry.register_confirm(p);
        }
        (registry, self.session_options, self.command)
    }
}

#[cfg(test)]
#[path = "preset_tests.rs"]
mod tests;
