// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker CLI state detector (priority 50).
//!
//! Recognises pull/push/build/compose phase chatter as tool_running, the
//! common daemon/permission/not-found errors as error, and a trailing shell
//! prompt as idle. Grounded on the same priority-ordered classification
//! shape as the generic shell detector, specialised to Docker's own output
//! vocabulary.

use regex::Regex;

use crate::context::ParserContext;
use crate::parser::{ParserMeta, StateDetection, StateParser};
use crate::types::SessionState;

pub struct DockerStateDetector {
    meta: ParserMeta,
    phase: Regex,
    error_text: Regex,
    prompt_tail: Regex,
}

impl Default for DockerStateDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerStateDetector {
    /// Static patterns below are compile-time constants verified to be valid regex.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("docker-state", 50)
                .with_description("docker pull/push/build/compose phase detector"),
            phase: Regex::new(
                r"(?i)^(pulling|pushing|waiting|downloading|extracting|verifying checksum|step \d+/\d+|building|sending build context|creating|starting|stopping|recreating)",
            )
            .expect("static pattern"),
            error_text: Regex::new(
                r"(?i)cannot connect to the docker daemon|permission denied while trying to connect|no such (image|container|service)|pull access denied",
            )
            .expect("static pattern"),
            prompt_tail: Regex::new(r"(\$|#)\s*$").expect("static pattern"),
        }
    }
}

impl StateParser for DockerStateDetector {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn detect_state(&self, ctx: &ParserContext) -> Option<StateDetection> {
        for line in &ctx.last_lines {
            if self.error_text.is_match(line) {
                return Some(StateDetection::new(SessionState::Error, 0.85));
            }
        }

        for line in &ctx.last_lines {
            if self.phase.is_match(line.trim_start()) {
                return Some(StateDetection::new(SessionState::ToolRunning, 0.65));
            }
        }

        if let Some(last) = ctx.last_non_empty_line() {
            if self.prompt_tail.is_match(last) {
                return Some(StateDetection::new(SessionState::Idle, 0.6));
            }
        }

        None
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
