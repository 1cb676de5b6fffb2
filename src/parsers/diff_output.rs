// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unified-diff classifier. No teacher counterpart — grounded on the
//! crate's own `OutputPayload::Diff` shape. Recognises the standard
//! `--- a/<file>` / `+++ b/<file>` / `@@ ... @@` unified-diff format
//! produced by `git diff` and `diff -u`.

use regex::Regex;

use crate::context::ParserContext;
use crate::parser::{OutputParser, ParserMeta};
use crate::types::{DiffChange, DiffChangeKind, DiffHunk, OutputPayload, SemanticOutput};

pub struct DiffOutputParser {
    meta: ParserMeta,
    hunk_header: Regex,
    git_header: Regex,
    new_file: Regex,
    old_file: Regex,
}

impl Default for DiffOutputParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffOutputParser {
    /// Static patterns below are compile-time constants verified to be valid regex.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("diff-output", 35)
                .with_description("unified-diff (git diff / diff -u) classifier"),
            hunk_header: Regex::new(r"^@@ -\d+(?:,\d+)? \+\d+(?:,\d+)? @@.*$").expect("static pattern"),
            git_header: Regex::new(r"^diff --git a/(.+?) b/.+$").expect("static pattern"),
            new_file: Regex::new(r"^\+\+\+ b/(.+)$").expect("static pattern"),
            old_file: Regex::new(r"^--- a/(.+)$").expect("static pattern"),
        }
    }

    fn is_diff_marker(&self, line: &str) -> bool {
        self.hunk_header.is_match(line)
            || self.git_header.is_match(line)
            || self.new_file.is_match(line)
            || self.old_file.is_match(line)
    }
}

impl OutputParser for DiffOutputParser {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn can_parse(&self, ctx: &ParserContext) -> bool {
        ctx.last_lines.iter().any(|l| self.is_diff_marker(l))
    }

    fn parse(&self, ctx: &ParserContext) -> Option<SemanticOutput> {
        let lines = &ctx.last_lines;
        if !lines.iter().any(|l| self.hunk_header.is_match(l)) {
            return None;
        }

        let file = lines
            .iter()
            .find_map(|l| self.git_header.captures(l).map(|c| c[1].to_string()))
            .or_else(|| lines.iter().find_map(|l| self.new_file.captures(l).map(|c| c[1].to_string())))
            .or_else(|| lines.iter().find_map(|l| self.old_file.captures(l).map(|c| c[1].to_string())));

        let mut hunks = Vec::new();
        let mut current: Option<DiffHunk> = None;
        for line in lines {
            if self.hunk_header.is_match(line) {
                if let Some(hunk) = current.take() {
                    hunks.push(hunk);
                }
                current = Some(DiffHunk { header: line.clone(), changes: vec![] });
                continue;
            }
            let Some(hunk) = current.as_mut() else { continue };
            let (kind, content) = match line.chars().next() {
                Some('+') => (DiffChangeKind::Add, line[1..].to_string()),
                Some('-') => (DiffChangeKind::Remove, line[1..].to_string()),
                Some(' ') => (DiffChangeKind::Context, line[1..].to_string()),
                _ => continue,
            };
            hunk.changes.push(DiffChange { kind, content });
        }
        if let Some(hunk) = current.take() {
            hunks.push(hunk);
        }
        if hunks.is_empty() {
            return None;
        }

        Some(SemanticOutput {
            raw: lines.join("\n"),
            data: OutputPayload::Diff { file, hunks },
            confidence: 0.9,
            parser_name: self.meta.name.clone(),
        })
    }
}

#[cfg(test)]
#[path = "diff_output_tests.rs"]
mod tests;
