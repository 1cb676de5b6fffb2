// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipe-delimited table classifier. No teacher counterpart — grounded on
//! the crate's own `OutputPayload::Table` shape. Recognises a Markdown-
//! style table: a header row, a `---`/`:--`-style separator row, and zero
//! or more data rows, all pipe-delimited.

use std::collections::HashMap;

use regex::Regex;

use crate::context::ParserContext;
use crate::parser::{OutputParser, ParserMeta};
use crate::types::{OutputPayload, SemanticOutput};

pub struct TableOutputParser {
    meta: ParserMeta,
    separator: Regex,
}

impl Default for TableOutputParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TableOutputParser {
    /// Static patterns below are compile-time constants verified to be valid regex.
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("table-output", 30)
                .with_description("pipe-delimited Markdown table classifier"),
            separator: Regex::new(r"^\|?[\s:|-]+\|?$").expect("static pattern"),
        }
    }

    fn split_row(line: &str) -> Vec<String> {
        line.trim().trim_matches('|').split('|').map(|c| c.trim().to_string()).collect()
    }

    fn header_index(&self, lines: &[String]) -> Option<usize> {
        for i in 0..lines.len().saturating_sub(1) {
            if lines[i].contains('|') && self.separator.is_match(lines[i + 1].trim()) {
                return Some(i);
            }
        }
        None
    }
}

impl OutputParser for TableOutputParser {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn can_parse(&self, ctx: &ParserContext) -> bool {
        self.header_index(&ctx.last_lines).is_some()
    }

    fn parse(&self, ctx: &ParserContext) -> Option<SemanticOutput> {
        let idx = self.header_index(&ctx.last_lines)?;
        let headers = Self::split_row(&ctx.last_lines[idx]);

        let mut rows = Vec::new();
        for line in &ctx.last_lines[idx + 2..] {
            if !line.contains('|') {
                break;
            }
            let cells = Self::split_row(line);
            let mut row: HashMap<String, String> = HashMap::new();
            for (header, cell) in headers.iter().zip(cells.into_iter()) {
                row.insert(header.clone(), cell);
            }
            rows.push(row);
        }

        let raw = ctx.last_lines[idx..idx + 2 + rows.len()].join("\n");

        Some(SemanticOutput {
            raw,
            data: OutputPayload::Table { headers, rows },
            confidence: 0.85,
            parser_name: self.meta.name.clone(),
        })
    }
}

#[cfg(test)]
#[path = "table_output_tests.rs"]
mod tests;
