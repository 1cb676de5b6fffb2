// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON output classifier. No teacher counterpart — the teacher never
//! needed to classify arbitrary command output, only Claude/Gemini screen
//! state. Grounded on the crate's own `OutputPayload::Json` shape; built to
//! match whenever the trailing screen text parses whole as JSON.

use crate::context::ParserContext;
use crate::parser::{OutputParser, ParserMeta};
use crate::types::{OutputPayload, SemanticOutput};

pub struct JsonOutputParser {
    meta: ParserMeta,
}

impl Default for JsonOutputParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonOutputParser {
    pub fn new() -> Self {
        Self {
            meta: ParserMeta::new("json-output", 40)
                .with_description("classifies trailing output that parses as whole JSON"),
        }
    }

    fn block(ctx: &ParserContext) -> Option<String> {
        let start = ctx.last_lines.iter().position(|l| {
            let t = l.trim_start();
            t.starts_with('{') || t.starts_with('[')
        })?;
        Some(ctx.last_lines[start..].join("\n"))
    }
}

impl OutputParser for JsonOutputParser {
    fn meta(&self) -> &ParserMeta {
        &self.meta
    }

    fn can_parse(&self, ctx: &ParserContext) -> bool {
        Self::block(ctx)
            .is_some_and(|block| serde_json::from_str::<serde_json::Value>(&block).is_ok())
    }

    fn parse(&self, ctx: &ParserContext) -> Option<SemanticOutput> {
        let block = Self::block(ctx)?;
        let data: serde_json::Value = serde_json::from_str(&block).ok()?;

        Some(SemanticOutput {
            raw: block,
            data: OutputPayload::Json { data },
            confidence: 0.9,
            parser_name: self.meta.name.clone(),
        })
    }
}

#[cfg(test)]
#[path = "json_output_tests.rs"]
mod tests;
