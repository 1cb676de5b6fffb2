// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fingerprint registry: named textual patterns with a category and
//! confidence, shared by multiple parsers so they don't duplicate the same
//! "what's on the screen?" regexes.

use std::collections::HashMap;

use regex::Regex;

use crate::context::ParserContext;

/// How a fingerprint's pattern should be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Regex,
    Literal,
    Enum,
    Marker,
}

/// Category a fingerprint belongs to; drives the per-category positive
/// lists and boolean hints produced by [`FingerprintRegistry::extract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Spinner,
    StatusBar,
    Prompt,
    Separator,
    Assistant,
    Tool,
    Error,
    Confirm,
}

/// A named textual pattern with a category and confidence.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    pub id: String,
    pub match_kind: MatchKind,
    pub category: Category,
    /// For `Regex`/`Literal`: a single pattern string. For `Enum`/`Marker`:
    /// `|`-joined alternates, tested individually against each line.
    pub pattern: String,
    pub confidence: f64,
    pub priority: i32,
    pub source: String,
}

impl Fingerprint {
    fn alternates(&self) -> Vec<&str> {
        self.pattern.split('|').collect()
    }
}

/// Result of testing one fingerprint against a context.
#[derive(Debug, Clone)]
pub struct FingerprintMatch {
    pub fingerprint_id: String,
    pub matched: bool,
    pub captures: Vec<String>,
    pub line_index: Option<usize>,
}

/// Aggregate result of running every registered fingerprint against a
/// context: a lookup by id, per-category positive matches, and cheap
/// boolean hints for higher-level parsers.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub by_id: HashMap<String, FingerprintMatch>,
    pub by_category: HashMap<Category, Vec<FingerprintMatch>>,
    pub has_spinner: bool,
    pub has_prompt: bool,
    pub has_tool_output: bool,
    pub has_confirm_dialog: bool,
    pub has_error: bool,
}

/// Registry of fingerprints, keyed by id and by category (categories
/// ordered by descending priority within the stored list).
#[derive(Default)]
pub struct FingerprintRegistry {
    fingerprints: Vec<Fingerprint>,
}

impl FingerprintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, fp: Fingerprint) {
        self.fingerprints.push(fp);
        self.fingerprints.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    pub fn unregister(&mut self, id: &str) {
        self.fingerprints.retain(|fp| fp.id != id);
    }

    pub fn clear(&mut self) {
        self.fingerprints.clear();
    }

    pub fn by_category(&self, category: Category) -> Vec<&Fingerprint> {
        self.fingerprints.iter().filter(|fp| fp.category == category).collect()
    }

    /// Test a single fingerprint against `ctx`, walking `last_lines` once.
    pub fn test(&self, fp: &Fingerprint, ctx: &ParserContext) -> FingerprintMatch {
        match fp.match_kind {
            MatchKind::Regex => {
                let Ok(re) = Regex::new(&fp.pattern) else {
                    return no_match(fp);
                };
                for (idx, line) in ctx.last_lines.iter().enumerate() {
                    if let Some(caps) = re.captures(line) {
                        let captures = caps
                            .iter()
                            .skip(1)
                            .filter_map(|m| m.map(|m| m.as_str().to_owned()))
                            .collect();
                        return FingerprintMatch {
                            fingerprint_id: fp.id.clone(),
                            matched: true,
                            captures,
                            line_index: Some(idx),
                        };
                    }
                }
                no_match(fp)
            }
            MatchKind::Literal => {
                for (idx, line) in ctx.last_lines.iter().enumerate() {
                    if line.contains(&fp.pattern) {
                        return FingerprintMatch {
                            fingerprint_id: fp.id.clone(),
                            matched: true,
                            captures: vec![],
                            line_index: Some(idx),
                        };
                    }
                }
                if ctx.screen_text.contains(&fp.pattern) {
                    return FingerprintMatch {
                        fingerprint_id: fp.id.clone(),
                        matched: true,
                        captures: vec![],
                        line_index: None,
                    };
                }
                no_match(fp)
            }
            MatchKind::Enum | MatchKind::Marker => {
                let alternates = fp.alternates();
                for (idx, line) in ctx.last_lines.iter().enumerate() {
                    for alt in &alternates {
                        if line.contains(alt) {
                            return FingerprintMatch {
                                fingerprint_id: fp.id.clone(),
                                matched: true,
                                captures: vec![(*alt).to_owned()],
                                line_index: Some(idx),
                            };
                        }
                    }
                }
                no_match(fp)
            }
        }
    }

    /// Run every registered fingerprint against `ctx` and build the
    /// aggregate extraction result.
    pub fn extract(&self, ctx: &ParserContext) -> ExtractionResult {
        let mut result = ExtractionResult::default();
        for fp in &self.fingerprints {
            let m = self.test(fp, ctx);
            if m.matched {
                result.by_category.entry(fp.category).or_default().push(m.clone());
                match fp.category {
                    Category::Spinner => result.has_spinner = true,
                    Category::Prompt => result.has_prompt = true,
                    Category::Tool => result.has_tool_output = true,
                    Category::Confirm => result.has_confirm_dialog = true,
                    Category::Error => result.has_error = true,
                    _ => {}
                }
            }
            result.by_id.insert(fp.id.clone(), m);
        }
        result
    }
}

fn no_match(fp: &Fingerprint) -> FingerprintMatch {
    FingerprintMatch {
        fingerprint_id: fp.id.clone(),
        matched: false,
        captures: vec![],
        line_index: None,
    }
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;
