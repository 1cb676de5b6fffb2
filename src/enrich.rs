// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Severity classification and suggestion enrichment.
//!
//! Grounded on the teacher's `driver/error_category.rs`: a case-insensitive
//! substring cascade checked in a fixed priority order, generalised from a
//! fixed `ErrorCategory` enum into a [`Severity`] ranking plus a small
//! suggestion catalogue keyed by the same kind of substring match.

use crate::types::{
    EnhancedOutput, OutputMetadata, SemanticOutput, Severity, Suggestion, SuggestionKind,
};

/// Classify severity from raw output text. Checked in priority order —
/// critical wins over error, error over warning, warning over success —
/// so a line matching more than one bucket always resolves to the most
/// severe.
pub fn classify_severity(text: &str) -> Severity {
    let lower = text.to_lowercase();

    if lower.contains("panic") || lower.contains("segmentation fault") || lower.contains("fatal") {
        return Severity::Critical;
    }

    if lower.contains("error")
        || lower.contains("exception")
        || lower.contains("traceback")
        || lower.contains("failed")
        || lower.contains("command not found")
        || lower.contains("permission denied")
        || lower.contains("rate limit")
        || lower.contains("err!")
        || lower.contains("eresolve")
    {
        return Severity::Error;
    }

    if lower.contains("warning") || lower.contains("warn:") || lower.contains("deprecated") {
        return Severity::Warning;
    }

    if lower.contains("success")
        || lower.contains("passed")
        || lower.contains("completed")
        || lower.contains('✓')
        || lower.contains('✔')
    {
        return Severity::Success;
    }

    Severity::Info
}

/// A suggestion rule: fires when `pattern` appears (case-insensitive) in
/// the raw output text.
struct SuggestionRule {
    pattern: &'static str,
    build: fn() -> Suggestion,
}

const SUGGESTION_RULES: &[SuggestionRule] = &[
    SuggestionRule {
        pattern: "eresolve",
        build: || Suggestion {
            kind: SuggestionKind::Fix,
            action: "npm install --legacy-peer-deps".to_string(),
            description: "Dependency tree has conflicting peer requirements".to_string(),
            confidence: 0.8,
            automated: true,
            requires: None,
        },
    },
    SuggestionRule {
        pattern: "rate limit",
        build: || Suggestion {
            kind: SuggestionKind::Retry,
            action: "retry after backoff".to_string(),
            description: "Request was rate limited by the upstream service".to_string(),
            confidence: 0.8,
            automated: false,
            requires: None,
        },
    },
    SuggestionRule {
        pattern: "command not found",
        build: || Suggestion {
            kind: SuggestionKind::Investigate,
            action: "check PATH or install the missing binary".to_string(),
            description: "Shell could not locate the requested command".to_string(),
            confidence: 0.7,
            automated: false,
            requires: None,
        },
    },
    SuggestionRule {
        pattern: "permission denied",
        build: || Suggestion {
            kind: SuggestionKind::Fix,
            action: "check file permissions or ownership".to_string(),
            description: "Operation was rejected by the filesystem permission model".to_string(),
            confidence: 0.7,
            automated: false,
            requires: None,
        },
    },
    SuggestionRule {
        pattern: "no such file or directory",
        build: || Suggestion {
            kind: SuggestionKind::Investigate,
            action: "verify the path exists".to_string(),
            description: "Referenced path does not exist".to_string(),
            confidence: 0.65,
            automated: false,
            requires: None,
        },
    },
];

/// Build the suggestion list for a piece of raw output text.
pub fn suggest(text: &str) -> Vec<Suggestion> {
    let lower = text.to_lowercase();
    SUGGESTION_RULES.iter().filter(|r| lower.contains(r.pattern)).map(|r| (r.build)()).collect()
}

/// Enrich a [`SemanticOutput`] with severity, suggestions, and execution
/// metadata.
pub fn enrich(output: SemanticOutput, metadata: OutputMetadata) -> EnhancedOutput {
    let severity = classify_severity(&output.raw);
    let suggestions = suggest(&output.raw);

    EnhancedOutput {
        raw: output.raw,
        data: output.data,
        confidence: output.confidence,
        parser_name: output.parser_name,
        severity,
        suggestions,
        metadata,
    }
}

#[cfg(test)]
#[path = "enrich_tests.rs"]
mod tests;
