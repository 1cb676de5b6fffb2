use super::*;
use crate::types::OutputPayload;

fn output(raw: &str) -> SemanticOutput {
    SemanticOutput {
        raw: raw.to_string(),
        data: OutputPayload::Text { content: raw.to_string() },
        confidence: 0.9,
        parser_name: "test".to_string(),
    }
}

#[test]
fn panic_is_critical() {
    assert_eq!(classify_severity("thread 'main' panicked at src/main.rs"), Severity::Critical);
}

#[test]
fn eresolve_is_error_with_fix_suggestion() {
    let npm_output = "npm ERR! code ERESOLVE\nnpm ERR! ERESOLVE unable to resolve dependency tree";
    assert_eq!(classify_severity(npm_output), Severity::Error);
    let suggestions = suggest(npm_output);
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].kind, SuggestionKind::Fix);
    assert!(suggestions[0].action.contains("legacy-peer-deps"));
    assert_eq!(suggestions[0].confidence, 0.8);
    assert!(suggestions[0].automated);
}

#[test]
fn success_marker_is_success_severity() {
    assert_eq!(classify_severity("test result: ok. 4 passed"), Severity::Success);
}

#[test]
fn plain_text_is_info() {
    assert_eq!(classify_severity("just some regular output"), Severity::Info);
}

#[test]
fn enrich_attaches_severity_and_suggestions_to_metadata() {
    let meta = OutputMetadata { timestamp: 1000, session_id: Some("s1".into()), ..Default::default() };
    let enhanced = enrich(output("rate limit exceeded, please retry"), meta);
    assert_eq!(enhanced.severity, Severity::Error);
    assert_eq!(enhanced.suggestions[0].kind, SuggestionKind::Retry);
    assert_eq!(enhanced.metadata.session_id.as_deref(), Some("s1"));
}

#[test]
fn error_outranks_warning_when_both_present() {
    assert_eq!(classify_severity("warning: deprecated, error: failed to build"), Severity::Error);
}
