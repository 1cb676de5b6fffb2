use super::*;

#[test]
fn session_state_wire_strings_are_snake_case() {
    assert_eq!(SessionState::ToolRunning.as_str(), "tool_running");
    assert_eq!(SessionState::Idle.as_str(), "idle");
}

#[test]
fn exited_is_the_only_terminal_state() {
    assert!(SessionState::Exited.is_terminal());
    assert!(!SessionState::Error.is_terminal());
}

#[test]
fn severity_ordering_matches_priority() {
    assert!(Severity::Critical > Severity::Error);
    assert!(Severity::Error > Severity::Warning);
    assert!(Severity::Warning > Severity::Success);
    assert!(Severity::Success > Severity::Info);
}

#[test]
fn now_ms_is_nonzero_and_monotonic_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(b >= a);
    assert!(a > 0);
}

#[test]
fn enhanced_output_serializes_without_empty_suggestions() {
    let output = EnhancedOutput {
        raw: "ok".into(),
        data: OutputPayload::Text { content: "ok".into() },
        confidence: 0.9,
        parser_name: "text".into(),
        severity: Severity::Info,
        suggestions: vec![],
        metadata: OutputMetadata { timestamp: 1, ..Default::default() },
    };
    let json = serde_json::to_string(&output).unwrap();
    assert!(!json.contains("suggestions"));
}
