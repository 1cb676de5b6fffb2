use super::*;

fn ctx(lines: &[&str]) -> ParserContext {
    let text = lines.join("\n");
    ParserContext::new(text, lines.iter().map(|s| s.to_string()).collect())
}

#[test]
fn inline_bash_tool_completion_parses_duration_and_output() {
    let p = ClaudeToolParser::new();
    let c = ctx(&[
        "⏺ Bash(cargo test --all)",
        "⎿ running 42 tests",
        "⎿ test result: ok. 42 passed",
        "  (3.2s)",
    ]);
    assert!(p.can_parse(&c));
    let out = p.parse(&c).unwrap();
    assert_eq!(out.confidence, 0.95);
    match out.data {
        OutputPayload::ClaudeTool { tool_name, output, duration_ms, status, .. } => {
            assert_eq!(tool_name, "Bash");
            assert_eq!(duration_ms, Some(3200));
            assert_eq!(status, "completed");
            assert!(output.unwrap().contains("42 passed"));
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn box_mode_header_with_completion_and_params() {
    let p = ClaudeToolParser::new();
    let c = ctx(&["⏺ Bash (completed in 0.5s)", "  │ command: \"git status\""]);
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::ClaudeTool { tool_name, params, duration_ms, status, .. } => {
            assert_eq!(tool_name, "Bash");
            assert_eq!(duration_ms, Some(500));
            assert_eq!(status, "completed");
            assert_eq!(params.get("command").and_then(|v| v.as_str()), Some("git status"));
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn box_mode_running_without_completion() {
    let p = ClaudeToolParser::new();
    let c = ctx(&["⏺ Read", "  │ file_path: \"/tmp/x.rs\""]);
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::ClaudeTool { status, params, .. } => {
            assert_eq!(status, "running");
            assert_eq!(params.get("file_path").and_then(|v| v.as_str()), Some("/tmp/x.rs"));
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn unknown_tool_gets_lower_confidence() {
    let p = ClaudeToolParser::new();
    let c = ctx(&["⏺ SomeCustomTool(arg)"]);
    let out = p.parse(&c).unwrap();
    assert_eq!(out.confidence, 0.8);
}

#[test]
fn error_output_without_duration_is_still_running() {
    let p = ClaudeToolParser::new();
    let c = ctx(&["⏺ Bash(rm missing.txt)", "⎿ Error: No such file or directory"]);
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::ClaudeTool { status, output, .. } => {
            assert_eq!(status, "running");
            assert!(output.unwrap().contains("No such file or directory"));
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn error_output_with_duration_is_completed_not_error() {
    let p = ClaudeToolParser::new();
    let c = ctx(&[
        "⏺ Bash(rm missing.txt)",
        "⎿ Error: No such file or directory",
        "  (0.1s)",
    ]);
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::ClaudeTool { status, duration_ms, .. } => {
            assert_eq!(status, "completed");
            assert_eq!(duration_ms, Some(100));
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn tool_without_output_is_running() {
    let p = ClaudeToolParser::new();
    let c = ctx(&["⏺ Bash(sleep 5)"]);
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::ClaudeTool { status, output, .. } => {
            assert_eq!(status, "running");
            assert!(output.is_none());
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn non_tool_lines_do_not_match() {
    let p = ClaudeToolParser::new();
    let c = ctx(&["just some output"]);
    assert!(!p.can_parse(&c));
}
