use super::*;

fn ctx(lines: &[&str]) -> ParserContext {
    let text = lines.join("\n");
    ParserContext::new(text, lines.iter().map(|s| s.to_string()).collect())
}

#[test]
fn collects_plain_response_lines() {
    let p = ClaudeContentParser::new();
    let c = ctx(&["Here is the summary:", "- item one", "- item two"]);
    assert!(p.can_parse(&c));
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::ClaudeContent { content, is_complete, role } => {
            assert_eq!(role, "assistant");
            assert!(content.contains("item one"));
            assert!(!is_complete);
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn idle_prompt_below_marks_complete() {
    let p = ClaudeContentParser::new();
    let c = ctx(&["Done with the refactor.", "❯ "]);
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::ClaudeContent { is_complete, .. } => assert!(is_complete),
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn skips_tool_headers_and_spinners() {
    let p = ClaudeContentParser::new();
    let c = ctx(&["⏺ Bash(ls)", "⠋ Running", "actual response text"]);
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::ClaudeContent { content, .. } => {
            assert_eq!(content, "actual response text");
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn blank_screen_does_not_match() {
    let p = ClaudeContentParser::new();
    let c = ctx(&["", "   "]);
    assert!(!p.can_parse(&c));
    assert!(p.parse(&c).is_none());
}
