use super::*;

fn ctx_with_title(title: &str) -> ParserContext {
    ParserContext::new("", vec![]).with_terminal_title(title)
}

#[test]
fn title_with_project_suffix_parses_task_name() {
    let p = ClaudeTitleParser::new();
    let c = ctx_with_title("✳ Refactoring parser… - myproject");
    assert!(p.can_parse(&c));
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::ClaudeTitle { task_name, is_processing, .. } => {
            assert_eq!(task_name, "Refactoring parser…");
            assert!(is_processing);
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn title_without_suffix_parses() {
    let p = ClaudeTitleParser::new();
    let c = ctx_with_title("⠋ Building index");
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::ClaudeTitle { task_name, .. } => assert_eq!(task_name, "Building index"),
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn no_title_does_not_match() {
    let p = ClaudeTitleParser::new();
    let c = ParserContext::new("", vec![]);
    assert!(!p.can_parse(&c));
    assert!(p.parse(&c).is_none());
}

#[test]
fn plain_title_does_not_match() {
    let p = ClaudeTitleParser::new();
    let c = ctx_with_title("user@host: ~/project");
    assert!(!p.can_parse(&c));
}
