use super::*;

fn ctx(lines: &[&str]) -> ParserContext {
    let text = lines.join("\n");
    ParserContext::new(text, lines.iter().map(|s| s.to_string()).collect())
}

#[test]
fn spinner_with_explicit_phase_hint() {
    let p = ClaudeStatusParser::new();
    let c = ctx(&["· Precipitating… (esc to interrupt · thinking)"]);
    assert!(p.can_parse(&c));
    let out = p.parse(&c).unwrap();
    assert_eq!(out.confidence, 0.95);
    match out.data {
        OutputPayload::ClaudeStatus { spinner, status_text, phase, interruptible } => {
            assert_eq!(spinner, "·");
            assert_eq!(status_text, "Precipitating…");
            assert_eq!(phase, "thinking");
            assert!(interruptible);
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn spinner_without_phase_hint_defaults_to_thinking() {
    let p = ClaudeStatusParser::new();
    let c = ctx(&["✳ Pondering (esc to interrupt)"]);
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::ClaudeStatus { phase, interruptible, .. } => {
            assert_eq!(phase, "thinking");
            assert!(interruptible);
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn plain_text_does_not_match() {
    let p = ClaudeStatusParser::new();
    let c = ctx(&["just some regular output"]);
    assert!(!p.can_parse(&c));
    assert!(p.parse(&c).is_none());
}

#[test]
fn status_line_without_interrupt_hint_does_not_match() {
    let p = ClaudeStatusParser::new();
    let c = ctx(&["✳ Thinking"]);
    assert!(!p.can_parse(&c));
}
