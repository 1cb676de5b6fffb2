use super::*;

fn ctx(lines: &[&str]) -> ParserContext {
    let text = lines.join("\n");
    ParserContext::new(text, lines.iter().map(|s| s.to_string()).collect())
}

#[test]
fn detects_bracket_y_n_prompt() {
    let p = GenericConfirmParser::new();
    let info = p.detect_confirm(&ctx(&["Overwrite existing file? [y/n]"])).unwrap();
    assert_eq!(info.kind, ConfirmKind::YesNo);
    assert_eq!(info.prompt, "Overwrite existing file?");
}

#[test]
fn detects_capitalized_default_variant() {
    let p = GenericConfirmParser::new();
    let info = p.detect_confirm(&ctx(&["Proceed with install? [Y/n]:"])).unwrap();
    assert_eq!(info.raw_prompt, "Proceed with install? [Y/n]:");
}

#[test]
fn confirm_formats_as_y_cr() {
    let p = GenericConfirmParser::new();
    let response = ConfirmResponse { action: ConfirmAction::Confirm, option: None, value: None };
    let info = ConfirmInfo {
        kind: ConfirmKind::YesNo,
        prompt: "x".into(),
        options: vec![],
        tool: None,
        raw_prompt: "x [y/n]".into(),
    };
    assert_eq!(p.format_response(&info, &response), b"y\r".to_vec());
}

#[test]
fn deny_formats_as_n_cr() {
    let p = GenericConfirmParser::new();
    let response = ConfirmResponse { action: ConfirmAction::Deny, option: None, value: None };
    let info = ConfirmInfo {
        kind: ConfirmKind::YesNo,
        prompt: "x".into(),
        options: vec![],
        tool: None,
        raw_prompt: "x [y/n]".into(),
    };
    assert_eq!(p.format_response(&info, &response), b"n\r".to_vec());
}

#[test]
fn non_matching_line_detects_nothing() {
    let p = GenericConfirmParser::new();
    assert!(p.detect_confirm(&ctx(&["just some output"])).is_none());
}
