use super::*;

fn ctx(lines: &[&str]) -> ParserContext {
    let last_lines: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
    ParserContext::new(last_lines.join("\n"), last_lines)
}

#[test]
fn regex_fingerprint_matches_and_captures() {
    let fp = Fingerprint {
        id: "err".into(),
        match_kind: MatchKind::Regex,
        category: Category::Error,
        pattern: r"code (\w+)".into(),
        confidence: 0.8,
        priority: 1,
        source: "test".into(),
    };
    let registry = FingerprintRegistry::new();
    let m = registry.test(&fp, &ctx(&["npm ERR! code ERESOLVE"]));
    assert!(m.matched);
    assert_eq!(m.captures, vec!["ERESOLVE".to_string()]);
}

#[test]
fn literal_fingerprint_falls_back_to_screen_text() {
    let fp = Fingerprint {
        id: "lit".into(),
        match_kind: MatchKind::Literal,
        category: Category::Confirm,
        pattern: "Continue?".into(),
        confidence: 0.5,
        priority: 1,
        source: "test".into(),
    };
    let registry = FingerprintRegistry::new();
    let mut c = ctx(&["something else"]);
    c.screen_text = "wrapped text Continue? more".into();
    let m = registry.test(&fp, &c);
    assert!(m.matched);
    assert_eq!(m.line_index, None);
}

#[test]
fn enum_fingerprint_returns_first_alternate() {
    let fp = Fingerprint {
        id: "spinner".into(),
        match_kind: MatchKind::Enum,
        category: Category::Spinner,
        pattern: "⠋|⠙|⠹".into(),
        confidence: 0.6,
        priority: 1,
        source: "test".into(),
    };
    let registry = FingerprintRegistry::new();
    let m = registry.test(&fp, &ctx(&["⠙ loading"]));
    assert!(m.matched);
    assert_eq!(m.captures, vec!["⠙".to_string()]);
}

#[test]
fn extract_sets_boolean_hints() {
    let mut registry = FingerprintRegistry::new();
    registry.register(Fingerprint {
        id: "prompt".into(),
        match_kind: MatchKind::Literal,
        category: Category::Prompt,
        pattern: "❯".into(),
        confidence: 0.7,
        priority: 10,
        source: "test".into(),
    });
    registry.register(Fingerprint {
        id: "err".into(),
        match_kind: MatchKind::Literal,
        category: Category::Error,
        pattern: "Error:".into(),
        confidence: 0.8,
        priority: 20,
        source: "test".into(),
    });
    let result = registry.extract(&ctx(&["❯ ", "Error: boom"]));
    assert!(result.has_prompt);
    assert!(result.has_error);
    assert!(!result.has_spinner);
    assert_eq!(result.by_id.len(), 2);
}

#[test]
fn unregister_and_clear_remove_fingerprints() {
    let mut registry = FingerprintRegistry::new();
    registry.register(Fingerprint {
        id: "a".into(),
        match_kind: MatchKind::Literal,
        category: Category::Tool,
        pattern: "x".into(),
        confidence: 0.5,
        priority: 1,
        source: "test".into(),
    });
    registry.unregister("a");
    assert!(registry.by_category(Category::Tool).is_empty());

    registry.register(Fingerprint {
        id: "b".into(),
        match_kind: MatchKind::Literal,
        category: Category::Tool,
        pattern: "y".into(),
        confidence: 0.5,
        priority: 1,
        source: "test".into(),
    });
    registry.clear();
    assert!(registry.by_category(Category::Tool).is_empty());
}

#[test]
fn by_category_sorted_by_descending_priority() {
    let mut registry = FingerprintRegistry::new();
    registry.register(Fingerprint {
        id: "low".into(),
        match_kind: MatchKind::Literal,
        category: Category::Tool,
        pattern: "x".into(),
        confidence: 0.5,
        priority: 1,
        source: "test".into(),
    });
    registry.register(Fingerprint {
        id: "high".into(),
        match_kind: MatchKind::Literal,
        category: Category::Tool,
        pattern: "y".into(),
        confidence: 0.5,
        priority: 100,
        source: "test".into(),
    });
    let by_cat = registry.by_category(Category::Tool);
    assert_eq!(by_cat[0].id, "high");
    assert_eq!(by_cat[1].id, "low");
}
