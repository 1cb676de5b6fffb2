use super::*;

#[test]
fn swallow_panics_returns_none_on_panic() {
    let result: Option<i32> = swallow_panics(|| panic!("boom"));
    assert_eq!(result, None);
}

#[test]
fn swallow_panics_passes_through_value() {
    let result = swallow_panics(|| Some(42));
    assert_eq!(result, Some(42));
}

#[test]
fn parser_meta_builder() {
    let meta = ParserMeta::new("shell", 10)
        .with_description("generic shell prompt detector")
        .with_version("1.0");
    assert_eq!(meta.name, "shell");
    assert_eq!(meta.priority, 10);
    assert_eq!(meta.description.as_deref(), Some("generic shell prompt detector"));
}
