use super::*;

#[test]
fn exact_match() {
    assert!(glob_match("hello", "hello"));
    assert!(!glob_match("hello", "hello world"));
}

#[test]
fn any_match() {
    assert!(glob_match("*", "anything at all"));
    assert!(glob_match("*", ""));
}

#[test]
fn prefix_match() {
    assert!(glob_match("foo*", "foobar"));
    assert!(!glob_match("foo*", "barfoo"));
}

#[test]
fn suffix_match() {
    assert!(glob_match("*foo", "barfoo"));
    assert!(!glob_match("*foo", "foobar"));
}

#[test]
fn middle_match() {
    assert!(glob_match("foo*bar", "foo-anything-bar"));
    assert!(!glob_match("foo*bar", "foobarbaz"));
}

#[test]
fn regex_metacharacters_are_escaped() {
    assert!(glob_match("a.b*", "a.bc"));
    assert!(!glob_match("a.b*", "axbc"));
}

#[test]
fn arbitrary_interior_stars() {
    assert!(glob_match("a*b*c", "a123b456c"));
    assert!(!glob_match("a*b*c", "a123b456"));
}
