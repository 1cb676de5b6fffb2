use super::*;

fn ctx(lines: &[&str]) -> ParserContext {
    let text = lines.join("\n");
    ParserContext::new(text, lines.iter().map(|s| s.to_string()).collect())
}

#[test]
fn parses_single_hunk_diff() {
    let p = DiffOutputParser::new();
    let c = ctx(&[
        "--- a/src/lib.rs",
        "+++ b/src/lib.rs",
        "@@ -1,3 +1,4 @@",
        " fn main() {",
        "-    old();",
        "+    new();",
        "+    extra();",
        " }",
    ]);
    assert!(p.can_parse(&c));
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::Diff { file, hunks } => {
            assert_eq!(file.as_deref(), Some("src/lib.rs"));
            assert_eq!(hunks.len(), 1);
            assert_eq!(hunks[0].changes.len(), 4);
            assert_eq!(hunks[0].changes[1].kind, DiffChangeKind::Remove);
            assert_eq!(hunks[0].changes[1].content, "    old();");
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn parses_multiple_hunks() {
    let p = DiffOutputParser::new();
    let c = ctx(&[
        "+++ b/a.txt",
        "@@ -1,1 +1,1 @@",
        "-a",
        "+b",
        "@@ -10,1 +10,1 @@",
        "-c",
        "+d",
    ]);
    let out = p.parse(&c).unwrap();
    match out.data {
        OutputPayload::Diff { hunks, .. } => assert_eq!(hunks.len(), 2),
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn git_diff_header_is_the_primary_file_source() {
    let p = DiffOutputParser::new();
    let c = ctx(&["diff --git a/x b/x", "@@ -1,1 +1,1 @@", "-bar", "+foo"]);
    assert!(p.can_parse(&c));
    let out = p.parse(&c).unwrap();
    assert_eq!(out.confidence, 0.9);
    match out.data {
        OutputPayload::Diff { file, hunks } => {
            assert_eq!(file.as_deref(), Some("x"));
            assert_eq!(hunks.len(), 1);
            assert_eq!(hunks[0].changes[0].kind, DiffChangeKind::Remove);
            assert_eq!(hunks[0].changes[0].content, "bar");
            assert_eq!(hunks[0].changes[1].kind, DiffChangeKind::Add);
            assert_eq!(hunks[0].changes[1].content, "foo");
        }
        _ => panic!("wrong payload variant"),
    }
}

#[test]
fn plain_text_does_not_match() {
    let p = DiffOutputParser::new();
    let c = ctx(&["just regular output"]);
    assert!(!p.can_parse(&c));
    assert!(p.parse(&c).is_none());
}
