use std::fs;

use super::*;

#[test]
fn disabled_sink_never_touches_the_filesystem() {
    let sink = LogSink::disabled();
    sink.session_started("sess-1");
    sink.input(b"echo hi");
    sink.output(b"hi\r\n");
    sink.session_ended("sess-1");
    // No path configured, nothing to assert beyond "did not panic".
}

#[test]
fn writes_banners_and_interleaved_io() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.log");
    let sink = LogSink::new(Some(path.clone()));

    sink.session_started("sess-1");
    sink.input(b"echo hi");
    sink.output(b"hi\r\n");
    sink.session_ended("sess-1");

    let contents = fs::read_to_string(&path).expect("log file written");
    assert!(contents.contains("--- session sess-1 started at"));
    assert!(contents.contains("[INPUT] echo hi"));
    assert!(contents.contains("hi\r\n"));
    assert!(contents.contains("--- session sess-1 ended at"));
}

#[test]
fn appends_across_multiple_writes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.log");
    let sink = LogSink::new(Some(path.clone()));

    sink.input(b"one");
    sink.input(b"two");

    let contents = fs::read_to_string(&path).expect("log file written");
    assert!(contents.contains("[INPUT] one"));
    assert!(contents.contains("[INPUT] two"));
}

#[test]
fn civil_date_roundtrip_matches_known_epoch_values() {
    // 1970-01-01 is day 0 since the epoch.
    assert_eq!(civil_from_days(0), (1970, 1, 1));
    // 2000-03-01 is a well-known reference point for this algorithm.
    assert_eq!(civil_from_days(11017), (2000, 3, 1));
}
