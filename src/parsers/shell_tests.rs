use super::*;

fn ctx(lines: &[&str]) -> ParserContext {
    let text = lines.join("\n");
    ParserContext::new(text, lines.iter().map(|s| s.to_string()).collect())
}

#[test]
fn bare_dollar_prompt_is_idle() {
    let det = ShellStateDetector::new();
    let result = det.detect_state(&ctx(&["user@host:~$ "])).unwrap();
    assert_eq!(result.state, SessionState::Idle);
    assert!(result.confidence >= 0.7);
}

#[test]
fn fancy_arrow_prompt_is_idle() {
    let det = ShellStateDetector::new();
    let result = det.detect_state(&ctx(&["~/project on main", "❯ "])).unwrap();
    assert_eq!(result.state, SessionState::Idle);
}

#[test]
fn braille_spinner_is_tool_running() {
    let det = ShellStateDetector::new();
    let result = det.detect_state(&ctx(&["⠋ building..."])).unwrap();
    assert_eq!(result.state, SessionState::ToolRunning);
}

#[test]
fn ellipsis_tail_is_tool_running() {
    let det = ShellStateDetector::new();
    let result = det.detect_state(&ctx(&["Installing dependencies..."])).unwrap();
    assert_eq!(result.state, SessionState::ToolRunning);
}

#[test]
fn command_not_found_is_error() {
    let det = ShellStateDetector::new();
    let result = det.detect_state(&ctx(&["bash: foo: command not found"])).unwrap();
    assert_eq!(result.state, SessionState::Error);
    assert!(result.confidence >= 0.8);
}

#[test]
fn bash_colon_prefix_with_message_is_error() {
    let det = ShellStateDetector::new();
    let result = det.detect_state(&ctx(&["zsh: permission denied: ./run.sh"])).unwrap();
    assert_eq!(result.state, SessionState::Error);
}

#[test]
fn prompt_like_colon_tail_is_not_error() {
    let det = ShellStateDetector::new();
    // "root@host: ~#" should not be misread as a bash error prefix.
    let result = det.detect_state(&ctx(&["root@host: ~#"]));
    assert_eq!(result.unwrap().state, SessionState::Idle);
}

#[test]
fn empty_screen_detects_nothing() {
    let det = ShellStateDetector::new();
    assert!(det.detect_state(&ctx(&[])).is_none());
}
