use super::*;

fn ctx(lines: &[&str]) -> ParserContext {
    let text = lines.join("\n");
    ParserContext::new(text, lines.iter().map(|s| s.to_string()).collect())
}

#[test]
fn pulling_layer_is_tool_running() {
    let det = DockerStateDetector::new();
    let result = det.detect_state(&ctx(&["Pulling fs layer", "latest: Pulling from library/ubuntu"])).unwrap();
    assert_eq!(result.state, SessionState::ToolRunning);
}

#[test]
fn build_step_is_tool_running() {
    let det = DockerStateDetector::new();
    let result = det.detect_state(&ctx(&["Step 3/7 : RUN apt-get update"])).unwrap();
    assert_eq!(result.state, SessionState::ToolRunning);
}

#[test]
fn daemon_not_running_is_error() {
    let det = DockerStateDetector::new();
    let result = det
        .detect_state(&ctx(&["Cannot connect to the Docker daemon at unix:///var/run/docker.sock"]))
        .unwrap();
    assert_eq!(result.state, SessionState::Error);
}

#[test]
fn no_such_image_is_error() {
    let det = DockerStateDetector::new();
    let result = det.detect_state(&ctx(&["Error: No such image: foo:latest"])).unwrap();
    assert_eq!(result.state, SessionState::Error);
}

#[test]
fn trailing_prompt_is_idle() {
    let det = DockerStateDetector::new();
    let result = det.detect_state(&ctx(&["Successfully built abc123", "user@host:~$ "])).unwrap();
    assert_eq!(result.state, SessionState::Idle);
}

#[test]
fn unrelated_output_detects_nothing() {
    let det = DockerStateDetector::new();
    assert!(det.detect_state(&ctx(&["hello world"])).is_none());
}
