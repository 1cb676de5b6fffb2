use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

use super::*;
use crate::preset::Preset;
use crate::pty::{Backend, ExitStatus, SpawnOptions};

/// Fake backend that greets with a shell prompt on start, then on every
/// write echoes a brief "working" marker followed by a trailing prompt —
/// enough to drive the generic-shell detector through idle -> tool_running
/// -> idle without a real PTY.
struct FakeBackend;

impl Backend for FakeBackend {
    fn run(
        &mut self,
        output_tx: mpsc::Sender<Bytes>,
        mut input_rx: mpsc::Receiver<crate::pty::BackendInput>,
        mut resize_rx: mpsc::Receiver<(u16, u16)>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ExitStatus>> + Send + '_>> {
        Box::pin(async move {
            let _ = output_tx.send(Bytes::from_static("\u{276f} ".as_bytes())).await;
            loop {
                tokio::select! {
                    input = input_rx.recv() => {
                        match input {
                            Some(crate::pty::BackendInput::Write(bytes)) => {
                                let text = String::from_utf8_lossy(&bytes).trim_end_matches('\r').to_string();
                                let _ = output_tx.send(Bytes::from("\r\n...\r\n")).await;
                                tokio::time::sleep(Duration::from_millis(15)).await;
                                let _ = output_tx
                                    .send(Bytes::from(format!("{text}-done\r\n\u{276f} ")))
                                    .await;
                            }
                            Some(crate::pty::BackendInput::Drain(done)) => {
                                let _ = done.send(());
                            }
                            None => break,
                        }
                    }
                    _ = resize_rx.recv() => {}
                }
            }
            Ok(ExitStatus { code: Some(0), signal: None })
        })
    }

    fn resize(&self, _cols: u16, _rows: u16) -> anyhow::Result<()> {
        Ok(())
    }

    fn child_pid(&self) -> Option<u32> {
        None
    }
}

/// Backend that never produces any output and never exits on its own —
/// used for kill()/timeout tests where we don't want the fake shell's
/// scripted replies in the way.
struct SilentBackend;

impl Backend for SilentBackend {
    fn run(
        &mut self,
        _output_tx: mpsc::Sender<Bytes>,
        mut input_rx: mpsc::Receiver<crate::pty::BackendInput>,
        mut resize_rx: mpsc::Receiver<(u16, u16)>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ExitStatus>> + Send + '_>> {
        Box::pin(async move {
            loop {
                tokio::select! {
                    input = input_rx.recv() => {
                        if input.is_none() {
                            break;
                        }
                    }
                    _ = resize_rx.recv() => {}
                }
            }
            Ok(ExitStatus { code: Some(0), signal: None })
        })
    }

    fn resize(&self, _cols: u16, _rows: u16) -> anyhow::Result<()> {
        Ok(())
    }

    fn child_pid(&self) -> Option<u32> {
        None
    }
}

struct FakeSpawner;

impl crate::pty::PtySpawner for FakeSpawner {
    fn spawn(
        &self,
        _command: &[String],
        _opts: &SpawnOptions,
    ) -> anyhow::Result<Box<dyn Backend>> {
        Ok(Box::new(FakeBackend))
    }
}

struct SilentSpawner;

impl crate::pty::PtySpawner for SilentSpawner {
    fn spawn(
        &self,
        _command: &[String],
        _opts: &SpawnOptions,
    ) -> anyhow::Result<Box<dyn Backend>> {
        Ok(Box::new(SilentBackend))
    }
}

fn fake_driver() -> SessionDriver {
    SessionDriver::new("sess-1", Preset::shell(), None, Arc::new(FakeSpawner))
}

fn silent_driver() -> SessionDriver {
    SessionDriver::new("sess-2", Preset::shell(), None, Arc::new(SilentSpawner))
}

#[tokio::test]
async fn write_before_start_is_not_started_error() {
    let driver = fake_driver();
    let err = driver.write(Bytes::from_static(b"hi")).await.unwrap_err();
    assert_eq!(err.kind, DriverErrorKind::NotStarted);
}

#[tokio::test]
async fn start_then_reaches_idle_from_prompt() {
    let driver = fake_driver();
    driver.start().await.unwrap();
    driver.wait_for_state(SessionState::Idle, Duration::from_secs(2)).await.unwrap();
    assert_eq!(driver.state().await.unwrap(), SessionState::Idle);
}

#[tokio::test]
async fn double_start_is_already_started_error() {
    let driver = fake_driver();
    driver.start().await.unwrap();
    let err = driver.start().await.unwrap_err();
    assert_eq!(err.kind, DriverErrorKind::AlreadyStarted);
}

#[tokio::test]
async fn exec_requires_idle_state() {
    let driver = fake_driver();
    driver.start().await.unwrap();
    // Before the prompt is observed the state is still `starting`.
    let err = driver.exec("echo hi", Duration::from_secs(2)).await;
    if let Err(e) = err {
        assert_eq!(e.kind, DriverErrorKind::WrongState);
    }
}

#[tokio::test]
async fn exec_happy_path_returns_new_content() {
    let driver = fake_driver();
    driver.start().await.unwrap();
    driver.wait_for_state(SessionState::Idle, Duration::from_secs(2)).await.unwrap();

    let result = driver.exec("echo hi", Duration::from_secs(2)).await.unwrap();
    assert!(result.raw_text().contains("echo hi-done"));
}

#[tokio::test]
async fn wait_for_state_times_out() {
    let driver = silent_driver();
    driver.start().await.unwrap();
    let err = driver
        .wait_for_state(SessionState::Idle, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert_eq!(err.kind, DriverErrorKind::WaitTimeout);
}

#[tokio::test]
async fn wait_for_state_already_in_target_resolves_immediately() {
    let driver = silent_driver();
    let state = driver.state().await.unwrap();
    driver.wait_for_state(state, Duration::from_secs(1)).await.unwrap();
}

#[tokio::test]
async fn kill_rejects_outstanding_waiters_and_sets_exited() {
    let driver = silent_driver();
    driver.start().await.unwrap();

    let waiter = {
        let driver = driver.clone();
        tokio::spawn(async move { driver.wait_for_state(SessionState::Idle, Duration::from_secs(5)).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    driver.kill().await;

    let result = waiter.await.unwrap();
    let err = result.unwrap_err();
    assert_eq!(err.kind, DriverErrorKind::SessionEndedWhileWaiting);
    assert_eq!(driver.state().await.unwrap(), SessionState::Exited);
}

#[tokio::test]
async fn confirm_without_pending_is_an_error() {
    let driver = silent_driver();
    driver.start().await.unwrap();
    let err = driver
        .confirm(ConfirmResponse { action: crate::types::ConfirmAction::Confirm, option: None, value: None })
        .await
        .unwrap_err();
    assert_eq!(err.kind, DriverErrorKind::NoPendingConfirm);
}

#[tokio::test]
async fn send_key_unknown_is_a_silent_no_op() {
    let driver = silent_driver();
    driver.start().await.unwrap();
    driver.send_key("not-a-real-key").await.unwrap();
}

#[tokio::test]
async fn send_appends_user_message() {
    let driver = silent_driver();
    driver.start().await.unwrap();
    driver.send("hello").await.unwrap();
    let messages = driver.messages().await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "hello");
}
