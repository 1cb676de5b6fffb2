// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session driver's actor: the single task that exclusively owns the
//! virtual screen, the child process, and the parser registry, and runs
//! the `tokio::select!` loop described in spec.md §4.4/§5. Grounded on the
//! teacher's `session/run.rs` `Session::run` loop — backend output,
//! commands, and timers are separate `select!` arms, with the
//! `match Option { Some(x) => x.await, None => pending().await }, if
//! cond` idiom (teacher's idle-timeout/drain-ticker arms) used here for
//! the backend-exit and timeout-deadline arms.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::context::ParserContext;
use crate::error::{DriverError, DriverErrorKind};
use crate::event::{DriverEvent, EventBus, OutputEvent, StateChangeEvent};
use crate::log_sink::LogSink;
use crate::parser::registry::ParserRegistry;
use crate::preset::{Preset, SessionOptions};
use crate::pty::{BackendInput, ExitStatus, PtySpawner, SpawnOptions};
use crate::screen::{Screen, ScreenSnapshot};
use crate::types::{
    now_ms, ConfirmInfo, ConfirmResponse, Message, PermissionDecision, Role, SessionState,
};

use super::{ExecResult, NamedKey};

/// Commands the actor accepts from [`super::SessionDriver`] handles. Every
/// variant carries its own reply channel; the actor never blocks a caller
/// longer than it takes to decide the reply (suspension for `wait_for_state`
/// and `exec` is modeled by parking the command in `waiters`/`pending_exec`
/// rather than holding the command handler open).
pub(crate) enum Command {
    Start { reply: oneshot::Sender<Result<(), DriverError>> },
    Write { bytes: Bytes, reply: oneshot::Sender<Result<(), DriverError>> },
    Send { text: String, reply: oneshot::Sender<Result<(), DriverError>> },
    Interrupt { reply: oneshot::Sender<Result<(), DriverError>> },
    SendKey { key: String, reply: oneshot::Sender<Result<(), DriverError>> },
    Resize { cols: u16, rows: u16, reply: oneshot::Sender<Result<(), DriverError>> },
    ScreenText { reply: oneshot::Sender<String> },
    LastLines { n: usize, reply: oneshot::Sender<Vec<String>> },
    Snapshot { reply: oneshot::Sender<ScreenSnapshot> },
    State { reply: oneshot::Sender<SessionState> },
    Messages { reply: oneshot::Sender<Vec<Message>> },
    RecordResponse { content: String, reply: oneshot::Sender<()> },
    WaitForState {
        target: SessionState,
        timeout: Duration,
        reply: oneshot::Sender<Result<(), DriverError>>,
    },
    Exec { text: String, timeout: Duration, reply: oneshot::Sender<Result<ExecResult, DriverError>> },
    Confirm { response: ConfirmResponse, reply: oneshot::Sender<Result<(), DriverError>> },
    PendingConfirm { reply: oneshot::Sender<Option<ConfirmInfo>> },
    LoadPreset { preset: Preset, reply: oneshot::Sender<()> },
    Close { exit_cmd: Option<String>, reply: oneshot::Sender<()> },
    Kill { reply: oneshot::Sender<()> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    NotStarted,
    Running,
    Exited,
}

struct BackendHandle {
    input_tx: mpsc::Sender<BackendInput>,
    resize_tx: mpsc::Sender<(u16, u16)>,
    join_handle: JoinHandle<anyhow::Result<ExitStatus>>,
}

struct Waiter {
    target: SessionState,
    deadline: Instant,
    reply: oneshot::Sender<Result<(), DriverError>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecPhase {
    LeavingIdle,
    ReturningIdle,
}

struct PendingExec {
    captured_len: usize,
    phase: ExecPhase,
    leave_deadline: Instant,
    return_deadline: Instant,
    total_timeout: Duration,
    reply: oneshot::Sender<Result<ExecResult, DriverError>>,
}

/// Everything the actor task owns exclusively. Never shared; only ever
/// touched from within [`run`].
pub(crate) struct Inner {
    id: String,
    screen: Screen,
    registry: ParserRegistry,
    state: SessionState,
    previous_state: Option<SessionState>,
    messages: Vec<Message>,
    pending_confirm: Option<(ConfirmInfo, usize)>,
    permission_checker: Option<Arc<dyn crate::types::PermissionChecker>>,
    tail_lines: usize,
    tick_interval: Duration,
    log: LogSink,
    events: EventBus<DriverEvent>,
    seq: u64,
    lifecycle: Lifecycle,
    backend: Option<BackendHandle>,
    output_rx: Option<mpsc::Receiver<Bytes>>,
    spawner: Arc<dyn PtySpawner>,
    spawn_command: Vec<String>,
    options: SessionOptions,
    waiters: Vec<Waiter>,
    pending_exec: Option<PendingExec>,
}

impl Inner {
    pub(crate) fn new(
        id: String,
        preset: Preset,
        permission_checker: Option<Arc<dyn crate::types::PermissionChecker>>,
        spawner: Arc<dyn PtySpawner>,
        events: EventBus<DriverEvent>,
    ) -> Self {
        let (registry, options, command) = preset.into_parts();
        let screen = Screen::new(options.cols, options.rows);
        let log = LogSink::new(options.log_path.clone());
        Self {
            id,
            screen,
            registry,
            state: SessionState::Starting,
            previous_state: None,
            messages: Vec::new(),
            pending_confirm: None,
            permission_checker,
            tail_lines: options.tail_lines,
            tick_interval: options.tick_interval,
            log,
            events,
            seq: 0,
            lifecycle: Lifecycle::NotStarted,
            backend: None,
            output_rx: None,
            spawner,
            spawn_command: command,
            options,
            waiters: Vec::new(),
            pending_exec: None,
        }
    }

    fn publish(&self, event: DriverEvent) {
        self.events.publish(event);
    }

    fn lifecycle_error(&self) -> DriverError {
        match self.lifecycle {
            Lifecycle::NotStarted => {
                DriverError::new(DriverErrorKind::NotStarted, "session has not been started")
            }
            Lifecycle::Exited => DriverError::new(DriverErrorKind::Exited, "session has exited"),
            Lifecycle::Running => {
                DriverError::new(DriverErrorKind::Exited, "backend unexpectedly absent")
            }
        }
    }

    async fn write_raw(&mut self, bytes: Bytes) -> Result<(), DriverError> {
        let Some(backend) = self.backend.as_ref() else {
            return Err(self.lifecycle_error());
        };
        self.log.input(&bytes);
        if backend.input_tx.send(BackendInput::Write(bytes)).await.is_err() {
            return Err(DriverError::new(DriverErrorKind::Exited, "backend input channel closed"));
        }
        Ok(())
    }

    fn context(&self) -> ParserContext {
        let ctx = ParserContext::new(self.screen.screen_text(), self.screen.last_lines(self.tail_lines))
            .with_states(Some(self.state), self.previous_state);
        match self.screen.title() {
            Some(title) => ctx.with_terminal_title(title),
            None => ctx,
        }
    }

    fn on_data(&mut self, bytes: Bytes) {
        self.screen.feed(&bytes);
        self.log.output(&bytes);
        self.publish(DriverEvent::Output(OutputEvent::Raw(bytes)));
    }

    fn transition(&mut self, new_state: SessionState) {
        if new_state == self.state {
            return;
        }
        let prev = self.state;
        self.previous_state = Some(prev);
        self.state = new_state;
        self.seq += 1;
        self.publish(DriverEvent::StateChanged(StateChangeEvent { prev, next: new_state, seq: self.seq }));
        self.resolve_waiters(new_state);
        self.resolve_pending_exec(new_state);
    }

    fn resolve_waiters(&mut self, new_state: SessionState) {
        let rejecting = matches!(new_state, SessionState::Error | SessionState::Exited);
        let mut remaining = Vec::with_capacity(self.waiters.len());
        for waiter in self.waiters.drain(..) {
            if waiter.target == new_state {
                let _ = waiter.reply.send(Ok(()));
            } else if rejecting {
                let _ = waiter.reply.send(Err(DriverError::new(
                    DriverErrorKind::SessionEndedWhileWaiting,
                    format!("session entered {new_state} while waiting for {}", waiter.target),
                )));
            } else {
                remaining.push(waiter);
            }
        }
        self.waiters = remaining;
    }

    fn resolve_pending_exec(&mut self, new_state: SessionState) {
        let returning_idle = matches!(
            self.pending_exec.as_ref(),
            Some(exec) if matches!(exec.phase, ExecPhase::ReturningIdle)
        );
        match new_state {
            SessionState::Exited => {
                if let Some(exec) = self.pending_exec.take() {
                    let _ = exec.reply.send(Err(DriverError::new(
                        DriverErrorKind::SessionEndedWhileWaiting,
                        "session exited while exec was pending",
                    )));
                }
            }
            SessionState::Idle | SessionState::Error if returning_idle => {
                if let Some(exec) = self.pending_exec.take() {
                    self.finalize_exec(exec);
                }
            }
            _ => {
                if let Some(exec) = self.pending_exec.as_mut() {
                    if matches!(exec.phase, ExecPhase::LeavingIdle) && new_state != SessionState::Idle {
                        exec.phase = ExecPhase::ReturningIdle;
                        exec.return_deadline = Instant::now() + exec.total_timeout;
                    }
                }
            }
        }
    }

    fn finalize_exec(&mut self, exec: PendingExec) {
        let full_text = self.screen.screen_text();
        let suffix = safe_suffix(&full_text, exec.captured_len).trim_end().to_string();
        let last_lines: Vec<String> = suffix.lines().map(str::to_string).collect();
        let ctx = ParserContext::new(suffix.clone(), last_lines);
        let result = match self.registry.classify_output(&ctx) {
            Some(output) => {
                self.publish(DriverEvent::SemanticOutput(output.clone()));
                ExecResult::Semantic(output)
            }
            None => ExecResult::Raw(suffix),
        };
        self.messages.push(Message {
            role: Role::Assistant,
            content: result.raw_text().to_string(),
            timestamp: now_ms(),
        });
        let _ = exec.reply.send(Ok(result));
    }

    fn check_timeouts(&mut self) {
        let now = Instant::now();
        let mut remaining = Vec::with_capacity(self.waiters.len());
        for waiter in self.waiters.drain(..) {
            if waiter.deadline <= now {
                let _ = waiter.reply.send(Err(DriverError::new(
                    DriverErrorKind::WaitTimeout,
                    format!("timed out waiting for state {}", waiter.target),
                )));
            } else {
                remaining.push(waiter);
            }
        }
        self.waiters = remaining;

        let timed_out = matches!(&self.pending_exec, Some(exec) if {
            let deadline = match exec.phase {
                ExecPhase::LeavingIdle => exec.leave_deadline,
                ExecPhase::ReturningIdle => exec.return_deadline,
            };
            deadline <= now
        });
        if timed_out {
            if let Some(exec) = self.pending_exec.take() {
                let _ = exec.reply.send(Err(DriverError::new(
                    DriverErrorKind::WaitTimeout,
                    "exec timed out",
                )));
            }
        }
    }

    fn next_wake(&self) -> Duration {
        let now = Instant::now();
        let mut wake = self.tick_interval;
        for waiter in &self.waiters {
            wake = wake.min(waiter.deadline.saturating_duration_since(now));
        }
        if let Some(exec) = &self.pending_exec {
            let deadline = match exec.phase {
                ExecPhase::LeavingIdle => exec.leave_deadline,
                ExecPhase::ReturningIdle => exec.return_deadline,
            };
            wake = wake.min(deadline.saturating_duration_since(now));
        }
        wake.max(Duration::from_millis(1))
    }

    /// The change-gated evaluation tick: confirm dispatch first, state
    /// detection only when no confirmation is pending, per spec.md §4.4.
    async fn run_tick(&mut self) {
        if !self.screen.changed() {
            return;
        }
        self.screen.clear_changed();
        let ctx = self.context();

        if let Some((idx, info)) = self.registry.detect_confirm(&ctx) {
            self.handle_confirm_hit(idx, info).await;
            return;
        }

        if let Some(detection) = self.registry.detect_state(&ctx) {
            self.transition(detection.state);
        }
    }

    async fn handle_confirm_hit(&mut self, idx: usize, info: ConfirmInfo) {
        if let Some(tool) = info.tool.clone() {
            if let Some(checker) = self.permission_checker.clone() {
                match checker.check(&tool) {
                    PermissionDecision::Allow => {
                        let response = ConfirmResponse {
                            action: crate::types::ConfirmAction::Confirm,
                            option: None,
                            value: None,
                        };
                        if let Some(bytes) = self.registry.format_confirm_response(idx, &info, &response) {
                            let _ = self.write_raw(Bytes::from(bytes)).await;
                        }
                        return;
                    }
                    PermissionDecision::Deny => {
                        let response = ConfirmResponse {
                            action: crate::types::ConfirmAction::Deny,
                            option: None,
                            value: None,
                        };
                        if let Some(bytes) = self.registry.format_confirm_response(idx, &info, &response) {
                            let _ = self.write_raw(Bytes::from(bytes)).await;
                        }
                        return;
                    }
                    PermissionDecision::Confirm => {}
                }
            }
        }

        self.pending_confirm = Some((info.clone(), idx));
        if self.state != SessionState::Confirming {
            self.transition(SessionState::Confirming);
        }
        self.publish(DriverEvent::ConfirmPending(info));
    }

    async fn do_start(&mut self) -> Result<(), DriverError> {
        if self.lifecycle != Lifecycle::NotStarted {
            return Err(DriverError::new(DriverErrorKind::AlreadyStarted, "session already started"));
        }
        let opts = SpawnOptions {
            cols: self.options.cols,
            rows: self.options.rows,
            cwd: self.options.cwd.clone(),
            env: self.options.env.clone(),
        };
        let mut backend = self
            .spawner
            .spawn(&self.spawn_command, &opts)
            .map_err(|e| DriverError::new(DriverErrorKind::SpawnFailed, e.to_string()))?;

        let (output_tx, output_rx) = mpsc::channel(256);
        let (input_tx, input_rx) = mpsc::channel(64);
        let (resize_tx, resize_rx) = mpsc::channel(8);

        let join_handle =
            tokio::spawn(async move { backend.run(output_tx, input_rx, resize_rx).await });

        self.output_rx = Some(output_rx);
        self.backend = Some(BackendHandle { input_tx, resize_tx, join_handle });
        self.lifecycle = Lifecycle::Running;
        self.log.session_started(&self.id);
        Ok(())
    }

    fn finish_exit(&mut self, code: Option<i32>) {
        if self.lifecycle == Lifecycle::Exited {
            return;
        }
        self.lifecycle = Lifecycle::Exited;
        self.backend = None;
        self.output_rx = None;
        self.pending_confirm = None;
        self.transition(SessionState::Exited);
        self.publish(DriverEvent::Exited { code });
        self.log.session_ended(&self.id);
    }

    async fn do_close(&mut self, exit_cmd: Option<String>) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        if let Some(cmd) = exit_cmd {
            let mut bytes = cmd.into_bytes();
            bytes.push(b'\r');
            let _ = self.write_raw(Bytes::from(bytes)).await;

            if let Some(backend) = self.backend.as_mut() {
                match tokio::time::timeout(Duration::from_secs(3), &mut backend.join_handle).await {
                    Ok(result) => {
                        let status = unwrap_exit(result);
                        self.finish_exit(status.code);
                        return;
                    }
                    Err(_elapsed) => {}
                }
            }
        }
        self.do_kill();
    }

    fn do_kill(&mut self) {
        if let Some(backend) = self.backend.take() {
            backend.join_handle.abort();
        }
        self.finish_exit(None);
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start { reply } => {
                let _ = reply.send(self.do_start().await);
            }
            Command::Write { bytes, reply } => {
                let _ = reply.send(self.write_raw(bytes).await);
            }
            Command::Send { text, reply } => {
                let mut bytes = text.clone().into_bytes();
                bytes.push(b'\r');
                let result = self.write_raw(Bytes::from(bytes)).await;
                if result.is_ok() {
                    self.messages.push(Message { role: Role::User, content: text, timestamp: now_ms() });
                }
                let _ = reply.send(result);
            }
            Command::Interrupt { reply } => {
                let result = self.write_raw(Bytes::from_static(b"\x03")).await;
                let _ = reply.send(result);
            }
            Command::SendKey { key, reply } => {
                let result = match NamedKey::parse(&key) {
                    Some(named) => self.write_raw(Bytes::from_static(named.bytes())).await,
                    None => Ok(()),
                };
                let _ = reply.send(result);
            }
            Command::Resize { cols, rows, reply } => {
                self.screen.resize(cols, rows);
                let result = match self.backend.as_ref() {
                    Some(backend) => {
                        if backend.resize_tx.send((cols, rows)).await.is_err() {
                            Err(DriverError::new(DriverErrorKind::Exited, "resize channel closed"))
                        } else {
                            Ok(())
                        }
                    }
                    None if self.lifecycle == Lifecycle::NotStarted => Ok(()),
                    None => Err(self.lifecycle_error()),
                };
                let _ = reply.send(result);
            }
            Command::ScreenText { reply } => {
                let _ = reply.send(self.screen.screen_text());
            }
            Command::LastLines { n, reply } => {
                let _ = reply.send(self.screen.last_lines(n));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.screen.snapshot());
            }
            Command::State { reply } => {
                let _ = reply.send(self.state);
            }
            Command::Messages { reply } => {
                let _ = reply.send(self.messages.clone());
            }
            Command::RecordResponse { content, reply } => {
                self.messages.push(Message { role: Role::Assistant, content, timestamp: now_ms() });
                let _ = reply.send(());
            }
            Command::WaitForState { target, timeout, reply } => {
                if self.state == target {
                    let _ = reply.send(Ok(()));
                    return;
                }
                if matches!(self.state, SessionState::Error | SessionState::Exited) {
                    let _ = reply.send(Err(DriverError::new(
                        DriverErrorKind::SessionEndedWhileWaiting,
                        format!("session is already in {} while waiting for {target}", self.state),
                    )));
                    return;
                }
                self.waiters.push(Waiter { target, deadline: Instant::now() + timeout, reply });
            }
            Command::Exec { text, timeout, reply } => {
                if self.lifecycle != Lifecycle::Running {
                    let _ = reply.send(Err(self.lifecycle_error()));
                    return;
                }
                if self.state != SessionState::Idle {
                    let _ = reply.send(Err(DriverError::new(
                        DriverErrorKind::WrongState,
                        format!("exec requires idle state, session is {}", self.state),
                    )));
                    return;
                }
                if self.pending_exec.is_some() {
                    let _ = reply.send(Err(DriverError::new(
                        DriverErrorKind::WrongState,
                        "another exec is already in flight",
                    )));
                    return;
                }
                let captured_len = self.screen.screen_text().len();
                let mut bytes = text.into_bytes();
                bytes.push(b'\r');
                if let Err(e) = self.write_raw(Bytes::from(bytes)).await {
                    let _ = reply.send(Err(e));
                    return;
                }
                let now = Instant::now();
                self.pending_exec = Some(PendingExec {
                    captured_len,
                    phase: ExecPhase::LeavingIdle,
                    leave_deadline: now + Duration::from_secs(5),
                    return_deadline: now,
                    total_timeout: timeout,
                    reply,
                });
            }
            Command::Confirm { response, reply } => {
                let Some((info, idx)) = self.pending_confirm.clone() else {
                    let _ = reply.send(Err(DriverError::new(
                        DriverErrorKind::NoPendingConfirm,
                        "no confirmation is pending",
                    )));
                    return;
                };
                let Some(bytes) = self.registry.format_confirm_response(idx, &info, &response) else {
                    let _ = reply.send(Err(DriverError::new(
                        DriverErrorKind::NoPendingConfirm,
                        "the confirming parser is no longer registered",
                    )));
                    return;
                };
                let result = self.write_raw(Bytes::from(bytes)).await;
                if result.is_ok() {
                    self.pending_confirm = None;
                }
                let _ = reply.send(result);
            }
            Command::PendingConfirm { reply } => {
                let _ = reply.send(self.pending_confirm.as_ref().map(|(info, _)| info.clone()));
            }
            Command::LoadPreset { preset, reply } => {
                let (registry, _options, _command) = preset.into_parts();
                self.registry = registry;
                let _ = reply.send(());
            }
            Command::Close { exit_cmd, reply } => {
                self.do_close(exit_cmd).await;
                let _ = reply.send(());
            }
            Command::Kill { reply } => {
                self.do_kill();
                let _ = reply.send(());
            }
        }
    }
}

/// The actor's main loop. Runs until every [`super::SessionDriver`] handle
/// has been dropped (the command channel closes).
pub(crate) async fn run(mut inner: Inner, mut cmd_rx: mpsc::Receiver<Command>) {
    loop {
        tokio::select! {
            data = recv_opt(&mut inner.output_rx) => {
                match data {
                    Some(bytes) => inner.on_data(bytes),
                    None => {}
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(cmd) => inner.handle_command(cmd).await,
                    None => break,
                }
            }

            result = recv_backend_exit(&mut inner.backend) => {
                let status = unwrap_exit(result);
                inner.finish_exit(status.code);
            }

            _ = tokio::time::sleep(inner.next_wake()) => {
                inner.check_timeouts();
                inner.run_tick().await;
            }
        }
    }
}

async fn recv_opt<T>(rx: &mut Option<mpsc::Receiver<T>>) -> Option<T> {
    match rx {
        Some(r) => r.recv().await,
        None => std::future::pending().await,
    }
}

async fn recv_backend_exit(
    backend: &mut Option<BackendHandle>,
) -> Result<anyhow::Result<ExitStatus>, tokio::task::JoinError> {
    match backend {
        Some(b) => (&mut b.join_handle).await,
        None => std::future::pending().await,
    }
}

fn unwrap_exit(result: Result<anyhow::Result<ExitStatus>, tokio::task::JoinError>) -> ExitStatus {
    match result {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            warn!(error = %e, "backend task returned an error");
            ExitStatus::default()
        }
        Err(e) => {
            warn!(error = %e, "backend task panicked or was aborted");
            ExitStatus::default()
        }
    }
}

/// Slice `s` at `byte_offset`, snapping forward to the nearest char
/// boundary so a multi-byte codepoint straddling the captured offset is
/// never split.
fn safe_suffix(s: &str, byte_offset: usize) -> &str {
    let mut offset = byte_offset.min(s.len());
    while offset < s.len() && !s.is_char_boundary(offset) {
        offset += 1;
    }
    &s[offset..]
}
