// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session driver: owns a child process + virtual screen, runs the
//! change-triggered evaluation loop, tracks the session state machine, and
//! offers the `exec`/`send`/`write`/`confirm`/`wait_for_state` primitives
//! from spec.md §4.4.
//!
//! The driver is realised as a single background task (the "actor" in
//! [`actor`]) that exclusively owns mutable session state; [`SessionDriver`]
//! is a cheap, cloneable handle that sends commands to it and awaits
//! replies over a oneshot channel. This mirrors the teacher's
//! `session/run.rs` select-loop, generalised from a single global session
//! to one task per [`crate::manager::SessionManager`] entry.

mod actor;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};

use crate::error::{DriverError, DriverErrorKind};
use crate::event::{DriverEvent, EventBus};
use crate::preset::Preset;
use crate::pty::PtySpawner;
use crate::types::{
    ConfirmInfo, ConfirmResponse, Message, OutputPayload, PermissionChecker, SemanticOutput,
    SessionState,
};

use actor::Command;

/// The result of a successful [`SessionDriver::exec`] call: either a
/// semantic output some classifier claimed, or the raw trimmed text when
/// none did.
#[derive(Debug, Clone)]
pub enum ExecResult {
    Semantic(SemanticOutput),
    Raw(String),
}

impl ExecResult {
    /// The raw text backing this result, regardless of whether a parser
    /// claimed it.
    pub fn raw_text(&self) -> &str {
        match self {
            Self::Semantic(output) => &output.raw,
            Self::Raw(text) => text,
        }
    }

    pub fn payload(&self) -> Option<&OutputPayload> {
        match self {
            Self::Semantic(output) => Some(&output.data),
            Self::Raw(_) => None,
        }
    }
}

/// A named key [`SessionDriver::send_key`] maps to its terminal escape
/// sequence. Unknown names are a no-op per spec.md §4.4's operation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
}

impl NamedKey {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "enter" | "return" => Some(Self::Enter),
            "escape" | "esc" => Some(Self::Escape),
            "tab" => Some(Self::Tab),
            "backspace" => Some(Self::Backspace),
            "delete" | "del" => Some(Self::Delete),
            "home" => Some(Self::Home),
            "end" => Some(Self::End),
            "pageup" | "page_up" => Some(Self::PageUp),
            "pagedown" | "page_down" => Some(Self::PageDown),
            _ => None,
        }
    }

    pub fn bytes(&self) -> &'static [u8] {
        match self {
            Self::Up => b"\x1b[A",
            Self::Down => b"\x1b[B",
            Self::Right => b"\x1b[C",
            Self::Left => b"\x1b[D",
            Self::Enter => b"\r",
            Self::Escape => b"\x1b",
            Self::Tab => b"\t",
            Self::Backspace => b"\x7f",
            Self::Delete => b"\x1b[3~",
            Self::Home => b"\x1b[H",
            Self::End => b"\x1b[F",
            Self::PageUp => b"\x1b[5~",
            Self::PageDown => b"\x1b[6~",
        }
    }
}

/// Default buffered command queue depth — generous enough that a burst of
/// manager-issued operations never blocks the caller on a full channel.
const COMMAND_QUEUE_DEPTH: usize = 64;

/// Handle to a running session driver actor. Cloning shares the same
/// underlying session; dropping the last clone lets the actor task exit
/// once its command channel closes (the actor does not force-kill the
/// child on handle drop — callers are expected to `close`/`kill`
/// explicitly, per spec.md §4.4's lifecycle contract).
#[derive(Clone)]
pub struct SessionDriver {
    id: Arc<str>,
    cmd_tx: mpsc::Sender<Command>,
    events: EventBus<DriverEvent>,
}

impl SessionDriver {
    /// Build a new (not-yet-started) driver from a resolved preset. Spawns
    /// its actor task immediately; `start()` must still be called before
    /// any write operation succeeds.
    pub fn new(
        id: impl Into<String>,
        preset: Preset,
        permission_checker: Option<Arc<dyn PermissionChecker>>,
        spawner: Arc<dyn PtySpawner>,
    ) -> Self {
        let id: Arc<str> = Arc::from(id.into());
        let events = EventBus::default();
        let inner = actor::Inner::new(id.to_string(), preset, permission_checker, spawner, events.clone());
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        tokio::spawn(actor::run(inner, cmd_rx));
        Self { id, cmd_tx, events }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Subscribe to this session's event stream. Only events published
    /// after subscription are observed.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<DriverEvent> {
        self.events.subscribe()
    }

    async fn call<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, DriverError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.cmd_tx.send(build(reply_tx)).await.is_err() {
            return Err(DriverError::new(DriverErrorKind::Exited, "session actor is no longer running"));
        }
        reply_rx
            .await
            .map_err(|_| DriverError::new(DriverErrorKind::Exited, "session actor dropped without replying"))
    }

    pub async fn start(&self) -> Result<(), DriverError> {
        self.call(|reply| Command::Start { reply }).await?
    }

    /// Graceful close: writes `exit_cmd` (if given) and waits up to 3s for
    /// the child to exit, then force-kills. Never fails.
    pub async fn close(&self, exit_cmd: Option<String>) {
        let _ = self.call(|reply| Command::Close { exit_cmd, reply }).await;
    }

    /// Immediate termination. Never fails.
    pub async fn kill(&self) {
        let _ = self.call(|reply| Command::Kill { reply }).await;
    }

    pub async fn write(&self, bytes: impl Into<Bytes>) -> Result<(), DriverError> {
        let bytes = bytes.into();
        self.call(|reply| Command::Write { bytes, reply }).await?
    }

    /// Writes `msg` followed by `\r` and appends a user [`Message`].
    pub async fn send(&self, text: impl Into<String>) -> Result<(), DriverError> {
        let text = text.into();
        self.call(|reply| Command::Send { text, reply }).await?
    }

    pub async fn interrupt(&self) -> Result<(), DriverError> {
        self.call(|reply| Command::Interrupt { reply }).await?
    }

    /// Writes the escape sequence mapped to a [`NamedKey`]; an unrecognised
    /// name is a silent no-op rather than an error.
    pub async fn send_key(&self, key: impl Into<String>) -> Result<(), DriverError> {
        let key = key.into();
        self.call(|reply| Command::SendKey { key, reply }).await?
    }

    pub async fn resize(&self, cols: u16, rows: u16) -> Result<(), DriverError> {
        self.call(|reply| Command::Resize { cols, rows, reply }).await?
    }

    pub async fn screen_text(&self) -> Result<String, DriverError> {
        self.call(|reply| Command::ScreenText { reply }).await
    }

    pub async fn last_lines(&self, n: usize) -> Result<Vec<String>, DriverError> {
        self.call(|reply| Command::LastLines { n, reply }).await
    }

    /// Full point-in-time capture of the screen, including cursor position.
    pub async fn snapshot(&self) -> Result<crate::screen::ScreenSnapshot, DriverError> {
        self.call(|reply| Command::Snapshot { reply }).await
    }

    pub async fn state(&self) -> Result<SessionState, DriverError> {
        self.call(|reply| Command::State { reply }).await
    }

    pub async fn messages(&self) -> Result<Vec<Message>, DriverError> {
        self.call(|reply| Command::Messages { reply }).await
    }

    /// Appends an assistant [`Message`] to the conversation record without
    /// writing anything to the PTY — the caller observed the response by
    /// other means (e.g. an `exec` result) and wants it recorded.
    pub async fn record_response(&self, content: impl Into<String>) -> Result<(), DriverError> {
        let content = content.into();
        self.call(|reply| Command::RecordResponse { content, reply }).await
    }

    /// Resolves when the session enters `target`, or rejects on timeout or
    /// on entering `error`/`exited` while waiting for a different state.
    pub async fn wait_for_state(
        &self,
        target: SessionState,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        self.call(|reply| Command::WaitForState { target, timeout, reply }).await?
    }

    /// Submits `cmd`, waits up to 5s for the session to leave `idle` and
    /// then up to `timeout` for it to return, and classifies the new
    /// screen content. Must be called while the session is `idle`.
    pub async fn exec(
        &self,
        cmd: impl Into<String>,
        timeout: Duration,
    ) -> Result<ExecResult, DriverError> {
        let text = cmd.into();
        self.call(|reply| Command::Exec { text, timeout, reply }).await?
    }

    /// Answers a pending confirmation by writing the parser-formatted
    /// response bytes. Errors if nothing is pending.
    pub async fn confirm(&self, response: ConfirmResponse) -> Result<(), DriverError> {
        self.call(|reply| Command::Confirm { response, reply }).await?
    }

    pub async fn pending_confirm(&self) -> Result<Option<ConfirmInfo>, DriverError> {
        self.call(|reply| Command::PendingConfirm { reply }).await
    }

    /// Atomically replaces the driver's parser sets with `preset`'s.
    pub async fn load_preset(&self, preset: Preset) -> Result<(), DriverError> {
        self.call(|reply| Command::LoadPreset { preset, reply }).await
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
