// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PTY spawner abstraction and the native Unix implementation.
//!
//! Grounded on the teacher's `pty/mod.rs`: a `Backend` trait the driver
//! drives through a `tokio::select!` loop rather than the callback-style
//! `spawn(...).on_data(cb)` shape named in spec.md §6 — the teacher never
//! uses callbacks for PTY I/O, and generalizing spec.md's interface into
//! the teacher's channel-based `Backend` keeps the driver's event loop a
//! single `select!` the way every other suspension point in this crate
//! works.

pub mod nbio;
pub mod spawn;

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use bytes::Bytes;
use tokio::sync::mpsc;

/// Options passed to a [`PtySpawner`], covering spec.md §6's
/// `{cols, rows, cwd, env}`.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    pub cols: u16,
    pub rows: u16,
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
}

/// How the child process exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitStatus {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

/// Input sent to the PTY backend: either raw bytes to write or a drain
/// synchronization point. The drain marker lets a caller await "all prior
/// writes have reached the PTY" without a roundtrip through the child.
#[derive(Debug)]
pub enum BackendInput {
    Write(Bytes),
    Drain(tokio::sync::oneshot::Sender<()>),
}

/// Terminal backend abstraction over PTY or compatibility layers. Object
/// -safe for use as `Box<dyn Backend>`.
pub trait Backend: Send + 'static {
    fn run(
        &mut self,
        output_tx: mpsc::Sender<Bytes>,
        input_rx: mpsc::Receiver<BackendInput>,
        resize_rx: mpsc::Receiver<(u16, u16)>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ExitStatus>> + Send + '_>>;

    fn resize(&self, cols: u16, rows: u16) -> anyhow::Result<()>;

    fn child_pid(&self) -> Option<u32>;
}

/// Spawns a [`Backend`] for a command. The one concrete implementation
/// ([`spawn::NativePtySpawner`]) uses `nix::pty::forkpty`; a transport-
/// agnostic caller could substitute a fake for tests.
pub trait PtySpawner: Send + Sync {
    fn spawn(&self, command: &[String], opts: &SpawnOptions) -> anyhow::Result<Box<dyn Backend>>;
}
