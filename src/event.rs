// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver and manager events, and the typed pub-sub bus that fans them
//! out. Grounded on the teacher's `event.rs` (`OutputEvent`/
//! `StateChangeEvent` shapes) and `broker/mux.rs`'s `Multiplexer`
//! (`broadcast::Sender` fan-out, `subscribe()` returning a fresh
//! receiver).

use bytes::Bytes;
use tokio::sync::broadcast;

use crate::types::{ConfirmInfo, SemanticOutput, SessionState};

/// Raw or rendered output from the terminal backend.
#[derive(Debug, Clone)]
pub enum OutputEvent {
    Raw(Bytes),
    ScreenUpdate { seq: u64 },
}

/// A session's state transition, tagged with a monotonic sequence number
/// for ordering.
#[derive(Debug, Clone)]
pub struct StateChangeEvent {
    pub prev: SessionState,
    pub next: SessionState,
    pub seq: u64,
}

/// Events published by a single session driver.
#[derive(Debug, Clone)]
pub enum DriverEvent {
    StateChanged(StateChangeEvent),
    Output(OutputEvent),
    /// The classified result of a completed `exec` call, per spec.md §6's
    /// `output(semantic_output)` event — distinct from the raw-bytes
    /// `data`/`Output(OutputEvent::Raw)` event above.
    SemanticOutput(SemanticOutput),
    ConfirmPending(ConfirmInfo),
    Exited { code: Option<i32> },
}

/// Events published by the session manager, each tagged with the
/// originating session id so a single subscriber can multiplex many
/// sessions over one channel.
#[derive(Debug, Clone)]
pub enum ManagerEvent {
    SessionStarted { session_id: String },
    SessionClosed { session_id: String },
    SessionEvicted { session_id: String },
    Driver { session_id: String, event: DriverEvent },
}

/// Default channel capacity — enough to absorb a burst of screen updates
/// between a slow subscriber's polls without blocking the publisher
/// (`broadcast::Sender::send` never awaits; a lagging subscriber just
/// misses old events on its next `recv`).
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// A typed broadcast bus. Cloning is cheap (it's just another sender
/// handle); every clone publishes onto the same channel.
#[derive(Clone)]
pub struct EventBus<T: Clone> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone> EventBus<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to future events. Receivers only see events published
    /// after they subscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }

    /// Publish an event. Returns the number of active receivers, or does
    /// nothing observable if there are none — publishing is fire-and-forget.
    pub fn publish(&self, event: T) {
        let _ = self.tx.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
