// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session manager: multiplexes many [`SessionDriver`]s behind a single
//! map, resolves presets by name, enforces a hard session-count quota, and
//! runs a periodic idle-eviction sweep. Grounded on the teacher's
//! `broker/registry.rs` `PodRegistry` — a `RwLock<HashMap<..>>` guarding a
//! map mutated only on create/destroy/sweep, with a `run_*` sweep loop
//! spawned by the caller via a `CancellationToken`, the same shape as
//! `PodRegistry::run_health_checks`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use rand::distr::Alphanumeric;
use rand::Rng;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::driver::{ExecResult, SessionDriver};
use crate::enrich;
use crate::error::ManagerError;
use crate::event::{DriverEvent, EventBus, ManagerEvent};
use crate::preset::Preset;
use crate::pty::PtySpawner;
use crate::types::{
    now_ms, ConfirmInfo, ConfirmResponse, OutputMetadata, OutputPayload, PermissionChecker,
    ScreenView, SemanticOutput, SessionState,
};

/// Hard cap on concurrently alive sessions absent an explicit override.
pub const DEFAULT_MAX_SESSIONS: usize = 10;
/// A session idle longer than this is force-evicted by the sweep.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// How often the idle sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// Grace period `destroy` gives a session to exit after writing `exit`.
const DESTROY_EXIT_TEXT: &str = "exit";

#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub max_sessions: usize,
    pub idle_timeout: Duration,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self { max_sessions: DEFAULT_MAX_SESSIONS, idle_timeout: DEFAULT_IDLE_TIMEOUT }
    }
}

/// Arguments to [`SessionManager::create`].
#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub preset: String,
    pub cols: Option<u16>,
    pub rows: Option<u16>,
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub log_path: Option<PathBuf>,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            preset: "shell".to_string(),
            cols: None,
            rows: None,
            cwd: None,
            env: HashMap::new(),
            log_path: None,
        }
    }
}

/// A session's manager-visible summary, as returned by [`SessionManager::list`].
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub id: String,
    pub preset: String,
    pub state: SessionState,
    pub created_at: u64,
    pub last_activity: u64,
}

/// Result of [`SessionManager::exec`]: enriched by default, raw when the
/// caller passed `parse_output = false`.
#[derive(Debug, Clone)]
pub enum ManagerExecOutput {
    Enhanced(crate::types::EnhancedOutput),
    Raw(ExecResult),
}

struct ManagedSession {
    driver: SessionDriver,
    preset_name: String,
    created_at: u64,
    last_activity: Arc<AtomicU64>,
}

/// Multiplexes session drivers behind string ids. Cheap to clone (every
/// field is itself an `Arc`/`RwLock`-backed handle), so a single instance
/// can be shared across a server's request handlers.
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, ManagedSession>>>,
    max_sessions: usize,
    idle_timeout: Duration,
    permission_checker: Option<Arc<dyn PermissionChecker>>,
    spawner: Arc<dyn PtySpawner>,
    events: EventBus<ManagerEvent>,
}

impl SessionManager {
    pub fn new(
        spawner: Arc<dyn PtySpawner>,
        permission_checker: Option<Arc<dyn PermissionChecker>>,
        options: ManagerOptions,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: options.max_sessions,
            idle_timeout: options.idle_timeout,
            permission_checker,
            spawner,
            events: EventBus::default(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ManagerEvent> {
        self.events.subscribe()
    }

    /// Resolve `opts.preset`, spawn a fresh driver, and start it. Fails
    /// with a quota error past `max_sessions`, or an unknown-preset error.
    pub async fn create(&self, opts: CreateOptions) -> Result<String, ManagerError> {
        {
            let sessions = self.sessions.read().await;
            if sessions.len() >= self.max_sessions {
                return Err(ManagerError::MaxSessionsReached { max: self.max_sessions });
            }
        }

        let mut preset = Preset::resolve(&opts.preset)?;
        if let Some(cols) = opts.cols {
            preset.session_options.cols = cols;
        }
        if let Some(rows) = opts.rows {
            preset.session_options.rows = rows;
        }
        if opts.cwd.is_some() {
            preset.session_options.cwd = opts.cwd;
        }
        if !opts.env.is_empty() {
            preset.session_options.env = opts.env;
        }
        if opts.log_path.is_some() {
            preset.session_options.log_path = opts.log_path;
        }
        let preset_name = preset.name.clone();

        let id = generate_session_id();
        let driver = SessionDriver::new(id.clone(), preset, self.permission_checker.clone(), self.spawner.clone());

        spawn_event_relay(id.clone(), driver.subscribe(), self.sessions.clone(), self.events.clone());

        if let Err(e) = driver.start().await {
            return Err(ManagerError::Driver { id, source: e });
        }

        let now = now_ms();
        let managed = ManagedSession {
            driver,
            preset_name,
            created_at: now,
            last_activity: Arc::new(AtomicU64::new(now)),
        };
        self.sessions.write().await.insert(id.clone(), managed);
        self.events.publish(ManagerEvent::SessionStarted { session_id: id.clone() });
        info!(session = %id, "session created");
        Ok(id)
    }

    /// Tears down `id`: graceful close (writes `exit`, 3s grace, handled
    /// inside the driver) unless `force`, in which case it's killed
    /// outright. Publishes `SessionClosed` on success.
    pub async fn destroy(&self, id: &str, force: bool) -> Result<(), ManagerError> {
        self.remove_and_stop(id, force).await?;
        self.events.publish(ManagerEvent::SessionClosed { session_id: id.to_string() });
        info!(session = %id, force, "session destroyed");
        Ok(())
    }

    /// Gracefully tears down every live session. Best-effort: a session
    /// that exits on its own mid-sweep is simply skipped.
    pub async fn destroy_all(&self) {
        let ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        for id in ids {
            let _ = self.destroy(&id, false).await;
        }
    }

    pub async fn list(&self) -> Vec<SessionSummary> {
        let snapshot: Vec<(String, SessionDriver, String, u64, u64)> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .map(|(id, m)| {
                    (
                        id.clone(),
                        m.driver.clone(),
                        m.preset_name.clone(),
                        m.created_at,
                        m.last_activity.load(Ordering::Relaxed),
                    )
                })
                .collect()
        };

        let mut summaries = Vec::with_capacity(snapshot.len());
        for (id, driver, preset, created_at, last_activity) in snapshot {
            let Ok(state) = driver.state().await else { continue };
            summaries.push(SessionSummary { id, preset, state, created_at, last_activity });
        }
        summaries
    }

    pub async fn exec(
        &self,
        id: &str,
        cmd: impl Into<String>,
        timeout: Duration,
        parse_output: bool,
    ) -> Result<ManagerExecOutput, ManagerError> {
        let driver = self.driver_for(id).await?;
        let cmd = cmd.into();
        let started = Instant::now();
        let result = driver
            .exec(cmd.clone(), timeout)
            .await
            .map_err(|e| ManagerError::Driver { id: id.to_string(), source: e })?;
        self.touch(id).await;

        if !parse_output {
            return Ok(ManagerExecOutput::Raw(result));
        }

        let semantic = match result {
            ExecResult::Semantic(output) => output,
            ExecResult::Raw(text) => SemanticOutput {
                raw: text.clone(),
                data: OutputPayload::Text { content: text },
                confidence: 1.0,
                parser_name: "raw".to_string(),
            },
        };
        let metadata = OutputMetadata {
            timestamp: now_ms(),
            session_id: Some(id.to_string()),
            command: Some(cmd),
            duration_ms: Some(started.elapsed().as_millis() as u64),
            exit_code: None,
        };
        Ok(ManagerExecOutput::Enhanced(enrich::enrich(semantic, metadata)))
    }

    pub async fn send(&self, id: &str, text: impl Into<String>) -> Result<(), ManagerError> {
        let driver = self.driver_for(id).await?;
        driver.send(text).await.map_err(|e| ManagerError::Driver { id: id.to_string(), source: e })?;
        self.touch(id).await;
        Ok(())
    }

    pub async fn write(&self, id: &str, bytes: impl Into<Bytes>) -> Result<(), ManagerError> {
        let driver = self.driver_for(id).await?;
        driver.write(bytes).await.map_err(|e| ManagerError::Driver { id: id.to_string(), source: e })?;
        self.touch(id).await;
        Ok(())
    }

    pub async fn interrupt(&self, id: &str) -> Result<(), ManagerError> {
        let driver = self.driver_for(id).await?;
        driver.interrupt().await.map_err(|e| ManagerError::Driver { id: id.to_string(), source: e })?;
        self.touch(id).await;
        Ok(())
    }

    pub async fn get_screen(&self, id: &str, lines: Option<usize>) -> Result<ScreenView, ManagerError> {
        let driver = self.driver_for(id).await?;
        let snapshot = driver
            .snapshot()
            .await
            .map_err(|e| ManagerError::Driver { id: id.to_string(), source: e })?;
        let state = driver.state().await.map_err(|e| ManagerError::Driver { id: id.to_string(), source: e })?;
        let text = match lines {
            Some(n) => {
                let start = snapshot.lines.len().saturating_sub(n);
                snapshot.lines[start..].join("\n")
            }
            None => snapshot.lines.join("\n"),
        };
        Ok(ScreenView { text, cursor_x: snapshot.cursor.col, cursor_y: snapshot.cursor.row, state })
    }

    pub async fn get_state(&self, id: &str) -> Result<SessionState, ManagerError> {
        let driver = self.driver_for(id).await?;
        driver.state().await.map_err(|e| ManagerError::Driver { id: id.to_string(), source: e })
    }

    pub async fn wait_for_state(
        &self,
        id: &str,
        state: SessionState,
        timeout: Duration,
    ) -> Result<(), ManagerError> {
        let driver = self.driver_for(id).await?;
        let result = driver.wait_for_state(state, timeout).await;
        self.touch(id).await;
        result.map_err(|e| ManagerError::Driver { id: id.to_string(), source: e })
    }

    pub async fn get_pending_confirm(&self, id: &str) -> Result<Option<ConfirmInfo>, ManagerError> {
        let driver = self.driver_for(id).await?;
        driver.pending_confirm().await.map_err(|e| ManagerError::Driver { id: id.to_string(), source: e })
    }

    pub async fn respond_to_confirm(&self, id: &str, response: ConfirmResponse) -> Result<(), ManagerError> {
        let driver = self.driver_for(id).await?;
        driver.confirm(response).await.map_err(|e| ManagerError::Driver { id: id.to_string(), source: e })?;
        self.touch(id).await;
        Ok(())
    }

    /// Periodic idle-eviction loop: force-destroys any session whose
    /// `last_activity` has aged past `idle_timeout`. Intended to be
    /// `tokio::spawn`ed once alongside the manager.
    pub async fn run_idle_sweep(&self, shutdown: CancellationToken) {
        info!("session manager idle sweep started");
        loop {
            tokio::select! {
                _ = tokio::time::sleep(SWEEP_INTERVAL) => {}
                _ = shutdown.cancelled() => {
                    debug!("session manager idle sweep shutting down");
                    return;
                }
            }

            let now = now_ms();
            let idle_ms = self.idle_timeout.as_millis() as u64;
            let stale: Vec<String> = {
                let sessions = self.sessions.read().await;
                sessions
                    .iter()
                    .filter(|(_, m)| now.saturating_sub(m.last_activity.load(Ordering::Relaxed)) > idle_ms)
                    .map(|(id, _)| id.clone())
                    .collect()
            };

            for id in stale {
                warn!(session = %id, "evicting idle session");
                if self.remove_and_stop(&id, true).await.is_ok() {
                    self.events.publish(ManagerEvent::SessionEvicted { session_id: id });
                }
            }
        }
    }

    async fn driver_for(&self, id: &str) -> Result<SessionDriver, ManagerError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .map(|m| m.driver.clone())
            .ok_or_else(|| ManagerError::UnknownSession { id: id.to_string() })
    }

    async fn touch(&self, id: &str) {
        let sessions = self.sessions.read().await;
        if let Some(m) = sessions.get(id) {
            m.last_activity.store(now_ms(), Ordering::Relaxed);
        }
    }

    async fn remove_and_stop(&self, id: &str, force: bool) -> Result<(), ManagerError> {
        let managed = self.sessions.write().await.remove(id);
        let Some(managed) = managed else {
            return Err(ManagerError::UnknownSession { id: id.to_string() });
        };
        if force {
            managed.driver.kill().await;
        } else {
            managed.driver.close(Some(DESTROY_EXIT_TEXT.to_string())).await;
        }
        Ok(())
    }
}

/// Fans a session's driver events out onto the manager bus, tagged with
/// its id, and removes the session from the map (publishing
/// `SessionClosed`) the moment the driver reports it has exited on its
/// own — the "child-process exit deletes the session entry" policy.
fn spawn_event_relay(
    session_id: String,
    mut rx: broadcast::Receiver<DriverEvent>,
    sessions: Arc<RwLock<HashMap<String, ManagedSession>>>,
    events: EventBus<ManagerEvent>,
) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if matches!(event, DriverEvent::StateChanged(_)) {
                        let sessions = sessions.read().await;
                        if let Some(managed) = sessions.get(&session_id) {
                            managed.last_activity.store(now_ms(), Ordering::Relaxed);
                        }
                    }
                    let exited = matches!(event, DriverEvent::Exited { .. });
                    events.publish(ManagerEvent::Driver { session_id: session_id.clone(), event });
                    if exited {
                        let removed = sessions.write().await.remove(&session_id).is_some();
                        if removed {
                            events.publish(ManagerEvent::SessionClosed { session_id: session_id.clone() });
                        }
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

fn generate_session_id() -> String {
    let ts36 = to_base36(now_ms());
    let suffix: String = rand::rng().sample_iter(Alphanumeric).take(6).map(char::from).collect();
    format!("session-{ts36}-{suffix}")
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
