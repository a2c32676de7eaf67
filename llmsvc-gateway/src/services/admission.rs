//! Adaptive admission control
//!
//! Decides per client identity whether a request is admitted, and tracks each
//! client's error history to derive an exponential backoff.
//!
//! # Policy
//!
//! - `error_count == 0`: always admitted. The trailing-window timestamps are
//!   bookkeeping only; request volume never causes a rejection.
//! - `error_count > 0`: rejected with
//!   `retry_after = min(base * 2^error_count, max)` seconds.
//! - A recorded success resets `error_count` to zero; a recorded failure adds
//!   exactly one.
//!
//! Under this strict default a rejected request never runs, so no success
//! can reset the count: a client that keeps retrying stays rejected
//! indefinitely. Every rejected attempt also refreshes its idle timer, so
//! idle eviction only frees a client that stops calling for the whole idle
//! period.
//!
//! With `release_after_backoff` enabled, a rejected client is admitted again
//! once `retry_after` has elapsed since its last failure; that is the only
//! way a persistently retrying client recovers.
//!
//! # Concurrency
//!
//! Each client has its own lock; the outer map lock is only held to find or
//! create that entry, so clients never contend with each other's bookkeeping.
//!
//! # Memory
//!
//! Entries are created on first sight. [`AdmissionController::evict_idle`]
//! drops clients with no recent request so the map stays bounded; the
//! gateway runs it periodically via [`spawn_idle_sweeper`].

use llmsvc_common::config::ThrottleConfig;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Result of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Allow,
    Reject { retry_after_secs: u64 },
}

/// Outcome of an admitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Admission tuning
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionConfig {
    pub base_backoff_secs: u64,
    pub max_backoff_secs: u64,
    pub window: Duration,
    pub release_after_backoff: bool,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self::from(&ThrottleConfig::default())
    }
}

impl From<&ThrottleConfig> for AdmissionConfig {
    fn from(config: &ThrottleConfig) -> Self {
        Self {
            base_backoff_secs: config.base_backoff_secs,
            max_backoff_secs: config.max_backoff_secs,
            window: Duration::from_secs(config.window_secs),
            release_after_backoff: config.release_after_backoff,
        }
    }
}

/// Per-client throttle state
#[derive(Debug)]
struct ClientThrottleState {
    /// Request timestamps inside the trailing window, oldest first
    recent_requests: VecDeque<Instant>,
    error_count: u32,
    last_failure: Option<Instant>,
    last_seen: Instant,
}

impl ClientThrottleState {
    fn new(now: Instant) -> Self {
        Self {
            recent_requests: VecDeque::new(),
            error_count: 0,
            last_failure: None,
            last_seen: now,
        }
    }

    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.recent_requests.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.recent_requests.pop_front();
            } else {
                break;
            }
        }
    }
}

/// `min(base * 2^error_count, max)` without overflow at large counts
pub fn backoff_secs(base_secs: u64, max_secs: u64, error_count: u32) -> u64 {
    let factor = 1u64.checked_shl(error_count).unwrap_or(u64::MAX);
    base_secs.saturating_mul(factor).min(max_secs)
}

/// Per-client adaptive admission controller
pub struct AdmissionController {
    config: AdmissionConfig,
    clients: RwLock<HashMap<String, Arc<Mutex<ClientThrottleState>>>>,
}

impl AdmissionController {
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Decide whether `client_id` may proceed
    ///
    /// Called exactly once per incoming request, before any other work.
    pub async fn admit(&self, client_id: &str) -> AdmissionDecision {
        self.admit_at(client_id, Instant::now()).await
    }

    pub async fn admit_at(&self, client_id: &str, now: Instant) -> AdmissionDecision {
        let entry = self.entry(client_id, now).await;
        let mut state = entry.lock().await;

        state.prune(now, self.config.window);
        state.recent_requests.push_back(now);
        state.last_seen = now;

        if state.error_count == 0 {
            return AdmissionDecision::Allow;
        }

        let retry_after_secs = backoff_secs(
            self.config.base_backoff_secs,
            self.config.max_backoff_secs,
            state.error_count,
        );

        if self.config.release_after_backoff {
            if let Some(last_failure) = state.last_failure {
                if now.saturating_duration_since(last_failure) >= Duration::from_secs(retry_after_secs) {
                    debug!(
                        client = %client_id,
                        error_count = state.error_count,
                        "Backoff elapsed, admitting on probation"
                    );
                    return AdmissionDecision::Allow;
                }
            }
        }

        debug!(
            client = %client_id,
            error_count = state.error_count,
            retry_after_secs,
            "Rejecting request during backoff"
        );
        AdmissionDecision::Reject { retry_after_secs }
    }

    /// Feed the outcome of an admitted request back into the client's state
    ///
    /// Safe to call for a client that was never admitted.
    pub async fn record_outcome(&self, client_id: &str, outcome: Outcome) {
        self.record_outcome_at(client_id, outcome, Instant::now()).await
    }

    pub async fn record_outcome_at(&self, client_id: &str, outcome: Outcome, now: Instant) {
        let entry = self.entry(client_id, now).await;
        let mut state = entry.lock().await;

        match outcome {
            Outcome::Success => {
                if state.error_count > 0 {
                    debug!(client = %client_id, "Success recorded, error count reset");
                }
                state.error_count = 0;
                state.last_failure = None;
            }
            Outcome::Failure => {
                state.error_count = state.error_count.saturating_add(1);
                state.last_failure = Some(now);
                debug!(client = %client_id, error_count = state.error_count, "Failure recorded");
            }
        }
    }

    /// Current error count for `client_id` (0 if unknown)
    pub async fn error_count(&self, client_id: &str) -> u32 {
        match self.clients.read().await.get(client_id) {
            Some(entry) => entry.lock().await.error_count,
            None => 0,
        }
    }

    /// Requests by `client_id` inside the trailing window ending at `now`
    pub async fn recent_request_count(&self, client_id: &str, now: Instant) -> usize {
        match self.clients.read().await.get(client_id) {
            Some(entry) => {
                let mut state = entry.lock().await;
                state.prune(now, self.config.window);
                state.recent_requests.len()
            }
            None => 0,
        }
    }

    /// Number of client identities currently tracked
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Forget clients not seen for `idle_after`
    ///
    /// Returns how many clients were dropped.
    pub async fn evict_idle(&self, now: Instant, idle_after: Duration) -> usize {
        let mut clients = self.clients.write().await;
        let before = clients.len();

        let mut stale = Vec::new();
        for (client_id, entry) in clients.iter() {
            // An entry locked right now is in use, so it is not idle
            if let Ok(state) = entry.try_lock() {
                if now.saturating_duration_since(state.last_seen) >= idle_after {
                    stale.push(client_id.clone());
                }
            }
        }
        for client_id in &stale {
            clients.remove(client_id);
        }

        before - clients.len()
    }

    async fn entry(&self, client_id: &str, now: Instant) -> Arc<Mutex<ClientThrottleState>> {
        if let Some(entry) = self.clients.read().await.get(client_id) {
            return Arc::clone(entry);
        }

        let mut clients = self.clients.write().await;
        Arc::clone(
            clients
                .entry(client_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(ClientThrottleState::new(now)))),
        )
    }
}

/// Periodically evict idle clients until `cancel` fires
pub fn spawn_idle_sweeper(
    controller: Arc<AdmissionController>,
    interval: Duration,
    idle_after: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Idle client sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let evicted = controller.evict_idle(Instant::now(), idle_after).await;
                    if evicted > 0 {
                        info!(evicted, "Evicted idle clients from admission state");
                    }
                }
            }
        }
    })
}
