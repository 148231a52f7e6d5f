//! Background polling state machine for deployments.
//!
//! A [`DeploymentPoller`] drives one deployment session at a time:
//! trigger the hook, then poll the provider's deployment listing until
//! the build finishes, fails, or the overall timeout expires. State
//! transitions are published on a watch channel so the HTTP layer and
//! the CLI can observe the same machine.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::provider::BuildStatus;
use super::DeployService;

const TIMEOUT_MESSAGE: &str = "Timed out waiting for the deployment to finish";

/// Observable state of a deployment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployState {
    /// No session has run yet, or the last one was canceled.
    Idle,
    /// The hook request is in flight.
    Triggering,
    /// The hook accepted the trigger; the build is being polled.
    Building,
    /// The most recent session finished successfully.
    Ready,
    /// The most recent session failed; `message` says how.
    Error { message: String },
}

impl DeployState {
    /// Whether the session has finished and a new one may start.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeployState::Ready | DeployState::Error { .. })
    }

    fn in_flight(&self) -> bool {
        matches!(self, DeployState::Triggering | DeployState::Building)
    }
}

impl std::fmt::Display for DeployState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployState::Idle => write!(f, "IDLE"),
            DeployState::Triggering => write!(f, "TRIGGERING"),
            DeployState::Building => write!(f, "BUILDING"),
            DeployState::Ready => write!(f, "READY"),
            DeployState::Error { message } => write!(f, "ERROR: {message}"),
        }
    }
}

/// Handle to a running polling session.
///
/// Dropping the handle cancels the session at its next wakeup; the
/// session also ends on its own once it reaches a terminal state.
#[derive(Debug)]
pub struct PollHandle {
    states: watch::Receiver<DeployState>,
    cancel_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Subscribe to state transitions for this session.
    pub fn states(&self) -> watch::Receiver<DeployState> {
        self.states.clone()
    }

    /// The most recently published state.
    pub fn state(&self) -> DeployState {
        self.states.borrow().clone()
    }

    /// Run the session to completion and return its final state.
    pub async fn wait(mut self) -> DeployState {
        let _ = (&mut self.task).await;
        self.states.borrow().clone()
    }

    /// Stop polling and wait for the session task to exit.
    ///
    /// A tick that is already in flight completes first; no further
    /// ticks are scheduled after it.
    pub async fn cancel(self) {
        let _ = self.cancel_tx.send(()).await;
        let _ = self.task.await;
    }
}

/// Drives deployment sessions against a [`DeployService`].
///
/// The poller is restartable: after a session reaches [`DeployState::Ready`]
/// or [`DeployState::Error`], calling [`start`](Self::start) begins a fresh
/// one. Only one session may be in flight at a time.
pub struct DeploymentPoller {
    service: Arc<DeployService>,
    interval: Duration,
    timeout: Duration,
    state_tx: Arc<watch::Sender<DeployState>>,
    start_lock: Mutex<()>,
}

impl DeploymentPoller {
    pub fn new(service: Arc<DeployService>, poll_interval_secs: u64, timeout_secs: u64) -> Self {
        Self::with_timing(
            service,
            Duration::from_secs(poll_interval_secs),
            Duration::from_secs(timeout_secs),
        )
    }

    /// Like [`new`](Self::new) but with raw durations, for callers that
    /// need sub-second timing.
    pub fn with_timing(service: Arc<DeployService>, interval: Duration, timeout: Duration) -> Self {
        let (state_tx, _) = watch::channel(DeployState::Idle);
        Self {
            service,
            interval,
            timeout,
            state_tx: Arc::new(state_tx),
            start_lock: Mutex::new(()),
        }
    }

    /// The current state of the machine.
    pub fn state(&self) -> DeployState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state transitions across all sessions.
    pub fn subscribe(&self) -> watch::Receiver<DeployState> {
        self.state_tx.subscribe()
    }

    /// Trigger a deployment and begin polling it in a background task.
    ///
    /// Fails if a session is already in flight.
    pub fn start(&self) -> Result<PollHandle> {
        let _guard = self.start_lock.lock();
        if self.state_tx.borrow().in_flight() {
            anyhow::bail!("a deployment is already in progress");
        }
        let _ = self.state_tx.send(DeployState::Triggering);

        let (cancel_tx, cancel_rx) = mpsc::channel(1);
        let task = tokio::spawn(run_session(
            self.service.clone(),
            self.state_tx.clone(),
            self.interval,
            self.timeout,
            cancel_rx,
        ));

        Ok(PollHandle {
            states: self.state_tx.subscribe(),
            cancel_tx,
            task,
        })
    }
}

/// One deployment session: trigger, then poll until terminal.
///
/// Ticks run sequentially; the next sleep is not scheduled until the
/// current listing request has finished.
async fn run_session(
    service: Arc<DeployService>,
    state: Arc<watch::Sender<DeployState>>,
    interval: Duration,
    timeout: Duration,
    mut cancel_rx: mpsc::Receiver<()>,
) {
    let receipt = match service.trigger().await {
        Ok(receipt) => receipt,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "Failed to trigger deployment");
            let _ = state.send(DeployState::Error {
                message: format!("Failed to trigger deployment: {e:#}"),
            });
            return;
        }
    };

    let _ = state.send(DeployState::Building);
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        tokio::select! {
            biased;

            _ = cancel_rx.recv() => {
                tracing::info!(hook_id = %receipt.hook_id, "Deployment polling canceled");
                let _ = state.send(DeployState::Idle);
                return;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        if tokio::time::Instant::now() >= deadline {
            tracing::warn!(hook_id = %receipt.hook_id, "Deployment polling timed out");
            let _ = state.send(DeployState::Error {
                message: TIMEOUT_MESSAGE.to_string(),
            });
            return;
        }

        match service.status(receipt.triggered_at, &receipt.hook_id).await {
            Ok(BuildStatus::Ready) => {
                tracing::info!(hook_id = %receipt.hook_id, "Deployment ready");
                let _ = state.send(DeployState::Ready);
                return;
            }
            Ok(status) if status.is_failure() => {
                tracing::warn!(hook_id = %receipt.hook_id, status = %status, "Deployment failed");
                let _ = state.send(DeployState::Error {
                    message: format!("Deployment finished with status {status}"),
                });
                return;
            }
            Ok(status) => {
                tracing::debug!(hook_id = %receipt.hook_id, status = %status, "Deployment in progress");
            }
            // Transient listing failures are retried on the next tick.
            Err(e) => {
                tracing::warn!(hook_id = %receipt.hook_id, error = %format!("{e:#}"), "Deployment status check failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!DeployState::Idle.is_terminal());
        assert!(!DeployState::Triggering.is_terminal());
        assert!(!DeployState::Building.is_terminal());
        assert!(DeployState::Ready.is_terminal());
        assert!(DeployState::Error {
            message: "boom".into()
        }
        .is_terminal());
    }

    #[test]
    fn display_includes_error_message() {
        assert_eq!(DeployState::Building.to_string(), "BUILDING");
        let err = DeployState::Error {
            message: "Timed out".into(),
        };
        assert_eq!(err.to_string(), "ERROR: Timed out");
    }
}
