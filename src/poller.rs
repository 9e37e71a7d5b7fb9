//! Queue/status poller
//!
//! Keeps one submission's status fresh while it is still being processed:
//! status is polled on a fixed interval while the submission is Queued or
//! Running, the queue position on its own interval strictly while Queued.
//! Both timers go dead the moment a terminal status is observed. The two
//! timers are independent; each update reflects the most recent value at the
//! time of its own response.
//!
//! The poller never invents state: an interrupt request only triggers an
//! immediate authoritative refresh, and transient fetch failures keep the
//! last known value.

use std::sync::Arc;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::{AuthContext, SubmissionGateway};
use crate::config::PollingConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{Status, Submission};
use crate::telemetry::DisconnectHook;

/// Poller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerPhase {
    /// Created, first fetch not issued yet
    Idle,
    /// Timers armed
    Polling,
    /// Terminal status observed or poller cancelled; all timers dead
    Stopped,
}

/// Handle to the polling task for one submission.
///
/// Dropping the handle cancels the task; [`SubmissionPoller::stop`] does the
/// same but waits for it to finish.
pub struct SubmissionPoller {
    submission_rx: watch::Receiver<Submission>,
    queue_rx: watch::Receiver<Option<i64>>,
    phase_rx: watch::Receiver<PollerPhase>,
    refresh: Arc<Notify>,
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    gateway: Arc<dyn SubmissionGateway>,
    submission_id: String,
}

impl SubmissionPoller {
    /// Start polling a submission from its last known state
    pub fn spawn(
        gateway: Arc<dyn SubmissionGateway>,
        auth: AuthContext,
        submission: Submission,
        config: PollingConfig,
    ) -> Self {
        let submission_id = submission.id.clone();
        let (submission_tx, submission_rx) = watch::channel(submission);
        let (queue_tx, queue_rx) = watch::channel(None);
        let (phase_tx, phase_rx) = watch::channel(PollerPhase::Idle);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let refresh = Arc::new(Notify::new());

        let task = tokio::spawn(run_poller(
            gateway.clone(),
            auth,
            submission_id.clone(),
            config,
            submission_tx,
            queue_tx,
            phase_tx,
            refresh.clone(),
            cancel_rx,
        ));

        Self {
            submission_rx,
            queue_rx,
            phase_rx,
            refresh,
            cancel_tx,
            task,
            gateway,
            submission_id,
        }
    }

    /// Latest known submission state
    pub fn submission(&self) -> Submission {
        self.submission_rx.borrow().clone()
    }

    /// Watch submission updates
    pub fn watch_submission(&self) -> watch::Receiver<Submission> {
        self.submission_rx.clone()
    }

    /// Latest known queue position; `None` once the submission left Queued
    pub fn queue_position(&self) -> Option<i64> {
        *self.queue_rx.borrow()
    }

    /// Watch queue position updates
    pub fn watch_queue_position(&self) -> watch::Receiver<Option<i64>> {
        self.queue_rx.clone()
    }

    /// Current poller phase
    pub fn phase(&self) -> PollerPhase {
        *self.phase_rx.borrow()
    }

    /// Force an immediate authoritative status fetch
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    /// Hook that forces a refresh; handed to the step tracker so a transport
    /// closure re-fetches the submission
    pub fn refresh_hook(&self) -> DisconnectHook {
        let refresh = self.refresh.clone();
        Arc::new(move || refresh.notify_one())
    }

    /// Request interruption of the submission.
    ///
    /// Rejected locally unless the submission is still Queued or Running. On
    /// success only a refresh is triggered; the next poll is authoritative.
    /// A failed request is returned to the caller for a one-shot notice and
    /// leaves polling untouched.
    pub async fn interrupt(&self) -> ClientResult<()> {
        let status = self.submission_rx.borrow().status;
        if status.is_terminal() {
            return Err(ClientError::InvalidState(format!(
                "cannot interrupt a {status} submission"
            )));
        }

        self.gateway.interrupt(&self.submission_id).await?;
        self.refresh.notify_one();
        Ok(())
    }

    /// Stop polling and wait until the task has finished
    pub async fn stop(mut self) {
        let _ = self.cancel_tx.send(true);
        let _ = (&mut self.task).await;
    }
}

impl Drop for SubmissionPoller {
    fn drop(&mut self) {
        let _ = self.cancel_tx.send(true);
    }
}

/// Resolve once cancellation has been requested
async fn cancelled(cancel_rx: &mut watch::Receiver<bool>) {
    if *cancel_rx.borrow() {
        return;
    }
    while cancel_rx.changed().await.is_ok() {
        if *cancel_rx.borrow() {
            return;
        }
    }
}

enum Wake {
    Status,
    Queue,
    Cancel,
}

#[allow(clippy::too_many_arguments)]
async fn run_poller(
    gateway: Arc<dyn SubmissionGateway>,
    auth: AuthContext,
    submission_id: String,
    config: PollingConfig,
    submission_tx: watch::Sender<Submission>,
    queue_tx: watch::Sender<Option<i64>>,
    phase_tx: watch::Sender<PollerPhase>,
    refresh: Arc<Notify>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let mut status_tick = tokio::time::interval(config.status_interval);
    status_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut queue_tick = tokio::time::interval(config.queue_interval);
    queue_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let _ = phase_tx.send(PollerPhase::Polling);

    loop {
        let status = submission_tx.borrow().status;
        if status.is_terminal() {
            break;
        }

        let wake = tokio::select! {
            _ = cancelled(&mut cancel_rx) => Wake::Cancel,
            _ = auth.logged_out() => Wake::Cancel,
            _ = refresh.notified() => Wake::Status,
            _ = status_tick.tick() => Wake::Status,
            _ = queue_tick.tick(), if status == Status::Queued => Wake::Queue,
        };

        match wake {
            Wake::Cancel => break,
            Wake::Status => match gateway.submission(&submission_id).await {
                Ok(submission) => {
                    if submission.status != Status::Queued {
                        let _ = queue_tx.send(None);
                    }
                    let _ = submission_tx.send(submission);
                }
                Err(e) => {
                    // Transient: keep the last known state, next tick retries
                    tracing::warn!(
                        submission_id = %submission_id,
                        error = %e,
                        "status poll failed"
                    );
                }
            },
            Wake::Queue => match gateway.queue_position(&submission_id).await {
                Ok(position) => {
                    let _ = queue_tx.send(Some(position.position));
                }
                Err(e) => {
                    tracing::warn!(
                        submission_id = %submission_id,
                        error = %e,
                        "queue position poll failed"
                    );
                }
            },
        }
    }

    let _ = queue_tx.send(None);
    let _ = phase_tx.send(PollerPhase::Stopped);
    tracing::debug!(submission_id = %submission_id, "submission poller stopped");
}
