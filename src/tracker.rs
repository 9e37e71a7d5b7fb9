//! Submission step tracker
//!
//! Maps a submission's workflow steps to what the viewer can show for each
//! one, owns at most one live log transport at a time, and keeps the selected
//! step in sync with execution progress. A step is Hidden when the problem
//! author marked it non-visible, Unavailable before its container exists,
//! Live while its container runs, and Static once it finished.
//!
//! Selection follows the execution frontier (the newest container) until the
//! caller explicitly selects a step, which pins the selection. Hidden steps
//! can still be selected; they simply render no log.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{AuthContext, SubmissionGateway};
use crate::error::{ClientError, ClientResult};
use crate::models::{Container, Status, Submission, WorkflowStep};
use crate::telemetry::connector::{LogEndpoint, LogStreamConnector};
use crate::telemetry::event::LogEvent;
use crate::telemetry::transport::{DisconnectHook, LogTransport};

/// What the viewer can show for one workflow step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Author marked the step non-visible; never show a log
    Hidden,
    /// Container is running; stream its output
    Live,
    /// Container finished; fetch the complete historical log once
    Static,
    /// No container yet; the step has not started
    Unavailable,
}

/// Outcome of one static log fetch, cached per step
#[derive(Debug, Clone)]
pub enum StaticLog {
    Loaded(Vec<LogEvent>),
    Failed(String),
}

/// Resolve the display mode of every workflow step.
///
/// Containers map to visible positions in order of creation, so step `i`'s
/// container is `containers[i]` when it exists.
pub fn resolve_step_modes(workflow: &[WorkflowStep], containers: &[Container]) -> Vec<StepMode> {
    workflow
        .iter()
        .enumerate()
        .map(|(index, step)| {
            if !step.show {
                return StepMode::Hidden;
            }
            match containers.get(index) {
                None => StepMode::Unavailable,
                Some(container) if container.status == Status::Running => StepMode::Live,
                Some(_) => StepMode::Static,
            }
        })
        .collect()
}

struct LiveStep {
    step: usize,
    transport: LogTransport,
}

/// Tracks one submission's steps and owns their log resources.
///
/// The tracker never polls by itself; the caller feeds it authoritative
/// submission snapshots via [`StepTracker::sync`], typically wired to a
/// poller plus the live transport's disconnect hook.
pub struct StepTracker<C: LogStreamConnector> {
    gateway: Arc<dyn SubmissionGateway>,
    connector: Arc<C>,
    auth: AuthContext,
    reconnect_interval: Duration,
    submission_id: String,
    workflow: Vec<WorkflowStep>,
    containers: Vec<Container>,
    modes: Vec<StepMode>,
    selected: usize,
    pinned: bool,
    live: Option<LiveStep>,
    static_logs: HashMap<usize, StaticLog>,
    on_refresh: DisconnectHook,
}

impl<C: LogStreamConnector> StepTracker<C> {
    /// Create a tracker from the problem's workflow and the submission's
    /// current state, selecting the execution frontier.
    ///
    /// `on_refresh` is invoked whenever a live transport closes, so the owner
    /// can re-fetch the submission and call [`sync`](Self::sync).
    pub async fn new(
        gateway: Arc<dyn SubmissionGateway>,
        connector: Arc<C>,
        auth: AuthContext,
        reconnect_interval: Duration,
        workflow: Vec<WorkflowStep>,
        submission: &Submission,
        on_refresh: DisconnectHook,
    ) -> Self {
        let containers = submission.containers.clone();
        let modes = resolve_step_modes(&workflow, &containers);
        let mut tracker = Self {
            gateway,
            connector,
            auth,
            reconnect_interval,
            submission_id: submission.id.clone(),
            workflow,
            containers,
            modes,
            selected: 0,
            pinned: false,
            live: None,
            static_logs: HashMap::new(),
            on_refresh,
        };
        tracker.selected = tracker.frontier();
        tracker.reconcile().await;
        tracker
    }

    /// Index of the newest step with a container, 0 before any exist
    fn frontier(&self) -> usize {
        self.containers.len().saturating_sub(1)
    }

    /// Apply a fresh authoritative submission snapshot.
    ///
    /// When execution advanced to a new step and the selection is not pinned,
    /// the selection follows the frontier.
    pub async fn sync(&mut self, submission: &Submission) {
        let grew = submission.containers.len() > self.containers.len();
        self.containers = submission.containers.clone();
        self.modes = resolve_step_modes(&self.workflow, &self.containers);

        if grew && !self.pinned {
            self.selected = self.frontier();
        }
        self.reconcile().await;
    }

    /// Select a step explicitly.
    ///
    /// Pins the selection unless the chosen step is the frontier itself, in
    /// which case auto-advance resumes.
    pub async fn select_step(&mut self, index: usize) -> ClientResult<()> {
        if index >= self.workflow.len() {
            return Err(ClientError::InvalidState(format!(
                "step {index} out of range for a {}-step workflow",
                self.workflow.len()
            )));
        }
        self.selected = index;
        self.pinned = index != self.frontier();
        self.reconcile().await;
        Ok(())
    }

    /// Drop a cached static log failure and fetch it again
    pub async fn retry_static_log(&mut self) {
        self.static_logs.remove(&self.selected);
        self.reconcile().await;
    }

    /// Bring owned resources in line with the selected step's mode
    async fn reconcile(&mut self) {
        let mode = self.mode(self.selected);

        // A live transport survives only while it still belongs to the
        // selected, still-running step.
        let keep_live = mode == Some(StepMode::Live)
            && self.live.as_ref().is_some_and(|l| l.step == self.selected);
        if !keep_live {
            if let Some(live) = self.live.take() {
                tracing::info!(
                    submission_id = %self.submission_id,
                    step = live.step,
                    "closing live log transport"
                );
                live.transport.close().await;
            }
        }

        match mode {
            Some(StepMode::Live) => {
                if self.live.is_none() {
                    if let Some(container) = self.containers.get(self.selected) {
                        let transport = LogTransport::open(
                            self.connector.clone(),
                            LogEndpoint {
                                submission_id: self.submission_id.clone(),
                                container_id: container.id.clone(),
                            },
                            self.auth.clone(),
                            self.on_refresh.clone(),
                            self.reconnect_interval,
                        );
                        self.live = Some(LiveStep {
                            step: self.selected,
                            transport,
                        });
                    }
                }
            }
            Some(StepMode::Static) => {
                if !self.static_logs.contains_key(&self.selected) {
                    if let Some(container) = self.containers.get(self.selected) {
                        let log = match self
                            .gateway
                            .container_log(&self.submission_id, &container.id)
                            .await
                        {
                            Ok(events) => StaticLog::Loaded(events),
                            Err(e) => {
                                tracing::warn!(
                                    submission_id = %self.submission_id,
                                    container_id = %container.id,
                                    error = %e,
                                    "static log fetch failed"
                                );
                                StaticLog::Failed(e.to_string())
                            }
                        };
                        self.static_logs.insert(self.selected, log);
                    }
                }
            }
            // Hidden and Unavailable steps use no network resources
            Some(StepMode::Hidden) | Some(StepMode::Unavailable) | None => {}
        }
    }

    /// Display modes of all workflow steps, in order
    pub fn modes(&self) -> &[StepMode] {
        &self.modes
    }

    /// Display mode of one step
    pub fn mode(&self, index: usize) -> Option<StepMode> {
        self.modes.get(index).copied()
    }

    /// Currently selected step index
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Whether the selection is pinned away from the frontier
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Mutable access to the live transport, when the selected step streams
    pub fn live_transport_mut(&mut self) -> Option<&mut LogTransport> {
        self.live
            .as_mut()
            .filter(|l| l.step == self.selected)
            .map(|l| &mut l.transport)
    }

    /// Cached static log of one step, if it was fetched
    pub fn static_log(&self, index: usize) -> Option<&StaticLog> {
        self.static_logs.get(&index)
    }

    /// Release all owned resources
    pub async fn shutdown(mut self) {
        if let Some(live) = self.live.take() {
            live.transport.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockSubmissionGateway;
    use crate::models::User;
    use crate::telemetry::connector::{FrameStream, TransportError};
    use crate::telemetry::event::LogStream;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RECONNECT: Duration = Duration::from_secs(3);

    /// Connector whose streams stay open forever; only connect counts matter
    struct CountingConnector {
        connects: AtomicUsize,
    }

    impl CountingConnector {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                connects: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LogStreamConnector for CountingConnector {
        async fn connect(&self, _endpoint: &LogEndpoint) -> Result<FrameStream, TransportError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Box::pin(futures::stream::pending()))
        }
    }

    fn workflow(shows: &[bool]) -> Vec<WorkflowStep> {
        shows
            .iter()
            .enumerate()
            .map(|(i, &show)| WorkflowStep {
                name: format!("step-{i}"),
                show,
            })
            .collect()
    }

    fn container(id: &str, status: Status) -> Container {
        Container {
            id: id.to_string(),
            submission_id: "s1".to_string(),
            image: String::new(),
            status,
            exit_code: 0,
            started_at: None,
            finished_at: None,
        }
    }

    fn submission(containers: Vec<Container>) -> Submission {
        Submission {
            id: "s1".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            problem_id: "p1".to_string(),
            user_id: "u1".to_string(),
            user: User {
                id: "u1".to_string(),
                username: "alice".to_string(),
                nickname: "Alice".to_string(),
                signature: String::new(),
                avatar_url: String::new(),
            },
            status: Status::Running,
            current_step: containers.len().saturating_sub(1),
            cluster: String::new(),
            node: String::new(),
            score: 0.0,
            info: Default::default(),
            is_valid: true,
            containers,
        }
    }

    fn noop_hook() -> DisconnectHook {
        Arc::new(|| {})
    }

    fn sample_log() -> Vec<LogEvent> {
        vec![LogEvent {
            stream: LogStream::Stdout,
            data: "done".to_string(),
        }]
    }

    #[test]
    fn test_resolve_step_modes() {
        // Three steps, middle one hidden; two containers, both finished
        let workflow = workflow(&[true, false, true]);
        let containers = vec![
            container("c1", Status::Success),
            container("c2", Status::Success),
        ];
        assert_eq!(
            resolve_step_modes(&workflow, &containers),
            vec![StepMode::Static, StepMode::Hidden, StepMode::Unavailable]
        );
    }

    #[test]
    fn test_running_container_is_live() {
        let workflow = workflow(&[true, true]);
        let containers = vec![
            container("c1", Status::Success),
            container("c2", Status::Running),
        ];
        assert_eq!(
            resolve_step_modes(&workflow, &containers),
            vec![StepMode::Static, StepMode::Live]
        );
    }

    #[test]
    fn test_hidden_step_with_running_container_stays_hidden() {
        let workflow = workflow(&[false]);
        let containers = vec![container("c1", Status::Running)];
        assert_eq!(resolve_step_modes(&workflow, &containers), vec![StepMode::Hidden]);
    }

    #[tokio::test]
    async fn test_live_frontier_opens_transport() {
        let mut gateway = MockSubmissionGateway::new();
        gateway.expect_container_log().never();
        let connector = CountingConnector::new();

        let tracker = StepTracker::new(
            Arc::new(gateway),
            connector.clone(),
            AuthContext::with_token("t"),
            RECONNECT,
            workflow(&[true, true]),
            &submission(vec![
                container("c1", Status::Success),
                container("c2", Status::Running),
            ]),
            noop_hook(),
        )
        .await;

        assert_eq!(tracker.selected(), 1);
        assert_eq!(tracker.mode(1), Some(StepMode::Live));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(connector.connects.load(Ordering::SeqCst), 1);

        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_static_log_fetched_once_and_cached() {
        let mut gateway = MockSubmissionGateway::new();
        gateway
            .expect_container_log()
            .times(1)
            .returning(|_, _| Ok(sample_log()));
        let connector = CountingConnector::new();

        let mut tracker = StepTracker::new(
            Arc::new(gateway),
            connector.clone(),
            AuthContext::with_token("t"),
            RECONNECT,
            workflow(&[true, true]),
            &submission(vec![
                container("c1", Status::Success),
                container("c2", Status::Running),
            ]),
            noop_hook(),
        )
        .await;

        tracker.select_step(0).await.unwrap();
        assert!(matches!(tracker.static_log(0), Some(StaticLog::Loaded(_))));
        assert!(tracker.is_pinned());

        // Selecting away and back must not re-fetch
        tracker.select_step(1).await.unwrap();
        tracker.select_step(0).await.unwrap();
        assert!(matches!(tracker.static_log(0), Some(StaticLog::Loaded(_))));
    }

    #[tokio::test]
    async fn test_failed_static_fetch_is_cached_and_retryable() {
        let mut gateway = MockSubmissionGateway::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        gateway.expect_container_log().returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ClientError::Api {
                    status: 500,
                    message: "log store unavailable".to_string(),
                })
            } else {
                Ok(sample_log())
            }
        });
        let connector = CountingConnector::new();

        let mut tracker = StepTracker::new(
            Arc::new(gateway),
            connector,
            AuthContext::with_token("t"),
            RECONNECT,
            workflow(&[true]),
            &submission(vec![container("c1", Status::Success)]),
            noop_hook(),
        )
        .await;

        assert!(matches!(tracker.static_log(0), Some(StaticLog::Failed(_))));

        tracker.retry_static_log().await;
        assert!(matches!(tracker.static_log(0), Some(StaticLog::Loaded(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_hidden_and_unavailable_use_no_network() {
        let mut gateway = MockSubmissionGateway::new();
        gateway.expect_container_log().never();
        let connector = CountingConnector::new();

        let mut tracker = StepTracker::new(
            Arc::new(gateway),
            connector.clone(),
            AuthContext::with_token("t"),
            RECONNECT,
            workflow(&[false, true]),
            &submission(vec![container("c1", Status::Running)]),
            noop_hook(),
        )
        .await;

        // Frontier is the hidden step; selecting the unavailable one is fine
        assert_eq!(tracker.mode(0), Some(StepMode::Hidden));
        tracker.select_step(1).await.unwrap();
        assert_eq!(tracker.mode(1), Some(StepMode::Unavailable));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(connector.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sync_follows_frontier_unless_pinned() {
        let mut gateway = MockSubmissionGateway::new();
        gateway
            .expect_container_log()
            .returning(|_, _| Ok(sample_log()));
        let connector = CountingConnector::new();

        let mut tracker = StepTracker::new(
            Arc::new(gateway),
            connector.clone(),
            AuthContext::with_token("t"),
            RECONNECT,
            workflow(&[true, true, true]),
            &submission(vec![container("c1", Status::Running)]),
            noop_hook(),
        )
        .await;
        assert_eq!(tracker.selected(), 0);

        // Execution advances; unpinned selection follows
        tracker
            .sync(&submission(vec![
                container("c1", Status::Success),
                container("c2", Status::Running),
            ]))
            .await;
        assert_eq!(tracker.selected(), 1);

        // Pin to step 0, then advance again; selection must stay put
        tracker.select_step(0).await.unwrap();
        tracker
            .sync(&submission(vec![
                container("c1", Status::Success),
                container("c2", Status::Success),
                container("c3", Status::Running),
            ]))
            .await;
        assert_eq!(tracker.selected(), 0);
        assert!(tracker.is_pinned());

        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_selecting_frontier_unpins() {
        let mut gateway = MockSubmissionGateway::new();
        gateway
            .expect_container_log()
            .returning(|_, _| Ok(sample_log()));
        let connector = CountingConnector::new();

        let mut tracker = StepTracker::new(
            Arc::new(gateway),
            connector,
            AuthContext::with_token("t"),
            RECONNECT,
            workflow(&[true, true]),
            &submission(vec![
                container("c1", Status::Success),
                container("c2", Status::Running),
            ]),
            noop_hook(),
        )
        .await;

        tracker.select_step(0).await.unwrap();
        assert!(tracker.is_pinned());
        tracker.select_step(1).await.unwrap();
        assert!(!tracker.is_pinned());

        tracker.shutdown().await;
    }

    #[tokio::test]
    async fn test_step_out_of_range_rejected() {
        let gateway = MockSubmissionGateway::new();
        let connector = CountingConnector::new();

        let mut tracker = StepTracker::new(
            Arc::new(gateway),
            connector,
            AuthContext::with_token("t"),
            RECONNECT,
            workflow(&[true]),
            &submission(vec![]),
            noop_hook(),
        )
        .await;

        assert!(matches!(
            tracker.select_step(5).await,
            Err(ClientError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_live_transport_closed_when_step_finishes() {
        let mut gateway = MockSubmissionGateway::new();
        gateway
            .expect_container_log()
            .returning(|_, _| Ok(sample_log()));
        let connector = CountingConnector::new();

        let mut tracker = StepTracker::new(
            Arc::new(gateway),
            connector.clone(),
            AuthContext::with_token("t"),
            RECONNECT,
            workflow(&[true]),
            &submission(vec![container("c1", Status::Running)]),
            noop_hook(),
        )
        .await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(tracker.live_transport_mut().is_some());

        // The step finished; the snapshot switches it to Static
        tracker
            .sync(&submission(vec![container("c1", Status::Success)]))
            .await;
        assert!(tracker.live_transport_mut().is_none());
        assert!(matches!(tracker.static_log(0), Some(StaticLog::Loaded(_))));
    }
}
