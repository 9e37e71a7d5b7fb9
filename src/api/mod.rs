//! REST access layer
//!
//! [`ApiClient`] is the concrete reqwest-backed client. The submission
//! poller and step tracker depend on the narrower [`SubmissionGateway`]
//! trait instead so tests can drive them with a mock backend.

pub mod auth;
pub mod client;

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{QueuePosition, Submission};
use crate::telemetry::event::LogEvent;

pub use auth::AuthContext;
pub use client::ApiClient;

/// Submission-scoped backend operations used by the poller and tracker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// Fetch the authoritative submission state
    async fn submission(&self, id: &str) -> ClientResult<Submission>;

    /// Fetch the current queue position (meaningful only while Queued)
    async fn queue_position(&self, id: &str) -> ClientResult<QueuePosition>;

    /// Request interruption of the submission
    async fn interrupt(&self, id: &str) -> ClientResult<()>;

    /// Fetch the complete historical log of a finished container
    async fn container_log(
        &self,
        submission_id: &str,
        container_id: &str,
    ) -> ClientResult<Vec<LogEvent>>;
}

#[async_trait]
impl SubmissionGateway for ApiClient {
    async fn submission(&self, id: &str) -> ClientResult<Submission> {
        ApiClient::submission(self, id).await
    }

    async fn queue_position(&self, id: &str) -> ClientResult<QueuePosition> {
        ApiClient::queue_position(self, id).await
    }

    async fn interrupt(&self, id: &str) -> ClientResult<()> {
        ApiClient::interrupt(self, id).await
    }

    async fn container_log(
        &self,
        submission_id: &str,
        container_id: &str,
    ) -> ClientResult<Vec<LogEvent>> {
        ApiClient::container_log(self, submission_id, container_id).await
    }
}
