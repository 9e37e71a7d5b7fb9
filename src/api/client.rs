//! REST API client
//!
//! Thin typed wrapper over the Arena REST API. Every response body is an
//! envelope `{"data": ...}`; the bearer token comes from the shared
//! [`AuthContext`] at request time so a re-login takes effect without
//! rebuilding the client.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::auth::AuthContext;
use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Attempts, Contest, LeaderboardEntry, Problem, QueuePosition, Submission, TrendEntry,
};
use crate::telemetry::event::{parse_log_records, LogEvent};

/// Response envelope used by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Ban payload carried in the body of a 403 response
#[derive(Debug, Deserialize)]
struct BanDetails {
    ban_reason: String,
    banned_until: chrono::DateTime<chrono::Utc>,
}

/// Error envelope returned on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Typed REST client with connection pooling and a fixed request timeout
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthContext,
}

impl ApiClient {
    /// Create a client from configuration and an auth capability
    pub fn new(config: &ApiConfig, auth: AuthContext) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Auth capability this client was built with
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    /// Fetch a contest (time window and problem ordering)
    pub async fn contest(&self, id: &str) -> ClientResult<Contest> {
        self.get_json(&format!("/contests/{id}")).await
    }

    /// Fetch a problem (workflow steps, limits)
    pub async fn problem(&self, id: &str) -> ClientResult<Problem> {
        self.get_json(&format!("/problems/{id}")).await
    }

    /// Fetch the current user's attempt accounting for a problem
    pub async fn attempts(&self, problem_id: &str) -> ClientResult<Attempts> {
        self.get_json(&format!("/problems/{problem_id}/attempts"))
            .await
    }

    /// Fetch a submission with its containers
    pub async fn submission(&self, id: &str) -> ClientResult<Submission> {
        self.get_json(&format!("/submissions/{id}")).await
    }

    /// Fetch the submission's zero-based queue position
    pub async fn queue_position(&self, id: &str) -> ClientResult<QueuePosition> {
        self.get_json(&format!("/submissions/{id}/queue_position"))
            .await
    }

    /// Request interruption of a queued or running submission.
    ///
    /// The backend is authoritative: callers refresh the submission instead
    /// of assuming local state changed.
    pub async fn interrupt(&self, id: &str) -> ClientResult<()> {
        let url = format!("{}/submissions/{id}/interrupt", self.base_url);
        let response = self.authorize(self.http.post(&url)).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Fetch the complete historical log of a finished container.
    ///
    /// The body is newline-delimited JSON; malformed lines are dropped.
    pub async fn container_log(
        &self,
        submission_id: &str,
        container_id: &str,
    ) -> ClientResult<Vec<LogEvent>> {
        let url = format!(
            "{}/submissions/{submission_id}/containers/{container_id}/log",
            self.base_url
        );
        let response = self.authorize(self.http.get(&url)).send().await?;
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        Ok(parse_log_records(&body))
    }

    /// Fetch the server-sorted leaderboard for a contest
    pub async fn leaderboard(&self, contest_id: &str) -> ClientResult<Vec<LeaderboardEntry>> {
        self.get_json(&format!("/contests/{contest_id}/leaderboard"))
            .await
    }

    /// Fetch per-user sparse score histories for a contest
    pub async fn trend(&self, contest_id: &str) -> ClientResult<Vec<TrendEntry>> {
        self.get_json(&format!("/contests/{contest_id}/trend")).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.authorize(self.http.get(&url)).send().await?;
        let response = Self::ensure_success(response).await?;
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map non-2xx responses onto the client error taxonomy.
    ///
    /// A 403 whose body carries ban details becomes [`ClientError::Banned`]
    /// so the auth collaborator can surface it.
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
            message: None,
            data: None,
        });
        let message = body.message.unwrap_or_else(|| status.to_string());

        Err(match status.as_u16() {
            401 => ClientError::Unauthorized,
            403 => match body
                .data
                .and_then(|d| serde_json::from_value::<BanDetails>(d).ok())
            {
                Some(ban) => ClientError::Banned {
                    reason: ban.ban_reason,
                    until: ban.banned_until,
                },
                None => ClientError::Forbidden(message),
            },
            404 => ClientError::NotFound(message),
            code => ClientError::Api {
                status: code,
                message,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_deserialize() {
        let json = r#"{"data": {"position": 4}}"#;
        let envelope: Envelope<QueuePosition> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.position, 4);
    }

    #[test]
    fn test_ban_details_deserialize() {
        let json = r#"{"ban_reason": "plagiarism", "banned_until": "2026-04-01T00:00:00Z"}"#;
        let ban: BanDetails = serde_json::from_str(json).unwrap();
        assert_eq!(ban.ban_reason, "plagiarism");
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let config = ApiConfig {
            base_url: "http://judge.example/api/v1/".to_string(),
            timeout: std::time::Duration::from_secs(5),
        };
        let client = ApiClient::new(&config, AuthContext::anonymous()).unwrap();
        assert_eq!(client.base_url, "http://judge.example/api/v1");
    }
}
