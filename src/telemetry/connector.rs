//! Log stream connector trait and WebSocket implementation
//!
//! [`LogStreamConnector`] abstracts over how raw log frames reach the
//! transport, so the reconnect machinery can be driven by scripted streams in
//! tests. [`WsConnector`] is the production implementation: one WebSocket per
//! `(submission, container)` pair, authenticated via a token query parameter.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::api::AuthContext;
use crate::config::TelemetryConfig;

/// Transport-level failures, all treated as transient by the reconnect loop
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("missing auth token")]
    MissingToken,
}

/// Identity of one per-container log endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEndpoint {
    pub submission_id: String,
    pub container_id: String,
}

/// Raw text frames as delivered by the stream, in arrival order
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

/// Opens a fresh frame stream for an endpoint identity.
///
/// Each call is one connection attempt; the transport owns retry policy.
#[async_trait]
pub trait LogStreamConnector: Send + Sync + 'static {
    async fn connect(&self, endpoint: &LogEndpoint) -> Result<FrameStream, TransportError>;
}

/// WebSocket connector backed by `tokio-tungstenite`
pub struct WsConnector {
    ws_base_url: String,
    auth: AuthContext,
}

impl WsConnector {
    /// Create a connector from configuration and an auth capability
    pub fn new(config: &TelemetryConfig, auth: AuthContext) -> Self {
        Self {
            ws_base_url: config.ws_base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn endpoint_url(&self, endpoint: &LogEndpoint) -> Result<Url, TransportError> {
        let raw = format!(
            "{}/ws/submissions/{}/containers/{}/logs",
            self.ws_base_url, endpoint.submission_id, endpoint.container_id
        );
        let mut url = Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let token = self.auth.token().ok_or(TransportError::MissingToken)?;
        url.query_pairs_mut().append_pair("token", &token);
        Ok(url)
    }
}

#[async_trait]
impl LogStreamConnector for WsConnector {
    async fn connect(&self, endpoint: &LogEndpoint) -> Result<FrameStream, TransportError> {
        let url = self.endpoint_url(endpoint)?;

        let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let frames = socket.filter_map(|item| async move {
            match item {
                Ok(Message::Text(text)) => Some(Ok(text.to_string())),
                // Control and binary frames carry no log data
                Ok(_) => None,
                Err(e) => Some(Err(TransportError::Stream(e.to_string()))),
            }
        });

        Ok(Box::pin(frames))
    }
}
