//! Client-wide constants
//!
//! This module contains all constant values used throughout the client.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// ENDPOINT DEFAULTS
// =============================================================================

/// Default REST API base URL (includes the version prefix)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Default WebSocket base URL for live log streams
pub const DEFAULT_WS_BASE_URL: &str = "ws://localhost:8080";

/// Default HTTP request timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;

// =============================================================================
// POLLING DEFAULTS
// =============================================================================

/// Submission status poll interval in milliseconds (while Queued or Running)
pub const DEFAULT_STATUS_POLL_INTERVAL_MS: u64 = 2_000;

/// Queue position poll interval in milliseconds (strictly while Queued)
pub const DEFAULT_QUEUE_POLL_INTERVAL_MS: u64 = 3_000;

// =============================================================================
// TELEMETRY DEFAULTS
// =============================================================================

/// Fixed delay before reattempting a dropped log stream, in milliseconds.
/// The retry policy is a constant interval, not exponential backoff.
pub const DEFAULT_RECONNECT_INTERVAL_MS: u64 = 3_000;

// =============================================================================
// CHART DEFAULTS
// =============================================================================

/// Minimum upper bound of the trend chart score axis
pub const MIN_TREND_AXIS_MAX: i64 = 100;

/// Headroom factor applied to the maximum observed score before rounding
/// the trend axis upper bound to the next multiple of 100
pub const TREND_AXIS_HEADROOM: f64 = 1.1;
