//! Log event model and record parsing
//!
//! The judge emits the same JSON record shape on the live stream and in the
//! stored per-container log file (one record per line). Events are ordered by
//! arrival and never retroactively reordered.

use serde::{Deserialize, Serialize};

/// Source stream of a log fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
    Info,
    Error,
}

impl LogStream {
    /// Whether the fragment should be rendered as an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Stderr | Self::Error)
    }
}

/// One text fragment emitted by a judging step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub stream: LogStream,
    pub data: String,
}

/// Parse a single JSON frame into a log event
pub fn parse_log_event(frame: &str) -> Result<LogEvent, serde_json::Error> {
    serde_json::from_str(frame)
}

/// Parse a newline-delimited JSON log file leniently.
///
/// Blank lines are skipped; malformed lines are dropped with a warning so a
/// partially corrupt historical log still renders.
pub fn parse_log_records(body: &str) -> Vec<LogEvent> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_log_event(line) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed log record");
                None
            }
        })
        .collect()
}
