//! Submission model

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::User;

/// Submission lifecycle status.
///
/// The same enum describes a whole submission and a single container, scoped
/// to that container's step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Queued,
    Running,
    Success,
    Failed,
}

impl Status {
    /// Check whether this status is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    /// Check whether the submission is still being processed
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "Queued"),
            Self::Running => write!(f, "Running"),
            Self::Success => write!(f, "Success"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Runtime instantiation of one workflow step for one submission.
///
/// Created when the backend starts the step; once its status is terminal the
/// container is never mutated again and its log becomes static.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub submission_id: String,
    #[serde(default)]
    pub image: String,
    pub status: Status,
    #[serde(default)]
    pub exit_code: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Submission as returned by the backend.
///
/// Mutated by the backend as execution advances; immutable once `status` is
/// terminal except for the cosmetic addition of `info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
    pub problem_id: String,
    pub user_id: String,
    pub user: User,
    pub status: Status,
    /// Zero-based index into the problem's workflow
    pub current_step: usize,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub info: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub containers: Vec<Container>,
}

impl Submission {
    /// Total workflow steps for progress display.
    ///
    /// Prefers the judge-reported `total_steps` in `info`; falls back to the
    /// container count plus one (at least one step is still pending when the
    /// submission is active).
    pub fn total_steps(&self) -> usize {
        self.info
            .get("total_steps")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(self.containers.len() + 1)
    }

    /// Progress through the workflow as a percentage in `[0, 100]`
    pub fn progress(&self) -> f64 {
        let total = self.total_steps();
        if total == 0 {
            return 0.0;
        }
        ((self.current_step as f64 / total as f64) * 100.0).clamp(0.0, 100.0)
    }
}

/// Zero-based position in the judge queue, meaningful only while Queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuePosition {
    pub position: i64,
}
