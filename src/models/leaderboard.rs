//! Leaderboard and score trend models

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a contest leaderboard.
///
/// The backend emits the list already ordered by descending `total_score`,
/// with `disable_rank` entries interleaved in their natural score position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub nickname: String,
    #[serde(default)]
    pub avatar_url: String,
    pub total_score: i64,
    #[serde(default)]
    pub problem_scores: HashMap<String, i64>,
    /// Excludes the entry from rank counting and display while keeping it in
    /// the list at its score position
    #[serde(default)]
    pub disable_rank: bool,
}

/// One scoring event for one user.
///
/// Per user, `time` values are weakly increasing and `score` is
/// non-decreasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreHistoryPoint {
    pub time: DateTime<Utc>,
    pub score: i64,
    #[serde(default)]
    pub problem_id: Option<String>,
}

/// Sparse per-user score history for trend reconstruction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendEntry {
    pub user_id: String,
    pub username: String,
    pub nickname: String,
    #[serde(default)]
    pub history: Vec<ScoreHistoryPoint>,
}
