//! Contest model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contest as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contest {
    pub id: String,
    pub name: String,
    pub starttime: DateTime<Utc>,
    pub endtime: DateTime<Utc>,
    #[serde(default)]
    pub problem_ids: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl Contest {
    /// Check whether the contest has ended at the given instant
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.endtime
    }

    /// Check whether the contest is running at the given instant
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        now >= self.starttime && now < self.endtime
    }
}
