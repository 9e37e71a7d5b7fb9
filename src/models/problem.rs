//! Problem model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One named, ordered stage of a problem's judging pipeline.
///
/// `show` controls whether entrants may view this step's log at all. It is a
/// property of the problem's workflow, independent of which containers were
/// actually instantiated for a given submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    pub show: bool,
}

/// Upload limits for a problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLimits {
    pub max_num: u32,
    pub max_size: u64,
}

/// Submission attempt accounting for the current user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempts {
    pub limit: Option<u32>,
    pub used: u32,
    pub remaining: Option<u32>,
}

/// Problem as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub name: String,
    pub starttime: DateTime<Utc>,
    pub endtime: DateTime<Utc>,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub memory: u64,
    pub upload: Option<UploadLimits>,
    #[serde(default)]
    pub workflow: Vec<WorkflowStep>,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_deserialize_minimal() {
        // Backend omits optional fields for problems without uploads
        let json = r#"{
            "id": "p1",
            "name": "A + B",
            "starttime": "2026-03-01T12:00:00Z",
            "endtime": "2026-03-01T17:00:00Z",
            "workflow": [
                {"name": "build", "show": true},
                {"name": "judge", "show": false}
            ]
        }"#;

        let problem: Problem = serde_json::from_str(json).unwrap();
        assert_eq!(problem.workflow.len(), 2);
        assert!(problem.workflow[0].show);
        assert!(!problem.workflow[1].show);
        assert!(problem.upload.is_none());
    }
}
