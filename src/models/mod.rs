//! Domain models and DTOs
//!
//! Wire types mirror the JSON bodies produced by the Arena backend. All
//! identifiers are opaque server-issued strings.

pub mod contest;
pub mod leaderboard;
pub mod problem;
pub mod submission;
pub mod user;

pub use contest::Contest;
pub use leaderboard::{LeaderboardEntry, ScoreHistoryPoint, TrendEntry};
pub use problem::{Attempts, Problem, UploadLimits, WorkflowStep};
pub use submission::{Container, QueuePosition, Status, Submission};
pub use user::User;
