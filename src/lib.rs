//! Arena Client - Contest Judge Client Library
//!
//! This library provides the client-side core for an online judge platform:
//! everything a frontend needs to follow a submission through the judge and
//! render a contest, without any rendering of its own.
//!
//! # Features
//!
//! - Authenticated REST access to contests, problems, submissions and logs
//! - Live per-container log streaming with fixed-interval reconnect
//! - Submission step tracking (hidden / live / static / unavailable steps)
//! - Status and queue-position polling that stops on terminal states
//! - Pure leaderboard ranking and score-trend reconstruction
//!
//! # Architecture
//!
//! The library follows a layered architecture:
//! - **Api**: REST client, auth context and the gateway trait seam
//! - **Telemetry**: streaming log transport and its connector seam
//! - **Poller / Tracker**: stateful drivers built on the two layers above
//! - **Ranking / Trend**: pure functions over leaderboard data
//! - **Models**: wire-format domain models

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod poller;
pub mod ranking;
pub mod telemetry;
pub mod tracker;
pub mod trend;

// Re-export commonly used types
pub use api::{ApiClient, AuthContext};
pub use config::Config;
pub use error::{ClientError, ClientResult};
