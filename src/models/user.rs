//! User model

use serde::{Deserialize, Serialize};

/// Public user identity as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub nickname: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub avatar_url: String,
}
