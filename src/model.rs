use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Junior,
    Senior,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Junior => write!(f, "junior"),
            Role::Senior => write!(f, "senior"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    // unique
    pub email: String,
    /// Argon2id PHC string, never the plaintext password.
    pub password_hash: String,
    pub role: Role,
    /// Singleton for juniors once they select; free set for seniors.
    #[serde(default)]
    pub interests: Vec<String>,
    /// Senior emails; juniors only, at most one entry.
    #[serde(default)]
    pub assigned_mentors: Vec<String>,
    /// Junior emails; seniors only.
    #[serde(default)]
    pub assigned_juniors: Vec<String>,
}

/// Append-only chat record, keyed by the derived room id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub room: String,
    pub sender: String,
    pub text: String,
    /// Unix seconds.
    pub timestamp: i64,
}

impl Message {
    pub fn new(room: String, sender: String, text: String) -> Message {
        Message {
            id: Uuid::now_v7(),
            room,
            sender,
            text,
            timestamp: OffsetDateTime::now_utc().unix_timestamp(),
        }
    }
}

/// Written once per submission, never read back by the app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub junior_email: String,
    pub senior_email: String,
    pub rating: u8,
    pub comments: String,
    pub submitted_at: i64,
}
