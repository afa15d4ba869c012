// Typed records shared between the controller, the match engine and the store
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Caregiver,
    Careseeker,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Caregiver => write!(f, "CAREGIVER"),
            UserRole::Careseeker => write!(f, "CARESEEKER"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CAREGIVER" => Ok(UserRole::Caregiver),
            "CARESEEKER" => Ok(UserRole::Careseeker),
            other => Err(anyhow::anyhow!("unknown role: {}", other)),
        }
    }
}

/// A user's public matching record. `id` equals the owning account id;
/// there is exactly one profile per account and saves overwrite it whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub photo: String,
    pub location: String,
    pub bio: String,
    pub tags: Vec<String>,
    pub rating: f64,
}

/// A directional like/pass decision. One row per ordered (from, to) pair,
/// last write wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Swipe {
    pub from_user_id: String,
    pub to_user_id: String,
    pub liked: bool,
    pub timestamp: DateTime<Utc>,
}

/// A mutual-like result. `users` is stored canonically sorted so a pair can
/// never be matched twice under reversed ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub id: String,
    pub users: [String; 2],
    pub timestamp: DateTime<Utc>,
    pub last_message: String,
    pub last_message_timestamp: Option<DateTime<Utc>>,
}

impl Match {
    /// Sorts a pair of profile ids into canonical order.
    pub fn canonical_pair(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    /// The participant that is not `me`, if `me` belongs to this match.
    pub fn other_user(&self, me: &str) -> Option<&str> {
        if self.users[0] == me {
            Some(self.users[1].as_str())
        } else if self.users[1] == me {
            Some(self.users[0].as_str())
        } else {
            None
        }
    }
}

/// Sender id used for the local participant in a chat session.
pub const LOCAL_SENDER: &str = "me";

/// A chat message. Client-local only, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// An open conversation with a matched profile. Message history lives only
/// for the lifetime of the view; a session is always seeded empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub participant: Profile,
    pub messages: Vec<ChatMessage>,
}
