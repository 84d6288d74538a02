//! Persisted entities — users and tour requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review status of a tour request.
///
/// Normal progression: `New` → `InReview` (automatic on first operator
/// open) → `Approved` or `Rejected`. The two terminal statuses are sinks;
/// no transition out of them is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    New,
    InReview,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::New,
        RequestStatus::InReview,
        RequestStatus::Approved,
        RequestStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a status string from the DB. Unknown strings map to `New`
    /// rather than failing a whole row read.
    pub fn parse(s: &str) -> Self {
        match s {
            "in_review" => Self::InReview,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::New,
        }
    }

    /// Whether the status is a sink state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Human-readable label for rendering.
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "🆕 New",
            Self::InReview => "⏳ In review",
            Self::Approved => "✅ Approved",
            Self::Rejected => "❌ Rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered conversant. Created on first contact, refreshed on every
/// contact, never deleted.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    /// Telegram chat id — the external conversant identity.
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// The seven content fields of a completed intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeFields {
    pub destination: String,
    pub dates: String,
    pub adults: i64,
    pub children: i64,
    pub budget: String,
    pub wishes: String,
    pub contact: String,
}

/// A tour request moving through the review lifecycle.
///
/// `chat_id` and `username` are a write-time snapshot of the owner — kept
/// consistent at creation only, no cascading update. `first_name` is joined
/// from the owning user at read time.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: i64,
    pub user_id: i64,
    pub chat_id: i64,
    pub username: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fields: IntakeFields,
    pub operator_comment: Option<String>,
    pub operator_id: Option<i64>,
    pub first_name: Option<String>,
}
