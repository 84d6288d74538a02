//! Action tokens — colon-delimited `category:action[:id]` callback data.
//!
//! Tokens are decoded at the router boundary into a tagged enum; malformed
//! tokens are rejected with a typed error instead of panicking mid-handler.

use std::fmt;

use crate::error::TokenError;
use crate::store::RequestStatus;

/// Status filter for operator request listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    New,
    InReview,
    Approved,
    Rejected,
    All,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::All => "all",
        }
    }

    /// The statuses this filter selects.
    pub fn statuses(&self) -> &'static [RequestStatus] {
        match self {
            Self::New => &[RequestStatus::New],
            Self::InReview => &[RequestStatus::InReview],
            Self::Approved => &[RequestStatus::Approved],
            Self::Rejected => &[RequestStatus::Rejected],
            Self::All => &RequestStatus::ALL,
        }
    }

    /// Listing title shown above the results.
    pub fn title(&self) -> &'static str {
        match self {
            Self::New => "🆕 <b>New requests</b>",
            Self::InReview => "⏳ <b>Requests in review</b>",
            Self::Approved => "✅ <b>Approved requests</b>",
            Self::Rejected => "❌ <b>Rejected requests</b>",
            Self::All => "📊 <b>All requests</b>",
        }
    }
}

/// A decoded callback action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `adm:list:<filter>` — list requests by status filter.
    ListRequests(StatusFilter),
    /// `adm:open:<id>` — open a specific request.
    Open(i64),
    /// `adm:approve:<id>` — start the approve-comment flow.
    Approve(i64),
    /// `adm:reject:<id>` — start the reject-comment flow.
    Reject(i64),
    /// `app:send` — submit the in-progress intake.
    SubmitIntake,
    /// `app:restart` — restart the in-progress intake.
    RestartIntake,
    /// `user:newapp` — start a new request.
    NewRequest,
    /// `user:contact` — contact an operator.
    ContactOperator,
    /// `rep:send:<id>` — repeat a specific prior request.
    RepeatRequest(i64),
    /// `rep:cancel` — cancel a repeat.
    CancelRepeat,
}

impl Action {
    pub fn parse(token: &str) -> Result<Self, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        let mut parts = token.splitn(3, ':');
        let category = parts.next().unwrap_or_default();
        let action = parts.next().unwrap_or_default();
        let id = parts.next();

        let parse_id = |token: &str| -> Result<i64, TokenError> {
            let raw = id.ok_or_else(|| TokenError::MissingId(token.to_string()))?;
            raw.parse::<i64>()
                .map_err(|_| TokenError::InvalidId(token.to_string()))
        };

        match category {
            "adm" => match action {
                "list" => {
                    let filter = match id {
                        Some("new") => StatusFilter::New,
                        Some("in_review") => StatusFilter::InReview,
                        Some("approved") => StatusFilter::Approved,
                        Some("rejected") => StatusFilter::Rejected,
                        Some("all") => StatusFilter::All,
                        _ => return Err(TokenError::InvalidId(token.to_string())),
                    };
                    Ok(Self::ListRequests(filter))
                }
                "open" => Ok(Self::Open(parse_id(token)?)),
                "approve" => Ok(Self::Approve(parse_id(token)?)),
                "reject" => Ok(Self::Reject(parse_id(token)?)),
                _ => Err(TokenError::UnknownAction {
                    category: category.to_string(),
                    action: action.to_string(),
                }),
            },
            "app" => match action {
                "send" => Ok(Self::SubmitIntake),
                "restart" => Ok(Self::RestartIntake),
                _ => Err(TokenError::UnknownAction {
                    category: category.to_string(),
                    action: action.to_string(),
                }),
            },
            "user" => match action {
                "newapp" => Ok(Self::NewRequest),
                "contact" => Ok(Self::ContactOperator),
                _ => Err(TokenError::UnknownAction {
                    category: category.to_string(),
                    action: action.to_string(),
                }),
            },
            "rep" => match action {
                "send" => Ok(Self::RepeatRequest(parse_id(token)?)),
                "cancel" => Ok(Self::CancelRepeat),
                _ => Err(TokenError::UnknownAction {
                    category: category.to_string(),
                    action: action.to_string(),
                }),
            },
            other => Err(TokenError::UnknownCategory(other.to_string())),
        }
    }

    /// Whether the action is gated on operator membership.
    pub fn operator_only(&self) -> bool {
        matches!(
            self,
            Self::ListRequests(_) | Self::Open(_) | Self::Approve(_) | Self::Reject(_)
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListRequests(filter) => write!(f, "adm:list:{}", filter.as_str()),
            Self::Open(id) => write!(f, "adm:open:{id}"),
            Self::Approve(id) => write!(f, "adm:approve:{id}"),
            Self::Reject(id) => write!(f, "adm:reject:{id}"),
            Self::SubmitIntake => write!(f, "app:send"),
            Self::RestartIntake => write!(f, "app:restart"),
            Self::NewRequest => write!(f, "user:newapp"),
            Self::ContactOperator => write!(f, "user:contact"),
            Self::RepeatRequest(id) => write!(f, "rep:send:{id}"),
            Self::CancelRepeat => write!(f, "rep:cancel"),
        }
    }
}
