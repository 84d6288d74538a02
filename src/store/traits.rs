//! `RequestStore` — single async interface for all persistence.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::store::model::{IntakeFields, Request, RequestStatus, User};

/// Backend-agnostic store for users and tour requests.
///
/// All mutations are immediately durable and atomic at the single-row
/// level. There is no cross-call compare-and-swap: concurrent status
/// updates on the same request race, and the last write wins.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Insert-or-refresh a user; `last_seen_at` is updated unconditionally.
    /// Returns the internal user id.
    async fn upsert_user(
        &self,
        chat_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> Result<i64, DatabaseError>;

    /// Look up a user by chat id.
    async fn user_by_chat_id(&self, chat_id: i64) -> Result<Option<User>, DatabaseError>;

    /// Create a request in status `new`, both timestamps set to now.
    /// Owner snapshot fields are copied from `user` at write time.
    async fn create_request(
        &self,
        user: &User,
        fields: &IntakeFields,
    ) -> Result<i64, DatabaseError>;

    /// Get a request by id, joined with the owner's first name.
    async fn request(&self, id: i64) -> Result<Option<Request>, DatabaseError>;

    /// A user's requests, most recent first, capped at `limit`.
    async fn requests_for_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<Request>, DatabaseError>;

    /// Requests in any of the given statuses, most recent first, capped at
    /// `limit`.
    async fn requests_by_status(
        &self,
        statuses: &[RequestStatus],
        limit: usize,
    ) -> Result<Vec<Request>, DatabaseError>;

    /// Set a request's status, overwriting the operator comment and acting
    /// operator unconditionally. Refreshes `updated_at`.
    async fn set_status(
        &self,
        id: i64,
        status: RequestStatus,
        operator_id: i64,
        comment: &str,
    ) -> Result<(), DatabaseError>;
}
