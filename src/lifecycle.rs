//! Request lifecycle controller — validates operator access, applies status
//! transitions, and triggers the notifications each transition owes.

use std::sync::Arc;

use crate::auth::OperatorPolicy;
use crate::error::LifecycleError;
use crate::notify::Notifier;
use crate::store::{IntakeFields, Request, RequestStatus, RequestStore, User};
use crate::telegram::{keyboards, Conversant, StatusFilter};
use crate::texts;

/// Normalized approve comment: `-` and empty both mean "no comment".
fn normalize_approve_comment(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed == "-" { "" } else { trimmed }
}

/// Normalized reject reason: an empty input falls back to the fixed default.
fn normalize_reject_reason(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        texts::DEFAULT_REJECT_REASON
    } else {
        trimmed
    }
}

pub struct LifecycleController {
    store: Arc<dyn RequestStore>,
    notifier: Arc<Notifier>,
    policy: OperatorPolicy,
    list_limit: usize,
}

impl LifecycleController {
    pub fn new(
        store: Arc<dyn RequestStore>,
        notifier: Arc<Notifier>,
        policy: OperatorPolicy,
        list_limit: usize,
    ) -> Self {
        Self {
            store,
            notifier,
            policy,
            list_limit,
        }
    }

    pub fn policy(&self) -> &OperatorPolicy {
        &self.policy
    }

    fn require_operator(&self, chat_id: i64) -> Result<(), LifecycleError> {
        if self.policy.is_operator(chat_id) {
            Ok(())
        } else {
            tracing::warn!(chat_id, "Operator command from a non-operator");
            Err(LifecycleError::AccessDenied)
        }
    }

    async fn owner(&self, who: &Conversant) -> Result<User, LifecycleError> {
        self.store
            .upsert_user(who.chat_id, who.username.as_deref(), who.first_name.as_deref())
            .await?;
        let user = self.store.user_by_chat_id(who.chat_id).await?;
        user.ok_or_else(|| {
            crate::error::DatabaseError::NotFound {
                entity: "user".into(),
                id: who.chat_id.to_string(),
            }
            .into()
        })
    }

    /// Record first or repeat contact: insert-or-refresh the conversant's
    /// profile row.
    pub async fn register(&self, who: &Conversant) -> Result<(), LifecycleError> {
        self.owner(who).await?;
        Ok(())
    }

    /// Submit a completed questionnaire: create the request at `new` and
    /// fan the summary out to the operators.
    pub async fn submit(
        &self,
        who: &Conversant,
        fields: &IntakeFields,
    ) -> Result<i64, LifecycleError> {
        let user = self.owner(who).await?;
        let request_id = self.store.create_request(&user, fields).await?;
        tracing::info!(request_id, chat_id = who.chat_id, "Request submitted");

        self.notifier
            .notify_operators(
                self.policy.operators(),
                &texts::new_request_notice(request_id, who, fields),
                Some(keyboards::request_item(request_id)),
            )
            .await;
        Ok(request_id)
    }

    /// Open a request for review. A `new` request silently moves to
    /// `in_review` first; any other status is left as is, so re-opening is
    /// harmless.
    pub async fn open(&self, operator_id: i64, request_id: i64) -> Result<Request, LifecycleError> {
        self.require_operator(operator_id)?;

        let request = self
            .store
            .request(request_id)
            .await?
            .ok_or(LifecycleError::RequestNotFound(request_id))?;

        if request.status != RequestStatus::New {
            return Ok(request);
        }

        self.store
            .set_status(
                request_id,
                RequestStatus::InReview,
                operator_id,
                request.operator_comment.as_deref().unwrap_or(""),
            )
            .await?;
        tracing::info!(request_id, operator_id, "Request taken into review");

        self.store
            .request(request_id)
            .await?
            .ok_or(LifecycleError::RequestNotFound(request_id))
    }

    /// Mark a request approved and notify its owner.
    pub async fn approve(
        &self,
        operator_id: i64,
        request_id: i64,
        raw_comment: &str,
    ) -> Result<Request, LifecycleError> {
        self.require_operator(operator_id)?;
        let comment = normalize_approve_comment(raw_comment);

        self.store
            .set_status(request_id, RequestStatus::Approved, operator_id, comment)
            .await
            .map_err(|e| match e {
                crate::error::DatabaseError::NotFound { .. } => {
                    LifecycleError::RequestNotFound(request_id)
                }
                other => other.into(),
            })?;

        let request = self
            .store
            .request(request_id)
            .await?
            .ok_or(LifecycleError::RequestNotFound(request_id))?;
        tracing::info!(request_id, operator_id, "Request approved");

        self.notifier
            .notify_user(
                request.chat_id,
                &texts::approved_owner_notice(&request, comment),
                Some(keyboards::after_status()),
            )
            .await;
        Ok(request)
    }

    /// Mark a request rejected and notify its owner with the reason.
    pub async fn reject(
        &self,
        operator_id: i64,
        request_id: i64,
        raw_reason: &str,
    ) -> Result<Request, LifecycleError> {
        self.require_operator(operator_id)?;
        let reason = normalize_reject_reason(raw_reason);

        self.store
            .set_status(request_id, RequestStatus::Rejected, operator_id, reason)
            .await
            .map_err(|e| match e {
                crate::error::DatabaseError::NotFound { .. } => {
                    LifecycleError::RequestNotFound(request_id)
                }
                other => other.into(),
            })?;

        let request = self
            .store
            .request(request_id)
            .await?
            .ok_or(LifecycleError::RequestNotFound(request_id))?;
        tracing::info!(request_id, operator_id, "Request rejected");

        self.notifier
            .notify_user(
                request.chat_id,
                &texts::rejected_owner_notice(request_id, reason),
                Some(keyboards::after_status()),
            )
            .await;
        Ok(request)
    }

    /// The conversant's most recent request, for the repeat preview.
    pub async fn latest_request(&self, chat_id: i64) -> Result<Request, LifecycleError> {
        let user = self
            .store
            .user_by_chat_id(chat_id)
            .await?
            .ok_or(LifecycleError::NothingToRepeat)?;
        self.store
            .requests_for_user(user.id, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(LifecycleError::NothingToRepeat)
    }

    /// Clone an earlier request into a fresh one. The copy carries all seven
    /// content fields unchanged and starts at `new` whatever the source
    /// status was. Only the owner may repeat their own request.
    pub async fn repeat(
        &self,
        who: &Conversant,
        source_id: i64,
    ) -> Result<(i64, Request), LifecycleError> {
        let source = self
            .store
            .request(source_id)
            .await?
            .ok_or(LifecycleError::RequestNotFound(source_id))?;
        if source.chat_id != who.chat_id {
            tracing::warn!(
                chat_id = who.chat_id,
                source_id,
                "Repeat attempted on another conversant's request"
            );
            return Err(LifecycleError::RequestNotFound(source_id));
        }

        let user = self.owner(who).await?;
        let new_id = self.store.create_request(&user, &source.fields).await?;
        tracing::info!(new_id, source_id, chat_id = who.chat_id, "Request repeated");

        self.notifier
            .notify_operators(
                self.policy.operators(),
                &texts::repeated_request_notice(new_id, &source),
                Some(keyboards::request_item(new_id)),
            )
            .await;
        Ok((new_id, source))
    }

    /// The conversant's own requests for the "my requests" listing.
    /// `None` means the conversant has no profile yet.
    pub async fn requests_for(&self, chat_id: i64) -> Result<Option<Vec<Request>>, LifecycleError> {
        let Some(user) = self.store.user_by_chat_id(chat_id).await? else {
            return Ok(None);
        };
        Ok(Some(
            self.store
                .requests_for_user(user.id, self.list_limit)
                .await?,
        ))
    }

    /// Operator listing for one status filter.
    pub async fn requests_by_filter(
        &self,
        operator_id: i64,
        filter: StatusFilter,
    ) -> Result<Vec<Request>, LifecycleError> {
        self.require_operator(operator_id)?;
        Ok(self
            .store
            .requests_by_status(filter.statuses(), self.list_limit)
            .await?)
    }
}
