//! ConversationEngine — advances a conversant's session on each text input.
//!
//! The engine owns no side effects: it reads and writes sessions and tells
//! the caller what to send or which lifecycle operation to run.

use std::sync::Arc;

use crate::telegram::MessageRef;
use crate::texts;

use super::session::SessionStore;
use super::state::{FlowState, IntakeStep, Session};

/// What the caller should do after the engine consumed a text input.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowReply {
    /// No active session — the input belongs to the idle-text handler.
    Idle,
    /// Send this text and wait for the next input.
    Prompt(String),
    /// Intake reached the confirm step — render the summary with the
    /// submit/restart buttons.
    Summary(crate::store::IntakeFields),
    /// An approve comment was entered; the session is already cleared.
    ApproveCommitted {
        request_id: i64,
        comment: String,
        source: MessageRef,
    },
    /// A reject reason was entered; the session is already cleared.
    RejectCommitted {
        request_id: i64,
        reason: String,
        source: MessageRef,
    },
}

pub struct ConversationEngine {
    sessions: Arc<dyn SessionStore>,
}

impl ConversationEngine {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// Whether the conversant has no active session.
    pub async fn is_idle(&self, chat_id: i64) -> bool {
        self.sessions.get(chat_id).await.is_none()
    }

    /// Begin (or restart) the intake questionnaire. Any prior session is
    /// replaced.
    pub async fn start_intake(&self, chat_id: i64) -> String {
        let session = Session::intake();
        self.sessions.put(chat_id, session).await;
        IntakeStep::Destination.prompt().to_string()
    }

    /// Pin an approve-comment flow onto the operator's session.
    pub async fn begin_approve(&self, chat_id: i64, request_id: i64, source: MessageRef) {
        let session = Session {
            state: FlowState::ApproveComment { request_id, source },
            draft: Default::default(),
        };
        self.sessions.put(chat_id, session).await;
    }

    /// Pin a reject-reason flow onto the operator's session.
    pub async fn begin_reject(&self, chat_id: i64, request_id: i64, source: MessageRef) {
        let session = Session {
            state: FlowState::RejectComment { request_id, source },
            draft: Default::default(),
        };
        self.sessions.put(chat_id, session).await;
    }

    /// Drop the conversant's session, whatever flow it is in.
    pub async fn clear(&self, chat_id: i64) {
        self.sessions.clear(chat_id).await;
    }

    /// Feed one text input into the active session.
    pub async fn handle_text(&self, chat_id: i64, text: &str) -> FlowReply {
        let Some(mut session) = self.sessions.get(chat_id).await else {
            return FlowReply::Idle;
        };

        match session.state {
            FlowState::Intake(IntakeStep::Confirm) => {
                // Text at the confirm step just re-renders the summary;
                // only the submit/restart buttons move on from here.
                match session.draft.complete() {
                    Some(fields) => FlowReply::Summary(fields),
                    None => {
                        // An incomplete draft cannot reach Confirm; recover
                        // by restarting.
                        FlowReply::Prompt(self.start_intake(chat_id).await)
                    }
                }
            }
            FlowState::Intake(step) => {
                if let Err(invalid) = session.draft.record(step, text) {
                    return FlowReply::Prompt(invalid.message().to_string());
                }
                let Some(next) = step.next() else {
                    return FlowReply::Idle;
                };
                session.state = FlowState::Intake(next);
                let reply = if next == IntakeStep::Confirm {
                    match session.draft.complete() {
                        Some(fields) => FlowReply::Summary(fields),
                        None => FlowReply::Prompt(texts::INVALID_EMPTY.to_string()),
                    }
                } else {
                    FlowReply::Prompt(next.prompt().to_string())
                };
                self.sessions.put(chat_id, session).await;
                reply
            }
            FlowState::ApproveComment { request_id, source } => {
                self.sessions.clear(chat_id).await;
                FlowReply::ApproveCommitted {
                    request_id,
                    comment: text.trim().to_string(),
                    source,
                }
            }
            FlowState::RejectComment { request_id, source } => {
                self.sessions.clear(chat_id).await;
                FlowReply::RejectCommitted {
                    request_id,
                    reason: text.trim().to_string(),
                    source,
                }
            }
        }
    }

    /// Take the completed answer set out of a confirm-stage session,
    /// clearing the session. Returns `None` if there is nothing to submit —
    /// a second submit press after the first one finds no session and
    /// creates no request.
    pub async fn take_submission(&self, chat_id: i64) -> Option<crate::store::IntakeFields> {
        let session = self.sessions.get(chat_id).await?;
        let FlowState::Intake(IntakeStep::Confirm) = session.state else {
            return None;
        };
        let fields = session.draft.complete()?;
        self.sessions.clear(chat_id).await;
        Some(fields)
    }
}
