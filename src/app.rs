//! App — routes decoded events to the conversation engine and the
//! lifecycle controller.
//!
//! Events for one conversant are processed strictly in arrival order by a
//! dedicated worker task; different conversants interleave freely. No
//! handler error is allowed to take the event loop down.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;

use crate::error::LifecycleError;
use crate::flow::{ConversationEngine, FlowReply};
use crate::lifecycle::LifecycleController;
use crate::notify::Notifier;
use crate::telegram::{
    keyboards, Action, Conversant, Event, EventKind, EventStream, MessageRef, Outbound,
    StatusFilter,
};
use crate::texts;

pub struct App {
    engine: ConversationEngine,
    controller: Arc<LifecycleController>,
    notifier: Arc<Notifier>,
    outbound: Arc<dyn Outbound>,
}

impl App {
    pub fn new(
        engine: ConversationEngine,
        controller: Arc<LifecycleController>,
        notifier: Arc<Notifier>,
        outbound: Arc<dyn Outbound>,
    ) -> Self {
        Self {
            engine,
            controller,
            notifier,
            outbound,
        }
    }

    /// Consume the inbound stream until it ends. Each conversant gets a
    /// worker task with an ordered queue.
    pub async fn run(self: Arc<Self>, mut events: EventStream) {
        let mut workers: HashMap<i64, mpsc::UnboundedSender<Event>> = HashMap::new();

        while let Some(event) = events.next().await {
            let chat_id = event.from.chat_id;
            let tx = workers
                .entry(chat_id)
                .or_insert_with(|| self.clone().spawn_worker(chat_id));

            if let Err(mpsc::error::SendError(event)) = tx.send(event) {
                // Worker ended; start a fresh one and retry once
                let tx = self.clone().spawn_worker(chat_id);
                if tx.send(event).is_err() {
                    tracing::error!(chat_id, "Conversant worker refused a fresh event");
                }
                workers.insert(chat_id, tx);
            }
        }
        tracing::info!("Inbound event stream ended");
    }

    fn spawn_worker(self: Arc<Self>, chat_id: i64) -> mpsc::UnboundedSender<Event> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                self.handle_event(event).await;
            }
            tracing::debug!(chat_id, "Conversant worker stopped");
        });
        tx
    }

    /// Handle one decoded event. Never returns an error: everything a
    /// handler can fail on is reported to the conversant or logged.
    pub async fn handle_event(&self, event: Event) {
        let who = event.from;
        match event.kind {
            EventKind::Text(text) => self.handle_text(&who, &text).await,
            EventKind::Action {
                token,
                source,
                callback_id,
            } => self.handle_action(&who, &token, source, &callback_id).await,
        }
    }

    fn is_operator(&self, chat_id: i64) -> bool {
        self.controller.policy().is_operator(chat_id)
    }

    /// Fire-and-forget send used for conversational replies.
    async fn send(&self, chat_id: i64, text: &str, keyboard: Option<serde_json::Value>) {
        if let Err(e) = self.outbound.send(chat_id, text, keyboard).await {
            tracing::warn!(chat_id, error = %e, "Reply delivery failed");
        }
    }

    async fn clear_buttons(&self, source: MessageRef) {
        if let Err(e) = self.outbound.clear_buttons(source).await {
            tracing::debug!(chat_id = source.chat_id, error = %e, "Button retraction failed");
        }
    }

    fn lifecycle_notice(err: &LifecycleError) -> &'static str {
        match err {
            LifecycleError::AccessDenied => texts::ACCESS_DENIED,
            LifecycleError::RequestNotFound(_) => texts::REQUEST_NOT_FOUND,
            LifecycleError::NothingToRepeat => texts::NOTHING_TO_REPEAT,
            LifecycleError::Database(_) => texts::INTERNAL_ERROR,
        }
    }

    // ── Text input ──────────────────────────────────────────────────

    async fn handle_text(&self, who: &Conversant, text: &str) {
        if text.trim() == "/start" {
            // An in-flight questionnaire survives a stray /start
            if let Err(e) = self.controller.register(who).await {
                tracing::warn!(chat_id = who.chat_id, error = %e, "Profile refresh failed");
            }
            self.send(
                who.chat_id,
                texts::GREETING,
                Some(keyboards::main_menu(self.is_operator(who.chat_id))),
            )
            .await;
            return;
        }

        match self.engine.handle_text(who.chat_id, text).await {
            FlowReply::Prompt(prompt) => self.send(who.chat_id, &prompt, None).await,
            FlowReply::Summary(fields) => {
                self.send(
                    who.chat_id,
                    &texts::intake_summary(&fields),
                    Some(keyboards::intake_confirm()),
                )
                .await;
            }
            FlowReply::ApproveCommitted {
                request_id,
                comment,
                source,
            } => {
                self.clear_buttons(source).await;
                match self
                    .controller
                    .approve(who.chat_id, request_id, &comment)
                    .await
                {
                    Ok(_) => {
                        self.send(
                            who.chat_id,
                            &texts::approved_operator_notice(request_id),
                            None,
                        )
                        .await;
                    }
                    Err(e) => {
                        tracing::warn!(request_id, error = %e, "Approve failed");
                        self.send(who.chat_id, Self::lifecycle_notice(&e), None).await;
                    }
                }
            }
            FlowReply::RejectCommitted {
                request_id,
                reason,
                source,
            } => {
                self.clear_buttons(source).await;
                match self
                    .controller
                    .reject(who.chat_id, request_id, &reason)
                    .await
                {
                    Ok(_) => {
                        self.send(
                            who.chat_id,
                            &texts::rejected_operator_notice(request_id),
                            None,
                        )
                        .await;
                    }
                    Err(e) => {
                        tracing::warn!(request_id, error = %e, "Reject failed");
                        self.send(who.chat_id, Self::lifecycle_notice(&e), None).await;
                    }
                }
            }
            FlowReply::Idle => self.handle_idle_text(who, text).await,
        }
    }

    /// Free text outside any flow: menu buttons, or forwarding to the
    /// operators.
    async fn handle_idle_text(&self, who: &Conversant, text: &str) {
        match text.trim() {
            texts::BTN_FIND_TOUR => {
                let prompt = self.engine.start_intake(who.chat_id).await;
                self.send(who.chat_id, &prompt, None).await;
            }
            texts::BTN_MY_REQUESTS => self.show_my_requests(who).await,
            texts::BTN_ABOUT => self.send(who.chat_id, texts::ABOUT, None).await,
            texts::BTN_CONTACT => self.send(who.chat_id, texts::CONTACT_OPERATOR, None).await,
            texts::BTN_FAQ => self.send(who.chat_id, texts::FAQ, None).await,
            texts::BTN_REPEAT => self.show_repeat_preview(who).await,
            texts::BTN_OPERATOR_PANEL => {
                if self.is_operator(who.chat_id) {
                    self.send(
                        who.chat_id,
                        texts::OPERATOR_PANEL,
                        Some(keyboards::operator_panel()),
                    )
                    .await;
                } else {
                    self.send(who.chat_id, texts::ACCESS_DENIED, None).await;
                }
            }
            other => self.forward_to_operators(who, other).await,
        }
    }

    async fn show_my_requests(&self, who: &Conversant) {
        match self.controller.requests_for(who.chat_id).await {
            Ok(None) => self.send(who.chat_id, texts::PROFILE_NOT_FOUND, None).await,
            Ok(Some(requests)) if requests.is_empty() => {
                self.send(who.chat_id, texts::NO_REQUESTS_YET, None).await;
            }
            Ok(Some(requests)) => {
                let mut text = String::from("📋 <b>Your requests:</b>\n\n");
                for request in &requests {
                    text.push_str(&texts::my_request_line(request));
                }
                self.send(who.chat_id, &text, None).await;
            }
            Err(e) => {
                tracing::warn!(chat_id = who.chat_id, error = %e, "Listing own requests failed");
                self.send(who.chat_id, Self::lifecycle_notice(&e), None).await;
            }
        }
    }

    async fn show_repeat_preview(&self, who: &Conversant) {
        match self.controller.latest_request(who.chat_id).await {
            Ok(request) => {
                self.send(
                    who.chat_id,
                    &texts::repeat_preview(&request),
                    Some(keyboards::repeat_confirm(request.id)),
                )
                .await;
            }
            Err(e @ LifecycleError::NothingToRepeat) => {
                self.send(who.chat_id, Self::lifecycle_notice(&e), None).await;
            }
            Err(e) => {
                tracing::warn!(chat_id = who.chat_id, error = %e, "Repeat preview failed");
                self.send(who.chat_id, Self::lifecycle_notice(&e), None).await;
            }
        }
    }

    async fn forward_to_operators(&self, who: &Conversant, text: &str) {
        let delivered = self
            .notifier
            .notify_operators(
                self.controller.policy().operators(),
                &texts::forwarded_message(who, text),
                None,
            )
            .await;
        if delivered > 0 {
            self.send(who.chat_id, texts::FORWARDED_TO_OPERATORS, None).await;
        } else {
            tracing::warn!(chat_id = who.chat_id, "Forwarded message reached no operator");
        }
    }

    // ── Action tokens ───────────────────────────────────────────────

    async fn handle_action(
        &self,
        who: &Conversant,
        token: &str,
        source: MessageRef,
        callback_id: &str,
    ) {
        let action = match Action::parse(token) {
            Ok(action) => action,
            Err(e) => {
                tracing::warn!(chat_id = who.chat_id, token, error = %e, "Malformed action token");
                self.answer(callback_id, None).await;
                return;
            }
        };

        if action.operator_only() && !self.is_operator(who.chat_id) {
            tracing::warn!(chat_id = who.chat_id, token, "Operator action from a non-operator");
            self.answer(callback_id, Some(texts::ACCESS_DENIED)).await;
            return;
        }

        self.answer(callback_id, None).await;

        match action {
            Action::ListRequests(filter) => self.list_requests(who, filter).await,
            Action::Open(request_id) => self.open_request(who, request_id).await,
            Action::Approve(request_id) => {
                self.engine.begin_approve(who.chat_id, request_id, source).await;
                self.send(who.chat_id, &texts::approve_comment_prompt(request_id), None)
                    .await;
            }
            Action::Reject(request_id) => {
                self.engine.begin_reject(who.chat_id, request_id, source).await;
                self.send(who.chat_id, &texts::reject_comment_prompt(request_id), None)
                    .await;
            }
            Action::SubmitIntake => self.submit_intake(who, source).await,
            Action::RestartIntake => {
                self.clear_buttons(source).await;
                let prompt = self.engine.start_intake(who.chat_id).await;
                self.send(
                    who.chat_id,
                    &format!("{}\n\n{}", texts::RESTARTING, prompt),
                    None,
                )
                .await;
            }
            Action::NewRequest => {
                let prompt = self.engine.start_intake(who.chat_id).await;
                self.send(who.chat_id, &prompt, None).await;
            }
            Action::ContactOperator => {
                self.send(who.chat_id, texts::CONTACT_OPERATOR, None).await;
            }
            Action::RepeatRequest(request_id) => self.repeat_request(who, request_id, source).await,
            Action::CancelRepeat => {
                self.clear_buttons(source).await;
                self.send(who.chat_id, texts::REPEAT_CANCELLED, None).await;
            }
        }
    }

    async fn answer(&self, callback_id: &str, text: Option<&str>) {
        if let Err(e) = self.outbound.answer_callback(callback_id, text).await {
            tracing::debug!(error = %e, "Callback acknowledgement failed");
        }
    }

    async fn list_requests(&self, who: &Conversant, filter: StatusFilter) {
        match self.controller.requests_by_filter(who.chat_id, filter).await {
            Ok(requests) => {
                let title = texts::listing_title(filter.title(), requests.is_empty());
                self.send(who.chat_id, &title, None).await;
                for request in &requests {
                    self.send(
                        who.chat_id,
                        &texts::request_list_item(request),
                        Some(keyboards::request_item(request.id)),
                    )
                    .await;
                }
            }
            Err(e) => {
                tracing::warn!(chat_id = who.chat_id, error = %e, "Listing failed");
                self.send(who.chat_id, Self::lifecycle_notice(&e), None).await;
            }
        }
    }

    async fn open_request(&self, who: &Conversant, request_id: i64) {
        match self.controller.open(who.chat_id, request_id).await {
            Ok(request) => {
                // Terminal requests are view-only
                let keyboard = if request.status.is_terminal() {
                    None
                } else {
                    Some(keyboards::request_manage(request.id))
                };
                self.send(who.chat_id, &texts::request_full(&request), keyboard)
                    .await;
            }
            Err(e) => {
                tracing::warn!(request_id, error = %e, "Open failed");
                self.send(who.chat_id, Self::lifecycle_notice(&e), None).await;
            }
        }
    }

    async fn submit_intake(&self, who: &Conversant, source: MessageRef) {
        self.clear_buttons(source).await;

        let Some(fields) = self.engine.take_submission(who.chat_id).await else {
            // Second press after the session was consumed
            self.send(who.chat_id, texts::NOTHING_TO_SUBMIT, None).await;
            return;
        };

        match self.controller.submit(who, &fields).await {
            Ok(request_id) => {
                self.send(
                    who.chat_id,
                    &texts::submitted_notice(request_id),
                    Some(keyboards::main_menu(self.is_operator(who.chat_id))),
                )
                .await;
            }
            Err(e) => {
                tracing::error!(chat_id = who.chat_id, error = %e, "Submit failed");
                self.send(who.chat_id, Self::lifecycle_notice(&e), None).await;
            }
        }
    }

    async fn repeat_request(&self, who: &Conversant, request_id: i64, source: MessageRef) {
        self.clear_buttons(source).await;

        match self.controller.repeat(who, request_id).await {
            Ok((new_id, source_request)) => {
                self.send(
                    who.chat_id,
                    &texts::repeated_notice(new_id, source_request.id),
                    None,
                )
                .await;
            }
            Err(e) => {
                tracing::warn!(request_id, error = %e, "Repeat failed");
                self.send(who.chat_id, Self::lifecycle_notice(&e), None).await;
            }
        }
    }
}
