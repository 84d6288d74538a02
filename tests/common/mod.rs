//! Shared harness: an app wired to the in-memory store and a recording
//! outbound fake.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tourdesk::app::App;
use tourdesk::auth::OperatorPolicy;
use tourdesk::error::ChannelError;
use tourdesk::flow::{ConversationEngine, InMemorySessions};
use tourdesk::lifecycle::LifecycleController;
use tourdesk::notify::Notifier;
use tourdesk::store::LibSqlStore;
use tourdesk::telegram::{Conversant, Event, EventKind, MessageRef, Outbound};

pub const OPERATOR: i64 = 900;
pub const SECOND_OPERATOR: i64 = 901;
pub const CUSTOMER: i64 = 42;

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<serde_json::Value>,
}

#[derive(Default)]
pub struct RecordingOutbound {
    pub sent: Mutex<Vec<SentMessage>>,
    pub cleared: Mutex<Vec<MessageRef>>,
    pub answered: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingOutbound {
    /// All message texts delivered to one chat, in order.
    pub async fn texts_for(&self, chat_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .map(|m| m.text.clone())
            .collect()
    }

    /// The last message delivered to one chat.
    pub async fn last_for(&self, chat_id: i64) -> SentMessage {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.chat_id == chat_id)
            .cloned()
            .expect("no message delivered to that chat")
    }

    /// Callback tokens present on the last keyboard sent to one chat.
    pub async fn last_tokens_for(&self, chat_id: i64) -> Vec<String> {
        let message = self.last_for(chat_id).await;
        let keyboard = message.keyboard.expect("last message had no keyboard");
        keyboard["inline_keyboard"]
            .as_array()
            .expect("not an inline keyboard")
            .iter()
            .flat_map(|row| row.as_array().unwrap().clone())
            .map(|b| b["callback_data"].as_str().unwrap().to_string())
            .collect()
    }
}

#[async_trait]
impl Outbound for RecordingOutbound {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<serde_json::Value>,
    ) -> Result<(), ChannelError> {
        self.sent.lock().await.push(SentMessage {
            chat_id,
            text: text.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn clear_buttons(&self, message: MessageRef) -> Result<(), ChannelError> {
        self.cleared.lock().await.push(message);
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), ChannelError> {
        self.answered
            .lock()
            .await
            .push((callback_id.to_string(), text.map(String::from)));
        Ok(())
    }
}

/// An app against a fresh in-memory store, with two operators on the
/// allow-list.
pub async fn test_app() -> (App, Arc<RecordingOutbound>) {
    let store = Arc::new(LibSqlStore::new_memory().await.unwrap());
    let outbound = Arc::new(RecordingOutbound::default());
    let notifier = Arc::new(Notifier::new(outbound.clone()));
    let policy = OperatorPolicy::new(vec![OPERATOR, SECOND_OPERATOR]);
    let controller = Arc::new(LifecycleController::new(store, notifier.clone(), policy, 20));
    let engine = ConversationEngine::new(Arc::new(InMemorySessions::new()));
    let app = App::new(engine, controller, notifier, outbound.clone());
    (app, outbound)
}

pub fn conversant(chat_id: i64) -> Conversant {
    Conversant {
        chat_id,
        username: Some(format!("user{chat_id}")),
        first_name: Some("Sam".to_string()),
    }
}

pub fn text_event(chat_id: i64, text: &str) -> Event {
    Event {
        from: conversant(chat_id),
        kind: EventKind::Text(text.to_string()),
    }
}

pub fn action_event(chat_id: i64, token: &str) -> Event {
    Event {
        from: conversant(chat_id),
        kind: EventKind::Action {
            token: token.to_string(),
            source: MessageRef {
                chat_id,
                message_id: 1000,
            },
            callback_id: format!("cb-{chat_id}-{token}"),
        },
    }
}

/// Drive a customer from `/start` through the full questionnaire up to the
/// confirm summary.
pub async fn fill_questionnaire(app: &App, chat_id: i64) {
    app.handle_event(text_event(chat_id, "/start")).await;
    app.handle_event(text_event(chat_id, "🏖 Find a tour")).await;
    for answer in ["Lisbon", "July", "2", "0", "2000 USD", "none", "@sam"] {
        app.handle_event(text_event(chat_id, answer)).await;
    }
}
