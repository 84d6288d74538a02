//! Session storage — one active session per conversant, kept in memory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::state::Session;

/// Storage for active conversation sessions, keyed by chat id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat_id: i64) -> Option<Session>;
    async fn put(&self, chat_id: i64, session: Session);
    async fn clear(&self, chat_id: i64);
}

/// In-memory session map. Sessions do not survive a restart; an incomplete
/// questionnaire simply starts over.
#[derive(Default)]
pub struct InMemorySessions {
    sessions: RwLock<HashMap<i64, Session>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn get(&self, chat_id: i64) -> Option<Session> {
        self.sessions.read().await.get(&chat_id).cloned()
    }

    async fn put(&self, chat_id: i64, session: Session) {
        self.sessions.write().await.insert(chat_id, session);
    }

    async fn clear(&self, chat_id: i64) {
        self.sessions.write().await.remove(&chat_id);
    }
}
