//! Telegram Bot API client — long-polls `getUpdates`, sends messages.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ChannelError;
use crate::telegram::event::{Conversant, Event, EventKind, MessageRef};

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

/// Stream of decoded inbound events.
pub type EventStream = Pin<Box<dyn Stream<Item = Event> + Send>>;

/// Outbound send primitives — the seam between the core and the Bot API.
///
/// Tests exercise the engine and controller against a recording fake.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Send a text message, optionally with a `reply_markup` keyboard.
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<serde_json::Value>,
    ) -> Result<(), ChannelError>;

    /// Retract the inline keyboard on a previously sent message.
    async fn clear_buttons(&self, message: MessageRef) -> Result<(), ChannelError>;

    /// Acknowledge a callback query, optionally with an alert text.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), ChannelError>;
}

/// Telegram client — connects to the Bot API via long-polling.
pub struct TelegramClient {
    bot_token: SecretString,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.bot_token.expose_secret()
        )
    }

    /// Verify the token against `getMe`.
    pub async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }

    /// Start the long-polling loop and return the inbound event stream.
    pub async fn start(&self) -> Result<EventStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for updates...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": 30,
                    "allowed_updates": ["message", "callback_query"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                let data: serde_json::Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                if let Some(results) = data.get("result").and_then(serde_json::Value::as_array) {
                    for update in results {
                        if let Some(uid) =
                            update.get("update_id").and_then(serde_json::Value::as_i64)
                        {
                            offset = uid + 1;
                        }

                        let Some(event) = parse_update(update) else {
                            continue;
                        };

                        if tx.send(event).is_err() {
                            tracing::info!("Telegram listener channel closed");
                            return;
                        }
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });

        Ok(Box::pin(stream))
    }

    /// Send a single message chunk (≤4096 chars), HTML-first with plain
    /// text fallback.
    async fn send_message_chunk(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&serde_json::Value>,
    ) -> Result<(), ChannelError> {
        let mut html_body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML"
        });
        if let Some(kb) = keyboard {
            html_body["reply_markup"] = kb.clone();
        }

        let html_resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&html_body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                chat_id,
                reason: e.to_string(),
            })?;

        if html_resp.status().is_success() {
            return Ok(());
        }

        let html_status = html_resp.status();
        tracing::warn!(
            status = ?html_status,
            chat_id,
            "Telegram sendMessage with HTML failed; retrying without parse_mode"
        );

        let mut plain_body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(kb) = keyboard {
            plain_body["reply_markup"] = kb.clone();
        }
        let plain_resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&plain_body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                chat_id,
                reason: e.to_string(),
            })?;

        if !plain_resp.status().is_success() {
            let plain_err = plain_resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                chat_id,
                reason: format!("sendMessage failed (html: {html_status}, plain: {plain_err})"),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Outbound for TelegramClient {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<serde_json::Value>,
    ) -> Result<(), ChannelError> {
        let chunks = split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH);
        let last = chunks.len() - 1;

        for (i, chunk) in chunks.iter().enumerate() {
            // The keyboard goes on the final chunk only
            let kb = if i == last { keyboard.as_ref() } else { None };
            self.send_message_chunk(chat_id, chunk, kb).await?;
        }
        Ok(())
    }

    async fn clear_buttons(&self, message: MessageRef) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "chat_id": message.chat_id,
            "message_id": message.message_id,
            "reply_markup": { "inline_keyboard": [] }
        });

        let resp = self
            .client
            .post(self.api_url("editMessageReplyMarkup"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ChannelError::Http(format!(
                "editMessageReplyMarkup returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), ChannelError> {
        let mut body = serde_json::json!({ "callback_query_id": callback_id });
        if let Some(t) = text {
            body["text"] = serde_json::Value::String(t.to_string());
            body["show_alert"] = serde_json::Value::Bool(true);
        }

        let resp = self
            .client
            .post(self.api_url("answerCallbackQuery"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ChannelError::Http(format!(
                "answerCallbackQuery returned {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn conversant(from: Option<&serde_json::Value>, fallback_chat_id: i64) -> Conversant {
    let chat_id = from
        .and_then(|f| f.get("id"))
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(fallback_chat_id);
    let username = from
        .and_then(|f| f.get("username"))
        .and_then(|u| u.as_str())
        .map(String::from);
    let first_name = from
        .and_then(|f| f.get("first_name"))
        .and_then(|n| n.as_str())
        .map(String::from);
    Conversant {
        chat_id,
        username,
        first_name,
    }
}

/// Decode one raw update into an Event. Updates without a usable payload
/// (no text, no callback data) are dropped.
fn parse_update(update: &serde_json::Value) -> Option<Event> {
    if let Some(message) = update.get("message") {
        let text = message.get("text")?.as_str()?;
        let chat_id = message.get("chat")?.get("id")?.as_i64()?;
        return Some(Event {
            from: conversant(message.get("from"), chat_id),
            kind: EventKind::Text(text.to_string()),
        });
    }

    if let Some(callback) = update.get("callback_query") {
        let callback_id = callback.get("id")?.as_str()?.to_string();
        let token = callback.get("data")?.as_str()?.to_string();
        let message = callback.get("message")?;
        let chat_id = message.get("chat")?.get("id")?.as_i64()?;
        let message_id = message.get("message_id")?.as_i64()?;
        return Some(Event {
            from: conversant(callback.get("from"), chat_id),
            kind: EventKind::Action {
                token,
                source: MessageRef {
                    chat_id,
                    message_id,
                },
                callback_id,
            },
        });
    }

    None
}

/// Split a message into chunks that fit Telegram's character limit.
/// Tries to split on newlines, then spaces, then hard-cuts.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        // Back off to a char boundary before slicing
        let mut cut = max_len;
        while !remaining.is_char_boundary(cut) {
            cut -= 1;
        }

        let chunk = &remaining[..cut];
        let split_at = chunk
            .rfind('\n')
            .or_else(|| chunk.rfind(' '))
            .unwrap_or(cut);

        // Don't split at position 0 (infinite loop guard)
        let split_at = if split_at == 0 { cut } else { split_at };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

// ── Tests ───────────────────────────────────────────────────────────
