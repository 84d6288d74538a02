//! Inbound events decoded from Telegram updates.

/// The remote party behind an inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversant {
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

/// Reference to a previously sent message, used to retract its buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

/// A decoded inbound event.
#[derive(Debug, Clone)]
pub struct Event {
    pub from: Conversant,
    pub kind: EventKind,
}

#[derive(Debug, Clone)]
pub enum EventKind {
    /// A plain text message.
    Text(String),
    /// A button press carrying an opaque action token. `source` is the
    /// message the button was attached to; `callback_id` must be
    /// acknowledged back to the platform.
    Action {
        token: String,
        source: MessageRef,
        callback_id: String,
    },
}
