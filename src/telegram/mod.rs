//! Telegram Bot API plumbing — long-polling, outbound sends, action tokens.

pub mod action;
pub mod client;
pub mod event;
pub mod keyboards;

pub use action::{Action, StatusFilter};
pub use client::{EventStream, Outbound, TelegramClient};
pub use event::{Conversant, Event, EventKind, MessageRef};
