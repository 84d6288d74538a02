//! Tourdesk — a Telegram bot that collects tour requests through a
//! step-by-step questionnaire and routes them through an operator review
//! workflow.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod flow;
pub mod lifecycle;
pub mod notify;
pub mod store;
pub mod telegram;
pub mod texts;

pub use error::{Error, Result};
