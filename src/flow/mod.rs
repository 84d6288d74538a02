//! Per-conversant conversation state machines.
//!
//! Two flows share one session mechanism: the seven-step tour intake and
//! the single-step operator comment entry (approve / reject).

pub mod engine;
pub mod session;
pub mod state;

pub use engine::{ConversationEngine, FlowReply};
pub use session::{InMemorySessions, SessionStore};
pub use state::{FlowState, IntakeDraft, IntakeStep, InvalidInput, Session};
