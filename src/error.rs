//! Error types for tourdesk.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Action token error: {0}")]
    Token(#[from] TokenError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Telegram channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel failed to start: {reason}")]
    StartupFailed { reason: String },

    #[error("Failed to send to chat {chat_id}: {reason}")]
    SendFailed { chat_id: i64, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Malformed callback action tokens.
///
/// Raised at the router boundary; a malformed token never reaches the
/// conversation engine or the lifecycle controller.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Empty action token")]
    Empty,

    #[error("Unknown token category: {0}")]
    UnknownCategory(String),

    #[error("Unknown action {action} in category {category}")]
    UnknownAction { category: String, action: String },

    #[error("Invalid entity id in token: {0}")]
    InvalidId(String),

    #[error("Missing entity id in token: {0}")]
    MissingId(String),
}

/// Request lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Operator access required")]
    AccessDenied,

    #[error("Request {0} not found")]
    RequestNotFound(i64),

    #[error("No prior request to repeat")]
    NothingToRepeat,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
