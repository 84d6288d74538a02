//! Configuration — read once from the environment at startup.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Bot configuration.
///
/// `BOT_TOKEN` and `TOURDESK_OPERATORS` are required; everything else
/// has a default.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token.
    pub bot_token: SecretString,
    /// Chat ids allowed to review requests.
    pub operators: Vec<i64>,
    /// Path to the SQLite database file.
    pub db_path: String,
    /// Maximum number of requests returned by any listing.
    pub list_limit: usize,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("BOT_TOKEN".into()))?;

        let operators_raw = std::env::var("TOURDESK_OPERATORS")
            .map_err(|_| ConfigError::MissingEnvVar("TOURDESK_OPERATORS".into()))?;
        let operators = parse_operators(&operators_raw)?;
        if operators.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "TOURDESK_OPERATORS".into(),
                message: "at least one operator chat id is required".into(),
            });
        }

        let db_path = std::env::var("TOURDESK_DB_PATH")
            .unwrap_or_else(|_| "./data/tourdesk.db".to_string());

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            operators,
            db_path,
            list_limit: 20,
        })
    }
}

/// Parse a comma-separated list of operator chat ids.
fn parse_operators(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                key: "TOURDESK_OPERATORS".into(),
                message: format!("not a chat id: {s}"),
            })
        })
        .collect()
}
