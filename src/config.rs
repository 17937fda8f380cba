//! Bot configuration, read from the environment.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Runtime configuration for the bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram Bot API token.
    pub bot_token: SecretString,
    /// Path of the local profile database.
    pub db_path: PathBuf,
    /// Long-poll timeout passed to getUpdates, in seconds.
    pub poll_timeout_secs: u64,
}

impl BotConfig {
    /// Read configuration from environment variables.
    ///
    /// `TELEGRAM_BOT_TOKEN` is required; `ENROLL_BOT_DB_PATH` and
    /// `ENROLL_BOT_POLL_TIMEOUT` have defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = get("TELEGRAM_BOT_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".into()))?;

        let db_path = get("ENROLL_BOT_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/enroll-bot.db"));

        let poll_timeout_secs = match get("ENROLL_BOT_POLL_TIMEOUT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "ENROLL_BOT_POLL_TIMEOUT".into(),
                message: format!("not a number: {raw}"),
            })?,
            None => 30,
        };

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            db_path,
            poll_timeout_secs,
        })
    }
}
