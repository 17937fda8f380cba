//! Error types for Enroll Bot.

use crate::store::UserId;

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Profile store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("No profile for user {0}")]
    NotFound(UserId),

    #[error("Profile already exists for user {0}")]
    Duplicate(UserId),
}

/// Transport/channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Channel health check failed: {name}: {reason}")]
    HealthCheckFailed { name: String, reason: String },
}

/// Terminal flow errors.
///
/// Validation failures are not errors — the state machine self-loops on
/// invalid input. Only flow-logic violations and store faults end a flow.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Registration already completed for user {0}")]
    DuplicateRegistration(UserId),

    #[error("No registered profile for user {0}")]
    ProfileNotFound(UserId),

    #[error("Store failure: {0}")]
    Store(StoreError),
}

impl FlowError {
    /// Classify a store fault raised during commit (profile insert).
    pub fn from_commit(err: StoreError, user_id: UserId) -> Self {
        match err {
            StoreError::Duplicate(_) => Self::DuplicateRegistration(user_id),
            other => Self::Store(other),
        }
    }

    /// Classify a store fault raised during patch (single-field update).
    pub fn from_patch(err: StoreError, user_id: UserId) -> Self {
        match err {
            StoreError::NotFound(_) => Self::ProfileNotFound(user_id),
            other => Self::Store(other),
        }
    }
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
