//! Error types for Brand Assist.

use std::time::Duration;

/// Top-level error type for the assistant core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable-store errors.
///
/// `Corrupt` is recovered locally by every caller (the stored entry is
/// treated as absent) and is never surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Stored value under {key} failed to parse: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Identity-provider errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Sign-in failed: {0}")]
    SignInFailed(String),
}

/// Strategy-generator errors. Every variant is retryable: the workflow
/// returns to the pre-call interactive step with the message attached.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generator request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Generator request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Generator returned an invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Generator authentication failed")]
    Auth,
}

/// User-input preconditions. Surfaced inline; the transition is blocked
/// and no state changes.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Profile text must not be empty")]
    EmptyProfileText,

    #[error("Not a valid public profile URL: {0}")]
    InvalidProfileUrl(String),
}

/// Workflow/session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Event {event} is not valid from step {step}")]
    InvalidStep { event: String, step: String },

    #[error("No identity is established")]
    NoIdentity,

    #[error("No strategy is loaded")]
    NoStrategy,

    #[error("Start over requires explicit confirmation")]
    NotConfirmed,
}

/// Scheduled-post collection errors.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Scheduled post {id} not found")]
    NotFound { id: uuid::Uuid },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for the assistant core.
pub type Result<T> = std::result::Result<T, Error>;
