//! Error types for the daemon

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Division by zero in reward estimation")]
    DivisionByZero,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

/// Coarse classification used when deciding how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Communication,
    Protocol,
    Validation,
    Computation,
}

impl DaemonError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Communication(_)
            | Self::Network(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Notification(_) => ErrorKind::Communication,
            Self::Protocol(_) | Self::Json(_) => ErrorKind::Protocol,
            Self::Validation(_) | Self::Config(_) => ErrorKind::Validation,
            Self::DivisionByZero => ErrorKind::Computation,
        }
    }

    /// True when the message can be shown to a chat user verbatim.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Corrective text for a chat user; `None` when the cause stays in the logs
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Validation(msg) if self.is_user_facing() => Some(msg.as_str()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DaemonError>;
