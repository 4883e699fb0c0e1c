//! Error types for startup loading and task execution.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort startup. Nothing here is recoverable: the deck
/// refuses to open with a partial registry or a broken settings file.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("cannot read script {path}: {source}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed script {path} (line {line}): {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("script {path} rejected by {shell}: {message}")]
    SyntaxCheck {
        path: PathBuf,
        shell: String,
        message: String,
    },

    #[error("cannot read settings {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot list assets in {path}: {source}")]
    Assets {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DeckError>;

/// Why a single action run failed. Only the message survives; it is
/// what ends up in the log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for ActionError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
