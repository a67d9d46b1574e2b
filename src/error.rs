// Error types shared across the client
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend ran the command and reported an error
    #[error("{command} failed: {message}")]
    Command { command: String, message: String },

    #[error("Unknown backend command: {0}")]
    UnknownCommand(String),

    #[error("Failed to encode arguments for {command}: {message}")]
    Encode { command: String, message: String },

    #[error("Failed to decode response from {command}: {message}")]
    Decode { command: String, message: String },
}

impl BackendError {
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Message suitable for a notification, without the command prefix
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Command { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// The SSH/sync precondition that blocks dispatching work
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("SSH key {key_path} is locked, passphrase required")]
    PassphraseRequired { key_path: String },

    #[error("No SSH key found at {expected_path}")]
    KeyGenerationRequired { expected_path: String },

    #[error("No SSH agent is running")]
    AgentUnavailable,

    #[error("SSH key is not locked, nothing to unlock")]
    NotLocked,

    #[error("Unable to check SSH status: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Error, Debug)]
pub enum FileError {
    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("File not found: {0:?}")]
    NotFound(PathBuf),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    #[error(transparent)]
    File(#[from] FileError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
