use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] carnet_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Profile '{0}' is not signed in. Run `carnet auth login` first.")]
    NotSignedIn(String),
    #[error("Session for profile '{0}' was rejected by the server and has been cleared. Sign in again.")]
    SessionExpired(String),
    #[error("Nothing to change: pass at least one edit option")]
    NothingToEdit,
    #[error("No subtask at position {0}")]
    SubtaskOutOfRange(usize),
}
