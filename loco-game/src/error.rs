use crate::domain::WorkerError;
use loco_connection::ConnectionError;

/// Errors surfaced by the game layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Session runtime is no longer running")]
    RuntimeClosed,
}

pub type Result<T> = std::result::Result<T, GameError>;
