use loco_connection::ConnectionError;
use loco_game::GameError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Failed to initialize tracing: {0}")]
    Logging(String),

    #[error("Simulation failed: {0}")]
    Simulation(String),
}

impl CliError {
    pub fn timed_out(what: &str) -> Self {
        CliError::Simulation(format!("timed out waiting for {}", what))
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
