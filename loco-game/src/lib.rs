// Domain layer (game messages, worker contract)
pub mod domain;

// Application layer (orchestrator + tokio runtime)
pub mod application;

// Reference workers
pub mod workers;

pub mod error;

// Re-exports for convenience
pub use application::{
    GameCommand, GameEvent, GameService, RuntimeConfig, SessionRuntime, SessionSnapshot,
};
pub use domain::{
    GameMessage, GameWorker, WorkerError, WorkerFactory, WorkerOutput, WorkerRole, WorkerSender,
};
pub use error::{GameError, Result};
pub use workers::{EchoStats, EchoWorker, EchoWorkerFactory};
