mod message;
mod worker;

pub use message::GameMessage;
pub use worker::{GameWorker, WorkerError, WorkerFactory, WorkerOutput, WorkerRole, WorkerSender};
