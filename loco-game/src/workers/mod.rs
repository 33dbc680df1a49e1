pub mod echo;

pub use echo::{EchoStats, EchoWorker, EchoWorkerFactory};
