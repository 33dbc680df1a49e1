use crate::domain::{GameWorker, WorkerError, WorkerFactory, WorkerRole, WorkerSender};
use std::sync::{Arc, Mutex, PoisonError};

/// What an echo worker has seen so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EchoStats {
    pub role: Option<WorkerRole>,
    pub seed: String,
    pub received: Vec<Vec<u8>>,
    pub echoed: usize,
}

/// Echo worker - simplest possible game for testing
///
/// The host echoes every payload back to the whole session.
/// Participants only record what arrives.
pub struct EchoWorker {
    role: WorkerRole,
    sender: WorkerSender,
    stats: Arc<Mutex<EchoStats>>,
}

impl EchoWorker {
    fn stats(&self) -> std::sync::MutexGuard<'_, EchoStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GameWorker for EchoWorker {
    fn on_data(&mut self, data: Vec<u8>) {
        self.stats().received.push(data.clone());

        if self.role == WorkerRole::Host {
            match self.sender.broadcast(data) {
                Ok(()) => self.stats().echoed += 1,
                Err(e) => tracing::warn!("Echo dropped: {}", e),
            }
        }
    }
}

/// Builds [`EchoWorker`]s that share one stats record
#[derive(Debug, Clone, Default)]
pub struct EchoWorkerFactory {
    stats: Arc<Mutex<EchoStats>>,
}

impl EchoWorkerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current worker's stats
    pub fn stats(&self) -> EchoStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl WorkerFactory for EchoWorkerFactory {
    fn build(
        &self,
        role: WorkerRole,
        init: Option<Vec<u8>>,
        sender: WorkerSender,
    ) -> Result<Box<dyn GameWorker>, WorkerError> {
        let seed = match init {
            Some(bytes) => {
                String::from_utf8(bytes).map_err(|e| WorkerError::InvalidInit(e.to_string()))?
            }
            None => String::new(),
        };

        tracing::debug!("🔁 Echo worker ({}) seeded with {:?}", role, seed);

        *self.stats.lock().unwrap_or_else(PoisonError::into_inner) = EchoStats {
            role: Some(role),
            seed,
            ..EchoStats::default()
        };

        Ok(Box::new(EchoWorker {
            role,
            sender,
            stats: self.stats.clone(),
        }))
    }
}
