use loco_connection::Peer;
use std::fmt;
use tokio::sync::mpsc;

/// Which side of the session a worker runs for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerRole {
    Host,
    Participant,
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerRole::Host => write!(f, "host"),
            WorkerRole::Participant => write!(f, "participant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    #[error("Invalid init payload: {0}")]
    InvalidInit(String),

    #[error("Worker construction failed: {0}")]
    Build(String),

    #[error("Worker is no longer attached to a session")]
    Detached,
}

/// Pluggable game simulation. Receives opaque bytes routed by the session.
pub trait GameWorker: Send {
    fn on_data(&mut self, data: Vec<u8>);
}

/// Builds workers when a game starts, locally or on the host's signal
pub trait WorkerFactory: Send {
    fn build(
        &self,
        role: WorkerRole,
        init: Option<Vec<u8>>,
        sender: WorkerSender,
    ) -> Result<Box<dyn GameWorker>, WorkerError>;
}

impl<F> WorkerFactory for F
where
    F: Fn(WorkerRole, Option<Vec<u8>>, WorkerSender) -> Result<Box<dyn GameWorker>, WorkerError>
        + Send,
{
    fn build(
        &self,
        role: WorkerRole,
        init: Option<Vec<u8>>,
        sender: WorkerSender,
    ) -> Result<Box<dyn GameWorker>, WorkerError> {
        self(role, init, sender)
    }
}

/// Bytes a worker wants delivered to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOutput {
    pub payload: Vec<u8>,
    /// `None` broadcasts to every peer in the session
    pub to: Option<Peer>,
}

/// Outbound capability handed to a worker at construction.
///
/// Output is queued and flushed by the game service on its next poll. Once the
/// worker has been superseded or the service dropped, sends fail with
/// [`WorkerError::Detached`].
#[derive(Debug, Clone)]
pub struct WorkerSender {
    tx: mpsc::UnboundedSender<WorkerOutput>,
}

impl WorkerSender {
    pub fn new(tx: mpsc::UnboundedSender<WorkerOutput>) -> Self {
        Self { tx }
    }

    pub fn broadcast(&self, payload: Vec<u8>) -> Result<(), WorkerError> {
        self.push(WorkerOutput { payload, to: None })
    }

    pub fn send_to(&self, peer: Peer, payload: Vec<u8>) -> Result<(), WorkerError> {
        self.push(WorkerOutput {
            payload,
            to: Some(peer),
        })
    }

    fn push(&self, output: WorkerOutput) -> Result<(), WorkerError> {
        self.tx.send(output).map_err(|_| WorkerError::Detached)
    }
}
