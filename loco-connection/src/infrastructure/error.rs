use crate::domain::PeerHandle;

/// Errors surfaced by the transport and connection layers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("No active session")]
    NotConnected,

    #[error("Peer unreachable: {0}")]
    PeerUnreachable(PeerHandle),

    #[error("Invalid service type: {0}")]
    InvalidServiceType(String),
}

pub type Result<T> = std::result::Result<T, ConnectionError>;
