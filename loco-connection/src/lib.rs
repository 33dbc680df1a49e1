// Domain layer (peers, registry, control messages)
pub mod domain;

// Application layer (connection core)
pub mod application;

// Infrastructure layer (transport boundary + in-memory transport)
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    ConnectionConfig, ConnectionEvent, ConnectionManager, DEFAULT_INVITE_TIMEOUT,
    DEFAULT_SERVICE_TYPE,
};
pub use domain::{
    Inbound, Invitation, InviteReply, Peer, PeerHandle, PeerMessage, PeerRegistry, PeerState,
    SessionRole,
};
pub use infrastructure::error::{ConnectionError, Result};
pub use infrastructure::{
    ConnectionState, MemoryNetwork, MemoryTransport, NearbyTransport, TransportEvent,
};
