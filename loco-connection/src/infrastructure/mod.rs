pub mod error;
pub mod memory;
pub mod transport;

pub use memory::{MemoryNetwork, MemoryTransport};
pub use transport::{ConnectionState, NearbyTransport, TransportEvent};
