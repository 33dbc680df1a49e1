mod invitation;
mod message;
mod peer;
mod peer_handle;
mod registry;
mod role;

pub use invitation::{Invitation, InviteReply};
pub use message::{Inbound, PeerMessage};
pub use peer::{Peer, PeerState};
pub use peer_handle::PeerHandle;
pub use registry::PeerRegistry;
pub use role::SessionRole;
