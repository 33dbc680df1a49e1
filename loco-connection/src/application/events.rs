use crate::domain::{Invitation, PeerHandle, PeerMessage};

/// Events emitted by the connection core, in arrival order
#[derive(Debug)]
pub enum ConnectionEvent {
    /// Inbound bytes that are not a control message
    DataReceived(Vec<u8>),
    MessageReceived(PeerMessage),
    /// The registry gained or lost an entry; carries every known handle
    HostsChanged(Vec<PeerHandle>),
    InviteReceived(Invitation),
}
