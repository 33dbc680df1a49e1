use crate::domain::PeerHandle;
use crate::infrastructure::error::Result;
use instant::Duration;

/// Link state reported by the transport for a remote device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    NotConnected,
}

/// Raw events produced by a transport.
///
/// Transports may produce these on any thread; they are only acted upon when
/// the connection core drains them through [`NearbyTransport::poll_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Browsing found an advertiser
    PeerFound {
        handle: PeerHandle,
        discovery_info: Option<Vec<u8>>,
    },
    /// An advertiser went away
    PeerLost(PeerHandle),
    StateChanged {
        handle: PeerHandle,
        state: ConnectionState,
    },
    DataReceived {
        from: PeerHandle,
        data: Vec<u8>,
    },
    /// A remote device asked to join; answer with
    /// [`NearbyTransport::respond_to_invitation`]
    InvitationReceived {
        from: PeerHandle,
        context: Option<Vec<u8>>,
    },
}

/// Boundary to the physical discovery/connection mechanism.
///
/// The connection core is generic over this trait so tests can run whole
/// sessions in memory.
pub trait NearbyTransport {
    /// Handle other devices see for us
    fn local_handle(&self) -> &PeerHandle;

    fn start_advertising(&mut self, identity: Vec<u8>);
    fn stop_advertising(&mut self);

    fn start_browsing(&mut self);
    fn stop_browsing(&mut self);

    /// Ask a discovered device to connect. Abandoned by the transport once
    /// `timeout` elapses without an answer.
    fn invite(&mut self, peer: &PeerHandle, context: Vec<u8>, timeout: Duration);

    /// Answer a pending [`TransportEvent::InvitationReceived`].
    ///
    /// Returns `false` when the invitation was no longer pending (expired,
    /// already answered, inviter gone); no link is made in that case.
    fn respond_to_invitation(&mut self, from: &PeerHandle, accept: bool) -> bool;

    /// Reliable, ordered delivery to every handle in `to`
    fn send_reliable(&mut self, data: &[u8], to: &[PeerHandle]) -> Result<()>;

    /// Handles with a live link right now
    fn connected_handles(&self) -> Vec<PeerHandle>;

    fn poll_events(&mut self) -> Vec<TransportEvent>;
}
