use crate::domain::{WorkerError, WorkerRole};
use loco_connection::{Invitation, PeerHandle, PeerMessage};

/// Events surfaced to the game's UI layer
#[derive(Debug)]
pub enum GameEvent {
    /// Full list of known session handles after a registry change
    HostsChanged(Vec<PeerHandle>),
    /// Someone wants to join our hosted session
    InviteReceived(Invitation),
    /// A session control message arrived
    PeerMessageReceived(PeerMessage),
    /// A worker could not be constructed after the host started the game
    WorkerFailed { role: WorkerRole, error: WorkerError },
}
