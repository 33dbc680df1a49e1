use crate::domain::{Peer, PeerHandle, PeerState};
use std::collections::HashMap;

/// Known peers, keyed by their transport handle
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<PeerHandle, Peer>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
        }
    }

    /// Insert or replace a peer. Returns `true` if the handle was not known before.
    pub fn insert(&mut self, handle: PeerHandle, peer: Peer) -> bool {
        self.peers.insert(handle, peer).is_none()
    }

    pub fn contains(&self, handle: &PeerHandle) -> bool {
        self.peers.contains_key(handle)
    }

    pub fn get(&self, handle: &PeerHandle) -> Option<&Peer> {
        self.peers.get(handle)
    }

    pub fn remove(&mut self, handle: &PeerHandle) -> Option<Peer> {
        self.peers.remove(handle)
    }

    /// Drop every entry, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let count = self.peers.len();
        self.peers.clear();
        count
    }

    /// Move a known peer into the session. Returns `false` for unknown handles.
    pub fn mark_in_session(&mut self, handle: &PeerHandle) -> bool {
        match self.peers.get_mut(handle) {
            Some(peer) => {
                peer.set_state(PeerState::InSession);
                true
            }
            None => false,
        }
    }

    pub fn handles(&self) -> Vec<PeerHandle> {
        self.peers.keys().cloned().collect()
    }

    /// Handles of every peer in state `InSession`
    pub fn in_session_handles(&self) -> Vec<PeerHandle> {
        self.peers
            .iter()
            .filter(|(_, peer)| peer.state() == PeerState::InSession)
            .map(|(handle, _)| handle.clone())
            .collect()
    }

    /// Handle registered for a peer, matched by identity
    pub fn find_handle(&self, peer: &Peer) -> Option<&PeerHandle> {
        self.peers
            .iter()
            .find(|(_, known)| *known == peer)
            .map(|(handle, _)| handle)
    }

    /// In-session peers whose handle is also live on the transport
    pub fn connected(&self, live: &[PeerHandle]) -> Vec<Peer> {
        self.peers
            .iter()
            .filter(|(handle, peer)| peer.state() == PeerState::InSession && live.contains(handle))
            .map(|(_, peer)| peer.clone())
            .collect()
    }

    /// Immutable copy of every entry
    pub fn snapshot(&self) -> Vec<(PeerHandle, Peer)> {
        self.peers
            .iter()
            .map(|(handle, peer)| (handle.clone(), peer.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
