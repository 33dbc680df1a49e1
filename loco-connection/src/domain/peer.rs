use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Lifecycle of a peer as seen by the local registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeerState {
    /// Known only by identity (e.g. the local device before it advertises)
    Undiscovered,
    /// Found by browsing, not yet connected
    Discovered,
    /// Accepted into the current session
    InSession,
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerState::Undiscovered => write!(f, "undiscovered"),
            PeerState::Discovered => write!(f, "discovered"),
            PeerState::InSession => write!(f, "inSession"),
        }
    }
}

/// A device taking part (or able to take part) in a session.
///
/// Identity is the `id` alone: two values with the same id compare equal even
/// if the display name or state differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    id: Uuid,
    display_name: String,
    state: PeerState,
}

impl Peer {
    pub fn new(id: Uuid, display_name: impl Into<String>, state: PeerState) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            state,
        }
    }

    /// Identity for the local device
    pub fn local(display_name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4(), display_name, PeerState::Undiscovered)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    pub fn set_state(&mut self, state: PeerState) {
        self.state = state;
    }

    pub fn with_state(mut self, state: PeerState) -> Self {
        self.state = state;
        self
    }

    /// Serialized identity, as advertised and attached to invitations
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

impl PartialEq for Peer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Peer {}

impl Hash for Peer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_name_and_state() {
        let id = Uuid::new_v4();
        let a = Peer::new(id, "Host", PeerState::Discovered);
        let b = Peer::new(id, "Renamed", PeerState::InSession);
        let c = Peer::new(Uuid::new_v4(), "Host", PeerState::Discovered);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_identity_survives_encoding() {
        let peer = Peer::local("Alice").with_state(PeerState::Discovered);

        let bytes = peer.encode().unwrap();
        let decoded = Peer::decode(&bytes).unwrap();

        assert_eq!(decoded, peer);
        assert_eq!(decoded.display_name(), "Alice");
        assert_eq!(decoded.state(), PeerState::Discovered);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let peer = Peer::new(id, "Host", PeerState::InSession);

        let json: serde_json::Value = serde_json::from_slice(&peer.encode().unwrap()).unwrap();

        assert_eq!(json["displayName"], "Host");
        assert_eq!(json["state"], "inSession");
        assert_eq!(json["id"], "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Peer::decode(b"not a peer").is_err());
        assert!(Peer::decode(br#"{"id":"nope"}"#).is_err());
    }
}
