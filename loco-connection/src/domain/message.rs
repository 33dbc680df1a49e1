use serde::{Deserialize, Serialize};

/// Session-control messages exchanged between connection cores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeerMessage {
    /// The host is tearing the session down
    SessionEnded,
    /// Membership changed, peer lists should be re-read
    RefreshPeers,
    /// The local device finished joining (only ever raised locally)
    JoinedSession,
}

impl PeerMessage {
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

/// First-stage classification of inbound bytes.
///
/// Bytes that decode as a [`PeerMessage`] are control traffic; anything else
/// is handed up untouched for the next layer to interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Control(PeerMessage),
    Opaque(Vec<u8>),
}

impl Inbound {
    pub fn classify(data: Vec<u8>) -> Self {
        match PeerMessage::decode(&data) {
            Ok(message) => Inbound::Control(message),
            Err(_) => Inbound::Opaque(data),
        }
    }
}
