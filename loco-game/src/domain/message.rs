use serde::{Deserialize, Serialize};

/// Application-layer messages carried as opaque bytes by the connection core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameMessage {
    /// Host → participants: start a worker with this init payload
    GameStarted(Option<Vec<u8>>),
    /// Bytes for the already running worker
    WorkerData(Vec<u8>),
}

impl GameMessage {
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
