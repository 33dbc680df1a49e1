use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Transport-level handle for a nearby device.
///
/// Handles are minted by the transport and are only meaningful to it. The
/// registry keys peers by handle; the application talks about [`Peer`]s.
///
/// [`Peer`]: crate::domain::Peer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerHandle {
    id: Uuid,
    display_name: String,
}

impl PeerHandle {
    /// Mint a fresh handle for a device name
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
        }
    }

    pub fn with_id(id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl fmt::Display for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.simple().to_string();
        write!(f, "{}#{}", self.display_name, &id[..8])
    }
}
