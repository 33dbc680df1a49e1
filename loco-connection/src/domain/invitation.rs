use crate::domain::PeerHandle;

/// An inbound connection request waiting for the user's decision.
///
/// Not `Clone`: [`accept`](Invitation::accept) and [`reject`](Invitation::reject)
/// consume it, so a request can be answered exactly once. The resulting
/// [`InviteReply`] is handed back to the connection core, which performs the
/// transport call and any registry update.
#[derive(Debug)]
pub struct Invitation {
    requester: PeerHandle,
    context: Option<Vec<u8>>,
}

impl Invitation {
    pub fn new(requester: PeerHandle, context: Option<Vec<u8>>) -> Self {
        Self { requester, context }
    }

    /// Name of the requesting device, for presentation
    pub fn device_name(&self) -> &str {
        self.requester.display_name()
    }

    pub fn requester(&self) -> &PeerHandle {
        &self.requester
    }

    pub fn context(&self) -> Option<&[u8]> {
        self.context.as_deref()
    }

    pub fn accept(self) -> InviteReply {
        InviteReply::Accept {
            requester: self.requester,
            context: self.context,
        }
    }

    pub fn reject(self) -> InviteReply {
        InviteReply::Reject {
            requester: self.requester,
        }
    }
}

/// The user's answer to an [`Invitation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteReply {
    /// Accept the connection and, if the context carries an identity, admit that peer
    Accept {
        requester: PeerHandle,
        context: Option<Vec<u8>>,
    },
    Reject {
        requester: PeerHandle,
    },
}

impl InviteReply {
    pub fn requester(&self) -> &PeerHandle {
        match self {
            InviteReply::Accept { requester, .. } | InviteReply::Reject { requester } => requester,
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, InviteReply::Accept { .. })
    }
}
