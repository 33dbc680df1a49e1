use crate::application::{ConnectionConfig, ConnectionEvent};
use crate::domain::{
    Inbound, Invitation, InviteReply, Peer, PeerHandle, PeerMessage, PeerRegistry, PeerState,
    SessionRole,
};
use crate::infrastructure::error::Result;
use crate::infrastructure::transport::{ConnectionState, NearbyTransport, TransportEvent};

/// Connection core: owns the peer registry and the session role, turns
/// transport events into [`ConnectionEvent`]s and outbound intents into
/// transport calls.
///
/// All mutation happens on the caller's thread inside [`poll`](Self::poll) or
/// one of the intent methods. Generic over the transport so sessions can run
/// in memory under test.
pub struct ConnectionManager<T: NearbyTransport> {
    transport: T,

    config: ConnectionConfig,

    /// Our own identity, advertised and attached to invitations
    current_peer: Peer,

    registry: PeerRegistry,

    role: SessionRole,

    browsing: bool,

    /// Events waiting for the caller to drain
    outbound: Vec<ConnectionEvent>,
}

impl<T: NearbyTransport> ConnectionManager<T> {
    pub fn new(transport: T, current_peer: Peer, config: ConnectionConfig) -> Self {
        Self {
            transport,
            config,
            current_peer,
            registry: PeerRegistry::new(),
            role: SessionRole::Idle,
            browsing: false,
            outbound: Vec::new(),
        }
    }

    pub fn current_peer(&self) -> &Peer {
        &self.current_peer
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn is_hosting(&self) -> bool {
        self.role == SessionRole::Hosting
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Snapshot of every registry entry
    pub fn peers(&self) -> Vec<(PeerHandle, Peer)> {
        self.registry.snapshot()
    }

    /// Peers in the session that the transport still reports as linked
    pub fn connected_peers(&self) -> Vec<Peer> {
        self.registry.connected(&self.transport.connected_handles())
    }

    /// Start looking for hosts. Calling it again while browsing does nothing.
    pub fn browse_sessions(&mut self) {
        if self.browsing {
            return;
        }
        self.browsing = true;
        self.transport.start_browsing();
        tracing::info!("🔍 Browsing for sessions");
    }

    /// Leave whatever we were doing and start advertising as a host
    pub fn host_session(&mut self) {
        self.leave_session();

        self.role = SessionRole::Hosting;

        match self.current_peer.encode() {
            Ok(identity) => {
                self.transport.start_advertising(identity);
                tracing::info!("📣 Hosting session as '{}'", self.current_peer.display_name());
            }
            Err(e) => tracing::warn!("Cannot advertise, identity failed to encode: {}", e),
        }
    }

    /// Ask a discovered host to let us in
    pub fn invite(&mut self, peer: &PeerHandle) {
        match self.registry.get(peer).map(Peer::state) {
            Some(PeerState::Discovered) => {}
            Some(state) => {
                tracing::debug!("Not inviting {}: already {}", peer, state);
                return;
            }
            None => {
                tracing::debug!("Not inviting {}: never discovered", peer);
                return;
            }
        }

        let Ok(context) = self.current_peer.encode() else {
            return;
        };

        tracing::info!("✉️  Inviting {}", peer);
        self.transport.invite(peer, context, self.config.invite_timeout());
    }

    /// Tell the session we are going, then forget everything about it.
    ///
    /// The goodbye is best effort: delivery failures are ignored.
    pub fn leave_session(&mut self) {
        let goodbye = if self.is_hosting() {
            PeerMessage::SessionEnded
        } else {
            PeerMessage::RefreshPeers
        };
        if let Err(e) = self.send_message(goodbye) {
            tracing::debug!("Goodbye {:?} not delivered: {}", goodbye, e);
        }

        if self.registry.clear() > 0 {
            self.emit_hosts_changed();
        }
        self.role = SessionRole::Idle;
        self.browsing = false;

        self.transport.stop_advertising();
        self.transport.stop_browsing();

        tracing::debug!("Left session");
    }

    /// Broadcast to every peer in the session. No peers means nothing to do.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        let targets = self.registry.in_session_handles();
        if targets.is_empty() {
            return Ok(());
        }
        self.transport.send_reliable(data, &targets)
    }

    /// Send to a single peer, resolved by identity. Unknown peers are ignored.
    /// Any registry entry matches, so a peer that is only `Discovered` yields
    /// the transport's error rather than a no-op.
    pub fn send_to(&mut self, data: &[u8], peer: &Peer) -> Result<()> {
        let Some(handle) = self.registry.find_handle(peer).cloned() else {
            tracing::debug!("No handle for peer {}, dropping message", peer.id());
            return Ok(());
        };
        self.transport.send_reliable(data, &[handle])
    }

    pub fn send_message(&mut self, message: PeerMessage) -> Result<()> {
        let Ok(data) = message.encode() else {
            return Ok(());
        };
        self.send(&data)
    }

    /// Act on the user's answer to an [`Invitation`]
    pub fn respond(&mut self, reply: InviteReply) {
        match reply {
            InviteReply::Accept { requester, context } => {
                if !self.transport.respond_to_invitation(&requester, true) {
                    tracing::warn!("Invitation from {} is no longer pending", requester);
                    return;
                }
                tracing::info!("🤝 Accepted invitation from {}", requester);

                let Some(peer) = context.and_then(|data| Peer::decode(&data).ok()) else {
                    tracing::debug!("Invitation from {} carried no identity", requester);
                    return;
                };
                if self
                    .registry
                    .insert(requester, peer.with_state(PeerState::InSession))
                {
                    self.emit_hosts_changed();
                }
            }
            InviteReply::Reject { requester } => {
                self.transport.respond_to_invitation(&requester, false);
                tracing::info!("Declined invitation from {}", requester);
            }
        }
    }

    /// Drain the transport and process its events in order.
    /// Returns the number of transport events handled.
    pub fn poll(&mut self) -> usize {
        let events = self.transport.poll_events();
        let count = events.len();

        for event in events {
            self.handle_transport_event(event);
        }

        count
    }

    /// Drain all emitted events (caller's responsibility)
    pub fn drain_events(&mut self) -> Vec<ConnectionEvent> {
        std::mem::take(&mut self.outbound)
    }

    fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::PeerFound {
                handle,
                discovery_info,
            } => self.on_peer_found(handle, discovery_info),
            TransportEvent::PeerLost(handle) => {
                if self.registry.remove(&handle).is_some() {
                    tracing::debug!("Lost {}", handle);
                    self.emit_hosts_changed();
                }
            }
            TransportEvent::StateChanged { handle, state } => self.on_state_changed(handle, state),
            TransportEvent::DataReceived { from, data } => {
                tracing::trace!("📥 {} bytes from {}", data.len(), from);
                let event = match Inbound::classify(data) {
                    Inbound::Control(message) => ConnectionEvent::MessageReceived(message),
                    Inbound::Opaque(data) => ConnectionEvent::DataReceived(data),
                };
                self.outbound.push(event);
            }
            TransportEvent::InvitationReceived { from, context } => {
                tracing::info!("📨 Invitation from {}", from);
                self.outbound
                    .push(ConnectionEvent::InviteReceived(Invitation::new(from, context)));
            }
        }
    }

    fn on_peer_found(&mut self, handle: PeerHandle, discovery_info: Option<Vec<u8>>) {
        if self.registry.contains(&handle) {
            return;
        }
        let Some(peer) = discovery_info.and_then(|data| Peer::decode(&data).ok()) else {
            tracing::debug!("Ignoring {}: no readable identity advertised", handle);
            return;
        };

        tracing::debug!("Discovered {} ({})", handle, peer.id());
        self.registry.insert(handle, peer.with_state(PeerState::Discovered));
        self.emit_hosts_changed();
    }

    fn on_state_changed(&mut self, handle: PeerHandle, state: ConnectionState) {
        if state != ConnectionState::Connected {
            tracing::trace!("{} is now {:?}", handle, state);
            return;
        }
        if !self.registry.mark_in_session(&handle) {
            return;
        }

        tracing::info!("🟢 {} connected", handle);
        if self.role == SessionRole::Idle {
            self.role = SessionRole::Participant;
        }

        if let Err(e) = self.send_message(PeerMessage::RefreshPeers) {
            tracing::debug!("Refresh broadcast not delivered: {}", e);
        }
        self.outbound
            .push(ConnectionEvent::MessageReceived(PeerMessage::JoinedSession));
    }

    fn emit_hosts_changed(&mut self) {
        self.outbound
            .push(ConnectionEvent::HostsChanged(self.registry.handles()));
    }
}
