#![allow(dead_code)]

use loco_connection::{
    ConnectionConfig, ConnectionEvent, ConnectionManager, Invitation, MemoryNetwork,
    MemoryTransport, NearbyTransport, Peer, PeerHandle,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const SERVICE: &str = "loco-test";

pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

/// One simulated device: a connection core plus everything it has emitted
pub struct Device {
    pub manager: ConnectionManager<MemoryTransport>,
    pub events: Vec<ConnectionEvent>,
}

impl Device {
    pub fn new(network: &MemoryNetwork, name: &str) -> Self {
        let config = ConnectionConfig::new(SERVICE).unwrap();
        let transport = network.attach(name, SERVICE);
        Self {
            manager: ConnectionManager::new(transport, Peer::local(name), config),
            events: Vec::new(),
        }
    }

    pub fn handle(&self) -> PeerHandle {
        self.manager.transport().local_handle().clone()
    }

    pub fn identity(&self) -> Peer {
        self.manager.current_peer().clone()
    }

    /// Process pending transport events and collect what came out
    pub fn pump(&mut self) {
        self.manager.poll();
        let events = self.manager.drain_events();
        self.events.extend(events);
    }

    pub fn take_events(&mut self) -> Vec<ConnectionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Remove and return the first pending invitation
    pub fn take_invitation(&mut self) -> Option<Invitation> {
        let position = self
            .events
            .iter()
            .position(|event| matches!(event, ConnectionEvent::InviteReceived(_)))?;
        match self.events.remove(position) {
            ConnectionEvent::InviteReceived(invitation) => Some(invitation),
            _ => None,
        }
    }

    /// Most recent `HostsChanged` payload
    pub fn last_hosts(&self) -> Option<Vec<PeerHandle>> {
        self.events.iter().rev().find_map(|event| match event {
            ConnectionEvent::HostsChanged(hosts) => Some(hosts.clone()),
            _ => None,
        })
    }

    pub fn registry_handles(&self) -> Vec<PeerHandle> {
        self.manager
            .peers()
            .into_iter()
            .map(|(handle, _)| handle)
            .collect()
    }
}

/// Pump every device a few times so in-flight events settle
pub fn settle(devices: &mut [&mut Device]) {
    for _ in 0..3 {
        for device in devices.iter_mut() {
            device.pump();
        }
    }
}

/// Host + guests with every guest invited, accepted and joined
pub fn form_session(network: &MemoryNetwork, guest_names: &[&str]) -> (Device, Vec<Device>) {
    let mut host = Device::new(network, "Host");
    host.manager.host_session();

    let mut guests: Vec<Device> = guest_names
        .iter()
        .map(|name| Device::new(network, name))
        .collect();

    for guest in guests.iter_mut() {
        guest.manager.browse_sessions();
        guest.pump();
        guest.manager.invite(&host.handle());

        host.pump();
        let invitation = host.take_invitation().expect("host should see invitation");
        host.manager.respond(invitation.accept());

        guest.pump();
        host.pump();
    }

    let mut all: Vec<&mut Device> = std::iter::once(&mut host).chain(guests.iter_mut()).collect();
    settle(&mut all);

    (host, guests)
}

pub fn sorted(mut handles: Vec<PeerHandle>) -> Vec<PeerHandle> {
    handles.sort_by_key(|handle| handle.id());
    handles
}
