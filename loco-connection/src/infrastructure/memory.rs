use crate::domain::PeerHandle;
use crate::infrastructure::error::{ConnectionError, Result};
use crate::infrastructure::transport::{ConnectionState, NearbyTransport, TransportEvent};
use instant::{Duration, Instant};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-process stand-in for the radio: every device attached to the same
/// network can discover, invite and message every other device advertising
/// the same service type.
#[derive(Debug, Clone, Default)]
pub struct MemoryNetwork {
    state: Arc<Mutex<NetworkState>>,
}

#[derive(Debug, Default)]
struct NetworkState {
    stations: HashMap<PeerHandle, Station>,
}

#[derive(Debug)]
struct Station {
    service_type: String,
    advertisement: Option<Vec<u8>>,
    browsing: bool,
    links: HashSet<PeerHandle>,
    /// Pending inbound invitations and when they expire
    invitations: HashMap<PeerHandle, Instant>,
    inbox: VecDeque<TransportEvent>,
}

impl Station {
    fn new(service_type: String) -> Self {
        Self {
            service_type,
            advertisement: None,
            browsing: false,
            links: HashSet::new(),
            invitations: HashMap::new(),
            inbox: VecDeque::new(),
        }
    }
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new device to the network
    pub fn attach(&self, display_name: impl Into<String>, service_type: &str) -> MemoryTransport {
        let handle = PeerHandle::new(display_name);
        self.lock()
            .stations
            .insert(handle.clone(), Station::new(service_type.to_string()));

        tracing::debug!("📻 {} attached (service: {})", handle, service_type);

        MemoryTransport {
            handle,
            network: self.clone(),
        }
    }

    /// Drop the link between two devices, as if they walked out of range
    pub fn sever(&self, a: &PeerHandle, b: &PeerHandle) {
        self.lock().unlink(a, b);
    }

    /// Queue a raw event for a device, bypassing the simulated radio
    pub fn inject(&self, to: &PeerHandle, event: TransportEvent) {
        if let Some(station) = self.lock().stations.get_mut(to) {
            station.inbox.push_back(event);
        }
    }

    pub fn station_count(&self) -> usize {
        self.lock().stations.len()
    }

    fn lock(&self) -> MutexGuard<'_, NetworkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NetworkState {
    fn push(&mut self, to: &PeerHandle, event: TransportEvent) {
        if let Some(station) = self.stations.get_mut(to) {
            station.inbox.push_back(event);
        }
    }

    fn service_of(&self, handle: &PeerHandle) -> Option<String> {
        self.stations
            .get(handle)
            .map(|station| station.service_type.clone())
    }

    fn advertise(&mut self, handle: &PeerHandle, identity: Vec<u8>) {
        let Some(station) = self.stations.get_mut(handle) else {
            return;
        };
        let already_advertising = station.advertisement.is_some();
        station.advertisement = Some(identity.clone());
        if already_advertising {
            return;
        }

        let service = station.service_type.clone();
        for (other, station) in self.stations.iter_mut() {
            if other != handle && station.browsing && station.service_type == service {
                station.inbox.push_back(TransportEvent::PeerFound {
                    handle: handle.clone(),
                    discovery_info: Some(identity.clone()),
                });
            }
        }
    }

    fn withdraw(&mut self, handle: &PeerHandle) {
        let Some(station) = self.stations.get_mut(handle) else {
            return;
        };
        if station.advertisement.take().is_none() {
            return;
        }

        let service = station.service_type.clone();
        for (other, station) in self.stations.iter_mut() {
            if other != handle && station.browsing && station.service_type == service {
                station
                    .inbox
                    .push_back(TransportEvent::PeerLost(handle.clone()));
            }
        }
    }

    fn browse(&mut self, handle: &PeerHandle) {
        let Some(service) = self.service_of(handle) else {
            return;
        };

        let found: Vec<TransportEvent> = self
            .stations
            .iter()
            .filter(|(other, station)| *other != handle && station.service_type == service)
            .filter_map(|(other, station)| {
                station
                    .advertisement
                    .clone()
                    .map(|identity| TransportEvent::PeerFound {
                        handle: other.clone(),
                        discovery_info: Some(identity),
                    })
            })
            .collect();

        if let Some(station) = self.stations.get_mut(handle) {
            if station.browsing {
                return;
            }
            station.browsing = true;
            station.inbox.extend(found);
        }
    }

    fn stop_browsing(&mut self, handle: &PeerHandle) {
        if let Some(station) = self.stations.get_mut(handle) {
            station.browsing = false;
        }
    }

    fn invite(&mut self, from: &PeerHandle, to: &PeerHandle, context: Vec<u8>, timeout: Duration) {
        let service = self.service_of(from);
        let Some(target) = self.stations.get_mut(to) else {
            tracing::debug!("Invitation from {} abandoned: {} is gone", from, to);
            return;
        };
        if target.advertisement.is_none() || Some(&target.service_type) != service.as_ref() {
            tracing::debug!("Invitation from {} abandoned: {} is not advertising", from, to);
            return;
        }

        target
            .invitations
            .insert(from.clone(), Instant::now() + timeout);
        target.inbox.push_back(TransportEvent::InvitationReceived {
            from: from.clone(),
            context: Some(context),
        });
    }

    fn respond(&mut self, responder: &PeerHandle, inviter: &PeerHandle, accept: bool) -> bool {
        let Some(station) = self.stations.get_mut(responder) else {
            return false;
        };
        let Some(deadline) = station.invitations.remove(inviter) else {
            tracing::warn!("No pending invitation from {} at {}", inviter, responder);
            return false;
        };
        if Instant::now() > deadline {
            tracing::debug!("Invitation from {} expired before it was answered", inviter);
            return false;
        }
        if !self.stations.contains_key(inviter) {
            return false;
        }

        if accept {
            self.link(responder, inviter);
        } else {
            self.push(
                inviter,
                TransportEvent::StateChanged {
                    handle: responder.clone(),
                    state: ConnectionState::NotConnected,
                },
            );
        }
        true
    }

    fn link(&mut self, a: &PeerHandle, b: &PeerHandle) {
        for (local, remote) in [(a, b), (b, a)] {
            if let Some(station) = self.stations.get_mut(local) {
                station.links.insert(remote.clone());
                for state in [ConnectionState::Connecting, ConnectionState::Connected] {
                    station.inbox.push_back(TransportEvent::StateChanged {
                        handle: remote.clone(),
                        state,
                    });
                }
            }
        }
    }

    fn unlink(&mut self, a: &PeerHandle, b: &PeerHandle) {
        for (local, remote) in [(a, b), (b, a)] {
            if let Some(station) = self.stations.get_mut(local) {
                if station.links.remove(remote) {
                    station.inbox.push_back(TransportEvent::StateChanged {
                        handle: remote.clone(),
                        state: ConnectionState::NotConnected,
                    });
                }
            }
        }
    }

    fn send(&mut self, from: &PeerHandle, data: &[u8], to: &[PeerHandle]) -> Result<()> {
        let links = match self.stations.get(from) {
            Some(station) if !station.links.is_empty() => &station.links,
            _ => return Err(ConnectionError::NotConnected),
        };
        if let Some(unreachable) = to.iter().find(|handle| !links.contains(*handle)) {
            return Err(ConnectionError::PeerUnreachable(unreachable.clone()));
        }

        for handle in to {
            self.push(
                handle,
                TransportEvent::DataReceived {
                    from: from.clone(),
                    data: data.to_vec(),
                },
            );
        }
        Ok(())
    }

    fn links_of(&self, handle: &PeerHandle) -> Vec<PeerHandle> {
        self.stations
            .get(handle)
            .map(|station| station.links.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn drain(&mut self, handle: &PeerHandle) -> Vec<TransportEvent> {
        self.stations
            .get_mut(handle)
            .map(|station| station.inbox.drain(..).collect())
            .unwrap_or_default()
    }

    fn detach(&mut self, handle: &PeerHandle) {
        self.withdraw(handle);
        for remote in self.links_of(handle) {
            self.unlink(handle, &remote);
        }
        self.stations.remove(handle);
    }
}

/// One device's view of a [`MemoryNetwork`]. Dropping it detaches the device.
#[derive(Debug)]
pub struct MemoryTransport {
    handle: PeerHandle,
    network: MemoryNetwork,
}

impl MemoryTransport {
    pub fn network(&self) -> &MemoryNetwork {
        &self.network
    }
}

impl NearbyTransport for MemoryTransport {
    fn local_handle(&self) -> &PeerHandle {
        &self.handle
    }

    fn start_advertising(&mut self, identity: Vec<u8>) {
        self.network.lock().advertise(&self.handle, identity);
    }

    fn stop_advertising(&mut self) {
        self.network.lock().withdraw(&self.handle);
    }

    fn start_browsing(&mut self) {
        self.network.lock().browse(&self.handle);
    }

    fn stop_browsing(&mut self) {
        self.network.lock().stop_browsing(&self.handle);
    }

    fn invite(&mut self, peer: &PeerHandle, context: Vec<u8>, timeout: Duration) {
        self.network
            .lock()
            .invite(&self.handle, peer, context, timeout);
    }

    fn respond_to_invitation(&mut self, from: &PeerHandle, accept: bool) -> bool {
        self.network.lock().respond(&self.handle, from, accept)
    }

    fn send_reliable(&mut self, data: &[u8], to: &[PeerHandle]) -> Result<()> {
        tracing::trace!("📤 {} → {} peers ({} bytes)", self.handle, to.len(), data.len());
        self.network.lock().send(&self.handle, data, to)
    }

    fn connected_handles(&self) -> Vec<PeerHandle> {
        self.network.lock().links_of(&self.handle)
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        self.network.lock().drain(&self.handle)
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.network.lock().detach(&self.handle);
        tracing::debug!("📻 {} detached", self.handle);
    }
}
