#![allow(dead_code)]

use loco_connection::{
    ConnectionConfig, ConnectionManager, MemoryNetwork, MemoryTransport, NearbyTransport, Peer,
    PeerHandle,
};
use loco_game::{EchoWorkerFactory, GameEvent, GameService};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const SERVICE: &str = "loco-test";

pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

pub fn service(
    network: &MemoryNetwork,
    name: &str,
) -> GameService<MemoryTransport, EchoWorkerFactory> {
    let config = ConnectionConfig::new(SERVICE).unwrap();
    let manager = ConnectionManager::new(network.attach(name, SERVICE), Peer::local(name), config);
    GameService::new(manager, EchoWorkerFactory::new())
}

/// One simulated player running the echo game
pub struct Player {
    pub service: GameService<MemoryTransport, EchoWorkerFactory>,
    pub events: Vec<GameEvent>,
}

impl Player {
    pub fn new(network: &MemoryNetwork, name: &str) -> Self {
        Self {
            service: service(network, name),
            events: Vec::new(),
        }
    }

    pub fn handle(&self) -> PeerHandle {
        self.service.connection().transport().local_handle().clone()
    }

    pub fn pump(&mut self) {
        self.service.poll();
        let events = self.service.drain_events();
        self.events.extend(events);
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

pub fn settle(players: &mut [&mut Player]) {
    for _ in 0..4 {
        for player in players.iter_mut() {
            player.pump();
        }
    }
}

/// Host + participants, every participant joined and event queues emptied
pub fn form_game(network: &MemoryNetwork, names: &[&str]) -> (Player, Vec<Player>) {
    let mut host = Player::new(network, "Host");
    host.service.host_session();

    let mut participants: Vec<Player> = names
        .iter()
        .map(|name| Player::new(network, name))
        .collect();

    for participant in participants.iter_mut() {
        participant.service.browse_sessions();
        participant.pump();
        participant.service.invite(&host.handle());

        host.pump();
        let position = host
            .events
            .iter()
            .position(|event| matches!(event, GameEvent::InviteReceived(_)))
            .expect("host should see invitation");
        if let GameEvent::InviteReceived(invitation) = host.events.remove(position) {
            host.service.respond_to_invite(invitation.accept());
        }

        participant.pump();
        host.pump();
    }

    let mut all: Vec<&mut Player> = std::iter::once(&mut host)
        .chain(participants.iter_mut())
        .collect();
    settle(&mut all);
    for player in all.iter_mut() {
        player.take_events();
    }

    (host, participants)
}
