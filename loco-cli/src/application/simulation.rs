use crate::infrastructure::{CliError, Result};
use loco_connection::{
    ConnectionConfig, ConnectionManager, DEFAULT_SERVICE_TYPE, MemoryNetwork, Peer,
};
use loco_game::{
    EchoStats, EchoWorkerFactory, GameCommand, GameEvent, GameMessage, GameService, RuntimeConfig,
    SessionRuntime, SessionSnapshot, WorkerRole,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const HOST_NAME: &str = "Host";

/// Parameters for an in-memory session run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub participants: usize,
    pub seed: String,
    pub rounds: usize,
    pub service_type: String,
    pub poll_interval: Duration,
    pub step_timeout: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            participants: 2,
            seed: "seed=42".to_string(),
            rounds: 3,
            service_type: DEFAULT_SERVICE_TYPE.to_string(),
            poll_interval: Duration::from_millis(10),
            step_timeout: Duration::from_secs(10),
        }
    }
}

/// Final state of one simulated device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub name: String,
    pub role: Option<WorkerRole>,
    pub seed: String,
    pub received: usize,
    pub echoed: usize,
    pub connected: usize,
}

impl DeviceSummary {
    fn new(name: &str, stats: EchoStats, snapshot: &SessionSnapshot) -> Self {
        Self {
            name: name.to_string(),
            role: stats.role,
            seed: stats.seed,
            received: stats.received.len(),
            echoed: stats.echoed,
            connected: snapshot.connected_peers.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub devices: Vec<DeviceSummary>,
}

impl SimulationReport {
    pub fn host(&self) -> Option<&DeviceSummary> {
        self.devices.first()
    }

    pub fn participants(&self) -> &[DeviceSummary] {
        self.devices.get(1..).unwrap_or_default()
    }
}

struct Device {
    name: String,
    runtime: SessionRuntime,
    events: mpsc::UnboundedReceiver<GameEvent>,
    factory: EchoWorkerFactory,
}

impl Device {
    fn spawn(network: &MemoryNetwork, name: &str, config: &SimulationConfig) -> Result<Self> {
        let connection_config = ConnectionConfig::new(config.service_type.clone())?;
        let factory = EchoWorkerFactory::new();
        let manager = ConnectionManager::new(
            network.attach(name, connection_config.service_type()),
            Peer::local(name),
            connection_config,
        );
        let service = GameService::new(manager, factory.clone());
        let (runtime, events) = SessionRuntime::spawn(
            service,
            RuntimeConfig::default().with_poll_interval(config.poll_interval),
        );

        Ok(Self {
            name: name.to_string(),
            runtime,
            events,
            factory,
        })
    }

    fn summary(&self) -> DeviceSummary {
        DeviceSummary::new(&self.name, self.factory.stats(), &self.runtime.snapshot())
    }
}

/// Wait until the device publishes a snapshot matching `predicate`
async fn wait_for_snapshot(
    device: &Device,
    timeout: Duration,
    what: &str,
    predicate: impl Fn(&SessionSnapshot) -> bool,
) -> Result<()> {
    let mut updates = device.runtime.subscribe();
    tokio::time::timeout(timeout, async {
        loop {
            if predicate(&updates.borrow_and_update()) {
                return Ok(());
            }
            if updates.changed().await.is_err() {
                return Err(CliError::Simulation(format!("{} stopped", device.name)));
            }
        }
    })
    .await
    .map_err(|_| CliError::timed_out(what))?
}

/// Re-check `condition` every poll interval until it holds
async fn wait_until(
    config: &SimulationConfig,
    what: &str,
    condition: impl Fn() -> bool,
) -> Result<()> {
    tokio::time::timeout(config.step_timeout, async {
        while !condition() {
            tokio::time::sleep(config.poll_interval).await;
        }
    })
    .await
    .map_err(|_| CliError::timed_out(what))
}

/// Host, browse, invite, accept, start the game and exchange worker traffic,
/// all over an in-memory network.
pub async fn run_simulation(config: SimulationConfig) -> Result<SimulationReport> {
    let network = MemoryNetwork::new();

    let mut host = Device::spawn(&network, HOST_NAME, &config)?;
    host.runtime.execute(GameCommand::HostSession).await?;
    info!("🏠 {} hosting on '{}'", host.name, config.service_type);

    let mut participants = Vec::with_capacity(config.participants);
    for index in 1..=config.participants {
        let participant = Device::spawn(&network, &format!("Player{}", index), &config)?;
        join(&mut host, &participant, &config).await?;
        participants.push(participant);
    }

    let seed = config.seed.as_bytes().to_vec();
    host.runtime
        .execute(GameCommand::StartGame(Some(seed.clone())))
        .await?;
    host.runtime
        .execute(GameCommand::SendGameMessage(GameMessage::GameStarted(Some(seed))))
        .await?;
    info!("🎮 Game started with seed {:?}", config.seed);

    for participant in &participants {
        wait_for_snapshot(participant, config.step_timeout, "game start", |snapshot| {
            snapshot.has_started
        })
        .await?;
    }

    for round in 1..=config.rounds {
        for participant in &participants {
            let payload = format!("round {} from {}", round, participant.name).into_bytes();
            participant
                .runtime
                .execute(GameCommand::SendGameMessage(GameMessage::WorkerData(payload)))
                .await?;
        }
        debug!("Round {} sent", round);
    }

    let expected = config.rounds * config.participants;
    wait_until(&config, "host to receive every payload", || {
        host.factory.stats().received.len() >= expected
    })
    .await?;
    wait_until(&config, "participants to receive every echo", || {
        participants
            .iter()
            .all(|participant| participant.factory.stats().received.len() >= expected)
    })
    .await?;

    let mut devices = vec![host.summary()];
    devices.extend(participants.iter().map(Device::summary));

    drain_failures(&mut host);
    for participant in participants.iter_mut() {
        drain_failures(participant);
    }

    host.runtime.execute(GameCommand::LeaveSession).await?;
    host.runtime.shutdown().await;
    for participant in participants {
        participant.runtime.shutdown().await;
    }

    Ok(SimulationReport { devices })
}

/// Browse, invite the host and wait for both sides to see the link
async fn join(host: &mut Device, participant: &Device, config: &SimulationConfig) -> Result<()> {
    participant.runtime.execute(GameCommand::BrowseSessions).await?;
    wait_for_snapshot(participant, config.step_timeout, "host discovery", |snapshot| {
        snapshot
            .known_peers
            .iter()
            .any(|(_, peer)| peer.display_name() == HOST_NAME)
    })
    .await?;

    let host_handle = participant
        .runtime
        .snapshot()
        .known_peers
        .into_iter()
        .find(|(_, peer)| peer.display_name() == HOST_NAME)
        .map(|(handle, _)| handle)
        .ok_or_else(|| CliError::Simulation("host vanished before invite".to_string()))?;
    participant
        .runtime
        .execute(GameCommand::Invite(host_handle))
        .await?;

    let invitation = tokio::time::timeout(config.step_timeout, async {
        while let Some(event) = host.events.recv().await {
            if let GameEvent::InviteReceived(invitation) = event {
                return Some(invitation);
            }
        }
        None
    })
    .await
    .map_err(|_| CliError::timed_out("invitation"))?
    .ok_or_else(|| CliError::Simulation("host event stream closed".to_string()))?;

    info!("📨 {} asks to join", invitation.device_name());
    host.runtime
        .execute(GameCommand::RespondToInvite(invitation.accept()))
        .await?;

    wait_for_snapshot(participant, config.step_timeout, "join", |snapshot| {
        !snapshot.connected_peers.is_empty()
    })
    .await?;
    info!("✅ {} joined", participant.name);
    Ok(())
}

fn drain_failures(device: &mut Device) {
    while let Ok(event) = device.events.try_recv() {
        if let GameEvent::WorkerFailed { role, error } = event {
            warn!("{} failed to start {} worker: {}", device.name, role, error);
        }
    }
}
