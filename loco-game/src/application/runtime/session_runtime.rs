use super::{RuntimeConfig, MIN_POLL_INTERVAL};
use crate::application::{GameEvent, GameService};
use crate::domain::{GameMessage, WorkerFactory, WorkerRole};
use crate::error::{GameError, Result};
use loco_connection::{InviteReply, NearbyTransport, Peer, PeerHandle, PeerMessage, SessionRole};
use tokio::sync::{mpsc, oneshot, watch};

/// Operations the runtime applies to its [`GameService`]
#[derive(Debug)]
pub enum GameCommand {
    BrowseSessions,
    HostSession,
    Invite(PeerHandle),
    RespondToInvite(InviteReply),
    LeaveSession,
    SendPeerMessage(PeerMessage),
    SendGameMessage(GameMessage),
    StartGame(Option<Vec<u8>>),
}

/// Snapshot of session state (read-only, cheap to clone)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub role: SessionRole,
    pub has_started: bool,
    pub worker_role: Option<WorkerRole>,
    pub connected_peers: Vec<Peer>,
    pub known_peers: Vec<(PeerHandle, Peer)>,
}

struct Request {
    command: GameCommand,
    reply: oneshot::Sender<Result<()>>,
}

/// Background runtime for [`GameService`]
pub struct SessionRuntime {
    /// Send commands to the service
    cmd_tx: mpsc::Sender<Request>,

    /// Receive state snapshots (latest always available)
    state_rx: watch::Receiver<SessionSnapshot>,

    /// Handle to background task
    task_handle: tokio::task::JoinHandle<()>,
}

impl SessionRuntime {
    /// Spawn the service onto the current tokio runtime.
    ///
    /// Returns the runtime handle and the stream of game events.
    pub fn spawn<T, F>(
        mut service: GameService<T, F>,
        config: RuntimeConfig,
    ) -> (Self, mpsc::UnboundedReceiver<GameEvent>)
    where
        T: NearbyTransport + Send + 'static,
        F: WorkerFactory + 'static,
    {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<Request>(config.command_capacity);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(snapshot_of(&service));

        let name = service.current_peer().display_name().to_string();

        let task_handle = tokio::spawn(async move {
            let period = config.poll_interval.max(MIN_POLL_INTERVAL);
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!("🚀 SessionRuntime started for {}", name);

            loop {
                interval.tick().await;

                // 1. Apply queued commands
                loop {
                    match cmd_rx.try_recv() {
                        Ok(request) => {
                            let result = apply(&mut service, request.command);
                            if let Err(e) = &result {
                                tracing::warn!("Command failed: {}", e);
                            }
                            let _ = request.reply.send(result);
                        }
                        Err(mpsc::error::TryRecvError::Empty) => break,
                        Err(mpsc::error::TryRecvError::Disconnected) => {
                            tracing::info!("SessionRuntime for {} stopped", name);
                            return;
                        }
                    }
                }

                // 2. Poll the service (transport + workers)
                let processed = service.poll();
                if processed > 0 {
                    tracing::debug!("SessionRuntime processed {} events", processed);
                }

                // 3. Forward events; nobody listening is fine
                for event in service.drain_events() {
                    let _ = event_tx.send(event);
                }

                // 4. Publish snapshot (non-blocking)
                let _ = state_tx.send(snapshot_of(&service));
            }
        });

        (
            Self {
                cmd_tx,
                state_rx,
                task_handle,
            },
            event_rx,
        )
    }

    /// Submit a command and wait until the service has applied it
    pub async fn execute(&self, command: GameCommand) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.cmd_tx
            .send(Request { command, reply })
            .await
            .map_err(|_| GameError::RuntimeClosed)?;

        response.await.map_err(|_| GameError::RuntimeClosed)?
    }

    /// Get latest state snapshot (always succeeds, never blocks)
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }

    /// Shutdown runtime
    pub async fn shutdown(self) {
        self.task_handle.abort();
        let _ = self.task_handle.await;
    }
}

fn apply<T: NearbyTransport, F: WorkerFactory>(
    service: &mut GameService<T, F>,
    command: GameCommand,
) -> Result<()> {
    match command {
        GameCommand::BrowseSessions => service.browse_sessions(),
        GameCommand::HostSession => service.host_session(),
        GameCommand::Invite(handle) => service.invite(&handle),
        GameCommand::RespondToInvite(reply) => service.respond_to_invite(reply),
        GameCommand::LeaveSession => service.leave_session(),
        GameCommand::SendPeerMessage(message) => service.send_peer_message(message)?,
        GameCommand::SendGameMessage(message) => service.send_game_message(&message)?,
        GameCommand::StartGame(init) => service.start_game(init)?,
    }
    Ok(())
}

fn snapshot_of<T: NearbyTransport, F: WorkerFactory>(
    service: &GameService<T, F>,
) -> SessionSnapshot {
    let mut known_peers = service.peers();
    known_peers.sort_by_key(|(handle, _)| handle.id());

    SessionSnapshot {
        role: service.role(),
        has_started: service.has_started(),
        worker_role: service.worker_role(),
        connected_peers: service.connected_peers(),
        known_peers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameWorker, WorkerError, WorkerSender};
    use loco_connection::{ConnectionConfig, ConnectionManager, MemoryNetwork};

    fn refusing_factory(
        _role: WorkerRole,
        _init: Option<Vec<u8>>,
        _sender: WorkerSender,
    ) -> std::result::Result<Box<dyn GameWorker>, WorkerError> {
        Err(WorkerError::InvalidInit("no".to_string()))
    }

    #[tokio::test]
    async fn test_command_errors_reach_caller() {
        let network = MemoryNetwork::new();
        let manager = ConnectionManager::new(
            network.attach("Host", "loco-test"),
            Peer::local("Host"),
            ConnectionConfig::new("loco-test").unwrap(),
        );
        let service = GameService::new(manager, refusing_factory);
        let (runtime, _events) = SessionRuntime::spawn(service, RuntimeConfig::default());

        let result = runtime.execute(GameCommand::StartGame(None)).await;

        assert_eq!(
            result,
            Err(GameError::Worker(WorkerError::InvalidInit("no".to_string())))
        );
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_hosting_is_published() {
        let network = MemoryNetwork::new();
        let manager = ConnectionManager::new(
            network.attach("Host", "loco-test"),
            Peer::local("Host"),
            ConnectionConfig::new("loco-test").unwrap(),
        );
        let service = GameService::new(manager, refusing_factory);
        let (runtime, _events) = SessionRuntime::spawn(service, RuntimeConfig::default());
        let mut updates = runtime.subscribe();

        runtime.execute(GameCommand::HostSession).await.unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while updates.borrow_and_update().role != SessionRole::Hosting {
                updates.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        assert_eq!(runtime.snapshot().role, SessionRole::Hosting);
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_zero_poll_interval_keeps_runtime_alive() {
        let network = MemoryNetwork::new();
        let manager = ConnectionManager::new(
            network.attach("Host", "loco-test"),
            Peer::local("Host"),
            ConnectionConfig::new("loco-test").unwrap(),
        );
        let service = GameService::new(manager, refusing_factory);
        let config = RuntimeConfig {
            poll_interval: std::time::Duration::ZERO,
            ..RuntimeConfig::default()
        };
        let (runtime, _events) = SessionRuntime::spawn(service, config);

        assert_eq!(runtime.execute(GameCommand::HostSession).await, Ok(()));
        runtime.shutdown().await;
    }

    #[test]
    fn test_snapshot_default_is_idle() {
        let snapshot = SessionSnapshot::default();
        assert_eq!(snapshot.role, SessionRole::Idle);
        assert!(!snapshot.has_started);
        assert!(snapshot.connected_peers.is_empty());
    }
}
