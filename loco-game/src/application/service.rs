use crate::application::GameEvent;
use crate::domain::{
    GameMessage, GameWorker, WorkerError, WorkerFactory, WorkerOutput, WorkerRole, WorkerSender,
};
use crate::error::Result;
use loco_connection::{
    ConnectionEvent, ConnectionManager, InviteReply, NearbyTransport, Peer, PeerHandle,
    PeerMessage, SessionRole,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

struct ActiveWorker {
    role: WorkerRole,
    worker: Box<dyn GameWorker>,
    outputs: mpsc::UnboundedReceiver<WorkerOutput>,
}

/// Game orchestrator.
///
/// Owns the connection core, interprets opaque payloads as [`GameMessage`]s
/// and drives at most one [`GameWorker`] at a time.
pub struct GameService<T: NearbyTransport, F: WorkerFactory> {
    connection: ConnectionManager<T>,
    factory: F,
    active: Option<ActiveWorker>,
    has_started: bool,
    outbound: Vec<GameEvent>,
}

impl<T: NearbyTransport, F: WorkerFactory> GameService<T, F> {
    pub fn new(connection: ConnectionManager<T>, factory: F) -> Self {
        Self {
            connection,
            factory,
            active: None,
            has_started: false,
            outbound: Vec::new(),
        }
    }

    pub fn connection(&self) -> &ConnectionManager<T> {
        &self.connection
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn current_peer(&self) -> &Peer {
        self.connection.current_peer()
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    pub fn role(&self) -> SessionRole {
        self.connection.role()
    }

    /// Role of the running worker, if any
    pub fn worker_role(&self) -> Option<WorkerRole> {
        self.active.as_ref().map(|active| active.role)
    }

    pub fn connected_peers(&self) -> Vec<Peer> {
        self.connection.connected_peers()
    }

    pub fn peers(&self) -> Vec<(PeerHandle, Peer)> {
        self.connection.peers()
    }

    pub fn browse_sessions(&mut self) {
        self.connection.browse_sessions();
    }

    pub fn host_session(&mut self) {
        self.connection.host_session();
    }

    pub fn invite(&mut self, peer: &PeerHandle) {
        self.connection.invite(peer);
    }

    pub fn respond_to_invite(&mut self, reply: InviteReply) {
        self.connection.respond(reply);
    }

    /// Leave the session and tear down the running worker
    pub fn leave_session(&mut self) {
        self.connection.leave_session();

        if let Some(active) = self.active.take() {
            debug!("🧹 Dropping {} worker", active.role);
        }
        self.has_started = false;
    }

    pub fn send_peer_message(&mut self, message: PeerMessage) -> Result<()> {
        self.connection.send_message(message)?;
        Ok(())
    }

    /// Broadcast a game message. Encoding failures are logged and dropped.
    pub fn send_game_message(&mut self, message: &GameMessage) -> Result<()> {
        let bytes = match message.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to encode game message: {}", e);
                return Ok(());
            }
        };

        self.connection.send(&bytes)?;
        Ok(())
    }

    /// Start the game locally as host.
    ///
    /// Participants only start once the host broadcasts
    /// [`GameMessage::GameStarted`].
    pub fn start_game(&mut self, init: Option<Vec<u8>>) -> Result<()> {
        self.start_worker(WorkerRole::Host, init)?;
        Ok(())
    }

    /// Pump the connection core and route everything it produced.
    ///
    /// Returns the number of connection events processed.
    pub fn poll(&mut self) -> usize {
        self.connection.poll();

        let events = self.connection.drain_events();
        let count = events.len();
        for event in events {
            self.handle_connection_event(event);
        }

        self.flush_worker_output();

        count
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbound)
    }

    fn handle_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::DataReceived(data) => self.handle_data(data),
            ConnectionEvent::MessageReceived(message) => {
                self.outbound.push(GameEvent::PeerMessageReceived(message));
            }
            ConnectionEvent::HostsChanged(hosts) => {
                self.outbound.push(GameEvent::HostsChanged(hosts));
            }
            ConnectionEvent::InviteReceived(invitation) => {
                self.outbound.push(GameEvent::InviteReceived(invitation));
            }
        }
    }

    fn handle_data(&mut self, data: Vec<u8>) {
        let message = match GameMessage::decode(&data) {
            Ok(message) => message,
            Err(e) => {
                trace!("Dropping {} undecodable bytes: {}", data.len(), e);
                return;
            }
        };

        match message {
            GameMessage::GameStarted(init) => {
                info!("🎮 Host started the game");
                if let Err(e) = self.start_worker(WorkerRole::Participant, init) {
                    error!("Failed to build participant worker: {}", e);
                    self.outbound.push(GameEvent::WorkerFailed {
                        role: WorkerRole::Participant,
                        error: e,
                    });
                }
            }
            GameMessage::WorkerData(payload) => match self.active.as_mut() {
                Some(active) => active.worker.on_data(payload),
                None => trace!("No worker running, dropping {} bytes", payload.len()),
            },
        }
    }

    fn start_worker(
        &mut self,
        role: WorkerRole,
        init: Option<Vec<u8>>,
    ) -> std::result::Result<(), WorkerError> {
        // A new start always supersedes the previous worker
        self.active = None;
        self.has_started = false;

        let (tx, outputs) = mpsc::unbounded_channel();
        let worker = self.factory.build(role, init, WorkerSender::new(tx))?;

        info!("✅ {} worker running", role);
        self.active = Some(ActiveWorker {
            role,
            worker,
            outputs,
        });
        self.has_started = true;
        Ok(())
    }

    fn flush_worker_output(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        while let Ok(output) = active.outputs.try_recv() {
            Self::forward(&mut self.connection, output);
        }
    }

    fn forward(connection: &mut ConnectionManager<T>, output: WorkerOutput) {
        let bytes = match GameMessage::WorkerData(output.payload).encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to encode worker output: {}", e);
                return;
            }
        };

        let result = match &output.to {
            Some(peer) => connection.send_to(&bytes, peer),
            None => connection.send(&bytes),
        };

        if let Err(e) = result {
            warn!("Failed to deliver worker output: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loco_connection::{ConnectionConfig, MemoryNetwork, MemoryTransport};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(WorkerRole, Vec<u8>)>>>;

    struct Recorder {
        role: WorkerRole,
        log: Log,
    }

    impl GameWorker for Recorder {
        fn on_data(&mut self, data: Vec<u8>) {
            self.log.lock().unwrap().push((self.role, data));
        }
    }

    struct RecordingFactory {
        log: Log,
        builds: Arc<Mutex<Vec<(WorkerRole, Option<Vec<u8>>)>>>,
        fail: bool,
    }

    impl RecordingFactory {
        fn new() -> Self {
            Self {
                log: Arc::default(),
                builds: Arc::default(),
                fail: false,
            }
        }
    }

    impl WorkerFactory for RecordingFactory {
        fn build(
            &self,
            role: WorkerRole,
            init: Option<Vec<u8>>,
            _sender: WorkerSender,
        ) -> std::result::Result<Box<dyn GameWorker>, WorkerError> {
            self.builds.lock().unwrap().push((role, init));
            if self.fail {
                return Err(WorkerError::Build("refused".to_string()));
            }
            Ok(Box::new(Recorder {
                role,
                log: self.log.clone(),
            }))
        }
    }

    fn service(network: &MemoryNetwork) -> GameService<MemoryTransport, RecordingFactory> {
        let transport = network.attach("Solo", "loco-test");
        let manager = ConnectionManager::new(
            transport,
            Peer::local("Solo"),
            ConnectionConfig::new("loco-test").unwrap(),
        );
        GameService::new(manager, RecordingFactory::new())
    }

    fn inject(service: &GameService<MemoryTransport, RecordingFactory>, data: Vec<u8>) {
        let transport = service.connection().transport();
        transport.network().inject(
            &transport.local_handle(),
            loco_connection::TransportEvent::DataReceived {
                from: PeerHandle::new("Ghost"),
                data,
            },
        );
    }

    #[test]
    fn test_start_game_builds_host_worker() {
        let network = MemoryNetwork::new();
        let mut service = service(&network);

        assert!(!service.has_started());
        service.start_game(Some(b"seed".to_vec())).unwrap();

        assert!(service.has_started());
        assert_eq!(service.worker_role(), Some(WorkerRole::Host));
        assert_eq!(
            *service.factory().builds.lock().unwrap(),
            vec![(WorkerRole::Host, Some(b"seed".to_vec()))]
        );
    }

    #[test]
    fn test_failed_start_reports_error_and_stays_idle() {
        let network = MemoryNetwork::new();
        let mut service = service(&network);
        service.factory.fail = true;

        let err = service.start_game(None).unwrap_err();

        assert!(matches!(err, crate::GameError::Worker(WorkerError::Build(_))));
        assert!(!service.has_started());
        assert_eq!(service.worker_role(), None);
    }

    #[test]
    fn test_game_started_builds_participant_worker() {
        let network = MemoryNetwork::new();
        let mut service = service(&network);

        inject(
            &service,
            GameMessage::GameStarted(Some(b"seed=42".to_vec())).encode().unwrap(),
        );
        service.poll();

        assert!(service.has_started());
        assert_eq!(service.worker_role(), Some(WorkerRole::Participant));
        assert!(service.drain_events().is_empty());
    }

    #[test]
    fn test_participant_build_failure_emits_event() {
        let network = MemoryNetwork::new();
        let mut service = service(&network);
        service.factory.fail = true;

        inject(&service, GameMessage::GameStarted(None).encode().unwrap());
        service.poll();

        assert!(!service.has_started());
        let events = service.drain_events();
        assert!(matches!(
            events.as_slice(),
            [GameEvent::WorkerFailed {
                role: WorkerRole::Participant,
                error: WorkerError::Build(_)
            }]
        ));
    }

    #[test]
    fn test_worker_data_routed_to_worker_only() {
        let network = MemoryNetwork::new();
        let mut service = service(&network);
        service.start_game(None).unwrap();

        inject(&service, GameMessage::WorkerData(vec![1, 2, 3]).encode().unwrap());
        service.poll();

        assert_eq!(
            *service.factory().log.lock().unwrap(),
            vec![(WorkerRole::Host, vec![1, 2, 3])]
        );
        assert!(service.drain_events().is_empty());
    }

    #[test]
    fn test_worker_data_without_worker_is_dropped() {
        let network = MemoryNetwork::new();
        let mut service = service(&network);

        inject(&service, GameMessage::WorkerData(vec![9]).encode().unwrap());
        service.poll();

        assert!(!service.has_started());
        assert!(service.factory().log.lock().unwrap().is_empty());
        assert!(service.drain_events().is_empty());
    }

    #[test]
    fn test_undecodable_bytes_are_dropped() {
        let network = MemoryNetwork::new();
        let mut service = service(&network);
        service.start_game(None).unwrap();

        inject(&service, vec![0xFF, 0x00]);
        service.poll();

        assert!(service.factory().log.lock().unwrap().is_empty());
        assert!(service.drain_events().is_empty());
    }

    #[test]
    fn test_control_messages_surface_as_events() {
        let network = MemoryNetwork::new();
        let mut service = service(&network);

        inject(&service, PeerMessage::SessionEnded.encode().unwrap());
        service.poll();

        let events = service.drain_events();
        assert!(matches!(
            events.as_slice(),
            [GameEvent::PeerMessageReceived(PeerMessage::SessionEnded)]
        ));
    }

    #[test]
    fn test_leave_session_drops_worker() {
        let network = MemoryNetwork::new();
        let mut service = service(&network);
        service.start_game(None).unwrap();

        service.leave_session();

        assert!(!service.has_started());
        assert_eq!(service.worker_role(), None);
    }

    #[test]
    fn test_send_without_session_is_noop() {
        let network = MemoryNetwork::new();
        let mut service = service(&network);

        assert!(service
            .send_game_message(&GameMessage::GameStarted(None))
            .is_ok());
        assert!(service.send_peer_message(PeerMessage::RefreshPeers).is_ok());
    }
}
