//! Host/client topology negotiation and record transport.
//!
//! A starting peer first tries to reach an existing host at the configured
//! address. If nobody answers within the timeout it binds the port and
//! becomes the host itself, assigning player ids to every client that
//! connects later. All socket work runs on a private tokio runtime; the
//! blocking game loop and the async side only ever meet through channels.

use log::{error, info, warn};
use shared::wire::{self, RecordBuffer, HANDSHAKE_LEN};
use shared::{Packet, PlayerId};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// The host always plays as id 1; connecting clients get 2, 3, and so on.
pub const HOST_PLAYER_ID: PlayerId = 1;
const FIRST_CLIENT_ID: PlayerId = 2;

/// Link label used when a connection does not map to a single remote
/// player, which is the case for a client's one link to the host.
pub const LINK_ANY: PlayerId = 0;

const CONNECT_TIMEOUT: Duration = Duration::from_millis(1000);
const HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Address tried for an existing host before falling back to hosting.
    pub target: String,
    /// Port used both for joining and for listening.
    pub port: u16,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            target: shared::DEFAULT_TARGET.to_string(),
            port: shared::DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    Host,
    Client,
}

/// Network happenings, drained by the session once per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// A client finished the handshake. Host side only.
    Joined { player: PlayerId },
    /// A fully framed record arrived. `from` labels the link it arrived
    /// on, not necessarily the player named inside the packet.
    Packet { from: PlayerId, packet: Packet },
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("failed to start the network runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to bind a listener on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },
}

struct PeerLink {
    player: PlayerId,
    outgoing: mpsc::UnboundedSender<Vec<u8>>,
}

/// One end of the session topology. Owns its runtime and sockets; dropping
/// the peer tears everything down.
pub struct NetworkPeer {
    runtime: Option<Runtime>,
    role: PeerRole,
    local_player: PlayerId,
    local_addr: SocketAddr,
    links: Arc<Mutex<Vec<PeerLink>>>,
    events_rx: mpsc::UnboundedReceiver<PeerEvent>,
    accept_task: Option<JoinHandle<()>>,
}

impl NetworkPeer {
    /// Tries to join a host at `config.target:config.port`; when nobody
    /// answers, binds the port and hosts.
    pub fn negotiate(config: &PeerConfig) -> Result<Self, PeerError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(PeerError::Runtime)?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let links: Arc<Mutex<Vec<PeerLink>>> = Arc::new(Mutex::new(Vec::new()));

        let address = format!("{}:{}", config.target, config.port);
        match runtime.block_on(join_host(&address)) {
            Ok((stream, player)) => {
                info!("Joined host at {} as player {}", address, player);
                let local_addr = stream
                    .local_addr()
                    .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 0)));

                let (read_half, write_half) = stream.into_split();
                let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
                runtime.spawn(write_loop(write_half, outgoing_rx));
                runtime.spawn(read_loop(read_half, LINK_ANY, events_tx));
                lock_links(&links).push(PeerLink {
                    player: LINK_ANY,
                    outgoing: outgoing_tx,
                });

                Ok(Self {
                    runtime: Some(runtime),
                    role: PeerRole::Client,
                    local_player: player,
                    local_addr,
                    links,
                    events_rx,
                    accept_task: None,
                })
            }
            Err(reason) => {
                info!("No host at {} ({}); hosting instead", address, reason);
                let listener = runtime
                    .block_on(TcpListener::bind(("0.0.0.0", config.port)))
                    .map_err(|source| PeerError::Bind {
                        port: config.port,
                        source,
                    })?;
                let local_addr = listener.local_addr().map_err(|source| PeerError::Bind {
                    port: config.port,
                    source,
                })?;
                info!("Hosting on {} as player {}", local_addr, HOST_PLAYER_ID);

                let accept_task =
                    runtime.spawn(accept_loop(listener, Arc::clone(&links), events_tx));

                Ok(Self {
                    runtime: Some(runtime),
                    role: PeerRole::Host,
                    local_player: HOST_PLAYER_ID,
                    local_addr,
                    links,
                    events_rx,
                    accept_task: Some(accept_task),
                })
            }
        }
    }

    pub fn role(&self) -> PeerRole {
        self.role
    }

    pub fn is_host(&self) -> bool {
        self.role == PeerRole::Host
    }

    pub fn local_player(&self) -> PlayerId {
        self.local_player
    }

    /// Bound address. For the host this is the listening socket, which is
    /// how tests running on an ephemeral port discover it.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Queues `packet` for every link except `exclude`. Links whose writer
    /// is gone are dropped; one dead peer never blocks the others.
    pub fn broadcast(&self, packet: &Packet, exclude: Option<PlayerId>) {
        let bytes = match wire::encode_packet(packet) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to encode packet: {}", e);
                return;
            }
        };
        lock_links(&self.links).retain(|link| {
            if exclude == Some(link.player) {
                return true;
            }
            link.outgoing.send(bytes.clone()).is_ok()
        });
    }

    /// Queues `packet` for one specific link.
    pub fn send_to(&self, player: PlayerId, packet: &Packet) {
        let bytes = match wire::encode_packet(packet) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to encode packet: {}", e);
                return;
            }
        };
        let links = lock_links(&self.links);
        match links.iter().find(|link| link.player == player) {
            Some(link) => {
                if link.outgoing.send(bytes).is_err() {
                    warn!("Dropping packet for player {}: link is gone", player);
                }
            }
            None => warn!("No link for player {}", player),
        }
    }

    /// Every event that arrived since the last poll. Never blocks; an
    /// empty frame simply returns an empty list.
    pub fn poll_incoming(&mut self) -> Vec<PeerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Tears the transport down. Safe to call more than once; later calls
    /// are no-ops.
    pub fn shutdown(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
        lock_links(&self.links).clear();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl Drop for NetworkPeer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock_links(links: &Mutex<Vec<PeerLink>>) -> MutexGuard<'_, Vec<PeerLink>> {
    links.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn join_host(address: &str) -> io::Result<(TcpStream, PlayerId)> {
    let mut stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(address))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;

    let mut greeting = [0u8; HANDSHAKE_LEN];
    timeout(HANDSHAKE_TIMEOUT, stream.read_exact(&mut greeting))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "handshake timed out"))??;
    let player = wire::decode_handshake(&greeting)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok((stream, player))
}

async fn accept_loop(
    listener: TcpListener,
    links: Arc<Mutex<Vec<PeerLink>>>,
    events: mpsc::UnboundedSender<PeerEvent>,
) {
    let mut next_player = FIRST_CLIENT_ID;
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let player = next_player;
                next_player += 1;
                info!("Client at {} connected, assigned player {}", addr, player);

                let (read_half, write_half) = stream.into_split();
                let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
                tokio::spawn(write_loop(write_half, outgoing_rx));
                tokio::spawn(read_loop(read_half, player, events.clone()));

                // The greeting rides the write queue ahead of any broadcast.
                if outgoing_tx
                    .send(wire::encode_handshake(player).to_vec())
                    .is_err()
                {
                    warn!("Client {} vanished before the handshake", player);
                    continue;
                }
                lock_links(&links).push(PeerLink {
                    player,
                    outgoing: outgoing_tx,
                });

                if events.send(PeerEvent::Joined { player }).is_err() {
                    break;
                }
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

async fn read_loop(
    mut stream: OwnedReadHalf,
    from: PlayerId,
    events: mpsc::UnboundedSender<PeerEvent>,
) {
    let mut framing = RecordBuffer::new();
    let mut chunk = [0u8; 2048];

    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => {
                info!("Link {} closed by the remote side", from);
                break;
            }
            Ok(n) => {
                framing.extend_from_slice(&chunk[..n]);
                while let Some(record) = framing.next_packet() {
                    match record {
                        Ok(packet) => {
                            if events.send(PeerEvent::Packet { from, packet }).is_err() {
                                return;
                            }
                        }
                        Err(e) => warn!("Discarding malformed record on link {}: {}", from, e),
                    }
                }
            }
            Err(e) => {
                error!("Error reading from link {}: {}", from, e);
                break;
            }
        }
    }
}

async fn write_loop(mut stream: OwnedWriteHalf, mut outgoing: mpsc::UnboundedReceiver<Vec<u8>>) {
    while let Some(bytes) = outgoing.recv().await {
        if let Err(e) = stream.write_all(&bytes).await {
            error!("Error writing to link: {}", e);
            break;
        }
    }
}
