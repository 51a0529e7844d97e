//! Client networking: joins the server and mirrors the streamed board
//!
//! The socket runs on its own thread with a tokio runtime so the render loop
//! never blocks on I/O. Received board operations are applied to a shared
//! [`BoardView`] that the renderer reads every frame.

use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use shared::{Packet, SidebarState, KEEP_ALIVE_SECS, MAX_PACKET_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::interval;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected { client_id: u32 },
    Disconnected { reason: String },
}

/// What the client currently knows about its sidebar
#[derive(Debug, Clone)]
pub struct BoardView {
    pub status: ConnectionStatus,
    pub board: SidebarState,
    /// Board operations the server sent that could not be applied
    pub rejected: u64,
}

impl BoardView {
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            board: SidebarState::new(),
            rejected: 0,
        }
    }

    /// Applies one packet from the server
    pub fn handle_packet(&mut self, packet: Packet) {
        match packet {
            Packet::Connected { client_id } => {
                info!("Connected! Client ID: {}", client_id);
                self.status = ConnectionStatus::Connected { client_id };
            }

            Packet::Board(op) => {
                if let Err(e) = self.board.apply(&op) {
                    warn!("Ignoring board operation {:?}: {}", op, e);
                    self.rejected += 1;
                }
            }

            Packet::Disconnected { reason } => {
                warn!("Disconnected: {}", reason);
                self.status = ConnectionStatus::Disconnected { reason };
                self.board = SidebarState::new();
            }

            _ => {
                warn!("Unexpected packet type");
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connected { .. })
    }
}

impl Default for BoardView {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the background networking thread
pub struct NetworkClient {
    view: Arc<Mutex<BoardView>>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl NetworkClient {
    /// Starts connecting to `server_addr` in the background
    pub fn spawn(server_addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let server_addr: SocketAddr = server_addr.parse()?;
        let view = Arc::new(Mutex::new(BoardView::new()));
        let running = Arc::new(AtomicBool::new(true));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let thread = {
            let view = Arc::clone(&view);
            let running = Arc::clone(&running);
            std::thread::Builder::new()
                .name("sidebar-net".to_string())
                .spawn(move || {
                    if let Err(e) = runtime.block_on(run(server_addr, view, running)) {
                        error!("Network thread stopped: {}", e);
                    }
                })?
        };

        Ok(Self {
            view,
            running,
            thread: Some(thread),
        })
    }

    /// Shared view the renderer reads
    pub fn view(&self) -> Arc<Mutex<BoardView>> {
        Arc::clone(&self.view)
    }

    /// Says goodbye to the server and waits for the thread to finish
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Network thread panicked");
            }
        }
    }
}

impl Drop for NetworkClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn send_packet(
    socket: &UdpSocket,
    packet: &Packet,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = serialize(packet)?;
    socket.send_to(&data, addr).await?;
    Ok(())
}

async fn run(
    server_addr: SocketAddr,
    view: Arc<Mutex<BoardView>>,
    running: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;

    info!("Connecting to server at {}...", server_addr);
    send_packet(
        &socket,
        &Packet::Connect {
            client_version: PROTOCOL_VERSION,
        },
        server_addr,
    )
    .await?;

    let mut keep_alive = interval(Duration::from_secs(KEEP_ALIVE_SECS));
    let mut shutdown_poll = interval(Duration::from_millis(50));
    let mut buffer = vec![0u8; MAX_PACKET_SIZE];

    while running.load(Ordering::SeqCst) {
        tokio::select! {
            result = socket.recv_from(&mut buffer) => {
                match result {
                    Ok((len, from)) if from == server_addr => {
                        match deserialize::<Packet>(&buffer[0..len]) {
                            Ok(packet) => view.lock().handle_packet(packet),
                            Err(e) => warn!("Failed to deserialize packet: {}", e),
                        }
                    }
                    Ok((_, from)) => debug!("Ignoring packet from {}", from),
                    Err(e) => error!("Error receiving packet: {}", e),
                }
            },

            _ = keep_alive.tick() => {
                if view.lock().is_connected() {
                    if let Err(e) = send_packet(&socket, &Packet::KeepAlive, server_addr).await {
                        error!("Error sending keep-alive: {}", e);
                    }
                }
            },

            _ = shutdown_poll.tick() => {},
        }
    }

    if view.lock().is_connected() {
        let _ = send_packet(&socket, &Packet::Disconnect, server_addr).await;
    }

    Ok(())
}
