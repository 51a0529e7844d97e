//! Server network layer: UDP transport and client lifecycle

use crate::arena::ArenaHandler;
use crate::client_manager::{ClientManager, JoinError, SessionConfig};
use crate::config::ServerConfig;
use crate::handler::ContentHandler;
use crate::holder::RemotePlayer;
use crate::scheduler::{Scheduler, TokioScheduler};
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, MAX_PACKET_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    ClientTimeout { client_id: u32 },
}

/// A packet queued for one client address
#[derive(Debug)]
pub struct OutboundMessage {
    pub packet: Packet,
    pub addr: SocketAddr,
}

/// Main server accepting viewers and driving their scoreboards
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: Arc<RwLock<ClientManager>>,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    outbound_tx: mpsc::UnboundedSender<OutboundMessage>,
    outbound_rx: Option<mpsc::UnboundedReceiver<OutboundMessage>>,
}

impl Server {
    /// Binds the server with the bundled arena board
    pub async fn new(config: ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let online = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(ArenaHandler::new(Arc::clone(&online)));
        Self::with_handler(config, handler, online).await
    }

    /// Binds the server with a custom content handler
    ///
    /// `online` is kept in sync with the number of connected clients.
    pub async fn with_handler(
        config: ServerConfig,
        handler: Arc<dyn ContentHandler<RemotePlayer>>,
        online: Arc<AtomicUsize>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;

        let address = config.address();
        let socket = Arc::new(UdpSocket::bind(&address).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::new(config.tick_duration())?);
        let sessions = SessionConfig {
            scheduler,
            handler,
            update_interval: config.update_interval,
        };

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let clients = ClientManager::new(config.max_clients, outbound_tx.clone(), sessions, online);

        Ok(Server {
            socket,
            clients: Arc::new(RwLock::new(clients)),
            server_tx,
            server_rx,
            outbound_tx,
            outbound_rx: Some(outbound_rx),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that continuously listens for incoming packets
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = vec![0u8; MAX_PACKET_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that drains the outgoing packet queue
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let Some(mut outbound_rx) = self.outbound_rx.take() else {
            return;
        };

        tokio::spawn(async move {
            while let Some(OutboundMessage { packet, addr }) = outbound_rx.recv().await {
                if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                    error!("Failed to send packet to {}: {}", addr, e);
                }
            }
        });
    }

    /// Spawns task that monitors client timeouts
    fn spawn_timeout_checker(&self) {
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut clients_guard = clients.write().await;
                    clients_guard.check_timeouts()
                };

                for client_id in timed_out {
                    if let Err(e) = server_tx.send(ServerMessage::ClientTimeout { client_id }) {
                        error!("Failed to send timeout message: {}", e);
                        return;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.outbound_tx.send(OutboundMessage { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    /// Processes one packet from a client
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect { client_version } => {
                info!(
                    "Client connecting from {} (version: {})",
                    addr, client_version
                );

                if client_version != PROTOCOL_VERSION {
                    warn!(
                        "Rejecting {}: protocol {} != {}",
                        addr, client_version, PROTOCOL_VERSION
                    );
                    self.send_packet(
                        Packet::Disconnected {
                            reason: format!("Unsupported protocol version {}", client_version),
                        },
                        addr,
                    );
                    return;
                }

                let mut clients = self.clients.write().await;

                // Replace any earlier connection from the same address
                if let Some(existing_id) = clients.find_client_by_addr(addr) {
                    info!("Removing existing client {} from {}", existing_id, addr);
                    clients.remove_client(&existing_id);
                }

                let response = match clients.add_client(addr) {
                    Ok(client_id) => Packet::Connected { client_id },
                    Err(JoinError::ServerFull) => Packet::Disconnected {
                        reason: "Server full".to_string(),
                    },
                    Err(e) => {
                        error!("Failed to join client from {}: {}", addr, e);
                        Packet::Disconnected {
                            reason: e.to_string(),
                        }
                    }
                };
                drop(clients);
                self.send_packet(response, addr);
            }

            Packet::KeepAlive => {
                let mut clients = self.clients.write().await;
                if let Some(client_id) = clients.find_client_by_addr(addr) {
                    clients.touch(client_id);
                } else {
                    debug!("Keep-alive from unknown address {}", addr);
                }
            }

            Packet::Disconnect => {
                let mut clients = self.clients.write().await;
                if let Some(client_id) = clients.find_client_by_addr(addr) {
                    clients.remove_client(&client_id);
                }
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    /// Main server loop
    ///
    /// Scoreboard updates run on the scheduler; this loop only reacts to
    /// client traffic and timeouts.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_network_sender();
        self.spawn_timeout_checker();

        info!("Server started successfully");

        while let Some(message) = self.server_rx.recv().await {
            match message {
                ServerMessage::PacketReceived { packet, addr } => {
                    self.handle_packet(packet, addr).await;
                }
                ServerMessage::ClientTimeout { client_id } => {
                    let remaining = self.clients.read().await.len();
                    info!("Client {} timed out, {} still online", client_id, remaining);
                }
            }
        }

        info!("Server shutting down");
        Ok(())
    }
}
