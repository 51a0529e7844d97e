//! Connected viewer tracking for the sidebar server
//!
//! Each accepted client gets a [`RemotePlayer`] holder, a [`PacketBoard`] and
//! an activated scoreboard session. Removing a client, whether it said goodbye
//! or timed out, marks the holder as gone and deactivates its session.

use crate::board::PacketBoard;
use crate::error::ScoreboardError;
use crate::handler::ContentHandler;
use crate::holder::{Holder, RemotePlayer};
use crate::network::OutboundMessage;
use crate::scheduler::Scheduler;
use crate::session::Scoreboard;
use log::info;
use shared::CLIENT_TIMEOUT_SECS;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;

pub type RemoteScoreboard = Scoreboard<RemotePlayer, PacketBoard>;

#[derive(Debug, Error)]
pub enum JoinError {
    #[error("server full")]
    ServerFull,
    #[error("failed to start scoreboard: {0}")]
    Scoreboard(#[from] ScoreboardError),
}

/// How sessions for new clients are built
#[derive(Clone)]
pub struct SessionConfig {
    pub scheduler: Arc<dyn Scheduler>,
    pub handler: Arc<dyn ContentHandler<RemotePlayer>>,
    pub update_interval: u64,
}

/// A connected client and its scoreboard
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: u32,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
    pub player: Arc<RemotePlayer>,
    pub scoreboard: RemoteScoreboard,
}

impl Client {
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }

    /// Marks the holder as gone and stops its session
    fn shut_down(&self) {
        self.player.mark_disconnected();
        self.scoreboard.deactivate();
    }
}

pub struct ClientManager {
    clients: HashMap<u32, Client>,
    next_client_id: u32,
    max_clients: usize,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    sessions: SessionConfig,
    online: Arc<AtomicUsize>,
}

impl ClientManager {
    pub fn new(
        max_clients: usize,
        outbound: mpsc::UnboundedSender<OutboundMessage>,
        sessions: SessionConfig,
        online: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
            outbound,
            sessions,
            online,
        }
    }

    /// Accepts a new client and activates its scoreboard
    pub fn add_client(&mut self, addr: SocketAddr) -> Result<u32, JoinError> {
        if self.clients.len() >= self.max_clients {
            return Err(JoinError::ServerFull);
        }

        let client_id = self.next_client_id;
        let player = Arc::new(RemotePlayer::new(client_id, addr, self.outbound.clone()));
        let scoreboard = Scoreboard::new(
            Arc::clone(&player),
            PacketBoard::new(Arc::clone(&player)),
            Arc::clone(&self.sessions.scheduler),
        )?;
        scoreboard.set_handler(Arc::clone(&self.sessions.handler));
        scoreboard.set_update_interval(self.sessions.update_interval)?;
        scoreboard.activate()?;

        self.next_client_id += 1;
        info!("Client {} ({}) connected from {}", client_id, player.name(), addr);
        self.clients.insert(
            client_id,
            Client {
                id: client_id,
                addr,
                last_seen: Instant::now(),
                player,
                scoreboard,
            },
        );
        self.online.store(self.clients.len(), Ordering::SeqCst);

        Ok(client_id)
    }

    /// Removes a client; returns false if it was already gone
    pub fn remove_client(&mut self, client_id: &u32) -> bool {
        let Some(client) = self.clients.remove(client_id) else {
            return false;
        };

        client.shut_down();
        self.online.store(self.clients.len(), Ordering::SeqCst);
        info!("Client {} disconnected", client.id);
        true
    }

    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.clients
            .iter()
            .find(|(_, client)| client.addr == addr)
            .map(|(id, _)| *id)
    }

    /// Records activity from a client; returns false for unknown ids
    pub fn touch(&mut self, client_id: u32) -> bool {
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.last_seen = Instant::now();
            true
        } else {
            false
        }
    }

    pub fn scoreboard(&self, client_id: u32) -> Option<&RemoteScoreboard> {
        self.clients.get(&client_id).map(|client| &client.scoreboard)
    }

    /// Drops clients silent for longer than the timeout, returning their ids
    pub fn check_timeouts(&mut self) -> Vec<u32> {
        let timeout = Duration::from_secs(CLIENT_TIMEOUT_SECS);
        let timed_out: Vec<u32> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        for client_id in &timed_out {
            self.remove_client(client_id);
        }

        timed_out
    }

    pub fn get_client_addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.addr))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
