//! Players that view a scoreboard
//!
//! A [`Holder`] is the viewer a session renders for. The session only needs
//! to know whether the viewer is still around and how to switch what the
//! viewer's sidebar shows.

use crate::network::OutboundMessage;
use log::debug;
use parking_lot::Mutex;
use shared::{BoardOp, DisplayError, DisplaySlot, Packet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

/// What a holder's sidebar is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// The named objective of a session board
    Board(String),
    /// The host's default display
    Default,
}

impl View {
    fn objective(&self) -> Option<String> {
        match self {
            View::Board(objective) => Some(objective.clone()),
            View::Default => None,
        }
    }
}

pub trait Holder: Send + Sync {
    fn id(&self) -> u32;

    fn name(&self) -> &str;

    fn is_connected(&self) -> bool;

    /// Switches the viewer's sidebar
    fn show(&self, view: View) -> Result<(), DisplayError>;
}

/// A viewer connected over UDP
///
/// Board frames are queued on the server's outbound channel. Once the
/// connection flag is cleared, or the channel is gone, every send fails with
/// [`DisplayError::Disconnected`].
#[derive(Debug)]
pub struct RemotePlayer {
    id: u32,
    name: String,
    addr: SocketAddr,
    connected: AtomicBool,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
}

impl RemotePlayer {
    pub fn new(id: u32, addr: SocketAddr, outbound: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self {
            id,
            name: format!("Player{}", id),
            addr,
            connected: AtomicBool::new(true),
            outbound,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Queues a packet for this player
    pub fn send(&self, packet: Packet) -> Result<(), DisplayError> {
        if !self.is_connected() {
            return Err(DisplayError::Disconnected);
        }

        self.outbound
            .send(OutboundMessage {
                packet,
                addr: self.addr,
            })
            .map_err(|_| {
                debug!("Outbound queue closed for player {}", self.id);
                DisplayError::Disconnected
            })
    }
}

impl Holder for RemotePlayer {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn show(&self, view: View) -> Result<(), DisplayError> {
        self.send(Packet::Board(BoardOp::ShowObjective {
            slot: DisplaySlot::Sidebar,
            objective: view.objective(),
        }))
    }
}

/// An in-process viewer that records every view it is switched to
#[derive(Debug)]
pub struct LocalPlayer {
    id: u32,
    name: String,
    connected: AtomicBool,
    views: Mutex<Vec<View>>,
}

impl LocalPlayer {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            connected: AtomicBool::new(true),
            views: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn reconnect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Every view shown so far, oldest first
    pub fn views(&self) -> Vec<View> {
        self.views.lock().clone()
    }

    pub fn current_view(&self) -> View {
        self.views.lock().last().cloned().unwrap_or(View::Default)
    }
}

impl Holder for LocalPlayer {
    fn id(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn show(&self, view: View) -> Result<(), DisplayError> {
        if !self.is_connected() {
            return Err(DisplayError::Disconnected);
        }
        self.views.lock().push(view);
        Ok(())
    }
}
