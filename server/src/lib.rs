//! # Sidebar Server Library
//!
//! Per-player sidebar scoreboards with flicker-free line updates, plus a small
//! UDP host that streams each player's board to a remote viewer.
//!
//! ## Core Responsibilities
//!
//! ### Scoreboard Sessions
//! A [`Scoreboard`] binds one holder to one board. Once activated it asks its
//! [`ContentHandler`] for a title and a list of entries on a fixed tick
//! interval and writes only what changed.
//!
//! ### Flicker-Free Lines
//! Each sidebar position is backed by an invisible unique token whose visible
//! text is the prefix of a per-position team. Changing a line rewrites the
//! prefix instead of removing and re-adding a score, so the viewer never sees
//! the line disappear for a frame.
//!
//! ### Client Management
//! Handles the lifecycle of remote viewers:
//! - Connection establishment and session activation
//! - Keep-alive tracking and timeout detection
//! - Disconnection handling and session teardown
//!
//! ## Module Organization
//!
//! - `session`: activation state machine and the per-tick render
//! - `lines`: position to token/team registry
//! - `board`: the [`Board`] substrate trait with in-memory and packet backends
//! - `holder`: viewers a session renders for
//! - `handler`: content providers
//! - `format`: title markup formatting
//! - `scheduler`: repeating task scheduling on tokio or a manual clock
//! - `client_manager`, `network`, `config`, `arena`: the bundled UDP host
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new(ServerConfig::default()).await?;
//!
//!     // Accepts viewers, activates a scoreboard per viewer and streams
//!     // board operations until the process is stopped
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! Embedding a scoreboard without the network host:
//!
//! ```rust
//! use server::{ContentHandler, LocalPlayer, ManualScheduler, MemoryBoard, Scheduler, Scoreboard, SnapshotHandler};
//! use shared::Entry;
//! use std::sync::Arc;
//!
//! let player = Arc::new(LocalPlayer::new(1, "Steve"));
//! let scheduler = Arc::new(ManualScheduler::new());
//! let handler = Arc::new(SnapshotHandler::new());
//! handler.set_title("&6Lobby");
//! handler.set_entries(vec![Entry::new("§aWelcome", 1)]);
//!
//! let board = Scoreboard::new(player, MemoryBoard::new(), scheduler.clone() as Arc<dyn Scheduler>).unwrap();
//! board.set_handler(handler as Arc<dyn ContentHandler<LocalPlayer>>);
//! board.activate().unwrap();
//! scheduler.tick();
//!
//! assert_eq!(board.line_count(), 1);
//! ```

pub mod arena;
pub mod board;
pub mod client_manager;
pub mod config;
pub mod error;
pub mod format;
pub mod handler;
pub mod holder;
pub mod lines;
pub mod network;
pub mod scheduler;
pub mod session;

pub use board::{Board, MemoryBoard, PacketBoard};
pub use error::ScoreboardError;
pub use format::{LegacyFormatter, TextFormatter};
pub use handler::{ContentHandler, SnapshotHandler};
pub use holder::{Holder, LocalPlayer, RemotePlayer, View};
pub use lines::{LineRegistry, LineSlot};
pub use scheduler::{ManualScheduler, Scheduler, TaskHandle, TokioScheduler};
pub use session::Scoreboard;
