//! # Sidebar Viewer Library
//!
//! A remote viewer for sidebar scoreboards. The client joins a sidebar
//! server over UDP, replays the board operations the server streams into a
//! local [`shared::SidebarState`] and draws the sidebar every frame.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! - UDP connection handshake and keep-alives
//! - Packet deserialization on a background thread
//! - The shared [`network::BoardView`] the renderer reads
//!
//! ### Rendering Module (`rendering`)
//! - Sidebar panel at the right edge of the window
//! - Styled spans drawn in their legacy colors, scores right-aligned
//! - Pure layout math in [`rendering::layout`]
//!
//! ## Usage Example
//!
//! ```rust
//! use client::network::BoardView;
//! use shared::{BoardOp, DisplaySlot, Packet, RichText};
//!
//! let mut view = BoardView::new();
//! view.handle_packet(Packet::Board(BoardOp::CreateObjective {
//!     name: "board".to_string(),
//!     display_name: RichText::plain("Lobby"),
//!     slot: DisplaySlot::Sidebar,
//! }));
//! view.handle_packet(Packet::Board(BoardOp::ShowObjective {
//!     slot: DisplaySlot::Sidebar,
//!     objective: Some("board".to_string()),
//! }));
//!
//! assert_eq!(view.board.sidebar_objective(), Some("board"));
//! ```

pub mod network;
pub mod rendering;
