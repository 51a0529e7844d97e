//! Types shared by the sidebar server and its viewers
//!
//! Holds the styled text value, the per-tick [`Entry`], the board operations
//! a session emits, and the UDP wire packets that carry them.

pub mod board;
pub mod entry;
pub mod text;

pub use board::{BoardOp, DisplayError, DisplaySlot, SidebarRow, SidebarState, Team};
pub use entry::Entry;
pub use text::{legacy, NamedColor, RichText, Span, Style};

use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;
/// Number of sidebar lines a viewer can show; valid positions are `0..MAX_LINES`
pub const MAX_LINES: i32 = 16;
pub const CLIENT_TIMEOUT_SECS: u64 = 5;
pub const KEEP_ALIVE_SECS: u64 = 1;
/// Largest UDP payload; receive buffers are this big so no frame is truncated
pub const MAX_PACKET_SIZE: usize = 65_507;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Packet {
    Connect { client_version: u32 },
    KeepAlive,
    Disconnect,

    Connected { client_id: u32 },
    Board(BoardOp),
    Disconnected { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_serialization_connect() {
        let packet = Packet::Connect { client_version: 42 };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Connect { client_version } => assert_eq!(client_version, 42),
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_board_prefix() {
        let prefix = legacy::deserialize("§6§lGold");
        let packet = Packet::Board(BoardOp::SetTeamPrefix {
            team: "line3".to_string(),
            prefix: prefix.clone(),
        });

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Board(BoardOp::SetTeamPrefix { team, prefix: p }) => {
                assert_eq!(team, "line3");
                assert_eq!(p, prefix);
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }
}
