//! Display boards a scoreboard session draws on

use crate::holder::{Holder, RemotePlayer};
use shared::{BoardOp, DisplayError, DisplaySlot, Packet, RichText, SidebarState};
use std::sync::Arc;

/// The per-session display substrate
///
/// Implementors only provide [`Board::apply`]; the named operations build the
/// matching [`BoardOp`].
pub trait Board: Send {
    fn apply(&mut self, op: BoardOp) -> Result<(), DisplayError>;

    fn create_objective(
        &mut self,
        name: &str,
        display_name: RichText,
        slot: DisplaySlot,
    ) -> Result<(), DisplayError> {
        self.apply(BoardOp::CreateObjective {
            name: name.to_string(),
            display_name,
            slot,
        })
    }

    fn set_display_name(&mut self, objective: &str, display_name: RichText) -> Result<(), DisplayError> {
        self.apply(BoardOp::SetDisplayName {
            objective: objective.to_string(),
            display_name,
        })
    }

    fn register_team(&mut self, name: &str) -> Result<(), DisplayError> {
        self.apply(BoardOp::RegisterTeam {
            name: name.to_string(),
        })
    }

    fn set_team_prefix(&mut self, team: &str, prefix: RichText) -> Result<(), DisplayError> {
        self.apply(BoardOp::SetTeamPrefix {
            team: team.to_string(),
            prefix,
        })
    }

    fn add_team_member(&mut self, team: &str, member: &str) -> Result<(), DisplayError> {
        self.apply(BoardOp::AddTeamMember {
            team: team.to_string(),
            member: member.to_string(),
        })
    }

    fn unregister_team(&mut self, name: &str) -> Result<(), DisplayError> {
        self.apply(BoardOp::UnregisterTeam {
            name: name.to_string(),
        })
    }

    fn set_score(&mut self, objective: &str, member: &str, score: i32) -> Result<(), DisplayError> {
        self.apply(BoardOp::SetScore {
            objective: objective.to_string(),
            member: member.to_string(),
            score,
        })
    }
}

/// A board kept in process memory
///
/// Every accepted operation is appended to a log so hosts can replay it and
/// tests can count mutations.
#[derive(Debug, Default)]
pub struct MemoryBoard {
    state: SidebarState,
    log: Vec<BoardOp>,
    fail_with: Option<DisplayError>,
}

impl MemoryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SidebarState {
        &self.state
    }

    pub fn log(&self) -> &[BoardOp] {
        &self.log
    }

    /// Number of logged operations matching the predicate
    pub fn count(&self, predicate: impl Fn(&BoardOp) -> bool) -> usize {
        self.log.iter().filter(|op| predicate(op)).count()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Makes every following operation fail with `error`; `None` heals the board
    pub fn set_failure(&mut self, error: Option<DisplayError>) {
        self.fail_with = error;
    }
}

impl Board for MemoryBoard {
    fn apply(&mut self, op: BoardOp) -> Result<(), DisplayError> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        self.state.apply(&op)?;
        self.log.push(op);
        Ok(())
    }
}

/// A board that ships every operation to a remote viewer
pub struct PacketBoard {
    player: Arc<RemotePlayer>,
    sent: u64,
}

impl PacketBoard {
    pub fn new(player: Arc<RemotePlayer>) -> Self {
        Self { player, sent: 0 }
    }

    /// Operations queued so far
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Board for PacketBoard {
    fn apply(&mut self, op: BoardOp) -> Result<(), DisplayError> {
        // A departed viewer's copy of the board is gone with it
        if matches!(op, BoardOp::UnregisterTeam { .. }) && !self.player.is_connected() {
            return Ok(());
        }
        self.player.send(Packet::Board(op))?;
        self.sent += 1;
        Ok(())
    }
}
