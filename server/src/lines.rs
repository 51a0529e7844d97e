//! Line registry: sidebar positions mapped onto board teams
//!
//! A board can only show scored members, and member names must be unique.
//! Each line therefore gets its own team, whose prefix carries the visible
//! text, and a hidden placeholder member whose score orders the line.
//!
//! Placeholder tokens are a color code chosen by position followed by a
//! reset: `§<hex digit>§r`. They render as nothing and can never collide
//! with a real player name, which cannot contain the section sign. The
//! mapping is injective over `0..MAX_LINES` only, so positions outside that
//! range are rejected.

use crate::board::Board;
use crate::error::ScoreboardError;
use log::{debug, warn};
use shared::{legacy::SECTION_SIGN, MAX_LINES};
use std::collections::BTreeMap;

/// Hidden member name for a line position
pub fn token_for(position: i32) -> Result<String, ScoreboardError> {
    if !(0..MAX_LINES).contains(&position) {
        return Err(ScoreboardError::PositionOutOfRange { position });
    }
    let digit = char::from_digit(position as u32, 16)
        .ok_or(ScoreboardError::PositionOutOfRange { position })?;
    Ok(format!("{SECTION_SIGN}{digit}{SECTION_SIGN}r"))
}

/// Team name for a line position
pub fn team_name(position: i32) -> String {
    format!("line{}", position)
}

/// A line that has been materialized on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSlot {
    position: i32,
    team: String,
    token: String,
}

impl LineSlot {
    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Slots created for one session, keyed by position
#[derive(Debug, Default)]
pub struct LineRegistry {
    slots: BTreeMap<i32, LineSlot>,
}

impl LineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `position`, registering its team on first use
    ///
    /// An existing slot is returned untouched: no board operation is issued.
    pub fn slot_for<B: Board + ?Sized>(
        &mut self,
        position: i32,
        board: &mut B,
    ) -> Result<&LineSlot, ScoreboardError> {
        if !self.slots.contains_key(&position) {
            let slot = Self::create_slot(position, board)?;
            self.slots.insert(position, slot);
        }
        self.slots
            .get(&position)
            .ok_or(ScoreboardError::PositionOutOfRange { position })
    }

    fn create_slot<B: Board + ?Sized>(position: i32, board: &mut B) -> Result<LineSlot, ScoreboardError> {
        let token = token_for(position)?;
        let team = team_name(position);

        board.register_team(&team)?;
        if let Err(e) = board.add_team_member(&team, &token) {
            // Leave no half-built team behind so the next attempt can register again
            if let Err(rollback) = board.unregister_team(&team) {
                warn!("Failed to roll back team {}: {}", team, rollback);
            }
            return Err(e.into());
        }

        debug!("Created line slot {} ({})", position, team);
        Ok(LineSlot {
            position,
            team,
            token,
        })
    }

    pub fn get(&self, position: i32) -> Option<&LineSlot> {
        self.slots.get(&position)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn positions(&self) -> Vec<i32> {
        self.slots.keys().copied().collect()
    }

    /// Forgets every slot and unregisters its team
    ///
    /// The mapping is cleared even when unregistering fails.
    pub fn release_all<B: Board + ?Sized>(&mut self, board: &mut B) {
        let slots = std::mem::take(&mut self.slots);
        debug!("Releasing {} line slots", slots.len());

        for slot in slots.values() {
            if let Err(e) = board.unregister_team(&slot.team) {
                warn!("Failed to unregister team {}: {}", slot.team, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::MemoryBoard;
    use shared::{BoardOp, DisplayError};
    use std::collections::HashSet;

    #[test]
    fn test_tokens_are_injective_over_range() {
        let tokens: HashSet<String> = (0..MAX_LINES).map(|p| token_for(p).unwrap()).collect();
        assert_eq!(tokens.len(), MAX_LINES as usize);
    }

    #[test]
    fn test_tokens_render_invisible() {
        for position in 0..MAX_LINES {
            let token = token_for(position).unwrap();
            assert_eq!(shared::legacy::deserialize(&token).plain_text(), "");
        }
        assert_eq!(token_for(10).unwrap(), "§a§r");
    }

    #[test]
    fn test_out_of_range_positions_are_rejected() {
        let mut registry = LineRegistry::new();
        let mut board = MemoryBoard::new();

        for position in [-1, MAX_LINES, 100] {
            assert_eq!(
                registry.slot_for(position, &mut board),
                Err(ScoreboardError::PositionOutOfRange { position })
            );
        }
        assert!(registry.is_empty());
        assert!(board.log().is_empty());
    }

    #[test]
    fn test_slot_is_created_once() {
        let mut registry = LineRegistry::new();
        let mut board = MemoryBoard::new();

        let first = registry.slot_for(5, &mut board).unwrap().clone();
        let second = registry.slot_for(5, &mut board).unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(first.team(), "line5");
        assert_eq!(
            board.count(|op| matches!(op, BoardOp::RegisterTeam { .. })),
            1
        );
        assert_eq!(board.state().team_of(first.token()), Some("line5"));
    }

    #[test]
    fn test_failed_registration_stores_nothing() {
        let mut registry = LineRegistry::new();
        let mut board = MemoryBoard::new();
        board.register_team("line2").unwrap();

        assert_eq!(
            registry.slot_for(2, &mut board),
            Err(ScoreboardError::Display(DisplayError::TeamExists(
                "line2".to_string()
            )))
        );
        assert!(registry.get(2).is_none());
    }

    #[test]
    fn test_release_all_unregisters_teams() {
        let mut registry = LineRegistry::new();
        let mut board = MemoryBoard::new();
        for position in [1, 3, 7] {
            registry.slot_for(position, &mut board).unwrap();
        }
        assert_eq!(registry.positions(), vec![1, 3, 7]);

        registry.release_all(&mut board);

        assert!(registry.is_empty());
        assert_eq!(board.state().team_count(), 0);

        // Positions can be claimed again once released
        registry.slot_for(3, &mut board).unwrap();
        assert_eq!(board.state().team_of(&token_for(3).unwrap()), Some("line3"));
    }

    #[test]
    fn test_release_all_continues_past_failures() {
        let mut registry = LineRegistry::new();
        let mut board = MemoryBoard::new();
        registry.slot_for(0, &mut board).unwrap();
        registry.slot_for(1, &mut board).unwrap();
        board.set_failure(Some(DisplayError::Disconnected));

        registry.release_all(&mut board);
        assert!(registry.is_empty());
    }
}
