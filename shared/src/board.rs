//! Display board operations and the state they build up
//!
//! Every mutation a scoreboard session can make on a viewer's board is a
//! [`BoardOp`]. Server-side boards either apply them locally or ship them to
//! the viewer; the client replays them into a [`SidebarState`] to render.

use crate::text::{legacy, RichText};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Where an objective is displayed on the viewer's screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplaySlot {
    Sidebar,
    List,
    BelowName,
}

/// A single mutation of a display board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardOp {
    CreateObjective {
        name: String,
        display_name: RichText,
        slot: DisplaySlot,
    },
    SetDisplayName {
        objective: String,
        display_name: RichText,
    },
    RegisterTeam {
        name: String,
    },
    SetTeamPrefix {
        team: String,
        prefix: RichText,
    },
    AddTeamMember {
        team: String,
        member: String,
    },
    UnregisterTeam {
        name: String,
    },
    SetScore {
        objective: String,
        member: String,
        score: i32,
    },
    /// Switches the viewer to a board objective, or back to the default view with `None`
    ShowObjective {
        slot: DisplaySlot,
        objective: Option<String>,
    },
}

/// Failures raised while mutating a display board
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    #[error("viewer is no longer connected")]
    Disconnected,
    #[error("objective `{0}` is already registered")]
    ObjectiveExists(String),
    #[error("objective `{0}` is not registered")]
    UnknownObjective(String),
    #[error("team `{0}` is already registered")]
    TeamExists(String),
    #[error("team `{0}` is not registered")]
    UnknownTeam(String),
}

#[derive(Debug, Clone)]
struct Objective {
    display_name: RichText,
    slot: DisplaySlot,
    scores: HashMap<String, i32>,
}

/// A registered team: its prefix is what the viewer sees for each member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Team {
    pub prefix: RichText,
    pub members: BTreeSet<String>,
}

/// One rendered sidebar row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarRow {
    pub member: String,
    pub score: i32,
    pub text: RichText,
}

/// Board contents as the viewer sees them
#[derive(Debug, Clone, Default)]
pub struct SidebarState {
    objectives: HashMap<String, Objective>,
    teams: HashMap<String, Team>,
    shown: HashMap<DisplaySlot, String>,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one operation, rejecting it exactly as a host board would
    pub fn apply(&mut self, op: &BoardOp) -> Result<(), DisplayError> {
        match op {
            BoardOp::CreateObjective {
                name,
                display_name,
                slot,
            } => {
                if self.objectives.contains_key(name) {
                    return Err(DisplayError::ObjectiveExists(name.clone()));
                }
                self.objectives.insert(
                    name.clone(),
                    Objective {
                        display_name: display_name.clone(),
                        slot: *slot,
                        scores: HashMap::new(),
                    },
                );
            }
            BoardOp::SetDisplayName {
                objective,
                display_name,
            } => {
                self.objective_mut(objective)?.display_name = display_name.clone();
            }
            BoardOp::RegisterTeam { name } => {
                if self.teams.contains_key(name) {
                    return Err(DisplayError::TeamExists(name.clone()));
                }
                self.teams.insert(name.clone(), Team::default());
            }
            BoardOp::SetTeamPrefix { team, prefix } => {
                self.team_mut(team)?.prefix = prefix.clone();
            }
            BoardOp::AddTeamMember { team, member } => {
                if !self.teams.contains_key(team) {
                    return Err(DisplayError::UnknownTeam(team.clone()));
                }
                // A member belongs to at most one team
                for other in self.teams.values_mut() {
                    other.members.remove(member);
                }
                self.team_mut(team)?.members.insert(member.clone());
            }
            BoardOp::UnregisterTeam { name } => {
                if self.teams.remove(name).is_none() {
                    return Err(DisplayError::UnknownTeam(name.clone()));
                }
            }
            BoardOp::SetScore {
                objective,
                member,
                score,
            } => {
                self.objective_mut(objective)?
                    .scores
                    .insert(member.clone(), *score);
            }
            BoardOp::ShowObjective { slot, objective } => match objective {
                Some(name) => {
                    if !self.objectives.contains_key(name) {
                        return Err(DisplayError::UnknownObjective(name.clone()));
                    }
                    self.shown.insert(*slot, name.clone());
                }
                None => {
                    self.shown.remove(slot);
                }
            },
        }
        Ok(())
    }

    fn objective_mut(&mut self, name: &str) -> Result<&mut Objective, DisplayError> {
        self.objectives
            .get_mut(name)
            .ok_or_else(|| DisplayError::UnknownObjective(name.to_string()))
    }

    fn team_mut(&mut self, name: &str) -> Result<&mut Team, DisplayError> {
        self.teams
            .get_mut(name)
            .ok_or_else(|| DisplayError::UnknownTeam(name.to_string()))
    }

    pub fn display_name(&self, objective: &str) -> Option<&RichText> {
        self.objectives.get(objective).map(|o| &o.display_name)
    }

    pub fn objective_slot(&self, objective: &str) -> Option<DisplaySlot> {
        self.objectives.get(objective).map(|o| o.slot)
    }

    pub fn score(&self, objective: &str, member: &str) -> Option<i32> {
        self.objectives
            .get(objective)
            .and_then(|o| o.scores.get(member).copied())
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Name of the team the member currently belongs to
    pub fn team_of(&self, member: &str) -> Option<&str> {
        self.teams
            .iter()
            .find(|(_, team)| team.members.contains(member))
            .map(|(name, _)| name.as_str())
    }

    /// Rows of an objective, highest score first
    pub fn lines(&self, objective: &str) -> Vec<SidebarRow> {
        let Some(objective) = self.objectives.get(objective) else {
            return Vec::new();
        };

        let mut rows: Vec<SidebarRow> = objective
            .scores
            .iter()
            .map(|(member, score)| SidebarRow {
                member: member.clone(),
                score: *score,
                text: match self.team_of(member).and_then(|team| self.teams.get(team)) {
                    Some(team) => team.prefix.clone(),
                    None => legacy::deserialize(member),
                },
            })
            .collect();

        rows.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.member.cmp(&b.member)));
        rows
    }

    /// Objective the viewer currently sees in the sidebar slot
    pub fn sidebar_objective(&self) -> Option<&str> {
        self.shown.get(&DisplaySlot::Sidebar).map(String::as_str)
    }

    pub fn sidebar_title(&self) -> Option<&RichText> {
        self.sidebar_objective()
            .and_then(|objective| self.display_name(objective))
    }

    pub fn sidebar_lines(&self) -> Vec<SidebarRow> {
        self.sidebar_objective()
            .map(|objective| self.lines(objective))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> BoardOp {
        BoardOp::CreateObjective {
            name: name.to_string(),
            display_name: RichText::plain(name),
            slot: DisplaySlot::Sidebar,
        }
    }

    fn register(name: &str) -> BoardOp {
        BoardOp::RegisterTeam {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_duplicate_registrations_are_rejected() {
        let mut state = SidebarState::new();
        state.apply(&create("board")).unwrap();
        state.apply(&register("line1")).unwrap();

        assert_eq!(
            state.apply(&create("board")),
            Err(DisplayError::ObjectiveExists("board".to_string()))
        );
        assert_eq!(
            state.apply(&register("line1")),
            Err(DisplayError::TeamExists("line1".to_string()))
        );
    }

    #[test]
    fn test_unknown_targets_are_rejected() {
        let mut state = SidebarState::new();

        let prefix = BoardOp::SetTeamPrefix {
            team: "ghost".to_string(),
            prefix: RichText::plain("x"),
        };
        let score = BoardOp::SetScore {
            objective: "board".to_string(),
            member: "m".to_string(),
            score: 1,
        };

        assert_eq!(
            state.apply(&prefix),
            Err(DisplayError::UnknownTeam("ghost".to_string()))
        );
        assert_eq!(
            state.apply(&score),
            Err(DisplayError::UnknownObjective("board".to_string()))
        );
        assert!(state
            .apply(&BoardOp::UnregisterTeam {
                name: "ghost".to_string()
            })
            .is_err());
    }

    #[test]
    fn test_member_moves_between_teams() {
        let mut state = SidebarState::new();
        state.apply(&register("a")).unwrap();
        state.apply(&register("b")).unwrap();

        for team in ["a", "b"] {
            state
                .apply(&BoardOp::AddTeamMember {
                    team: team.to_string(),
                    member: "token".to_string(),
                })
                .unwrap();
        }

        assert_eq!(state.team_of("token"), Some("b"));
        assert!(state.team("a").unwrap().members.is_empty());
    }

    #[test]
    fn test_lines_render_team_prefix_by_descending_score() {
        let mut state = SidebarState::new();
        state.apply(&create("board")).unwrap();

        for (team, member, text, score) in [("low", "§1", "Low", 1), ("high", "§2", "High", 7)] {
            state.apply(&register(team)).unwrap();
            state
                .apply(&BoardOp::AddTeamMember {
                    team: team.to_string(),
                    member: member.to_string(),
                })
                .unwrap();
            state
                .apply(&BoardOp::SetTeamPrefix {
                    team: team.to_string(),
                    prefix: RichText::plain(text),
                })
                .unwrap();
            state
                .apply(&BoardOp::SetScore {
                    objective: "board".to_string(),
                    member: member.to_string(),
                    score,
                })
                .unwrap();
        }

        let rows = state.lines("board");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text.plain_text(), "High");
        assert_eq!(rows[0].score, 7);
        assert_eq!(rows[1].text.plain_text(), "Low");
    }

    #[test]
    fn test_sidebar_follows_shown_objective() {
        let mut state = SidebarState::new();
        state.apply(&create("board")).unwrap();
        assert!(state.sidebar_title().is_none());

        state
            .apply(&BoardOp::ShowObjective {
                slot: DisplaySlot::Sidebar,
                objective: Some("board".to_string()),
            })
            .unwrap();
        assert_eq!(state.sidebar_title(), Some(&RichText::plain("board")));

        state
            .apply(&BoardOp::ShowObjective {
                slot: DisplaySlot::Sidebar,
                objective: None,
            })
            .unwrap();
        assert!(state.sidebar_objective().is_none());
        assert!(state.sidebar_lines().is_empty());
    }

    #[test]
    fn test_show_unknown_objective_fails() {
        let mut state = SidebarState::new();
        let result = state.apply(&BoardOp::ShowObjective {
            slot: DisplaySlot::Sidebar,
            objective: Some("missing".to_string()),
        });
        assert_eq!(
            result,
            Err(DisplayError::UnknownObjective("missing".to_string()))
        );
    }
}
