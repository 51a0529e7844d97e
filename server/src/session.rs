//! Per-player scoreboard session
//!
//! A [`Scoreboard`] owns one board and renders a [`ContentHandler`]'s title
//! and entries onto it on a fixed tick interval. The session is either
//! inactive or active:
//!
//! - `activate` shows the board to the holder and starts the tick loop, with
//!   the first update on the very next scheduler tick.
//! - `deactivate` restores the holder's default view (if still connected),
//!   unregisters every line team and cancels the tick loop.
//!
//! Every state change and every board mutation happens under one lock, so a
//! deactivation racing a tick can never leave the holder looking at a board
//! that is being torn down, or restore the default view twice. The handler is
//! queried with the lock released; a tick whose activation ended meanwhile
//! discards what it fetched.
//!
//! Per tick the title is only written when it differs from what was last
//! rendered. Line teams are created once per position and then only have
//! their prefix and score updated. Lines a handler stops returning are left
//! as they were; handlers are expected to return a full snapshot.

use crate::board::Board;
use crate::error::ScoreboardError;
use crate::format::{LegacyFormatter, TextFormatter};
use crate::handler::ContentHandler;
use crate::holder::{Holder, View};
use crate::lines::{LineRegistry, LineSlot};
use crate::scheduler::{Scheduler, Task, TaskHandle};
use log::{debug, info, warn};
use parking_lot::Mutex;
use shared::{DisplaySlot, Entry, RichText};
use std::sync::Arc;

/// Name of the sidebar objective every session creates
pub const OBJECTIVE_NAME: &str = "board";
/// Ticks between updates unless configured otherwise
pub const DEFAULT_UPDATE_INTERVAL: u64 = 10;
/// Title used when the handler has none; bold with no text keeps the name non-empty
pub const BLANK_TITLE: &str = "§l";

struct SessionState<H: ?Sized, B> {
    board: B,
    lines: LineRegistry,
    activated: bool,
    /// Bumped on every activation so a tick can tell it outlived its activation
    generation: u64,
    update_interval: u64,
    handler: Option<Arc<dyn ContentHandler<H>>>,
    formatter: Arc<dyn TextFormatter>,
    last_title: Option<RichText>,
    task: Option<Box<dyn TaskHandle>>,
}

impl<H: ?Sized, B: Board> SessionState<H, B> {
    fn write_title(&mut self, title: RichText) -> Result<bool, ScoreboardError> {
        if self.last_title.as_ref() == Some(&title) {
            return Ok(false);
        }
        self.board.set_display_name(OBJECTIVE_NAME, title.clone())?;
        self.last_title = Some(title);
        Ok(true)
    }

    fn write_line(&mut self, position: i32, text: RichText) -> Result<(), ScoreboardError> {
        let slot = self.lines.slot_for(position, &mut self.board)?;
        self.board.set_team_prefix(slot.team(), text)?;
        self.board.set_score(OBJECTIVE_NAME, slot.token(), position)?;
        Ok(())
    }
}

struct Session<H: Holder + 'static, B: Board + 'static> {
    holder: Arc<H>,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<SessionState<H, B>>,
}

impl<H: Holder + 'static, B: Board + 'static> Session<H, B> {
    fn deactivate(&self) {
        let task = {
            let mut state = self.state.lock();
            self.deactivate_locked(&mut state)
        };
        if let Some(task) = task {
            task.cancel();
        }
    }

    /// Tears the session down; the caller cancels the returned task once the lock is released
    fn deactivate_locked(&self, state: &mut SessionState<H, B>) -> Option<Box<dyn TaskHandle>> {
        if !state.activated {
            return None;
        }
        state.activated = false;

        if self.holder.is_connected() {
            if let Err(e) = self.holder.show(View::Default) {
                warn!(
                    "Failed to restore default view for {}: {}",
                    self.holder.name(),
                    e
                );
            }
        }

        let SessionState { board, lines, .. } = &mut *state;
        lines.release_all(board);

        info!("Scoreboard deactivated for {}", self.holder.name());
        state.task.take()
    }

    fn update(&self) {
        let (handler, formatter, generation) = {
            let mut state = self.state.lock();
            if !state.activated {
                return;
            }
            if !self.holder.is_connected() {
                debug!("Holder {} left, deactivating", self.holder.name());
                let task = self.deactivate_locked(&mut state);
                drop(state);
                if let Some(task) = task {
                    task.cancel();
                }
                return;
            }
            match &state.handler {
                Some(handler) => (
                    Arc::clone(handler),
                    Arc::clone(&state.formatter),
                    state.generation,
                ),
                None => return,
            }
        };

        let markup = handler
            .title(&self.holder)
            .unwrap_or_else(|| BLANK_TITLE.to_string());
        let title = formatter.format(&markup);
        let entries = handler.entries(&self.holder);

        let mut state = self.state.lock();
        if !state.activated || state.generation != generation {
            debug!("Dropping stale update for {}", self.holder.name());
            return;
        }

        if let Err(e) = self.render(&mut state, title, entries) {
            warn!(
                "Scoreboard update for {} failed, deactivating: {}",
                self.holder.name(),
                e
            );
            let task = self.deactivate_locked(&mut state);
            drop(state);
            if let Some(task) = task {
                task.cancel();
            }
        }
    }

    fn render(
        &self,
        state: &mut SessionState<H, B>,
        title: RichText,
        entries: Option<Vec<Entry>>,
    ) -> Result<(), ScoreboardError> {
        if state.write_title(title)? {
            debug!("Updated scoreboard title for {}", self.holder.name());
        }

        let Some(entries) = entries else {
            return Ok(());
        };

        // Later entries for the same position overwrite earlier ones
        for entry in entries {
            match state.write_line(entry.position(), entry.name().clone()) {
                Err(ScoreboardError::PositionOutOfRange { position }) => {
                    warn!(
                        "Skipping line at position {} for {}: out of range",
                        position,
                        self.holder.name()
                    );
                }
                other => other?,
            }
        }
        Ok(())
    }
}

impl<H: Holder + 'static, B: Board + 'static> Drop for Session<H, B> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Handle to a player's scoreboard session
///
/// Clones share the same session. When the last clone is dropped an active
/// session is deactivated.
pub struct Scoreboard<H: Holder + 'static, B: Board + 'static> {
    session: Arc<Session<H, B>>,
}

impl<H: Holder + 'static, B: Board + 'static> Clone for Scoreboard<H, B> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl<H: Holder + 'static, B: Board + 'static> Scoreboard<H, B> {
    /// Builds the sidebar objective on `board` for `holder`
    pub fn new(holder: Arc<H>, mut board: B, scheduler: Arc<dyn Scheduler>) -> Result<Self, ScoreboardError> {
        board.create_objective(
            OBJECTIVE_NAME,
            RichText::plain(OBJECTIVE_NAME),
            DisplaySlot::Sidebar,
        )?;

        Ok(Self {
            session: Arc::new(Session {
                holder,
                scheduler,
                state: Mutex::new(SessionState {
                    board,
                    lines: LineRegistry::new(),
                    activated: false,
                    generation: 0,
                    update_interval: DEFAULT_UPDATE_INTERVAL,
                    handler: None,
                    formatter: Arc::new(LegacyFormatter::new()),
                    last_title: None,
                    task: None,
                }),
            }),
        })
    }

    pub fn with_formatter(self, formatter: Arc<dyn TextFormatter>) -> Self {
        self.session.state.lock().formatter = formatter;
        self
    }

    /// Shows the board and starts the tick loop; a no-op when already active
    pub fn activate(&self) -> Result<(), ScoreboardError> {
        let interval = {
            let mut state = self.session.state.lock();
            if state.activated {
                return Ok(());
            }
            if state.handler.is_none() {
                return Err(ScoreboardError::HandlerNotSet);
            }
            self.session
                .holder
                .show(View::Board(OBJECTIVE_NAME.to_string()))?;
            state.activated = true;
            state.generation += 1;
            state.update_interval
        };

        let session = Arc::downgrade(&self.session);
        let task: Task = Box::new(move || {
            if let Some(session) = session.upgrade() {
                session.update();
            }
        });
        let handle = self.session.scheduler.schedule_repeating(task, 0, interval);

        let mut state = self.session.state.lock();
        if state.activated && state.task.is_none() {
            state.task = Some(handle);
            info!(
                "Scoreboard activated for {} every {} ticks",
                self.session.holder.name(),
                interval
            );
        } else {
            // Deactivated (or re-activated) while the task was being scheduled
            handle.cancel();
        }
        Ok(())
    }

    /// Restores the default view and tears down every line; a no-op when inactive
    pub fn deactivate(&self) {
        self.session.deactivate();
    }

    pub fn is_activated(&self) -> bool {
        self.session.state.lock().activated
    }

    pub fn handler(&self) -> Option<Arc<dyn ContentHandler<H>>> {
        self.session.state.lock().handler.clone()
    }

    pub fn set_handler(&self, handler: Arc<dyn ContentHandler<H>>) -> &Self {
        self.session.state.lock().handler = Some(handler);
        self
    }

    pub fn update_interval(&self) -> u64 {
        self.session.state.lock().update_interval
    }

    /// Changes the tick interval; only allowed while inactive
    pub fn set_update_interval(&self, ticks: u64) -> Result<(), ScoreboardError> {
        let mut state = self.session.state.lock();
        if state.activated {
            return Err(ScoreboardError::AlreadyActivated);
        }
        if ticks == 0 {
            return Err(ScoreboardError::InvalidInterval);
        }
        state.update_interval = ticks;
        Ok(())
    }

    pub fn holder(&self) -> &Arc<H> {
        &self.session.holder
    }

    /// Runs one tick right away, exactly as the scheduled task does
    pub fn update(&self) {
        self.session.update();
    }

    /// Formats and writes the title now; later ticks diff against it
    pub fn set_title(&self, markup: &str) -> Result<(), ScoreboardError> {
        let mut state = self.session.state.lock();
        let title = state.formatter.format(markup);
        state.write_title(title)?;
        Ok(())
    }

    /// Writes one line now
    pub fn set_line(&self, position: i32, text: RichText) -> Result<(), ScoreboardError> {
        self.session.state.lock().write_line(position, text)
    }

    pub fn line_count(&self) -> usize {
        self.session.state.lock().lines.len()
    }

    pub fn line_slot(&self, position: i32) -> Option<LineSlot> {
        self.session.state.lock().lines.get(position).cloned()
    }

    /// Read access to the board, for hosts that render it locally
    pub fn with_board<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(&self.session.state.lock().board)
    }
}
