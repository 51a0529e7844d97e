use crate::holder::Holder;
use parking_lot::Mutex;
use shared::Entry;
use std::collections::HashMap;

/// Per-tick source of sidebar content for one viewer
///
/// Returning `None` from [`ContentHandler::entries`] means "no change this
/// tick": lines are left as they are. Lines omitted from a returned list are
/// not cleared either, so a handler should return a complete snapshot.
pub trait ContentHandler<H: ?Sized>: Send + Sync {
    /// Title markup, or `None` for a blank title
    fn title(&self, holder: &H) -> Option<String>;

    fn entries(&self, holder: &H) -> Option<Vec<Entry>>;
}

#[derive(Debug, Default)]
struct Snapshot {
    entries: Option<Vec<Entry>>,
    generation: u64,
    /// Last generation handed to each holder id
    delivered: HashMap<u32, u64>,
}

/// Handler whose content is pushed in by the host
///
/// The same snapshot is served to every holder. Each holder gets a new
/// snapshot once, so its ticks without a change leave the lines alone.
#[derive(Debug, Default)]
pub struct SnapshotHandler {
    title: Mutex<Option<String>>,
    snapshot: Mutex<Snapshot>,
    sticky: bool,
}

impl SnapshotHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves the last snapshot on every tick instead of only once
    pub fn sticky() -> Self {
        Self {
            sticky: true,
            ..Self::default()
        }
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.lock() = Some(title.into());
    }

    pub fn clear_title(&self) {
        *self.title.lock() = None;
    }

    pub fn set_entries(&self, entries: Vec<Entry>) {
        let mut snapshot = self.snapshot.lock();
        snapshot.entries = Some(entries);
        snapshot.generation += 1;
    }
}

impl<H: Holder + ?Sized> ContentHandler<H> for SnapshotHandler {
    fn title(&self, _holder: &H) -> Option<String> {
        self.title.lock().clone()
    }

    fn entries(&self, holder: &H) -> Option<Vec<Entry>> {
        let mut snapshot = self.snapshot.lock();
        if self.sticky {
            return snapshot.entries.clone();
        }

        let generation = snapshot.generation;
        if snapshot.delivered.insert(holder.id(), generation) == Some(generation) {
            return None;
        }
        snapshot.entries.clone()
    }
}
