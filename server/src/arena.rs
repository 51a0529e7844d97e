//! Demo content for the bundled server: a small arena status board

use crate::handler::ContentHandler;
use crate::holder::Holder;
use parking_lot::Mutex;
use rand::Rng;
use shared::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct ArenaHandler {
    started: Instant,
    online: Arc<AtomicUsize>,
    points: Mutex<HashMap<u32, u32>>,
}

impl ArenaHandler {
    pub fn new(online: Arc<AtomicUsize>) -> Self {
        Self {
            started: Instant::now(),
            online,
            points: Mutex::new(HashMap::new()),
        }
    }

    /// Bumps the holder's points by a random amount and returns the new total
    fn roll_points(&self, holder_id: u32) -> u32 {
        let gain = rand::thread_rng().gen_range(0..=3);
        let mut points = self.points.lock();
        let total = points.entry(holder_id).or_insert(0);
        *total += gain;
        *total
    }
}

fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

impl<H: Holder> ContentHandler<H> for ArenaHandler {
    fn title(&self, _holder: &H) -> Option<String> {
        Some("&6&lARENA".to_string())
    }

    fn entries(&self, holder: &H) -> Option<Vec<Entry>> {
        let points = self.roll_points(holder.id());
        let online = self.online.load(Ordering::SeqCst);

        Some(vec![
            Entry::new("§7─────────────", 7),
            Entry::new(&format!("§fPlayer: §a{}", holder.name()), 6),
            Entry::new(&format!("§fOnline: §e{}", online), 5),
            Entry::new("§r", 4),
            Entry::new(&format!("§fPoints: §b{}", points), 3),
            Entry::new(&format!("§fUptime: §7{}", format_uptime(self.started.elapsed())), 2),
            Entry::new("§8─────────────", 1),
            Entry::new("§eplay.example.net", 0),
        ])
    }
}
