//! Repeating task schedulers
//!
//! Delays and periods are counted in game ticks. [`TokioScheduler`] maps a
//! tick onto wall-clock time; [`ManualScheduler`] is stepped by a host that
//! already owns a game loop.
//!
//! Handles are RAII: dropping a [`TaskHandle`] cancels its task.

use log::debug;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub type Task = Box<dyn FnMut() + Send + 'static>;

/// Cancellable handle to a scheduled task
pub trait TaskHandle: Send + Sync {
    /// Suppresses every run after the current one
    fn cancel(&self);

    fn is_cancelled(&self) -> bool;
}

pub trait Scheduler: Send + Sync {
    /// Runs `task` after `initial_delay` ticks and then every `period` ticks
    fn schedule_repeating(&self, task: Task, initial_delay: u64, period: u64) -> Box<dyn TaskHandle>;
}

/// Scheduler backed by tokio timers
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    tick: Duration,
    runtime: Handle,
}

impl TokioScheduler {
    /// Creates a scheduler on the runtime the caller is running in
    pub fn new(tick: Duration) -> Result<Self, TryCurrentError> {
        Ok(Self::with_handle(tick, Handle::try_current()?))
    }

    pub fn with_handle(tick: Duration, runtime: Handle) -> Self {
        Self {
            tick: tick.max(Duration::from_millis(1)),
            runtime,
        }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    fn ticks(&self, count: u64) -> Duration {
        self.tick
            .saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, mut task: Task, initial_delay: u64, period: u64) -> Box<dyn TaskHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let start = Instant::now() + self.ticks(initial_delay);
        let period = self.ticks(period.max(1));

        let join = {
            let cancelled = Arc::clone(&cancelled);
            self.runtime.spawn(async move {
                let mut ticker = interval_at(start, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    ticker.tick().await;
                    if cancelled.load(Ordering::SeqCst) {
                        break;
                    }
                    task();
                }
            })
        };

        Box::new(TokioTaskHandle { cancelled, join })
    }
}

struct TokioTaskHandle {
    cancelled: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl TaskHandle for TokioTaskHandle {
    fn cancel(&self) {
        // A run in progress finishes; the loop exits at its next await point
        self.cancelled.store(true, Ordering::SeqCst);
        self.join.abort();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TokioTaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct ScheduledTask {
    task: Option<Task>,
    next_run: u64,
    period: u64,
    cancelled: Arc<AtomicBool>,
}

#[derive(Default)]
struct ManualState {
    now: u64,
    next_id: u64,
    scheduled: usize,
    tasks: BTreeMap<u64, ScheduledTask>,
}

/// Scheduler advanced explicitly by the host, one tick at a time
///
/// Tasks run outside the scheduler's lock, so a task may schedule or cancel
/// tasks (including itself) while it runs.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick
    pub fn now(&self) -> u64 {
        self.state.lock().now
    }

    /// Number of tasks ever scheduled
    pub fn scheduled_count(&self) -> usize {
        self.state.lock().scheduled
    }

    /// Number of tasks still waiting to run
    pub fn active_count(&self) -> usize {
        self.state
            .lock()
            .tasks
            .values()
            .filter(|t| !t.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Runs every task due at the current tick, then moves time forward by one
    pub fn tick(&self) {
        let (now, mut due) = {
            let mut state = self.state.lock();
            state
                .tasks
                .retain(|_, t| !t.cancelled.load(Ordering::SeqCst));

            let now = state.now;
            let due: Vec<(u64, Task)> = state
                .tasks
                .iter_mut()
                .filter(|(_, t)| t.next_run <= now)
                .filter_map(|(id, t)| t.task.take().map(|task| (*id, task)))
                .collect();
            (now, due)
        };

        for (id, task) in due.iter_mut() {
            let id = *id;
            let cancelled = self
                .state
                .lock()
                .tasks
                .get(&id)
                .map_or(true, |t| t.cancelled.load(Ordering::SeqCst));
            if !cancelled {
                task();
            }
        }

        let mut state = self.state.lock();
        for (id, task) in due {
            if let Some(scheduled) = state.tasks.get_mut(&id) {
                scheduled.task = Some(task);
                scheduled.next_run = now + scheduled.period;
            }
        }
        state.now += 1;
    }

    /// Steps `ticks` ticks
    pub fn advance(&self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, task: Task, initial_delay: u64, period: u64) -> Box<dyn TaskHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut state = self.state.lock();

        let id = state.next_id;
        state.next_id += 1;
        state.scheduled += 1;
        let next_run = state.now + initial_delay;
        state.tasks.insert(
            id,
            ScheduledTask {
                task: Some(task),
                next_run,
                period: period.max(1),
                cancelled: Arc::clone(&cancelled),
            },
        );
        debug!("Scheduled task {} at tick {} every {} ticks", id, next_run, period.max(1));

        Box::new(ManualTaskHandle { cancelled })
    }
}

struct ManualTaskHandle {
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle for ManualTaskHandle {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for ManualTaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
