//! Kernel — top-level scheduler instance
//!
//! Combines timer + task table + delay pool + event registry into a single
//! value. Hosts that own the kernel directly (tests, simulators) drive it
//! through `tick` and `run_once`; firmware uses the global instance in
//! [`crate::os`].
//!
//! A dispatch pass is a sequence of short steps: pick the next due item,
//! run its callback with the kernel released, stamp it. The steps go
//! through [`KernelAccess`] so the global instance can wrap each one in a
//! critical section and leave callbacks free to call back into the API.
//!
//! Author: Moroya Sakamoto

use crate::config;
use crate::delay::DelayManager;
use crate::error::Result;
use crate::timer::SysTimer;
use crate::types::{Id, Tick};

#[cfg(feature = "events")]
use crate::event::{self, EventRegistry, RegistryAccess};
#[cfg(feature = "tasks")]
use crate::scheduler::{self, Scheduler, TableAccess};
#[cfg(feature = "tasks")]
use crate::task::TaskState;
#[cfg(any(feature = "tasks", feature = "events"))]
use crate::types::{Callback, UserData};

/// Scheduler kernel
pub struct Kernel {
    /// Global tick counter
    pub timer: SysTimer,
    /// Periodic task table
    #[cfg(feature = "tasks")]
    pub scheduler: Scheduler<{ config::MAX_TASKS }>,
    /// Non-blocking delays
    pub delays: DelayManager<{ config::DELAY_POOL_SIZE }>,
    /// Triggered events
    #[cfg(feature = "events")]
    pub events: EventRegistry<{ config::EVENT_POOL_SIZE }>,
}

impl Kernel {
    /// Empty kernel at tick zero
    pub const fn new() -> Self {
        Self {
            timer: SysTimer::new(),
            #[cfg(feature = "tasks")]
            scheduler: Scheduler::new(),
            delays: DelayManager::new(),
            #[cfg(feature = "events")]
            events: EventRegistry::new(),
        }
    }

    /// Return every table to its initial state
    pub fn init(&mut self) {
        *self = Self::new();
    }

    /// Tick handler: advance the counter and count delays down
    pub fn tick(&mut self) {
        self.timer.advance();
        self.delays.tick();
    }

    /// Current tick
    pub fn now(&self) -> Tick {
        self.timer.now()
    }

    // ── tasks ────────────────────────────────────────────────────────

    #[cfg(feature = "tasks")]
    pub fn register_task(&mut self, id: Id, callback: Callback, userdata: UserData, period: Tick) -> Result<()> {
        self.scheduler.register(id, callback, userdata, period)
    }

    #[cfg(feature = "tasks")]
    pub fn suspend_task(&mut self, id: Id) -> Result<()> {
        self.scheduler.suspend(id)
    }

    #[cfg(feature = "tasks")]
    pub fn resume_task(&mut self, id: Id) -> Result<()> {
        self.scheduler.resume(id)
    }

    #[cfg(feature = "tasks")]
    pub fn delete_task(&mut self, id: Id) -> Result<()> {
        self.scheduler.delete(id)
    }

    /// Skip `id` for `ticks`, measured from now
    #[cfg(feature = "tasks")]
    pub fn sleep_task(&mut self, id: Id, ticks: Tick) -> Result<()> {
        let now = self.timer.now();
        self.scheduler.sleep(id, ticks, now)
    }

    #[cfg(feature = "tasks")]
    pub fn wake_task(&mut self, id: Id) -> Result<()> {
        self.scheduler.wake(id)
    }

    #[cfg(feature = "tasks")]
    pub fn task_state(&self, id: Id) -> Option<TaskState> {
        self.scheduler.state(id)
    }

    #[cfg(feature = "tasks")]
    pub fn task_count(&self) -> usize {
        self.scheduler.active_task_count()
    }

    #[cfg(feature = "tasks")]
    pub fn current_task(&self) -> Id {
        self.scheduler.current_task()
    }

    // ── delays ───────────────────────────────────────────────────────

    pub fn start_delay(&mut self, id: Id, ticks: Tick) -> Result<()> {
        self.delays.start(id, ticks)
    }

    pub fn delay_done(&self, id: Id) -> bool {
        self.delays.is_done(id)
    }

    pub fn remove_delay(&mut self, id: Id) {
        self.delays.remove(id);
    }

    // ── events ───────────────────────────────────────────────────────

    #[cfg(feature = "events")]
    pub fn register_event(&mut self, id: Id, callback: Callback, userdata: UserData) -> Result<()> {
        self.events.register(id, callback, userdata)
    }

    #[cfg(feature = "events")]
    pub fn delete_event(&mut self, id: Id) {
        self.events.delete(id);
    }

    #[cfg(feature = "events")]
    pub fn trigger_event(&mut self, id: Id) -> Result<()> {
        self.events.trigger(id)
    }

    #[cfg(feature = "events")]
    pub fn suspend_event(&mut self, id: Id) -> Result<()> {
        self.events.suspend(id)
    }

    #[cfg(feature = "events")]
    pub fn resume_event(&mut self, id: Id) -> Result<()> {
        self.events.resume(id)
    }

    #[cfg(feature = "events")]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    #[cfg(feature = "events")]
    pub fn current_event(&self) -> Id {
        self.events.current()
    }

    // ── dispatch ─────────────────────────────────────────────────────

    /// One pass of the dispatch loop: due events, then due tasks
    pub fn run_once(&mut self) -> PassStats {
        dispatch_pass(self)
    }

    /// Alternate `tick` and `run_once` for `ticks` ticks (simulation)
    pub fn run_for(&mut self, ticks: u32) -> KernelStats {
        let mut stats = KernelStats {
            start_tick: self.now(),
            ..KernelStats::default()
        };
        for _ in 0..ticks {
            self.tick();
            let pass = self.run_once();
            stats.passes += 1;
            stats.tasks_executed += pass.tasks as u64;
            stats.events_dispatched += pass.events as u64;
        }
        stats.end_tick = self.now();
        stats
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Callbacks run in one dispatch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub events: usize,
    pub tasks: usize,
}

/// Kernel execution statistics from [`Kernel::run_for`]
#[derive(Debug, Clone, Default)]
pub struct KernelStats {
    /// Tick before the first step
    pub start_tick: Tick,
    /// Tick after the last step
    pub end_tick: Tick,
    /// Dispatch passes run
    pub passes: u64,
    /// Task callbacks run
    pub tasks_executed: u64,
    /// Event callbacks run
    pub events_dispatched: u64,
}

/// Short-lived exclusive access to a kernel
pub(crate) trait KernelAccess {
    fn with<R>(&mut self, f: impl FnOnce(&mut Kernel) -> R) -> R;
}

impl KernelAccess for Kernel {
    fn with<R>(&mut self, f: impl FnOnce(&mut Kernel) -> R) -> R {
        f(self)
    }
}

/// The event registry of a kernel behind `A`
#[cfg(feature = "events")]
struct Events<'a, A>(&'a mut A);

#[cfg(feature = "events")]
impl<A: KernelAccess> RegistryAccess<{ config::EVENT_POOL_SIZE }> for Events<'_, A> {
    fn with<R>(&mut self, f: impl FnOnce(&mut EventRegistry<{ config::EVENT_POOL_SIZE }>) -> R) -> R {
        self.0.with(|k| f(&mut k.events))
    }
}

/// The task table of a kernel behind `A`, read at the current tick
#[cfg(feature = "tasks")]
struct Tasks<'a, A>(&'a mut A);

#[cfg(feature = "tasks")]
impl<A: KernelAccess> TableAccess<{ config::MAX_TASKS }> for Tasks<'_, A> {
    fn with<R>(&mut self, f: impl FnOnce(&mut Scheduler<{ config::MAX_TASKS }>, Tick) -> R) -> R {
        self.0.with(|k| {
            let now = k.timer.now();
            f(&mut k.scheduler, now)
        })
    }
}

/// Run one dispatch pass: the event walk, then the task scan. Callbacks
/// are invoked between `with` calls, never inside one.
#[cfg_attr(not(any(feature = "tasks", feature = "events")), allow(unused_variables, unused_mut))]
pub(crate) fn dispatch_pass<A: KernelAccess>(access: &mut A) -> PassStats {
    let mut stats = PassStats::default();

    #[cfg(feature = "events")]
    {
        stats.events = event::dispatch(&mut Events(&mut *access));
    }

    #[cfg(feature = "tasks")]
    {
        stats.tasks = scheduler::dispatch(&mut Tasks(&mut *access));
    }

    stats
}
