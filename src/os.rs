//! Global kernel instance
//!
//! Firmware has exactly one kernel, shared between two contexts:
//!
//! - the main context runs [`start_scheduler`] forever, and every task and
//!   event callback runs there, to completion, on the one stack;
//! - the tick interrupt calls [`tick`], which advances the counter and
//!   counts delays down.
//!
//! The kernel sits in a `critical_section::Mutex<RefCell<_>>`. Every call
//! in this module, and every step of a dispatch pass, holds the critical
//! section only while it touches kernel state. Callbacks run outside it:
//! they may call any function here (trigger an event, sleep their own
//! task, start a delay) and the tick interrupt is not masked while they
//! run. The tick interrupt must not re-enter itself.
//!
//! A callback that never returns stalls every other task and event.
//!
//! Author: Moroya Sakamoto

use core::cell::RefCell;

use critical_section::Mutex;
use log::{debug, info, trace, warn};

use crate::config;
use crate::error::{Error, Result};
use crate::kernel::{dispatch_pass, Kernel, KernelAccess, PassStats};
use crate::types::{Id, Tick};

#[cfg(feature = "tasks")]
use crate::task::TaskState;
#[cfg(any(feature = "tasks", feature = "events"))]
use crate::types::{Callback, UserData};

static KERNEL: Mutex<RefCell<Kernel>> = Mutex::new(RefCell::new(Kernel::new()));

fn with<R>(f: impl FnOnce(&mut Kernel) -> R) -> R {
    critical_section::with(|cs| f(&mut *KERNEL.borrow_ref_mut(cs)))
}

/// Dispatch steps against the global instance, one critical section each
struct Global;

impl KernelAccess for Global {
    fn with<R>(&mut self, f: impl FnOnce(&mut Kernel) -> R) -> R {
        with(f)
    }
}

/// Reset every table and the tick counter
pub fn init() {
    with(Kernel::init);
    info!(
        "kernel: init ({} task slots, {} delays, {} events, {} Hz)",
        config::MAX_TASKS,
        config::DELAY_POOL_SIZE,
        config::EVENT_POOL_SIZE,
        config::TICK_HZ
    );
}

/// Tick handler. Call once per tick from the timer interrupt.
pub fn tick() {
    with(Kernel::tick);
}

/// Current tick
pub fn now() -> Tick {
    with(|k| k.now())
}

/// One pass of the dispatch loop
pub fn run_once() -> PassStats {
    let stats = dispatch_pass(&mut Global);
    if stats.events + stats.tasks > 0 {
        trace!("kernel: pass ran {} events, {} tasks", stats.events, stats.tasks);
    }
    stats
}

/// Run the dispatch loop forever
pub fn start_scheduler() -> ! {
    info!("kernel: scheduler started at tick {}", now());
    loop {
        run_once();
    }
}

/// Busy-wait until `ticks` ticks have elapsed. Needs the tick interrupt
/// running; never call it from the interrupt itself.
pub fn blocking_delay(ticks: Tick) -> Result<()> {
    if ticks == 0 {
        return Err(Error::InvalidParameter);
    }
    let start = now();
    while now().wrapping_sub(start) < ticks {
        core::hint::spin_loop();
    }
    Ok(())
}

// ── tasks ────────────────────────────────────────────────────────────

/// Register (or replace) the task in slot `id`
#[cfg(feature = "tasks")]
pub fn register_task(id: Id, callback: Callback, userdata: UserData, period: Tick) -> Result<()> {
    with(|k| k.register_task(id, callback, userdata, period))
        .inspect(|_| debug!("task {}: registered, period {} ticks", id, period))
        .inspect_err(|e| warn!("task {}: register failed: {}", id, e))
}

#[cfg(feature = "tasks")]
pub fn suspend_task(id: Id) -> Result<()> {
    with(|k| k.suspend_task(id))
}

#[cfg(feature = "tasks")]
pub fn resume_task(id: Id) -> Result<()> {
    with(|k| k.resume_task(id))
}

#[cfg(feature = "tasks")]
pub fn delete_task(id: Id) -> Result<()> {
    with(|k| k.delete_task(id)).inspect(|_| debug!("task {}: deleted", id))
}

/// Skip task `id` for `ticks`; also restarts its period from now
#[cfg(feature = "tasks")]
pub fn sleep_task(id: Id, ticks: Tick) -> Result<()> {
    with(|k| k.sleep_task(id, ticks))
}

#[cfg(feature = "tasks")]
pub fn wake_task(id: Id) -> Result<()> {
    with(|k| k.wake_task(id))
}

#[cfg(feature = "tasks")]
pub fn task_state(id: Id) -> Option<TaskState> {
    with(|k| k.task_state(id))
}

#[cfg(feature = "tasks")]
pub fn task_count() -> usize {
    with(|k| k.task_count())
}

/// Id of the task most recently dispatched
#[cfg(feature = "tasks")]
pub fn current_task() -> Id {
    with(|k| k.current_task())
}

// ── delays ───────────────────────────────────────────────────────────

/// Start or restart the non-blocking delay `id`
pub fn start_delay(id: Id, ticks: Tick) -> Result<()> {
    with(|k| k.start_delay(id, ticks)).inspect_err(|e| {
        if *e == Error::Busy {
            warn!("delay {}: pool exhausted", id);
        }
    })
}

pub fn delay_done(id: Id) -> bool {
    with(|k| k.delay_done(id))
}

/// Release delay `id`. Owners must call this once they are done with it.
pub fn remove_delay(id: Id) {
    with(|k| k.remove_delay(id));
}

// ── events ───────────────────────────────────────────────────────────

/// Register (or update) event `id`
#[cfg(feature = "events")]
pub fn register_event(id: Id, callback: Callback, userdata: UserData) -> Result<()> {
    with(|k| k.register_event(id, callback, userdata))
        .inspect(|_| debug!("event {}: registered", id))
        .inspect_err(|e| warn!("event {}: register failed: {}", id, e))
}

#[cfg(feature = "events")]
pub fn delete_event(id: Id) {
    with(|k| k.delete_event(id));
    debug!("event {}: deleted", id);
}

/// Mark event `id` pending. Safe to call from any callback.
#[cfg(feature = "events")]
pub fn trigger_event(id: Id) -> Result<()> {
    with(|k| k.trigger_event(id))
}

#[cfg(feature = "events")]
pub fn suspend_event(id: Id) -> Result<()> {
    with(|k| k.suspend_event(id))
}

#[cfg(feature = "events")]
pub fn resume_event(id: Id) -> Result<()> {
    with(|k| k.resume_event(id))
}

#[cfg(feature = "events")]
pub fn event_count() -> usize {
    with(|k| k.event_count())
}

/// Id of the event most recently dispatched
#[cfg(feature = "events")]
pub fn current_event() -> Id {
    with(|k| k.current_event())
}
