//! Task table and its due-check
//!
//! Cooperative, non-preemptive. The table is scanned in ascending id
//! order on every pass of the dispatch loop; a task runs when its period
//! has elapsed since it last ran. Elapsed time is measured with wrapping
//! subtraction, so the 32-bit tick counter may overflow freely.
//!
//! The baseline after a run is the tick observed at dispatch, not the
//! previous baseline plus one period. A late pass therefore shifts every
//! later run of that task by the same amount.
//!
//! Author: Moroya Sakamoto

use crate::error::{Error, Result};
use crate::task::{Task, TaskState};
use crate::types::{Callback, Id, Tick, UserData};

/// A due task handed to the dispatch loop
#[derive(Clone, Copy)]
struct ReadyTask {
    pub id: Id,
    pub callback: Callback,
    pub userdata: UserData,
    /// Tick observed when the task was found due
    pub now: Tick,
}

/// Cooperative task scheduler
///
/// Static task table indexed by id, no dynamic allocation.
pub struct Scheduler<const N: usize> {
    /// Static task table
    tasks: [Task; N],
    /// Last task handed to dispatch
    current_task: Id,
}

impl<const N: usize> Scheduler<N> {
    /// Create empty scheduler
    pub const fn new() -> Self {
        Self {
            tasks: [Task::empty(); N],
            current_task: 0,
        }
    }

    fn slot_mut(&mut self, id: Id) -> Result<&mut Task> {
        self.tasks.get_mut(id as usize).ok_or(Error::InvalidParameter)
    }

    fn registered_mut(&mut self, id: Id) -> Result<&mut Task> {
        let task = self.slot_mut(id)?;
        if !task.in_use {
            return Err(Error::NotInitialized);
        }
        Ok(task)
    }

    /// Register a task under `id`
    ///
    /// Always overwrites: re-registering an id silently replaces the task
    /// that was there.
    pub fn register(&mut self, id: Id, callback: Callback, userdata: UserData, period: Tick) -> Result<()> {
        *self.slot_mut(id)? = Task::new(callback, userdata, period);
        Ok(())
    }

    /// Suspend a task
    pub fn suspend(&mut self, id: Id) -> Result<()> {
        self.registered_mut(id)?.running = false;
        Ok(())
    }

    /// Resume a suspended task
    pub fn resume(&mut self, id: Id) -> Result<()> {
        self.registered_mut(id)?.running = true;
        Ok(())
    }

    /// Put a task to sleep for `ticks`, starting at `now`
    ///
    /// `now` also becomes the task's period baseline, so the next periodic
    /// run is measured from the start of the sleep.
    pub fn sleep(&mut self, id: Id, ticks: Tick, now: Tick) -> Result<()> {
        if ticks == 0 {
            return Err(Error::InvalidParameter);
        }
        let task = self.registered_mut(id)?;
        task.sleeping = true;
        task.sleep_ticks = ticks;
        task.last_run = now;
        Ok(())
    }

    /// End a sleep early
    pub fn wake(&mut self, id: Id) -> Result<()> {
        let task = self.registered_mut(id)?;
        task.sleeping = false;
        task.sleep_ticks = 0;
        Ok(())
    }

    /// Clear the slot
    pub fn delete(&mut self, id: Id) -> Result<()> {
        *self.slot_mut(id)? = Task::empty();
        Ok(())
    }

    /// Get task by id
    pub fn get_task(&self, id: Id) -> Option<&Task> {
        self.tasks.get(id as usize)
    }

    pub fn state(&self, id: Id) -> Option<TaskState> {
        self.get_task(id).map(Task::state)
    }

    /// Number of registered tasks, counted from the table
    ///
    /// Every in-use slot counts, suspended or sleeping. Deleting a
    /// suspended task or registering an id twice therefore cannot leave the
    /// count off by one.
    pub fn active_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_active()).count()
    }

    /// Id of the task most recently dispatched
    pub fn current_task(&self) -> Id {
        self.current_task
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Run every due task once at `now`, ascending id
    pub fn run_due(&mut self, now: Tick) -> usize {
        dispatch(&mut At { table: self, now })
    }

    /// Due-check one slot at `now`. Expires a finished sleep on the way.
    fn poll(&mut self, id: Id, now: Tick) -> Option<ReadyTask> {
        let task = self.tasks.get_mut(id as usize)?;
        if !task.in_use || !task.running {
            return None;
        }

        if task.sleeping && task.sleep_elapsed(now) {
            task.sleeping = false;
            task.sleep_ticks = 0;
        }
        if task.sleeping || !task.period_elapsed(now) {
            return None;
        }

        let ready = ReadyTask {
            id,
            callback: task.callback?,
            userdata: task.userdata,
            now,
        };
        self.current_task = id;
        Some(ready)
    }

    /// Stamp the run after the callback returned. A task that deleted
    /// itself from inside its callback is left empty.
    fn complete(&mut self, id: Id, now: Tick) {
        if let Some(task) = self.tasks.get_mut(id as usize) {
            if task.in_use {
                task.last_run = now;
                task.exec_count = task.exec_count.wrapping_add(1);
            }
        }
    }
}

/// Short exclusive access to a task table, together with the tick it is
/// observed at
pub(crate) trait TableAccess<const N: usize> {
    fn with<R>(&mut self, f: impl FnOnce(&mut Scheduler<N>, Tick) -> R) -> R;
}

/// A table frozen at one tick
struct At<'a, const N: usize> {
    table: &'a mut Scheduler<N>,
    now: Tick,
}

impl<const N: usize> TableAccess<N> for At<'_, N> {
    fn with<R>(&mut self, f: impl FnOnce(&mut Scheduler<N>, Tick) -> R) -> R {
        f(&mut *self.table, self.now)
    }
}

/// Scan the table once in ascending id order, running every due task.
/// Callbacks run between `with` calls.
pub(crate) fn dispatch<const N: usize, A: TableAccess<N>>(access: &mut A) -> usize {
    let mut executed = 0;
    for id in 0..N {
        if let Some(ready) = access.with(|t, now| t.poll(id as Id, now)) {
            (ready.callback)(ready.userdata);
            access.with(|t, _| t.complete(ready.id, ready.now));
            executed += 1;
        }
    }
    executed
}

impl<const N: usize> Default for Scheduler<N> {
    fn default() -> Self {
        Self::new()
    }
}
