//! Non-blocking delays
//!
//! A periodic task starts a delay under its own id, keeps running, and
//! polls [`DelayManager::is_done`] on later passes. The tick handler counts
//! every active delay down by one. An expired delay keeps its descriptor
//! until the owner calls [`DelayManager::remove`].
//!
//! Author: Moroya Sakamoto

use crate::error::{Error, Result};
use crate::pool::{Descriptor, Pool};
use crate::types::{Id, Tick};

/// Countdown descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    /// Ticks left before timeout
    pub remaining: Tick,
    /// Set when `remaining` reached zero
    pub timed_out: bool,
}

impl Descriptor for Delay {
    const EMPTY: Self = Delay {
        remaining: 0,
        timed_out: false,
    };
}

/// Pool of countdown descriptors keyed by id
pub struct DelayManager<const N: usize> {
    pool: Pool<Delay, N>,
}

impl<const N: usize> DelayManager<N> {
    pub const fn new() -> Self {
        Self { pool: Pool::new() }
    }

    /// Start (or restart) the delay for `id`
    ///
    /// Restarting an active delay resets its countdown and clears the
    /// timed-out flag instead of taking a second descriptor.
    pub fn start(&mut self, id: Id, ticks: Tick) -> Result<()> {
        if ticks == 0 {
            return Err(Error::InvalidParameter);
        }
        if let Some(delay) = self.pool.get_mut(id) {
            delay.remaining = ticks;
            delay.timed_out = false;
            return Ok(());
        }
        let delay = self.pool.acquire(id)?;
        delay.remaining = ticks;
        Ok(())
    }

    /// Has the delay for `id` expired? False if `id` has no active delay.
    pub fn is_done(&self, id: Id) -> bool {
        self.pool.get(id).is_some_and(|d| d.timed_out)
    }

    /// Ticks left for `id`, if active
    pub fn remaining(&self, id: Id) -> Option<Tick> {
        self.pool.get(id).map(|d| d.remaining)
    }

    /// Release the descriptor for `id`. No-op if absent.
    pub fn remove(&mut self, id: Id) {
        self.pool.release(id);
    }

    /// Count every active delay down by one tick
    pub fn tick(&mut self) {
        self.pool.for_each_mut(|_, delay| {
            if delay.remaining > 0 {
                delay.remaining -= 1;
                if delay.remaining == 0 {
                    delay.timed_out = true;
                }
            }
        });
    }

    /// Active delays
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Unused descriptors
    pub fn free(&self) -> usize {
        self.pool.free_len()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn reset(&mut self) {
        self.pool.reset();
    }
}

impl<const N: usize> Default for DelayManager<N> {
    fn default() -> Self {
        Self::new()
    }
}
