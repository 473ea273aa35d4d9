//! System timer — the global tick counter
//!
//! Advanced once per tick interrupt. The counter is 32 bits wide and wraps;
//! callers measure intervals with [`SysTimer::elapsed_since`], which stays
//! correct across a single wrap.
//!
//! Author: Moroya Sakamoto

use crate::config;
use crate::types::Tick;

/// System timer
///
/// Size: 8 bytes
pub struct SysTimer {
    /// Current tick count
    ticks: Tick,
    /// Number of times the counter wrapped to zero
    overflows: u32,
}

impl SysTimer {
    /// Timer at tick zero
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            overflows: 0,
        }
    }

    /// Timer starting at an arbitrary tick (simulation and tests)
    pub const fn starting_at(ticks: Tick) -> Self {
        Self { ticks, overflows: 0 }
    }

    /// Advance by one tick
    pub fn advance(&mut self) {
        let new = self.ticks.wrapping_add(1);
        if new == 0 {
            self.overflows = self.overflows.wrapping_add(1);
        }
        self.ticks = new;
    }

    /// Current tick count
    pub fn now(&self) -> Tick {
        self.ticks
    }

    /// Current time in milliseconds (wraps with the tick counter)
    pub fn now_ms(&self) -> u32 {
        config::ticks_to_ms(self.ticks)
    }

    /// Reset timer
    pub fn reset(&mut self) {
        self.ticks = 0;
        self.overflows = 0;
    }

    /// Number of overflows
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    /// Ticks elapsed since a reference point
    pub fn elapsed_since(&self, reference: Tick) -> Tick {
        self.ticks.wrapping_sub(reference)
    }
}

impl Default for SysTimer {
    fn default() -> Self {
        Self::new()
    }
}
