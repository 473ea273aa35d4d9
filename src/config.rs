//! Compile-time configuration
//!
//! Capacities of the static tables and the tick frequency. Everything
//! the kernel allocates is sized from these constants.
//!
//! Author: Moroya Sakamoto

/// Task table size (valid task ids are `0..MAX_TASKS`)
pub const MAX_TASKS: usize = 10;

/// Delay descriptor pool size
pub const DELAY_POOL_SIZE: usize = 10;

/// Event descriptor pool size
pub const EVENT_POOL_SIZE: usize = 10;

/// Tick interrupt frequency in Hz
pub const TICK_HZ: u32 = 1000;

/// Milliseconds → ticks at [`TICK_HZ`], saturating at `u32::MAX`
pub const fn ms_to_ticks(ms: u32) -> u32 {
    scale(ms, TICK_HZ, 1000)
}

/// Ticks → milliseconds at [`TICK_HZ`], saturating at `u32::MAX`
pub const fn ticks_to_ms(ticks: u32) -> u32 {
    scale(ticks, 1000, TICK_HZ)
}

/// `value * mul / div` in 64 bits, clamped back into `u32`
const fn scale(value: u32, mul: u32, div: u32) -> u32 {
    let wide = value as u64 * mul as u64 / div as u64;
    if wide > u32::MAX as u64 {
        u32::MAX
    } else {
        wide as u32
    }
}
