//! tickos — tick-driven cooperative scheduler
//!
//! Don't switch stacks, run callbacks to completion.
//!
//! Minimal kernel for bare-metal main loops:
//! - Static task table indexed by id (no heap, no allocation)
//! - Periodic dispatch off a single tick interrupt, wraparound-safe
//! - Non-blocking delays and triggered events from fixed descriptor pools
//! - One shared stack; no preemption, no context switch
//!
//! Author: Moroya Sakamoto

#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod types;
pub mod error;
pub mod timer;
pub mod pool;
pub mod delay;
#[cfg(feature = "events")]
pub mod event;
#[cfg(feature = "tasks")]
pub mod task;
#[cfg(feature = "tasks")]
pub mod scheduler;
pub mod kernel;
pub mod os;
#[cfg(feature = "ffi")]
pub mod ffi;

pub use types::{Callback, Id, Tick, UserData};
pub use error::{Error, Result, Status};
pub use timer::SysTimer;
pub use pool::{Descriptor, Pool};
pub use delay::DelayManager;
#[cfg(feature = "events")]
pub use event::EventRegistry;
#[cfg(feature = "tasks")]
pub use task::{Task, TaskState};
#[cfg(feature = "tasks")]
pub use scheduler::Scheduler;
pub use kernel::{Kernel, KernelStats, PassStats};
pub use os::*;
