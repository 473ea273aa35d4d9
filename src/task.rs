//! Task definition — static, no-alloc task table entries
//!
//! Each task is a periodic callback with a fixed period in ticks. The slot
//! index in the task table is the task's identity.
//!
//! Author: Moroya Sakamoto

use crate::types::{Callback, Tick, UserData};

/// Task execution state, derived from the slot flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Scheduled every period
    Running,
    /// Skipped until its sleep elapses or it is woken
    Sleeping,
    /// Skipped until resumed
    Suspended,
    /// Task slot is empty
    Unused,
}

/// Task table entry — no heap
#[derive(Debug, Clone, Copy)]
pub struct Task {
    /// Slot holds a registration
    pub in_use: bool,
    /// Cleared by suspend
    pub running: bool,
    /// Set by sleep, cleared by wake or expiry
    pub sleeping: bool,
    /// Sleep length, measured from `last_run`
    pub sleep_ticks: Tick,
    /// Period in ticks
    pub period: Tick,
    /// Tick observed when the task last ran (or went to sleep)
    pub last_run: Tick,
    /// Task function
    pub callback: Option<Callback>,
    /// Task function argument
    pub userdata: UserData,
    /// Execution count (wrapping)
    pub exec_count: u32,
}

impl Task {
    /// Empty task slot
    pub const fn empty() -> Self {
        Self {
            in_use: false,
            running: false,
            sleeping: false,
            sleep_ticks: 0,
            period: 0,
            last_run: 0,
            callback: None,
            userdata: UserData::null(),
            exec_count: 0,
        }
    }

    /// Create a new periodic task, running, with its baseline at tick 0
    pub const fn new(callback: Callback, userdata: UserData, period: Tick) -> Self {
        Self {
            in_use: true,
            running: true,
            sleeping: false,
            sleep_ticks: 0,
            period,
            last_run: 0,
            callback: Some(callback),
            userdata,
            exec_count: 0,
        }
    }

    /// Is this task slot active?
    pub fn is_active(&self) -> bool {
        self.in_use
    }

    /// True when the slot is indistinguishable from a never-used one
    pub fn is_vacant(&self) -> bool {
        !self.in_use
            && !self.running
            && !self.sleeping
            && self.sleep_ticks == 0
            && self.period == 0
            && self.last_run == 0
            && self.callback.is_none()
            && self.userdata.is_null()
            && self.exec_count == 0
    }

    pub fn state(&self) -> TaskState {
        if !self.in_use {
            TaskState::Unused
        } else if !self.running {
            TaskState::Suspended
        } else if self.sleeping {
            TaskState::Sleeping
        } else {
            TaskState::Running
        }
    }

    /// Has the sleep started at `last_run` elapsed by `now`?
    pub fn sleep_elapsed(&self, now: Tick) -> bool {
        now.wrapping_sub(self.last_run) >= self.sleep_ticks
    }

    /// Has a full period passed since `last_run`?
    pub fn period_elapsed(&self, now: Tick) -> bool {
        now.wrapping_sub(self.last_run) >= self.period
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::empty()
    }
}
