//! C ABI over the global kernel
//!
//! Every entry point returns a [`Status`] byte. A null callback is reported
//! as `Status::Error`, as is an unknown event id.
//!
//! Author: Moroya Sakamoto

use crate::error::{Error, Status};
use crate::os;
use crate::types::{Id, Tick};

#[cfg(any(feature = "tasks", feature = "events"))]
use crate::types::{Callback, UserData};

#[no_mangle]
pub extern "C" fn tickos_init() -> Status {
    os::init();
    Status::Ok
}

#[no_mangle]
pub extern "C" fn tickos_tick() -> Status {
    os::tick();
    Status::Ok
}

#[no_mangle]
pub extern "C" fn tickos_now() -> Tick {
    os::now()
}

#[no_mangle]
pub extern "C" fn tickos_start_scheduler() -> ! {
    os::start_scheduler()
}

#[no_mangle]
pub extern "C" fn tickos_blocking_delay(ticks: Tick) -> Status {
    os::blocking_delay(ticks).into()
}

// ── tasks ────────────────────────────────────────────────────────────

#[cfg(feature = "tasks")]
#[no_mangle]
pub extern "C" fn tickos_register_task(
    id: Id,
    callback: Option<Callback>,
    userdata: UserData,
    period: Tick,
) -> Status {
    let Some(callback) = callback else {
        return Error::Failed.into();
    };
    os::register_task(id, callback, userdata, period).into()
}

#[cfg(feature = "tasks")]
#[no_mangle]
pub extern "C" fn tickos_suspend_task(id: Id) -> Status {
    os::suspend_task(id).into()
}

#[cfg(feature = "tasks")]
#[no_mangle]
pub extern "C" fn tickos_resume_task(id: Id) -> Status {
    os::resume_task(id).into()
}

#[cfg(feature = "tasks")]
#[no_mangle]
pub extern "C" fn tickos_delete_task(id: Id) -> Status {
    os::delete_task(id).into()
}

#[cfg(feature = "tasks")]
#[no_mangle]
pub extern "C" fn tickos_sleep_task(id: Id, ticks: Tick) -> Status {
    os::sleep_task(id, ticks).into()
}

#[cfg(feature = "tasks")]
#[no_mangle]
pub extern "C" fn tickos_wake_task(id: Id) -> Status {
    os::wake_task(id).into()
}

// ── delays ───────────────────────────────────────────────────────────

#[no_mangle]
pub extern "C" fn tickos_start_delay(id: Id, ticks: Tick) -> Status {
    os::start_delay(id, ticks).into()
}

#[no_mangle]
pub extern "C" fn tickos_delay_done(id: Id) -> bool {
    os::delay_done(id)
}

#[no_mangle]
pub extern "C" fn tickos_remove_delay(id: Id) {
    os::remove_delay(id);
}

// ── events ───────────────────────────────────────────────────────────

#[cfg(feature = "events")]
#[no_mangle]
pub extern "C" fn tickos_register_event(id: Id, callback: Option<Callback>, userdata: UserData) -> Status {
    let Some(callback) = callback else {
        return Error::Failed.into();
    };
    os::register_event(id, callback, userdata).into()
}

#[cfg(feature = "events")]
#[no_mangle]
pub extern "C" fn tickos_delete_event(id: Id) {
    os::delete_event(id);
}

#[cfg(feature = "events")]
#[no_mangle]
pub extern "C" fn tickos_trigger_event(id: Id) -> Status {
    os::trigger_event(id).into()
}

#[cfg(feature = "events")]
#[no_mangle]
pub extern "C" fn tickos_suspend_event(id: Id) -> Status {
    os::suspend_event(id).into()
}

#[cfg(feature = "events")]
#[no_mangle]
pub extern "C" fn tickos_resume_event(id: Id) -> Status {
    os::resume_event(id).into()
}
