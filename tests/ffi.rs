//! C entry points and their status codes.

#![cfg(all(feature = "ffi", feature = "tasks", feature = "events"))]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use tickos::ffi::*;
use tickos::{Status, UserData};

static SERIAL: Mutex<()> = Mutex::new(());

fn fresh_kernel() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    assert_eq!(tickos_init(), Status::Ok);
    guard
}

extern "C" fn bump(data: UserData) {
    let hits = unsafe { &*data.as_ptr().cast::<AtomicU32>() };
    hits.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn null_callbacks_are_errors() {
    let _k = fresh_kernel();
    assert_eq!(tickos_register_task(0, None, UserData::null(), 10), Status::Error);
    assert_eq!(tickos_register_event(0, None, UserData::null()), Status::Error);
}

#[test]
fn task_status_codes() {
    let _k = fresh_kernel();
    assert_eq!(tickos_register_task(200, Some(bump), UserData::null(), 10), Status::InvalidParameter);
    assert_eq!(tickos_suspend_task(1), Status::NotInitialized);
    assert_eq!(tickos_sleep_task(1, 0), Status::InvalidParameter);

    let hits = AtomicU32::new(0);
    assert_eq!(tickos_register_task(1, Some(bump), UserData::from_ref(&hits), 2), Status::Ok);
    assert_eq!(tickos_sleep_task(1, 4), Status::Ok);
    assert_eq!(tickos_wake_task(1), Status::Ok);
    assert_eq!(tickos_suspend_task(1), Status::Ok);
    assert_eq!(tickos_resume_task(1), Status::Ok);
    assert_eq!(tickos_delete_task(1), Status::Ok);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_event_is_generic_error() {
    let _k = fresh_kernel();
    assert_eq!(tickos_trigger_event(3), Status::Error);
    assert_eq!(tickos_suspend_event(3), Status::Error);
    assert_eq!(tickos_resume_event(3), Status::Error);
    tickos_delete_event(3);
}

#[test]
fn delays_over_the_c_abi() {
    let _k = fresh_kernel();
    assert_eq!(tickos_start_delay(1, 0), Status::InvalidParameter);
    assert_eq!(tickos_start_delay(1, 2), Status::Ok);
    assert_eq!(tickos_tick(), Status::Ok);
    assert!(!tickos_delay_done(1));
    assert_eq!(tickos_tick(), Status::Ok);
    assert!(tickos_delay_done(1));
    assert_eq!(tickos_now(), 2);
    tickos_remove_delay(1);
    assert!(!tickos_delay_done(1));
    assert_eq!(tickos_blocking_delay(0), Status::InvalidParameter);
}

#[test]
fn triggered_event_runs_on_next_pass() {
    let _k = fresh_kernel();
    let hits = AtomicU32::new(0);
    assert_eq!(tickos_register_event(2, Some(bump), UserData::from_ref(&hits)), Status::Ok);
    assert_eq!(tickos_trigger_event(2), Status::Ok);
    tickos::run_once();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
