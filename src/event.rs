//! Event-trigger registry
//!
//! Events are callbacks that run once per trigger instead of on a period.
//! Any context may trigger an event; the dispatch loop runs every
//! triggered, enabled event on its next pass, most recently registered
//! first.
//!
//! A trigger is recorded even while the event is suspended and fires once
//! the event is resumed.
//!
//! Author: Moroya Sakamoto

use crate::error::{Error, Result};
use crate::pool::{Descriptor, Pool, Slot};
use crate::types::{Callback, Id, UserData};

/// Event descriptor
#[derive(Debug, Clone, Copy)]
pub struct Event {
    /// Dispatch allowed (cleared by suspend)
    pub enabled: bool,
    /// Descriptor holds a registration
    pub in_use: bool,
    /// Pending trigger
    pub triggered: bool,
    /// Triggers received since registration (wrapping)
    pub trigger_count: u16,
    /// Handler
    pub callback: Option<Callback>,
    /// Handler argument
    pub userdata: UserData,
}

impl Descriptor for Event {
    const EMPTY: Self = Event {
        enabled: false,
        in_use: false,
        triggered: false,
        trigger_count: 0,
        callback: None,
        userdata: UserData::null(),
    };
}

impl Event {
    /// Should the next dispatch pass run this event?
    pub fn is_due(&self) -> bool {
        self.enabled && self.triggered && self.in_use
    }
}

/// A due event handed to the dispatch loop
#[derive(Clone, Copy)]
struct ReadyEvent {
    pub id: Id,
    pub callback: Callback,
    pub userdata: UserData,
}

/// Pool of event descriptors keyed by id
pub struct EventRegistry<const N: usize> {
    pool: Pool<Event, N>,
    /// Last event handed to dispatch
    current: Id,
}

impl<const N: usize> EventRegistry<N> {
    pub const fn new() -> Self {
        Self {
            pool: Pool::new(),
            current: 0,
        }
    }

    /// Register `callback` under `id`
    ///
    /// An id that is already registered is overwritten in place and comes
    /// back enabled, untriggered, with its trigger count cleared.
    pub fn register(&mut self, id: Id, callback: Callback, userdata: UserData) -> Result<()> {
        let fresh = Event {
            enabled: true,
            in_use: true,
            triggered: false,
            trigger_count: 0,
            callback: Some(callback),
            userdata,
        };
        if let Some(event) = self.pool.get_mut(id) {
            *event = fresh;
            return Ok(());
        }
        *self.pool.acquire(id)? = fresh;
        Ok(())
    }

    /// Mark `id` pending
    pub fn trigger(&mut self, id: Id) -> Result<()> {
        let event = self.pool.get_mut(id).ok_or(Error::NotFound)?;
        event.triggered = true;
        event.trigger_count = event.trigger_count.wrapping_add(1);
        Ok(())
    }

    pub fn suspend(&mut self, id: Id) -> Result<()> {
        self.pool.get_mut(id).ok_or(Error::NotFound)?.enabled = false;
        Ok(())
    }

    pub fn resume(&mut self, id: Id) -> Result<()> {
        self.pool.get_mut(id).ok_or(Error::NotFound)?.enabled = true;
        Ok(())
    }

    /// Release `id`. No-op if absent.
    pub fn delete(&mut self, id: Id) {
        self.pool.release(id);
    }

    pub fn get(&self, id: Id) -> Option<&Event> {
        self.pool.get(id)
    }

    pub fn is_registered(&self, id: Id) -> bool {
        self.pool.contains(id)
    }

    pub fn is_triggered(&self, id: Id) -> bool {
        self.pool.get(id).is_some_and(|e| e.triggered)
    }

    pub fn trigger_count(&self, id: Id) -> Option<u16> {
        self.pool.get(id).map(|e| e.trigger_count)
    }

    /// Id of the event most recently dispatched
    pub fn current(&self) -> Id {
        self.current
    }

    /// Registered events
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

    /// Registered ids in dispatch order
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.pool.iter().map(|(id, _)| id)
    }

    pub fn reset(&mut self) {
        self.pool.reset();
        self.current = 0;
    }

    /// Run every due event once, in list order
    pub fn dispatch_all(&mut self) -> usize {
        dispatch(self)
    }

    /// Inspect `slot`: if due, record it as current and hand it out
    fn poll(&mut self, slot: Slot) -> Option<ReadyEvent> {
        let (id, event) = self.pool.at(slot);
        let callback = event.callback.filter(|_| event.is_due())?;
        let ready = ReadyEvent {
            id,
            callback,
            userdata: event.userdata,
        };
        self.current = id;
        Some(ready)
    }

    /// Clear the pending trigger after the callback returned
    fn complete(&mut self, id: Id) {
        if let Some(event) = self.pool.get_mut(id) {
            event.triggered = false;
        }
    }
}

/// Short exclusive access to an event registry
pub(crate) trait RegistryAccess<const N: usize> {
    fn with<R>(&mut self, f: impl FnOnce(&mut EventRegistry<N>) -> R) -> R;
}

impl<const N: usize> RegistryAccess<N> for EventRegistry<N> {
    fn with<R>(&mut self, f: impl FnOnce(&mut EventRegistry<N>) -> R) -> R {
        f(self)
    }
}

/// Walk the active list once, head first, running every due event.
///
/// Callbacks run between `with` calls. The successor is read after the
/// callback returns, so an event deleted by a callback is already
/// unlinked and the walk steps over it. A callback that deletes its own
/// event sends the walk onto the free list, where nothing is due.
pub(crate) fn dispatch<const N: usize, A: RegistryAccess<N>>(access: &mut A) -> usize {
    let mut fired = 0;
    let mut cursor = access.with(|r| r.pool.first());
    while let Some(slot) = cursor {
        if let Some(ready) = access.with(|r| r.poll(slot)) {
            (ready.callback)(ready.userdata);
            access.with(|r| r.complete(ready.id));
            fired += 1;
        }
        cursor = access.with(|r| r.pool.next(slot));
    }
    fired
}

impl<const N: usize> Default for EventRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    extern "C" fn bump(data: UserData) {
        let hits = unsafe { &*data.as_ptr().cast::<AtomicU32>() };
        hits.fetch_add(1, Ordering::SeqCst);
    }

    extern "C" fn noop(_: UserData) {}

    /// Records the order callbacks ran in
    struct Trace {
        order: [AtomicU32; 8],
        len: AtomicUsize,
    }

    impl Trace {
        fn new() -> Self {
            Self {
                order: Default::default(),
                len: AtomicUsize::new(0),
            }
        }

        fn seen(&self) -> ([u32; 8], usize) {
            let n = self.len.load(Ordering::SeqCst);
            let mut out = [0; 8];
            for (i, slot) in self.order.iter().enumerate().take(n) {
                out[i] = slot.load(Ordering::SeqCst);
            }
            (out, n)
        }
    }

    struct Marker<'a> {
        tag: u32,
        trace: &'a Trace,
    }

    extern "C" fn record(data: UserData) {
        let marker = unsafe { &*data.as_ptr().cast::<Marker>() };
        let i = marker.trace.len.fetch_add(1, Ordering::SeqCst);
        marker.trace.order[i].store(marker.tag, Ordering::SeqCst);
    }

    #[test]
    fn test_trigger_fires_once() {
        let hits = AtomicU32::new(0);
        let mut events = EventRegistry::<4>::new();
        events.register(1, bump, UserData::from_ref(&hits)).unwrap();

        assert_eq!(events.dispatch_all(), 0);
        events.trigger(1).unwrap();
        assert_eq!(events.dispatch_all(), 1);
        assert_eq!(events.dispatch_all(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(events.current(), 1);
    }

    #[test]
    fn test_trigger_persists_across_suspension() {
        let hits = AtomicU32::new(0);
        let mut events = EventRegistry::<4>::new();
        events.register(5, bump, UserData::from_ref(&hits)).unwrap();
        events.suspend(5).unwrap();
        events.trigger(5).unwrap();

        assert_eq!(events.dispatch_all(), 0);
        assert!(events.is_triggered(5));

        events.resume(5).unwrap();
        assert_eq!(events.dispatch_all(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!events.is_triggered(5));
    }

    #[test]
    fn test_dispatch_order_most_recent_first() {
        let trace = Trace::new();
        let markers = [
            Marker { tag: 1, trace: &trace },
            Marker { tag: 2, trace: &trace },
            Marker { tag: 3, trace: &trace },
        ];
        let mut events = EventRegistry::<4>::new();
        for marker in &markers {
            events.register(marker.tag as Id, record, UserData::from_ref(marker)).unwrap();
        }
        for id in 1..=3 {
            events.trigger(id).unwrap();
        }
        events.dispatch_all();

        let (order, n) = trace.seen();
        assert_eq!(&order[..n], &[3, 2, 1]);
    }

    #[test]
    fn test_missing_id_not_found() {
        let mut events = EventRegistry::<2>::new();
        assert_eq!(events.trigger(3), Err(Error::NotFound));
        assert_eq!(events.suspend(3), Err(Error::NotFound));
        assert_eq!(events.resume(3), Err(Error::NotFound));
        events.delete(3);
        assert_eq!(events.free(), 2);
    }

    #[test]
    fn test_reregister_updates_in_place() {
        let hits = AtomicU32::new(0);
        let mut events = EventRegistry::<2>::new();
        events.register(1, noop, UserData::null()).unwrap();
        events.suspend(1).unwrap();
        events.trigger(1).unwrap();

        events.register(1, bump, UserData::from_ref(&hits)).unwrap();
        assert_eq!(events.len(), 1);
        let event = events.get(1).unwrap();
        assert!(event.enabled && event.in_use && !event.triggered);
        assert_eq!(event.trigger_count, 0);

        events.trigger(1).unwrap();
        events.dispatch_all();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pool_exhaustion_is_busy() {
        let mut events = EventRegistry::<3>::new();
        for id in 0..3 {
            assert_eq!(events.register(id, noop, UserData::null()), Ok(()));
        }
        assert_eq!(events.register(3, noop, UserData::null()), Err(Error::Busy));
        assert_eq!(events.len() + events.free(), events.capacity());
    }

    #[test]
    fn test_delete_frees_descriptor() {
        let hits = AtomicU32::new(0);
        let mut events = EventRegistry::<2>::new();
        events.register(1, bump, UserData::from_ref(&hits)).unwrap();
        events.trigger(1).unwrap();
        events.delete(1);

        assert_eq!(events.dispatch_all(), 0);
        assert!(!events.is_registered(1));
        assert_eq!(events.free(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_trigger_count_accumulates() {
        let mut events = EventRegistry::<2>::new();
        events.register(4, noop, UserData::null()).unwrap();
        events.trigger(4).unwrap();
        events.trigger(4).unwrap();
        events.trigger(4).unwrap();
        assert_eq!(events.trigger_count(4), Some(3));
        // Several triggers before a pass still run the callback once
        assert_eq!(events.dispatch_all(), 1);
        assert_eq!(events.trigger_count(4), Some(3));
    }

    #[test]
    fn test_ids_in_dispatch_order() {
        let mut events = EventRegistry::<4>::new();
        events.register(10, noop, UserData::null()).unwrap();
        events.register(20, noop, UserData::null()).unwrap();
        let mut ids = events.ids();
        assert_eq!(ids.next(), Some(20));
        assert_eq!(ids.next(), Some(10));
        assert_eq!(ids.next(), None);
    }

    /// Registry shared with its own callbacks, one borrow per step
    struct Shared<'a>(&'a RefCell<EventRegistry<4>>);

    impl RegistryAccess<4> for Shared<'_> {
        fn with<R>(&mut self, f: impl FnOnce(&mut EventRegistry<4>) -> R) -> R {
            f(&mut self.0.borrow_mut())
        }
    }

    extern "C" fn delete_two(data: UserData) {
        let events = unsafe { &*data.as_ptr().cast::<RefCell<EventRegistry<4>>>() };
        events.borrow_mut().delete(2);
    }

    extern "C" fn delete_three(data: UserData) {
        let events = unsafe { &*data.as_ptr().cast::<RefCell<EventRegistry<4>>>() };
        events.borrow_mut().delete(3);
    }

    #[test]
    fn test_walk_steps_over_event_deleted_by_callback() {
        let hits = AtomicU32::new(0);
        let events = RefCell::new(EventRegistry::<4>::new());
        {
            let mut r = events.borrow_mut();
            r.register(1, bump, UserData::from_ref(&hits)).unwrap();
            r.register(2, bump, UserData::from_ref(&hits)).unwrap();
            r.register(3, delete_two, UserData::from_ref(&events)).unwrap();
            for id in 1..=3 {
                r.trigger(id).unwrap();
            }
        }

        // 3 runs first and unlinks 2; 1 still fires in the same pass
        assert_eq!(dispatch(&mut Shared(&events)), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!events.borrow().is_registered(2));
        assert!(!events.borrow().is_triggered(1));
    }

    #[test]
    fn test_self_delete_ends_pass() {
        let hits = AtomicU32::new(0);
        let events = RefCell::new(EventRegistry::<4>::new());
        {
            let mut r = events.borrow_mut();
            r.register(1, bump, UserData::from_ref(&hits)).unwrap();
            r.register(3, delete_three, UserData::from_ref(&events)).unwrap();
            r.trigger(1).unwrap();
            r.trigger(3).unwrap();
        }

        // The deleted node now leads into the free list: 1 waits a pass
        assert_eq!(dispatch(&mut Shared(&events)), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(events.borrow().is_triggered(1));

        assert_eq!(dispatch(&mut Shared(&events)), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(events.borrow().len(), 1);
    }
}
