//! Intrusive descriptor pool
//!
//! A fixed array of nodes threaded into two singly-linked lists: `free`
//! and `active`. Links are slot indices instead of pointers, so the whole
//! pool is a plain value that can live in a `static`.
//!
//! Every node is on exactly one of the two lists. `acquire` moves the free
//! head to the active head, `release` unlinks a node by id and pushes it
//! back onto the free head. Lookup by id is a linear scan of the active
//! list; pools are tens of entries, so this stays cheap.
//!
//! Author: Moroya Sakamoto

use crate::error::{Error, Result};
use crate::types::Id;

/// Payload stored in a [`Pool`] node
pub trait Descriptor: Copy {
    /// Zeroed payload of a free node
    const EMPTY: Self;
}

/// Index of a node inside its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot(u8);

#[derive(Clone, Copy)]
struct Node<T> {
    id: Id,
    next: Option<u8>,
    payload: T,
}

/// Fixed-capacity pool with free and active lists
///
/// `N` must be in `1..=255` so every link fits in a `u8`.
pub struct Pool<T: Descriptor, const N: usize> {
    nodes: [Node<T>; N],
    free: Option<u8>,
    active: Option<u8>,
}

impl<T: Descriptor, const N: usize> Pool<T, N> {
    const LINKS_FIT: () = assert!(N > 0 && N <= u8::MAX as usize, "pool capacity must be 1..=255");

    /// All `N` nodes on the free list, active list empty
    pub const fn new() -> Self {
        let () = Self::LINKS_FIT;

        let mut nodes = [Node {
            id: 0,
            next: None,
            payload: T::EMPTY,
        }; N];
        let mut i = 0;
        while i + 1 < N {
            nodes[i].next = Some((i + 1) as u8);
            i += 1;
        }

        Self {
            nodes,
            free: Some(0),
            active: None,
        }
    }

    /// Put every node back on the free list
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of active descriptors
    pub fn len(&self) -> usize {
        self.count(self.active)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    /// Number of free descriptors
    pub fn free_len(&self) -> usize {
        self.count(self.free)
    }

    fn count(&self, mut cursor: Option<u8>) -> usize {
        let mut n = 0;
        while let Some(slot) = cursor {
            n += 1;
            cursor = self.nodes[slot as usize].next;
        }
        n
    }

    fn find(&self, id: Id) -> Option<u8> {
        let mut cursor = self.active;
        while let Some(slot) = cursor {
            let node = &self.nodes[slot as usize];
            if node.id == id {
                return Some(slot);
            }
            cursor = node.next;
        }
        None
    }

    pub fn contains(&self, id: Id) -> bool {
        self.find(id).is_some()
    }

    /// Active descriptor for `id`
    pub fn get(&self, id: Id) -> Option<&T> {
        self.find(id).map(|slot| &self.nodes[slot as usize].payload)
    }

    /// Active descriptor for `id`, mutable
    pub fn get_mut(&mut self, id: Id) -> Option<&mut T> {
        let slot = self.find(id)?;
        Some(&mut self.nodes[slot as usize].payload)
    }

    /// Take the free head, tag it with `id` and push it onto the active head.
    ///
    /// Does not check for an existing descriptor with the same id; callers
    /// look that up first.
    pub fn acquire(&mut self, id: Id) -> Result<&mut T> {
        let slot = self.free.ok_or(Error::Busy)?;
        let node = &mut self.nodes[slot as usize];
        self.free = node.next;

        node.id = id;
        node.payload = T::EMPTY;
        node.next = self.active;
        self.active = Some(slot);
        Ok(&mut node.payload)
    }

    /// Unlink `id` from the active list, zero it and push it onto the free
    /// head. Returns false if `id` was not active.
    pub fn release(&mut self, id: Id) -> bool {
        let mut prev: Option<u8> = None;
        let mut cursor = self.active;

        while let Some(slot) = cursor {
            let next = self.nodes[slot as usize].next;
            if self.nodes[slot as usize].id == id {
                match prev {
                    Some(p) => self.nodes[p as usize].next = next,
                    None => self.active = next,
                }
                let node = &mut self.nodes[slot as usize];
                node.id = 0;
                node.payload = T::EMPTY;
                node.next = self.free;
                self.free = Some(slot);
                return true;
            }
            prev = cursor;
            cursor = next;
        }
        false
    }

    /// Visit every active descriptor, head first
    pub fn for_each_mut(&mut self, mut f: impl FnMut(Id, &mut T)) {
        let mut cursor = self.active;
        while let Some(slot) = cursor {
            let node = &mut self.nodes[slot as usize];
            f(node.id, &mut node.payload);
            cursor = node.next;
        }
    }

    /// Active descriptors, head first (most recently acquired first)
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter {
            pool: self,
            cursor: self.active,
        }
    }

    /// Head of the active list
    pub(crate) fn first(&self) -> Option<Slot> {
        self.active.map(Slot)
    }

    /// Successor of `slot` in whichever list it currently sits on
    pub(crate) fn next(&self, slot: Slot) -> Option<Slot> {
        self.nodes[slot.0 as usize].next.map(Slot)
    }

    /// Id and payload stored at `slot`
    pub(crate) fn at(&self, slot: Slot) -> (Id, &T) {
        let node = &self.nodes[slot.0 as usize];
        (node.id, &node.payload)
    }
}

impl<T: Descriptor, const N: usize> Default for Pool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the active list
pub struct Iter<'a, T: Descriptor, const N: usize> {
    pool: &'a Pool<T, N>,
    cursor: Option<u8>,
}

impl<'a, T: Descriptor, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = (Id, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = &self.pool.nodes[slot as usize];
        self.cursor = node.next;
        Some((node.id, &node.payload))
    }
}
