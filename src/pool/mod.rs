//! Slot arena with LIFO freelist reuse.
//!
//! A [`Pool`] stores fixed records addressed by a dense [`SlotIndex`]. Freed
//! slots are pushed onto a freelist and handed out again before the arena
//! grows, so a bounded live population never grows the slot count. Record
//! storage is kept across recycling; the owner resets a reused record.
//!
//! Every slot carries a generation counter bumped on each free. Proxies
//! ([`Ref`]) capture the generation they were bound with, and
//! [`Pool::resolve`] rejects a proxy whose slot has been recycled since.

pub mod proxy;

pub use proxy::{EdgeKind, EdgeRef, PooledRef, Ref, RefKind, RefPool, RefPoolStats, VertexKind, VertexRef};

use crate::errors::{GraphResult, LineageGraphError};
use crate::types::{Generation, SlotIndex};

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    generation: Generation,
    occupied: bool,
}

/// Arena of records indexed by [`SlotIndex`].
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<SlotIndex>,
    live: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Release a slot back to the freelist.
    ///
    /// Every proxy bound to the slot becomes stale. Freeing a vacant slot
    /// would corrupt the freelist and panics.
    pub fn free(&mut self, slot: SlotIndex) {
        let entry = &mut self.slots[slot as usize];
        assert!(entry.occupied, "slot {slot} freed twice");
        entry.occupied = false;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(slot);
        self.live -= 1;
    }

    /// Number of allocated (live) slots.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Total number of slots, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots waiting on the freelist.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn is_live(&self, slot: SlotIndex) -> bool {
        self.slots
            .get(slot as usize)
            .is_some_and(|entry| entry.occupied)
    }

    /// Current generation of a live slot.
    pub fn generation(&self, slot: SlotIndex) -> Option<Generation> {
        self.slots
            .get(slot as usize)
            .filter(|entry| entry.occupied)
            .map(|entry| entry.generation)
    }

    pub fn get(&self, slot: SlotIndex) -> Option<&T> {
        self.slots
            .get(slot as usize)
            .filter(|entry| entry.occupied)
            .map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, slot: SlotIndex) -> Option<&mut T> {
        self.slots
            .get_mut(slot as usize)
            .filter(|entry| entry.occupied)
            .map(|entry| &mut entry.value)
    }

    /// Bind `proxy` to a live slot, stamping it with the slot's generation.
    pub fn bind<'r, K: RefKind>(
        &self,
        slot: SlotIndex,
        proxy: &'r mut Ref<K>,
    ) -> GraphResult<&'r mut Ref<K>> {
        match self.generation(slot) {
            Some(generation) => Ok(proxy.bind(slot, generation)),
            None => Err(LineageGraphError::VacantSlot {
                kind: K::KIND,
                slot,
            }),
        }
    }

    /// Check that `proxy` still designates the object it was bound to.
    pub fn resolve<K: RefKind>(&self, proxy: &Ref<K>) -> GraphResult<SlotIndex> {
        let slot = proxy.slot().ok_or_else(|| LineageGraphError::unbound(K::KIND))?;
        match self.slots.get(slot as usize) {
            Some(entry) if entry.occupied && entry.generation == proxy.generation() => Ok(slot),
            _ => Err(LineageGraphError::stale(K::KIND, slot, proxy.generation())),
        }
    }

    /// Lazy iteration over live slots in slot order.
    pub fn slots(&self) -> Slots<'_, T> {
        Slots {
            pool: self,
            next: 0,
        }
    }

    /// Free every live slot. Storage is kept and every outstanding proxy
    /// goes stale; slots are handed out again from index 0 upwards.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, entry) in self.slots.iter_mut().enumerate().rev() {
            if entry.occupied {
                entry.occupied = false;
                entry.generation = entry.generation.wrapping_add(1);
            }
            self.free.push(index as SlotIndex);
        }
        self.live = 0;
    }

    /// Direct record access for slots the owner knows to be live.
    pub(crate) fn record(&self, slot: SlotIndex) -> &T {
        &self.slots[slot as usize].value
    }

    pub(crate) fn record_mut(&mut self, slot: SlotIndex) -> &mut T {
        &mut self.slots[slot as usize].value
    }

    pub(crate) fn bind_allocated<'r, K: RefKind>(
        &self,
        slot: SlotIndex,
        proxy: &'r mut Ref<K>,
    ) -> &'r mut Ref<K> {
        proxy.bind(slot, self.slots[slot as usize].generation)
    }
}

impl<T: Default> Pool<T> {
    /// Hand out a slot, reusing the most recently freed one if any.
    ///
    /// A reused slot still holds its previous record; fresh slots hold
    /// `T::default()`.
    pub fn allocate(&mut self) -> SlotIndex {
        self.live += 1;
        if let Some(slot) = self.free.pop() {
            self.slots[slot as usize].occupied = true;
            return slot;
        }
        let slot = self.slots.len() as SlotIndex;
        self.slots.push(Slot {
            value: T::default(),
            generation: 0,
            occupied: true,
        });
        slot
    }
}

/// Restartable cursor over the live slots of a [`Pool`], in slot order.
#[derive(Debug)]
pub struct Slots<'a, T> {
    pool: &'a Pool<T>,
    next: usize,
}

impl<T> Clone for Slots<'_, T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool,
            next: self.next,
        }
    }
}

impl<'a, T> Slots<'a, T> {
    /// Rewind to the first slot.
    pub fn restart(&mut self) {
        self.next = 0;
    }

    /// Bind `proxy` to the next live slot instead of yielding an index.
    pub fn advance<'r, K: RefKind>(&mut self, proxy: &'r mut Ref<K>) -> Option<&'r mut Ref<K>> {
        let slot = self.next()?;
        let generation = self.pool.slots[slot as usize].generation;
        Some(proxy.bind(slot, generation))
    }
}

impl<T> Iterator for Slots<'_, T> {
    type Item = SlotIndex;

    fn next(&mut self) -> Option<SlotIndex> {
        while self.next < self.pool.slots.len() {
            let index = self.next;
            self.next += 1;
            if self.pool.slots[index].occupied {
                return Some(index as SlotIndex);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.pool.slots.len().saturating_sub(self.next)))
    }
}
