//! Rebindable proxy handles and their recycler.
//!
//! A [`Ref`] is a small caller-owned handle naming "the object in slot X".
//! Binding is an explicit operation, so one handle can walk millions of
//! objects without allocating. [`RefPool`] keeps released handles for reuse;
//! [`PooledRef`] returns its handle to the pool when dropped, including on
//! early returns and `?` propagation.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::types::{Generation, ObjectKind, SlotIndex};

const UNBOUND: SlotIndex = SlotIndex::MAX;

/// Marker for the object family a [`Ref`] designates.
pub trait RefKind {
    const KIND: ObjectKind;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeKind;

impl RefKind for VertexKind {
    const KIND: ObjectKind = ObjectKind::Vertex;
}

impl RefKind for EdgeKind {
    const KIND: ObjectKind = ObjectKind::Edge;
}

/// Reusable handle bound to at most one pool slot at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref<K> {
    slot: SlotIndex,
    generation: Generation,
    _kind: PhantomData<fn() -> K>,
}

pub type VertexRef = Ref<VertexKind>;
pub type EdgeRef = Ref<EdgeKind>;

impl<K: RefKind> Default for Ref<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: RefKind> Ref<K> {
    /// Create an unbound handle.
    pub const fn new() -> Self {
        Self {
            slot: UNBOUND,
            generation: 0,
            _kind: PhantomData,
        }
    }

    /// Point this handle at `slot`, returning the same instance.
    pub fn bind(&mut self, slot: SlotIndex, generation: Generation) -> &mut Self {
        self.slot = slot;
        self.generation = generation;
        self
    }

    pub fn unbind(&mut self) {
        self.slot = UNBOUND;
        self.generation = 0;
    }

    pub fn is_bound(&self) -> bool {
        self.slot != UNBOUND
    }

    pub fn slot(&self) -> Option<SlotIndex> {
        self.is_bound().then_some(self.slot)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn kind(&self) -> ObjectKind {
        K::KIND
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefPoolStats {
    /// Handles constructed because the pool was empty.
    pub created: u64,
    /// Handles currently parked in the pool.
    pub idle: usize,
}

/// Recycler for released handles of one kind.
///
/// Shared through `&self` so handles can be acquired while only a read lock
/// on the owning graph is held.
#[derive(Debug)]
pub struct RefPool<K> {
    released: Mutex<Vec<Ref<K>>>,
    created: AtomicU64,
}

impl<K: RefKind> Default for RefPool<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: RefKind> RefPool<K> {
    pub fn new() -> Self {
        Self {
            released: Mutex::new(Vec::new()),
            created: AtomicU64::new(0),
        }
    }

    /// Take an unbound handle, reusing a released one when available.
    pub fn create_ref(&self) -> Ref<K> {
        if let Some(proxy) = self.released.lock().pop() {
            return proxy;
        }
        self.created.fetch_add(1, Ordering::Relaxed);
        Ref::new()
    }

    /// Return a handle for reuse. It is unbound first.
    pub fn release_ref(&self, mut proxy: Ref<K>) {
        proxy.unbind();
        self.released.lock().push(proxy);
    }

    pub fn stats(&self) -> RefPoolStats {
        RefPoolStats {
            created: self.created.load(Ordering::Relaxed),
            idle: self.released.lock().len(),
        }
    }
}

/// A handle checked out of a [`RefPool`], released when dropped.
#[derive(Debug)]
pub struct PooledRef<K: RefKind> {
    proxy: Ref<K>,
    pool: Arc<RefPool<K>>,
}

impl<K: RefKind> PooledRef<K> {
    pub(crate) fn acquire(pool: &Arc<RefPool<K>>) -> Self {
        Self {
            proxy: pool.create_ref(),
            pool: Arc::clone(pool),
        }
    }
}

impl<K: RefKind> Deref for PooledRef<K> {
    type Target = Ref<K>;

    fn deref(&self) -> &Ref<K> {
        &self.proxy
    }
}

impl<K: RefKind> DerefMut for PooledRef<K> {
    fn deref_mut(&mut self) -> &mut Ref<K> {
        &mut self.proxy
    }
}

impl<K: RefKind> Drop for PooledRef<K> {
    fn drop(&mut self) {
        self.pool.release_ref(std::mem::take(&mut self.proxy));
    }
}
