//! Allocation-free cursors over vertices, edges and adjacency lists.
//!
//! All cursors yield slot indices and can instead rebind a caller-supplied
//! proxy through `advance`. Vertex and edge cursors walk pool-slot order,
//! which is the native order used by the binary protocol.

use std::slice;

use super::{EdgeRecord, VertexRecord};
use crate::pool::{EdgeRef, Pool, Slots, VertexRef};
use crate::types::SlotIndex;

/// Live vertices in slot order.
#[derive(Debug, Clone)]
pub struct VertexSlots<'a, V> {
    pub(super) inner: Slots<'a, VertexRecord<V>>,
}

impl<V> VertexSlots<'_, V> {
    pub fn restart(&mut self) {
        self.inner.restart();
    }

    pub fn advance<'r>(&mut self, proxy: &'r mut VertexRef) -> Option<&'r mut VertexRef> {
        self.inner.advance(proxy)
    }
}

impl<V> Iterator for VertexSlots<'_, V> {
    type Item = SlotIndex;

    fn next(&mut self) -> Option<SlotIndex> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Live edges in slot order.
#[derive(Debug, Clone)]
pub struct EdgeSlots<'a, E> {
    pub(super) inner: Slots<'a, EdgeRecord<E>>,
}

impl<E> EdgeSlots<'_, E> {
    pub fn restart(&mut self) {
        self.inner.restart();
    }

    pub fn advance<'r>(&mut self, proxy: &'r mut EdgeRef) -> Option<&'r mut EdgeRef> {
        self.inner.advance(proxy)
    }
}

impl<E> Iterator for EdgeSlots<'_, E> {
    type Item = SlotIndex;

    fn next(&mut self) -> Option<SlotIndex> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Edges of one adjacency list, in list order.
#[derive(Debug)]
pub struct AdjacentEdges<'a, E> {
    pub(super) slots: slice::Iter<'a, SlotIndex>,
    pub(super) edges: &'a Pool<EdgeRecord<E>>,
}

impl<E> Clone for AdjacentEdges<'_, E> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            edges: self.edges,
        }
    }
}

impl<E> AdjacentEdges<'_, E> {
    pub fn advance<'r>(&mut self, proxy: &'r mut EdgeRef) -> Option<&'r mut EdgeRef> {
        let &slot = self.slots.next()?;
        Some(self.edges.bind_allocated(slot, proxy))
    }
}

impl<E> Iterator for AdjacentEdges<'_, E> {
    type Item = SlotIndex;

    fn next(&mut self) -> Option<SlotIndex> {
        self.slots.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<E> ExactSizeIterator for AdjacentEdges<'_, E> {}
