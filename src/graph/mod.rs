//! Pooled lineage graph with ordered adjacency and stable ids.
//!
//! [`Graph`] owns a vertex pool, an edge pool, the id bimaps and two proxy
//! recyclers. Every vertex keeps ordered outgoing and incoming edge lists;
//! every edge records its position in both (`source_out_index`,
//! `target_in_index`). Those positions are authoritative and survive a
//! save/load cycle unchanged.
//!
//! Objects are addressed through rebindable proxies ([`VertexRef`],
//! [`EdgeRef`]). All accessors check the proxy's slot generation, so a proxy
//! kept across the removal of its object yields
//! [`LineageGraphError::StaleRef`] rather than another object's data.
//!
//! # Example
//!
//! ```rust
//! use lineagegraph::{Graph, VertexRef, EdgeRef};
//!
//! let mut graph: Graph<u32, ()> = Graph::new();
//! let (mut a, mut b, mut e) = (VertexRef::new(), VertexRef::new(), EdgeRef::new());
//! graph.add_vertex(&mut a);
//! graph.add_vertex(&mut b);
//! *graph.vertex_mut(&b)? = 7;
//! graph.add_edge(&a, &b, &mut e)?;
//! assert_eq!(graph.out_degree(&a)?, 1);
//! assert_eq!(graph.source_out_index(&e)?, 0);
//! # Ok::<(), lineagegraph::LineageGraphError>(())
//! ```

mod adjacency;
mod iter;

pub use iter::{AdjacentEdges, EdgeSlots, VertexSlots};

use std::sync::Arc;

use crate::config::GraphConfig;
use crate::errors::{GraphResult, LineageGraphError};
use crate::idmap::GraphIdBimap;
use crate::pool::{
    EdgeKind, EdgeRef, Pool, PooledRef, RefKind, RefPool, RefPoolStats, VertexKind, VertexRef,
};
use crate::types::{Direction, ObjectKind, SlotIndex, StableId};

#[derive(Debug, Clone, Default)]
pub(crate) struct VertexRecord<V> {
    pub(crate) attrs: V,
    pub(crate) outgoing: Vec<SlotIndex>,
    pub(crate) incoming: Vec<SlotIndex>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EdgeRecord<E> {
    pub(crate) attrs: E,
    pub(crate) source: SlotIndex,
    pub(crate) target: SlotIndex,
    pub(crate) source_out_index: u32,
    pub(crate) target_in_index: u32,
}

/// Vertex/edge storage with ordered adjacency.
///
/// `V` and `E` are the per-object attribute records. The graph never
/// interprets them.
#[derive(Debug)]
pub struct Graph<V, E> {
    vertices: Pool<VertexRecord<V>>,
    edges: Pool<EdgeRecord<E>>,
    idmap: GraphIdBimap,
    vertex_refs: Arc<RefPool<VertexKind>>,
    edge_refs: Arc<RefPool<EdgeKind>>,
}

impl<V: Default, E: Default> Default for Graph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Default, E: Default> Graph<V, E> {
    pub fn new() -> Self {
        Self::with_config(&GraphConfig::default())
    }

    pub fn with_config(config: &GraphConfig) -> Self {
        let vertex_capacity = config.reserve_vertex_capacity.unwrap_or(0);
        let edge_capacity = config.reserve_edge_capacity.unwrap_or(0);
        Self {
            vertices: Pool::with_capacity(vertex_capacity),
            edges: Pool::with_capacity(edge_capacity),
            idmap: GraphIdBimap::with_capacity(vertex_capacity, edge_capacity),
            vertex_refs: Arc::new(RefPool::new()),
            edge_refs: Arc::new(RefPool::new()),
        }
    }

    /// Create a vertex with default attributes and bind `proxy` to it.
    pub fn add_vertex<'r>(&mut self, proxy: &'r mut VertexRef) -> &'r mut VertexRef {
        let slot = self.vertices.allocate();
        let record = self.vertices.record_mut(slot);
        record.attrs = V::default();
        record.outgoing.clear();
        record.incoming.clear();
        self.idmap.vertices_mut().assign(slot);
        self.vertices.bind_allocated(slot, proxy)
    }

    /// Create an edge appended to the end of `source`'s outgoing list and
    /// `target`'s incoming list.
    pub fn add_edge<'r>(
        &mut self,
        source: &VertexRef,
        target: &VertexRef,
        proxy: &'r mut EdgeRef,
    ) -> GraphResult<&'r mut EdgeRef> {
        let source = self.vertices.resolve(source)?;
        let target = self.vertices.resolve(target)?;
        let source_out_index = adjacency::append_position(
            &self.vertices.record(source).outgoing,
            &self.edges,
            Direction::Outgoing,
        );
        let target_in_index = adjacency::append_position(
            &self.vertices.record(target).incoming,
            &self.edges,
            Direction::Incoming,
        );
        Ok(self.attach_edge(source, source_out_index, target, target_in_index, proxy))
    }

    /// Create an edge at prescribed positions in both adjacency lists.
    ///
    /// Edges already at or above a position move up by one. A position may
    /// be at most the current degree, so the lists stay gap-free.
    pub fn insert_edge<'r>(
        &mut self,
        source: &VertexRef,
        source_out_index: u32,
        target: &VertexRef,
        target_in_index: u32,
        proxy: &'r mut EdgeRef,
    ) -> GraphResult<&'r mut EdgeRef> {
        let source = self.vertices.resolve(source)?;
        let target = self.vertices.resolve(target)?;
        let checks = [
            (Direction::Outgoing, source_out_index, self.vertices.record(source).outgoing.len()),
            (Direction::Incoming, target_in_index, self.vertices.record(target).incoming.len()),
        ];
        for (direction, index, degree) in checks {
            if index as usize > degree {
                return Err(LineageGraphError::AdjacencyIndexOutOfRange {
                    direction,
                    index,
                    degree,
                });
            }
        }
        Ok(self.attach_edge(source, source_out_index, target, target_in_index, proxy))
    }

    /// Like [`Graph::insert_edge`], but positions are bare ordering keys and
    /// may run past the end, so siblings placed later slot in before them.
    /// The loader uses this and checks for gaps once every record is placed.
    pub(crate) fn place_edge<'r>(
        &mut self,
        source: &VertexRef,
        source_out_index: u32,
        target: &VertexRef,
        target_in_index: u32,
        proxy: &'r mut EdgeRef,
    ) -> GraphResult<&'r mut EdgeRef> {
        let source = self.vertices.resolve(source)?;
        let target = self.vertices.resolve(target)?;
        Ok(self.attach_edge(source, source_out_index, target, target_in_index, proxy))
    }

    fn attach_edge<'r>(
        &mut self,
        source: SlotIndex,
        source_out_index: u32,
        target: SlotIndex,
        target_in_index: u32,
        proxy: &'r mut EdgeRef,
    ) -> &'r mut EdgeRef {
        let edge = self.edges.allocate();
        *self.edges.record_mut(edge) = EdgeRecord {
            attrs: E::default(),
            source,
            target,
            source_out_index,
            target_in_index,
        };
        adjacency::attach(
            &mut self.vertices.record_mut(source).outgoing,
            &mut self.edges,
            edge,
            Direction::Outgoing,
        );
        adjacency::attach(
            &mut self.vertices.record_mut(target).incoming,
            &mut self.edges,
            edge,
            Direction::Incoming,
        );
        self.idmap.edges_mut().assign(edge);
        self.edges.bind_allocated(edge, proxy)
    }
}

impl<V, E> Graph<V, E> {
    /// Remove an edge, closing the gap in both adjacency lists.
    pub fn remove_edge(&mut self, edge: &EdgeRef) -> GraphResult<()> {
        let edge = self.edges.resolve(edge)?;
        self.detach_edge(edge);
        Ok(())
    }

    /// Remove a vertex together with every edge incident to it.
    pub fn remove_vertex(&mut self, vertex: &VertexRef) -> GraphResult<()> {
        let vertex = self.vertices.resolve(vertex)?;
        while let Some(&edge) = self.vertices.record(vertex).outgoing.last() {
            self.detach_edge(edge);
        }
        while let Some(&edge) = self.vertices.record(vertex).incoming.last() {
            self.detach_edge(edge);
        }
        if let Some(id) = self.idmap.vertex_id_bimap().id_of(vertex) {
            self.idmap.vertices_mut().release(id);
        }
        self.vertices.free(vertex);
        Ok(())
    }

    fn detach_edge(&mut self, edge: SlotIndex) {
        let record = self.edges.record(edge);
        let (source, target) = (record.source, record.target);
        adjacency::detach(
            &mut self.vertices.record_mut(source).outgoing,
            &mut self.edges,
            edge,
            Direction::Outgoing,
        );
        adjacency::detach(
            &mut self.vertices.record_mut(target).incoming,
            &mut self.edges,
            edge,
            Direction::Incoming,
        );
        if let Some(id) = self.idmap.edge_id_bimap().id_of(edge) {
            self.idmap.edges_mut().release(id);
        }
        self.edges.free(edge);
    }

    /// Remove every vertex and edge and reset the id spaces.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.idmap.clear();
    }

    pub fn vertex_ref(&self) -> PooledRef<VertexKind> {
        PooledRef::acquire(&self.vertex_refs)
    }

    pub fn edge_ref(&self) -> PooledRef<EdgeKind> {
        PooledRef::acquire(&self.edge_refs)
    }

    /// Hand a proxy back to its recycler.
    ///
    /// Dropping a [`PooledRef`] is what releases it; this only makes the
    /// release explicit at the call site. Callers never need it.
    pub fn release_ref<K: RefKind>(&self, proxy: PooledRef<K>) {
        drop(proxy);
    }

    pub fn vertex_ref_stats(&self) -> RefPoolStats {
        self.vertex_refs.stats()
    }

    pub fn edge_ref_stats(&self) -> RefPoolStats {
        self.edge_refs.stats()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of vertex slots ever allocated, live or free.
    pub fn vertex_slot_capacity(&self) -> usize {
        self.vertices.capacity()
    }

    pub fn edge_slot_capacity(&self) -> usize {
        self.edges.capacity()
    }

    /// Live vertices in pool-slot order.
    pub fn vertices(&self) -> VertexSlots<'_, V> {
        VertexSlots {
            inner: self.vertices.slots(),
        }
    }

    /// Live edges in pool-slot order.
    pub fn edges(&self) -> EdgeSlots<'_, E> {
        EdgeSlots {
            inner: self.edges.slots(),
        }
    }

    pub fn bind_vertex<'r>(
        &self,
        slot: SlotIndex,
        proxy: &'r mut VertexRef,
    ) -> GraphResult<&'r mut VertexRef> {
        self.vertices.bind(slot, proxy)
    }

    pub fn bind_edge<'r>(
        &self,
        slot: SlotIndex,
        proxy: &'r mut EdgeRef,
    ) -> GraphResult<&'r mut EdgeRef> {
        self.edges.bind(slot, proxy)
    }

    pub fn contains_vertex(&self, vertex: &VertexRef) -> bool {
        self.vertices.resolve(vertex).is_ok()
    }

    pub fn contains_edge(&self, edge: &EdgeRef) -> bool {
        self.edges.resolve(edge).is_ok()
    }

    pub fn vertex(&self, vertex: &VertexRef) -> GraphResult<&V> {
        let slot = self.vertices.resolve(vertex)?;
        Ok(&self.vertices.record(slot).attrs)
    }

    pub fn vertex_mut(&mut self, vertex: &VertexRef) -> GraphResult<&mut V> {
        let slot = self.vertices.resolve(vertex)?;
        Ok(&mut self.vertices.record_mut(slot).attrs)
    }

    pub fn edge(&self, edge: &EdgeRef) -> GraphResult<&E> {
        let slot = self.edges.resolve(edge)?;
        Ok(&self.edges.record(slot).attrs)
    }

    pub fn edge_mut(&mut self, edge: &EdgeRef) -> GraphResult<&mut E> {
        let slot = self.edges.resolve(edge)?;
        Ok(&mut self.edges.record_mut(slot).attrs)
    }

    /// Bind `proxy` to the source vertex of `edge`.
    pub fn source<'r>(
        &self,
        edge: &EdgeRef,
        proxy: &'r mut VertexRef,
    ) -> GraphResult<&'r mut VertexRef> {
        let slot = self.edges.resolve(edge)?;
        let source = self.edges.record(slot).source;
        Ok(self.vertices.bind_allocated(source, proxy))
    }

    /// Bind `proxy` to the target vertex of `edge`.
    pub fn target<'r>(
        &self,
        edge: &EdgeRef,
        proxy: &'r mut VertexRef,
    ) -> GraphResult<&'r mut VertexRef> {
        let slot = self.edges.resolve(edge)?;
        let target = self.edges.record(slot).target;
        Ok(self.vertices.bind_allocated(target, proxy))
    }

    pub fn source_out_index(&self, edge: &EdgeRef) -> GraphResult<u32> {
        let slot = self.edges.resolve(edge)?;
        Ok(self.edges.record(slot).source_out_index)
    }

    pub fn target_in_index(&self, edge: &EdgeRef) -> GraphResult<u32> {
        let slot = self.edges.resolve(edge)?;
        Ok(self.edges.record(slot).target_in_index)
    }

    /// First recorded position in `vertex`'s list that differs from its
    /// list index, if any.
    pub(crate) fn adjacency_gap(
        &self,
        vertex: &VertexRef,
        direction: Direction,
    ) -> GraphResult<Option<u32>> {
        let slot = self.vertices.resolve(vertex)?;
        let record = self.vertices.record(slot);
        let list = match direction {
            Direction::Outgoing => &record.outgoing,
            Direction::Incoming => &record.incoming,
        };
        Ok(adjacency::first_gap(list, &self.edges, direction))
    }

    pub fn out_degree(&self, vertex: &VertexRef) -> GraphResult<usize> {
        let slot = self.vertices.resolve(vertex)?;
        Ok(self.vertices.record(slot).outgoing.len())
    }

    pub fn in_degree(&self, vertex: &VertexRef) -> GraphResult<usize> {
        let slot = self.vertices.resolve(vertex)?;
        Ok(self.vertices.record(slot).incoming.len())
    }

    pub fn outgoing_edges(&self, vertex: &VertexRef) -> GraphResult<AdjacentEdges<'_, E>> {
        let slot = self.vertices.resolve(vertex)?;
        Ok(AdjacentEdges {
            slots: self.vertices.record(slot).outgoing.iter(),
            edges: &self.edges,
        })
    }

    pub fn incoming_edges(&self, vertex: &VertexRef) -> GraphResult<AdjacentEdges<'_, E>> {
        let slot = self.vertices.resolve(vertex)?;
        Ok(AdjacentEdges {
            slots: self.vertices.record(slot).incoming.iter(),
            edges: &self.edges,
        })
    }

    pub fn outgoing_edge_at<'r>(
        &self,
        vertex: &VertexRef,
        index: usize,
        proxy: &'r mut EdgeRef,
    ) -> GraphResult<Option<&'r mut EdgeRef>> {
        let slot = self.vertices.resolve(vertex)?;
        Ok(self
            .vertices
            .record(slot)
            .outgoing
            .get(index)
            .map(|&edge| self.edges.bind_allocated(edge, proxy)))
    }

    pub fn incoming_edge_at<'r>(
        &self,
        vertex: &VertexRef,
        index: usize,
        proxy: &'r mut EdgeRef,
    ) -> GraphResult<Option<&'r mut EdgeRef>> {
        let slot = self.vertices.resolve(vertex)?;
        Ok(self
            .vertices
            .record(slot)
            .incoming
            .get(index)
            .map(|&edge| self.edges.bind_allocated(edge, proxy)))
    }

    /// First edge from `source` to `target` in `source`'s outgoing order.
    pub fn get_edge<'r>(
        &self,
        source: &VertexRef,
        target: &VertexRef,
        proxy: &'r mut EdgeRef,
    ) -> GraphResult<Option<&'r mut EdgeRef>> {
        let source = self.vertices.resolve(source)?;
        let target = self.vertices.resolve(target)?;
        Ok(self
            .vertices
            .record(source)
            .outgoing
            .iter()
            .find(|&&edge| self.edges.record(edge).target == target)
            .map(|&edge| self.edges.bind_allocated(edge, proxy)))
    }

    pub fn idmap(&self) -> &GraphIdBimap {
        &self.idmap
    }

    pub fn vertex_id(&self, vertex: &VertexRef) -> GraphResult<StableId> {
        let slot = self.vertices.resolve(vertex)?;
        self.idmap
            .vertex_id_bimap()
            .id_of(slot)
            .ok_or(LineageGraphError::VacantSlot {
                kind: ObjectKind::Vertex,
                slot,
            })
    }

    pub fn edge_id(&self, edge: &EdgeRef) -> GraphResult<StableId> {
        let slot = self.edges.resolve(edge)?;
        self.idmap
            .edge_id_bimap()
            .id_of(slot)
            .ok_or(LineageGraphError::VacantSlot {
                kind: ObjectKind::Edge,
                slot,
            })
    }

    /// Bind `proxy` to the live vertex carrying stable id `id`.
    pub fn vertex_by_id<'r>(
        &self,
        id: StableId,
        proxy: &'r mut VertexRef,
    ) -> GraphResult<&'r mut VertexRef> {
        let slot = self
            .idmap
            .vertex_id_bimap()
            .slot_of(id)
            .ok_or_else(|| LineageGraphError::unknown_id(ObjectKind::Vertex, id))?;
        Ok(self.vertices.bind_allocated(slot, proxy))
    }

    /// Bind `proxy` to the live edge carrying stable id `id`.
    pub fn edge_by_id<'r>(
        &self,
        id: StableId,
        proxy: &'r mut EdgeRef,
    ) -> GraphResult<&'r mut EdgeRef> {
        let slot = self
            .idmap
            .edge_id_bimap()
            .slot_of(id)
            .ok_or_else(|| LineageGraphError::unknown_id(ObjectKind::Edge, id))?;
        Ok(self.edges.bind_allocated(slot, proxy))
    }

    pub(crate) fn vertex_pool(&self) -> &Pool<VertexRecord<V>> {
        &self.vertices
    }

    pub(crate) fn edge_pool(&self) -> &Pool<EdgeRecord<E>> {
        &self.edges
    }

    #[cfg(test)]
    pub(crate) fn edge_pool_mut(&mut self) -> &mut Pool<EdgeRecord<E>> {
        &mut self.edges
    }
}
