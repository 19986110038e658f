//! Translation tables between stable ids and file indices.
//!
//! A file index is the 0-based position an object had in one written or
//! read stream. Stable ids are not preserved across a round trip, so
//! companion streams (per-object tables written next to the graph) key
//! their records by file index and use these tables to find the objects.

use ahash::AHashMap;

use crate::errors::{GraphResult, LineageGraphError};
use crate::graph::Graph;
use crate::pool::{EdgeRef, VertexRef};
use crate::types::{FileIndex, ObjectKind, StableId};

/// Bidirectional stable id <-> file index table for one object kind.
#[derive(Debug, Clone)]
pub struct FileIdTable {
    kind: ObjectKind,
    stable_ids: Vec<StableId>,
    file_indices: AHashMap<StableId, FileIndex>,
}

impl FileIdTable {
    pub fn new(kind: ObjectKind) -> Self {
        Self::with_capacity(kind, 0)
    }

    pub fn with_capacity(kind: ObjectKind, capacity: usize) -> Self {
        Self {
            kind,
            stable_ids: Vec::with_capacity(capacity),
            file_indices: AHashMap::with_capacity(capacity),
        }
    }

    /// Record the next object in stream order.
    pub(crate) fn push(&mut self, id: StableId) -> FileIndex {
        let file_index = self.stable_ids.len() as FileIndex;
        self.stable_ids.push(id);
        self.file_indices.insert(id, file_index);
        file_index
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn file_index(&self, id: StableId) -> Option<FileIndex> {
        self.file_indices.get(&id).copied()
    }

    pub fn stable_id(&self, file_index: FileIndex) -> Option<StableId> {
        self.stable_ids.get(file_index as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.stable_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stable_ids.is_empty()
    }

    /// `(file index, stable id)` pairs in stream order.
    pub fn iter(&self) -> impl Iterator<Item = (FileIndex, StableId)> + '_ {
        self.stable_ids
            .iter()
            .enumerate()
            .map(|(index, &id)| (index as FileIndex, id))
    }

    fn resolve(&self, file_index: FileIndex) -> GraphResult<StableId> {
        self.stable_id(file_index).ok_or_else(|| {
            LineageGraphError::invalid_file_index(
                self.kind,
                i64::from(file_index),
                self.stable_ids.len() as FileIndex,
            )
        })
    }
}

/// Vertex and edge tables produced by one write or read.
#[derive(Debug, Clone)]
pub struct GraphFileIds {
    pub vertices: FileIdTable,
    pub edges: FileIdTable,
}

impl Default for GraphFileIds {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphFileIds {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            vertices: FileIdTable::with_capacity(ObjectKind::Vertex, vertices),
            edges: FileIdTable::with_capacity(ObjectKind::Edge, edges),
        }
    }

    pub fn vertex_file_index<V, E>(
        &self,
        graph: &Graph<V, E>,
        vertex: &VertexRef,
    ) -> GraphResult<Option<FileIndex>> {
        Ok(self.vertices.file_index(graph.vertex_id(vertex)?))
    }

    pub fn edge_file_index<V, E>(
        &self,
        graph: &Graph<V, E>,
        edge: &EdgeRef,
    ) -> GraphResult<Option<FileIndex>> {
        Ok(self.edges.file_index(graph.edge_id(edge)?))
    }

    /// Bind `proxy` to the vertex stored at `file_index`.
    pub fn vertex<'r, V, E>(
        &self,
        graph: &Graph<V, E>,
        file_index: FileIndex,
        proxy: &'r mut VertexRef,
    ) -> GraphResult<&'r mut VertexRef> {
        graph.vertex_by_id(self.vertices.resolve(file_index)?, proxy)
    }

    /// Bind `proxy` to the edge stored at `file_index`.
    pub fn edge<'r, V, E>(
        &self,
        graph: &Graph<V, E>,
        file_index: FileIndex,
        proxy: &'r mut EdgeRef,
    ) -> GraphResult<&'r mut EdgeRef> {
        graph.edge_by_id(self.edges.resolve(file_index)?, proxy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_maps_both_directions() {
        let mut table = FileIdTable::new(ObjectKind::Vertex);
        assert_eq!(table.push(17), 0);
        assert_eq!(table.push(3), 1);

        assert_eq!(table.file_index(3), Some(1));
        assert_eq!(table.stable_id(0), Some(17));
        assert_eq!(table.file_index(4), None);
        assert_eq!(table.stable_id(2), None);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(0, 17), (1, 3)]);
    }

    #[test]
    fn test_out_of_range_file_index_is_reported() {
        let graph: Graph<(), ()> = Graph::new();
        let ids = GraphFileIds::new();
        let mut proxy = VertexRef::new();
        let err = ids.vertex(&graph, 5, &mut proxy).unwrap_err();
        assert!(matches!(
            err,
            LineageGraphError::InvalidFileIndex {
                kind: ObjectKind::Vertex,
                index: 5,
                count: 0
            }
        ));
    }
}
