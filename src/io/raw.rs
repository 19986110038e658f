//! The bare binary protocol.
//!
//! ```text
//! i32                 vertex count N
//! N x [u8; Wv]        vertex attributes          (omitted when Wv == 0)
//! i32                 edge count M
//! M x {
//!     i32             source file index          (0..N)
//!     i32             target file index          (0..N)
//!     i32             source out index
//!     i32             target in index
//!     [u8; We]        edge attributes            (omitted when We == 0)
//! }
//! ```
//!
//! All integers are big-endian. Objects are written in pool-slot order and
//! numbered by file index in that order. `Wv` and `We` come from the
//! serializer and are not recorded in the stream.

use std::io::{Read, Write};

use tracing::debug;

use crate::errors::{GraphResult, LineageGraphError};
use crate::graph::Graph;
use crate::pool::VertexRef;
use crate::types::{Direction, FileIndex, ObjectKind};

use super::file_ids::{FileIdTable, GraphFileIds};
use super::serializer::{GraphSerializer, ObjectSerializer};

const EDGE_RECORD_SIZE: usize = 16;

const MAX_PREALLOCATED: usize = 1 << 16;

/// Write `graph` to `out` and return the file-index tables of this write.
///
/// Reads only, so a shared lock on the graph is enough.
pub fn write<V, E, S, W>(
    graph: &Graph<V, E>,
    serializer: &S,
    mut out: W,
) -> GraphResult<GraphFileIds>
where
    S: GraphSerializer<V, E>,
    W: Write,
{
    let vertex_codec = serializer.vertex_serializer();
    let edge_codec = serializer.edge_serializer();
    let vertex_count = wire_count(ObjectKind::Vertex, graph.vertex_count())?;
    let edge_count = wire_count(ObjectKind::Edge, graph.edge_count())?;
    debug!(vertex_count, edge_count, "writing graph");

    let mut ids = GraphFileIds::with_capacity(graph.vertex_count(), graph.edge_count());

    out.write_all(&vertex_count.to_be_bytes())?;
    let mut attrs = vec![0u8; vertex_codec.byte_width()];
    let mut vertex = graph.vertex_ref();
    let mut vertices = graph.vertices();
    while let Some(v) = vertices.advance(&mut vertex) {
        if !attrs.is_empty() {
            vertex_codec.encode(graph.vertex(v)?, &mut attrs);
            out.write_all(&attrs)?;
        }
        ids.vertices.push(graph.vertex_id(v)?);
    }

    out.write_all(&edge_count.to_be_bytes())?;
    let mut attrs = vec![0u8; edge_codec.byte_width()];
    let mut record = [0u8; EDGE_RECORD_SIZE];
    let mut edge = graph.edge_ref();
    let mut endpoint = graph.vertex_ref();
    let mut edges = graph.edges();
    while let Some(e) = edges.advance(&mut edge) {
        let source = vertex_file_index(graph, &ids, graph.source(e, &mut endpoint)?)?;
        let target = vertex_file_index(graph, &ids, graph.target(e, &mut endpoint)?)?;
        let source_out_index = wire_position(graph.source_out_index(e)?)?;
        let target_in_index = wire_position(graph.target_in_index(e)?)?;

        record[0..4].copy_from_slice(&source.to_be_bytes());
        record[4..8].copy_from_slice(&target.to_be_bytes());
        record[8..12].copy_from_slice(&source_out_index.to_be_bytes());
        record[12..16].copy_from_slice(&target_in_index.to_be_bytes());
        out.write_all(&record)?;

        if !attrs.is_empty() {
            edge_codec.encode(graph.edge(e)?, &mut attrs);
            out.write_all(&attrs)?;
        }
        ids.edges.push(graph.edge_id(e)?);
    }

    out.flush()?;
    debug!(vertex_count, edge_count, "graph written");
    Ok(ids)
}

/// Read a graph from `input` into `graph` and return the file-index tables
/// of this read.
///
/// Objects are added to whatever `graph` already holds. Every vertex gets a
/// fresh stable id. Recorded positions may arrive in any order but must
/// leave every adjacency list of a read vertex without gaps. On error the
/// graph may be partially populated and should be discarded.
pub fn read<V, E, S, R>(
    graph: &mut Graph<V, E>,
    serializer: &S,
    mut input: R,
) -> GraphResult<GraphFileIds>
where
    V: Default,
    E: Default,
    S: GraphSerializer<V, E>,
    R: Read,
{
    let vertex_codec = serializer.vertex_serializer();
    let edge_codec = serializer.edge_serializer();
    let vertex_width = vertex_codec.byte_width();
    let edge_width = edge_codec.byte_width();

    let vertex_count = read_count(&mut input, ObjectKind::Vertex)?;
    debug!(vertex_count, "reading vertices");
    let mut ids = GraphFileIds::with_capacity(preallocation(vertex_count), 0);

    // Zero-width vertex records take no bytes, so a truncated stream would
    // only surface after every declared vertex exists.
    let mut early_edge_count = None;
    if vertex_width == 0 {
        early_edge_count = Some(read_count(&mut input, ObjectKind::Edge)?);
    }

    let mut attrs = Vec::new();
    let mut vertex = graph.vertex_ref();
    for _ in 0..vertex_count {
        read_attributes(&mut input, &mut attrs, vertex_width)?;
        graph.add_vertex(&mut vertex);
        let object = graph.vertex_mut(&vertex)?;
        if vertex_width > 0 {
            vertex_codec.decode(object, &attrs);
        }
        vertex_codec.on_after_load(object);
        ids.vertices.push(graph.vertex_id(&vertex)?);
    }

    let edge_count = match early_edge_count {
        Some(count) => count,
        None => read_count(&mut input, ObjectKind::Edge)?,
    };
    debug!(edge_count, "reading edges");
    ids.edges = FileIdTable::with_capacity(ObjectKind::Edge, preallocation(edge_count));

    let mut record = [0u8; EDGE_RECORD_SIZE];
    let mut source = graph.vertex_ref();
    let mut target = graph.vertex_ref();
    let mut edge = graph.edge_ref();
    for _ in 0..edge_count {
        input.read_exact(&mut record)?;
        let source_index = field(&record, 0);
        let target_index = field(&record, 1);
        let source_out_index = position(Direction::Outgoing, field(&record, 2))?;
        let target_in_index = position(Direction::Incoming, field(&record, 3))?;
        read_attributes(&mut input, &mut attrs, edge_width)?;

        ids.vertex(graph, file_index(source_index, vertex_count)?, &mut source)?;
        ids.vertex(graph, file_index(target_index, vertex_count)?, &mut target)?;
        graph.place_edge(&source, source_out_index, &target, target_in_index, &mut edge)?;

        let object = graph.edge_mut(&edge)?;
        if edge_width > 0 {
            edge_codec.decode(object, &attrs);
        }
        edge_codec.on_after_load(object);
        ids.edges.push(graph.edge_id(&edge)?);
    }

    // Records may arrive in any order, so gaps only show once all are placed.
    for (file_index, _) in ids.vertices.iter() {
        ids.vertex(graph, file_index, &mut vertex)?;
        for direction in [Direction::Outgoing, Direction::Incoming] {
            if let Some(index) = graph.adjacency_gap(&vertex, direction)? {
                return Err(LineageGraphError::InvalidAdjacencyIndex {
                    direction,
                    index: i64::from(index),
                });
            }
        }
    }

    debug!(vertex_count, edge_count, "graph read");
    Ok(ids)
}

/// Table capacity to reserve for a count taken from the stream.
fn preallocation(count: u32) -> usize {
    (count as usize).min(MAX_PREALLOCATED)
}

/// Fill `buf` with the next `width` bytes. The buffer grows with the data
/// actually read, never with the declared width alone.
fn read_attributes<R: Read>(input: &mut R, buf: &mut Vec<u8>, width: usize) -> GraphResult<()> {
    buf.clear();
    if width == 0 {
        return Ok(());
    }
    input.by_ref().take(width as u64).read_to_end(buf)?;
    if buf.len() < width {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(())
}

fn wire_count(kind: ObjectKind, count: usize) -> GraphResult<i32> {
    i32::try_from(count).map_err(|_| LineageGraphError::TooManyObjects { kind, count })
}

fn wire_position(position: u32) -> GraphResult<i32> {
    wire_count(ObjectKind::Edge, position as usize)
}

fn vertex_file_index<V, E>(
    graph: &Graph<V, E>,
    ids: &GraphFileIds,
    vertex: &VertexRef,
) -> GraphResult<i32> {
    let id = graph.vertex_id(vertex)?;
    let file_index = ids
        .vertices
        .file_index(id)
        .ok_or_else(|| LineageGraphError::unknown_id(ObjectKind::Vertex, id))?;
    Ok(file_index as i32)
}

fn read_i32<R: Read>(input: &mut R) -> GraphResult<i32> {
    let mut bytes = [0u8; 4];
    input.read_exact(&mut bytes)?;
    Ok(i32::from_be_bytes(bytes))
}

fn read_count<R: Read>(input: &mut R, kind: ObjectKind) -> GraphResult<u32> {
    let count = read_i32(input)?;
    u32::try_from(count).map_err(|_| LineageGraphError::NegativeCount { kind, count })
}

fn field(record: &[u8; EDGE_RECORD_SIZE], n: usize) -> i32 {
    let at = n * 4;
    i32::from_be_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]])
}

fn file_index(index: i32, vertex_count: u32) -> GraphResult<FileIndex> {
    match u32::try_from(index) {
        Ok(file_index) if file_index < vertex_count => Ok(file_index),
        _ => Err(LineageGraphError::invalid_file_index(
            ObjectKind::Vertex,
            i64::from(index),
            vertex_count,
        )),
    }
}

fn position(direction: Direction, index: i32) -> GraphResult<u32> {
    u32::try_from(index).map_err(|_| LineageGraphError::InvalidAdjacencyIndex {
        direction,
        index: i64::from(index),
    })
}
