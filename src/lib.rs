//! Pooled in-memory storage for large lineage graphs.
//!
//! Vertices and edges live in slot arenas with LIFO slot reuse and are
//! addressed through rebindable, generation-checked proxies. Every object
//! carries a dense recyclable stable id. Adjacency lists are ordered, and
//! each edge records its position in its source's outgoing list and its
//! target's incoming list.
//!
//! Graphs persist to a compact big-endian binary form ([`io::raw`]),
//! optionally wrapped in a versioned envelope ([`io::envelope`]). Both
//! directions return file-index tables that companion streams use to key
//! their own records.
//!
//! [`SharedGraph`] guards a graph with a reader-writer lock and offers
//! bounded-wait reads for latency-sensitive callers.
//!
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod client;
pub mod config;
pub mod errors;
pub mod graph;
pub mod idmap;
pub mod io;
pub mod pool;
pub mod shared;
pub mod types;
pub mod validation;

pub use crate::config::GraphConfig;
pub use crate::errors::{GraphResult, LineageGraphError};
pub use crate::graph::{AdjacentEdges, EdgeSlots, Graph, VertexSlots};
pub use crate::idmap::{GraphIdBimap, IdBimap};
pub use crate::io::{
    FileIdTable, GraphFileIds, GraphSerializer, NoAttributes, ObjectSerializer, OpaqueBytes,
};
pub use crate::pool::{
    EdgeKind, EdgeRef, Pool, PooledRef, Ref, RefKind, RefPool, RefPoolStats, VertexKind, VertexRef,
};
pub use crate::shared::SharedGraph;
pub use crate::types::{Direction, FileIndex, ObjectKind, SlotIndex, StableId};
pub use crate::validation::{AdjacencyReport, validate_adjacency};
