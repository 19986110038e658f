//! Core type definitions shared by the pool, id map, graph and I/O layers.

use std::fmt;

/// Dense index of a record inside a [`Pool`](crate::pool::Pool).
pub type SlotIndex = u32;

/// Persistent identity of a vertex or edge, stable for the object's lifetime.
pub type StableId = u32;

/// Position of an object within one serialization session (0-based).
pub type FileIndex = u32;

/// Generation counter stamped on a slot each time it is freed.
pub type Generation = u32;

/// Which of the two object families a handle or id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Vertex,
    Edge,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Vertex => write!(f, "vertex"),
            ObjectKind::Edge => write!(f, "edge"),
        }
    }
}

/// Direction of an adjacency list relative to its owning vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outgoing => write!(f, "outgoing"),
            Direction::Incoming => write!(f, "incoming"),
        }
    }
}
