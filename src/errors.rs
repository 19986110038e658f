use thiserror::Error;

use crate::types::{Direction, FileIndex, Generation, ObjectKind, SlotIndex, StableId};

/// Error type for lineage graph operations.
#[derive(Debug, Error)]
pub enum LineageGraphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{kind} proxy is not bound to any slot")]
    UnboundRef { kind: ObjectKind },

    #[error("{kind} proxy is stale: slot {slot} generation {generation} has been recycled")]
    StaleRef {
        kind: ObjectKind,
        slot: SlotIndex,
        generation: Generation,
    },

    #[error("{kind} slot {slot} is not allocated")]
    VacantSlot { kind: ObjectKind, slot: SlotIndex },

    #[error("no live {kind} with stable id {id}")]
    UnknownStableId { kind: ObjectKind, id: StableId },

    #[error("{kind} file index {index} out of bounds (count: {count})")]
    InvalidFileIndex {
        kind: ObjectKind,
        index: i64,
        count: u32,
    },

    #[error("negative {kind} count in stream: {count}")]
    NegativeCount { kind: ObjectKind, count: i32 },

    #[error("invalid {direction} adjacency index: {index}")]
    InvalidAdjacencyIndex { direction: Direction, index: i64 },

    #[error("{direction} position {index} is past the end of the list (degree: {degree})")]
    AdjacencyIndexOutOfRange {
        direction: Direction,
        index: u32,
        degree: usize,
    },

    #[error("{kind} attribute width {width} does not fit the file header")]
    WidthTooLarge { kind: ObjectKind, width: usize },

    #[error("too many {kind}s for the stream format: {count}")]
    TooManyObjects { kind: ObjectKind, count: usize },

    #[error("invalid magic bytes: expected {expected:016x}, found {found:016x}")]
    InvalidMagic { expected: u64, found: u64 },

    #[error("unsupported format version: {version} (supported: {supported})")]
    UnsupportedVersion { version: u32, supported: u32 },

    #[error("{kind} attribute width mismatch: file has {found} bytes, serializer expects {expected}")]
    WidthMismatch {
        kind: ObjectKind,
        expected: usize,
        found: usize,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LineageGraphError {
    pub fn unbound(kind: ObjectKind) -> Self {
        LineageGraphError::UnboundRef { kind }
    }

    pub fn stale(kind: ObjectKind, slot: SlotIndex, generation: Generation) -> Self {
        LineageGraphError::StaleRef {
            kind,
            slot,
            generation,
        }
    }

    pub fn unknown_id(kind: ObjectKind, id: StableId) -> Self {
        LineageGraphError::UnknownStableId { kind, id }
    }

    pub fn invalid_file_index(kind: ObjectKind, index: i64, count: FileIndex) -> Self {
        LineageGraphError::InvalidFileIndex { kind, index, count }
    }

    /// True for failures of the underlying byte stream.
    pub fn is_stream_fault(&self) -> bool {
        matches!(self, LineageGraphError::Io(_))
    }
}

/// Result type alias for lineage graph operations.
pub type GraphResult<T> = Result<T, LineageGraphError>;
