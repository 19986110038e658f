//! Whole-graph persistence.
//!
//! [`raw`] is the bare binary protocol: vertex count, vertex attribute
//! blocks, edge count, edge records. [`envelope`] prefixes it with a magic
//! number, a format version and the attribute widths for standalone files.
//! Attribute bytes are produced by a pluggable [`ObjectSerializer`].

pub mod envelope;
pub mod file_ids;
pub mod raw;
pub mod serializer;

pub use envelope::{
    FileHeader, load_graph_from_path, read_enveloped, read_header, save_graph_to_path,
    write_enveloped,
};
pub use file_ids::{FileIdTable, GraphFileIds};
pub use raw::{read, write};
pub use serializer::{GraphSerializer, NoAttributes, ObjectSerializer, OpaqueBytes};
