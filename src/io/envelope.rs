//! Versioned file envelope around the raw protocol.
//!
//! ```text
//! [u8; 8]   magic "LNGRAPH\0"
//! u32       format version
//! u32       vertex attribute width (Wv)
//! u32       edge attribute width (We)
//! ...       raw protocol body
//! ```
//!
//! Recording the widths turns a serializer mismatch into a
//! [`LineageGraphError::WidthMismatch`] instead of a misaligned read.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::errors::{GraphResult, LineageGraphError};
use crate::graph::Graph;
use crate::types::ObjectKind;

use super::file_ids::GraphFileIds;
use super::raw;
use super::serializer::{GraphSerializer, ObjectSerializer};

pub const MAGIC_BYTES: [u8; 8] = *b"LNGRAPH\0";

pub const FORMAT_VERSION: u32 = 1;

pub const HEADER_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    pub version: u32,
    pub vertex_width: u32,
    pub edge_width: u32,
}

impl FileHeader {
    /// Header for a file written with `serializer`.
    pub fn for_serializer<V, E, S: GraphSerializer<V, E>>(serializer: &S) -> GraphResult<Self> {
        Ok(Self {
            version: FORMAT_VERSION,
            vertex_width: header_width(
                ObjectKind::Vertex,
                serializer.vertex_serializer().byte_width(),
            )?,
            edge_width: header_width(ObjectKind::Edge, serializer.edge_serializer().byte_width())?,
        })
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..8].copy_from_slice(&MAGIC_BYTES);
        bytes[8..12].copy_from_slice(&self.version.to_be_bytes());
        bytes[12..16].copy_from_slice(&self.vertex_width.to_be_bytes());
        bytes[16..20].copy_from_slice(&self.edge_width.to_be_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8; HEADER_SIZE]) -> GraphResult<Self> {
        if bytes[0..8] != MAGIC_BYTES {
            let mut found = [0u8; 8];
            found.copy_from_slice(&bytes[0..8]);
            return Err(LineageGraphError::InvalidMagic {
                expected: u64::from_be_bytes(MAGIC_BYTES),
                found: u64::from_be_bytes(found),
            });
        }

        let word = |at: usize| {
            u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let header = Self {
            version: word(8),
            vertex_width: word(12),
            edge_width: word(16),
        };
        if header.version != FORMAT_VERSION {
            return Err(LineageGraphError::UnsupportedVersion {
                version: header.version,
                supported: FORMAT_VERSION,
            });
        }
        Ok(header)
    }

    /// Check that the recorded widths match the ones `serializer` expects.
    pub fn check_widths<V, E, S>(&self, serializer: &S) -> GraphResult<()>
    where
        S: GraphSerializer<V, E>,
    {
        let checks = [
            (
                ObjectKind::Vertex,
                serializer.vertex_serializer().byte_width(),
                self.vertex_width,
            ),
            (
                ObjectKind::Edge,
                serializer.edge_serializer().byte_width(),
                self.edge_width,
            ),
        ];
        for (kind, expected, found) in checks {
            if expected != found as usize {
                return Err(LineageGraphError::WidthMismatch {
                    kind,
                    expected,
                    found: found as usize,
                });
            }
        }
        Ok(())
    }
}

fn header_width(kind: ObjectKind, width: usize) -> GraphResult<u32> {
    u32::try_from(width).map_err(|_| LineageGraphError::WidthTooLarge { kind, width })
}

/// Read and validate the envelope header without touching the body.
pub fn read_header<R: Read>(input: &mut R) -> GraphResult<FileHeader> {
    let mut bytes = [0u8; HEADER_SIZE];
    input.read_exact(&mut bytes)?;
    FileHeader::decode(&bytes)
}

pub fn write_enveloped<V, E, S, W>(
    graph: &Graph<V, E>,
    serializer: &S,
    mut out: W,
) -> GraphResult<GraphFileIds>
where
    S: GraphSerializer<V, E>,
    W: Write,
{
    out.write_all(&FileHeader::for_serializer(serializer)?.encode())?;
    raw::write(graph, serializer, out)
}

pub fn read_enveloped<V, E, S, R>(
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
    let header = read_header(&mut input)?;
    header.check_widths(serializer)?;
    raw::read(graph, serializer, input)
}

pub fn save_graph_to_path<V, E, S, P>(
    graph: &Graph<V, E>,
    serializer: &S,
    path: P,
) -> GraphResult<GraphFileIds>
where
    S: GraphSerializer<V, E>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    debug!(path = %path.display(), "saving graph");
    let mut out = BufWriter::new(File::create(path)?);
    let ids = write_enveloped(graph, serializer, &mut out)?;
    out.flush()?;
    Ok(ids)
}

pub fn load_graph_from_path<V, E, S, P>(
    graph: &mut Graph<V, E>,
    serializer: &S,
    path: P,
) -> GraphResult<GraphFileIds>
where
    V: Default,
    E: Default,
    S: GraphSerializer<V, E>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    debug!(path = %path.display(), "loading graph");
    let input = BufReader::new(File::open(path)?);
    read_enveloped(graph, serializer, input)
}
