//! Attribute codecs used by the binary protocol.

/// Fixed-width attribute codec for one object type.
///
/// The protocol never looks inside the bytes. Reader and writer must agree
/// on [`byte_width`](Self::byte_width); a width of zero writes nothing.
pub trait ObjectSerializer<O> {
    fn byte_width(&self) -> usize;

    /// Fill `bytes` (exactly `byte_width()` long) from `object`.
    fn encode(&self, object: &O, bytes: &mut [u8]);

    /// Overwrite the attributes of `object` from `bytes`.
    fn decode(&self, object: &mut O, bytes: &[u8]);

    /// Runs once per object after a load has placed it, to rebuild cached
    /// state that is not persisted.
    fn on_after_load(&self, _object: &mut O) {}
}

/// Vertex and edge codecs of one graph type.
pub trait GraphSerializer<V, E> {
    type Vertices: ObjectSerializer<V>;
    type Edges: ObjectSerializer<E>;

    fn vertex_serializer(&self) -> &Self::Vertices;
    fn edge_serializer(&self) -> &Self::Edges;
}

impl<V, E, VS, ES> GraphSerializer<V, E> for (VS, ES)
where
    VS: ObjectSerializer<V>,
    ES: ObjectSerializer<E>,
{
    type Vertices = VS;
    type Edges = ES;

    fn vertex_serializer(&self) -> &VS {
        &self.0
    }

    fn edge_serializer(&self) -> &ES {
        &self.1
    }
}

/// Codec for objects without persisted attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoAttributes;

impl<O> ObjectSerializer<O> for NoAttributes {
    fn byte_width(&self) -> usize {
        0
    }

    fn encode(&self, _object: &O, _bytes: &mut [u8]) {}

    fn decode(&self, _object: &mut O, _bytes: &[u8]) {}
}

/// Verbatim codec for opaque `Vec<u8>` attribute blocks of a fixed width.
///
/// Short blocks are zero-padded on encode and long ones truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpaqueBytes {
    width: usize,
}

impl OpaqueBytes {
    pub const fn new(width: usize) -> Self {
        Self { width }
    }
}

impl ObjectSerializer<Vec<u8>> for OpaqueBytes {
    fn byte_width(&self) -> usize {
        self.width
    }

    fn encode(&self, object: &Vec<u8>, bytes: &mut [u8]) {
        let len = object.len().min(bytes.len());
        bytes[..len].copy_from_slice(&object[..len]);
        bytes[len..].fill(0);
    }

    fn decode(&self, object: &mut Vec<u8>, bytes: &[u8]) {
        object.clear();
        object.extend_from_slice(bytes);
    }
}
