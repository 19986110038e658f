//! Bidirectional map between stable ids and pool slots.
//!
//! Two dense parallel arrays (id -> slot, slot -> id) plus a stack of
//! released ids. Released ids are reissued before the id space grows, which
//! keeps ids dense under heavy churn. Vertices and edges use independent id
//! spaces, bundled in [`GraphIdBimap`].

use crate::types::{ObjectKind, SlotIndex, StableId};

const NO_ENTRY: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub struct IdBimap {
    kind: ObjectKind,
    id_to_slot: Vec<SlotIndex>,
    slot_to_id: Vec<StableId>,
    free_ids: Vec<StableId>,
    live: usize,
}

impl IdBimap {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            id_to_slot: Vec::new(),
            slot_to_id: Vec::new(),
            free_ids: Vec::new(),
            live: 0,
        }
    }

    pub fn with_capacity(kind: ObjectKind, capacity: usize) -> Self {
        Self {
            kind,
            id_to_slot: Vec::with_capacity(capacity),
            slot_to_id: Vec::with_capacity(capacity),
            free_ids: Vec::new(),
            live: 0,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Issue an id for the object just placed in `slot`.
    ///
    /// Called exactly once per object at creation. Reuses the most recently
    /// released id, else the next sequential one.
    pub fn assign(&mut self, slot: SlotIndex) -> StableId {
        let id = match self.free_ids.pop() {
            Some(id) => id,
            None => {
                self.id_to_slot.push(NO_ENTRY);
                (self.id_to_slot.len() - 1) as StableId
            }
        };

        let slot_index = slot as usize;
        if slot_index >= self.slot_to_id.len() {
            self.slot_to_id.resize(slot_index + 1, NO_ENTRY);
        }
        assert_eq!(
            self.slot_to_id[slot_index], NO_ENTRY,
            "{} slot {slot} already has a stable id",
            self.kind
        );

        self.id_to_slot[id as usize] = slot;
        self.slot_to_id[slot_index] = id;
        self.live += 1;
        id
    }

    /// Return `id` to the free-id pool.
    ///
    /// Releasing an id that is not live is a contract violation: it would put
    /// the same id on the free stack twice and hand it to two objects.
    pub fn release(&mut self, id: StableId) {
        let slot = self.id_to_slot.get(id as usize).copied().unwrap_or(NO_ENTRY);
        assert_ne!(slot, NO_ENTRY, "{} id {id} released twice", self.kind);

        self.id_to_slot[id as usize] = NO_ENTRY;
        self.slot_to_id[slot as usize] = NO_ENTRY;
        self.free_ids.push(id);
        self.live -= 1;
    }

    pub fn id_of(&self, slot: SlotIndex) -> Option<StableId> {
        self.slot_to_id
            .get(slot as usize)
            .copied()
            .filter(|&id| id != NO_ENTRY)
    }

    pub fn slot_of(&self, id: StableId) -> Option<SlotIndex> {
        self.id_to_slot
            .get(id as usize)
            .copied()
            .filter(|&slot| slot != NO_ENTRY)
    }

    /// Number of live ids.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// One past the highest id ever issued.
    pub fn id_space(&self) -> usize {
        self.id_to_slot.len()
    }

    pub fn clear(&mut self) {
        self.id_to_slot.clear();
        self.slot_to_id.clear();
        self.free_ids.clear();
        self.live = 0;
    }
}

/// Vertex and edge id maps of one graph.
#[derive(Debug, Clone)]
pub struct GraphIdBimap {
    vertices: IdBimap,
    edges: IdBimap,
}

impl Default for GraphIdBimap {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphIdBimap {
    pub fn new() -> Self {
        Self {
            vertices: IdBimap::new(ObjectKind::Vertex),
            edges: IdBimap::new(ObjectKind::Edge),
        }
    }

    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            vertices: IdBimap::with_capacity(ObjectKind::Vertex, vertices),
            edges: IdBimap::with_capacity(ObjectKind::Edge, edges),
        }
    }

    pub fn vertex_id_bimap(&self) -> &IdBimap {
        &self.vertices
    }

    pub fn edge_id_bimap(&self) -> &IdBimap {
        &self.edges
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut IdBimap {
        &mut self.vertices
    }

    pub(crate) fn edges_mut(&mut self) -> &mut IdBimap {
        &mut self.edges
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
    }
}
