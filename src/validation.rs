//! Structural consistency checks.
//!
//! [`validate_adjacency`] walks every live vertex and edge and verifies:
//! each edge sits in its source's outgoing list at `source_out_index` and in
//! its target's incoming list at `target_in_index`; every list entry names a
//! live edge pointing back at the owning vertex; and both id bimaps are
//! bijective over the live objects.

use serde::Serialize;
use tracing::warn;

use crate::graph::{EdgeRecord, Graph};
use crate::idmap::IdBimap;
use crate::pool::Pool;
use crate::types::{Direction, SlotIndex};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AdjacencyReport {
    pub total_vertices: usize,
    pub total_edges: usize,
    /// List entries or edge positions that disagree with each other.
    pub misplaced_edges: usize,
    /// References to vacant vertex or edge slots.
    pub dangling_edges: usize,
    pub id_mismatches: usize,
}

impl AdjacencyReport {
    pub fn has_issues(&self) -> bool {
        self.misplaced_edges > 0 || self.dangling_edges > 0 || self.id_mismatches > 0
    }
}

pub fn validate_adjacency<V, E>(graph: &Graph<V, E>) -> AdjacencyReport {
    let vertices = graph.vertex_pool();
    let edges = graph.edge_pool();
    let mut report = AdjacencyReport {
        total_vertices: graph.vertex_count(),
        total_edges: graph.edge_count(),
        ..AdjacencyReport::default()
    };

    for vertex in vertices.slots() {
        let record = vertices.record(vertex);
        check_list(&mut report, edges, vertex, &record.outgoing, Direction::Outgoing);
        check_list(&mut report, edges, vertex, &record.incoming, Direction::Incoming);
    }

    for edge in edges.slots() {
        let record = edges.record(edge);
        for (direction, endpoint, index) in [
            (Direction::Outgoing, record.source, record.source_out_index),
            (Direction::Incoming, record.target, record.target_in_index),
        ] {
            let Some(vertex) = vertices.get(endpoint) else {
                warn!(edge, endpoint, %direction, "edge endpoint is not a live vertex");
                report.dangling_edges += 1;
                continue;
            };
            let list = match direction {
                Direction::Outgoing => &vertex.outgoing,
                Direction::Incoming => &vertex.incoming,
            };
            if list.get(index as usize) != Some(&edge) {
                warn!(edge, endpoint, index, %direction, "edge missing from its recorded position");
                report.misplaced_edges += 1;
            }
        }
    }

    let idmap = graph.idmap();
    report.id_mismatches += check_bijection(idmap.vertex_id_bimap(), vertices.slots(), vertices.len());
    report.id_mismatches += check_bijection(idmap.edge_id_bimap(), edges.slots(), edges.len());
    report
}

fn check_list<E>(
    report: &mut AdjacencyReport,
    edges: &Pool<EdgeRecord<E>>,
    vertex: SlotIndex,
    list: &[SlotIndex],
    direction: Direction,
) {
    for (position, &edge) in list.iter().enumerate() {
        let Some(record) = edges.get(edge) else {
            warn!(vertex, edge, %direction, "adjacency list names a vacant edge slot");
            report.dangling_edges += 1;
            continue;
        };
        let (owner, recorded) = match direction {
            Direction::Outgoing => (record.source, record.source_out_index),
            Direction::Incoming => (record.target, record.target_in_index),
        };
        if owner != vertex || recorded as usize != position {
            warn!(vertex, edge, position, recorded, %direction, "adjacency entry out of place");
            report.misplaced_edges += 1;
        }
    }
}

fn check_bijection(map: &IdBimap, live: impl Iterator<Item = SlotIndex>, count: usize) -> usize {
    let mut mismatches = 0;
    for slot in live {
        let round_trip = map.id_of(slot).and_then(|id| map.slot_of(id));
        if round_trip != Some(slot) {
            warn!(kind = %map.kind(), slot, "live object has no matching stable id");
            mismatches += 1;
        }
    }
    if map.len() != count {
        warn!(kind = %map.kind(), ids = map.len(), live = count, "id count differs from live objects");
        mismatches += 1;
    }
    mismatches
}
