//! Ordered adjacency list maintenance.
//!
//! Each vertex keeps its outgoing and incoming edges in `Vec<SlotIndex>`
//! lists. Every edge records its position in both lists
//! (`source_out_index`, `target_in_index`), and each list is kept strictly
//! increasing in that recorded position.
//!
//! Positions act as sort keys while a list is being rebuilt out of order
//! (a loader may place position 3 before position 1 arrives). Once every
//! sibling is present the keys are exactly `0..len`. Inserting at an
//! occupied position shifts the colliding run up by one; removal shifts
//! every later entry down by one, so a contiguous list stays contiguous.

use super::EdgeRecord;
use crate::pool::Pool;
use crate::types::{Direction, SlotIndex};

fn position<E>(edges: &Pool<EdgeRecord<E>>, edge: SlotIndex, direction: Direction) -> u32 {
    let record = edges.record(edge);
    match direction {
        Direction::Outgoing => record.source_out_index,
        Direction::Incoming => record.target_in_index,
    }
}

fn set_position<E>(
    edges: &mut Pool<EdgeRecord<E>>,
    edge: SlotIndex,
    direction: Direction,
    value: u32,
) {
    let record = edges.record_mut(edge);
    match direction {
        Direction::Outgoing => record.source_out_index = value,
        Direction::Incoming => record.target_in_index = value,
    }
}

/// Position a new edge takes when appended to `list`.
pub(crate) fn append_position<E>(
    list: &[SlotIndex],
    edges: &Pool<EdgeRecord<E>>,
    direction: Direction,
) -> u32 {
    list.last()
        .map(|&last| position(edges, last, direction) + 1)
        .unwrap_or(0)
}

/// Insert `edge` into `list` at the position already recorded on the edge.
pub(crate) fn attach<E>(
    list: &mut Vec<SlotIndex>,
    edges: &mut Pool<EdgeRecord<E>>,
    edge: SlotIndex,
    direction: Direction,
) {
    let key = position(edges, edge, direction);
    let at = list.partition_point(|&other| position(edges, other, direction) < key);
    list.insert(at, edge);

    let mut previous = key;
    for &other in &list[at + 1..] {
        if position(edges, other, direction) > previous {
            break;
        }
        previous += 1;
        set_position(edges, other, direction, previous);
    }
}

/// First recorded position that does not match its index in `list`.
pub(crate) fn first_gap<E>(
    list: &[SlotIndex],
    edges: &Pool<EdgeRecord<E>>,
    direction: Direction,
) -> Option<u32> {
    list.iter()
        .enumerate()
        .map(|(index, &edge)| (index, position(edges, edge, direction)))
        .find(|&(index, key)| key as usize != index)
        .map(|(_, key)| key)
}

/// Remove `edge` from `list` and close the gap it leaves.
pub(crate) fn detach<E>(
    list: &mut Vec<SlotIndex>,
    edges: &mut Pool<EdgeRecord<E>>,
    edge: SlotIndex,
    direction: Direction,
) {
    let key = position(edges, edge, direction);
    let at = list.partition_point(|&other| position(edges, other, direction) < key);
    debug_assert_eq!(list.get(at), Some(&edge), "{direction} list out of order");
    list.remove(at);

    for &other in &list[at..] {
        let shifted = position(edges, other, direction) - 1;
        set_position(edges, other, direction, shifted);
    }
}
