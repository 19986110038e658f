use lineagegraph::{
    Direction, EdgeRef, Graph, GraphConfig, LineageGraphError, ObjectKind, VertexRef,
    validate_adjacency,
};

type SpotGraph = Graph<u64, u32>;

fn graph_with_vertices(count: usize) -> (SpotGraph, Vec<VertexRef>) {
    let mut graph = SpotGraph::new();
    let mut vertices = Vec::new();
    for label in 0..count {
        let mut v = VertexRef::new();
        graph.add_vertex(&mut v);
        *graph.vertex_mut(&v).expect("vertex") = label as u64;
        vertices.push(v);
    }
    (graph, vertices)
}

fn outgoing_labels(graph: &SpotGraph, vertex: &VertexRef) -> Vec<u64> {
    let mut edge = graph.edge_ref();
    let mut target = graph.vertex_ref();
    let mut edges = graph.outgoing_edges(vertex).expect("outgoing");
    let mut labels = Vec::new();
    while let Some(e) = edges.advance(&mut edge) {
        graph.target(e, &mut target).expect("target");
        labels.push(*graph.vertex(&target).expect("vertex"));
    }
    labels
}

fn incoming_labels(graph: &SpotGraph, vertex: &VertexRef) -> Vec<u64> {
    let mut edge = graph.edge_ref();
    let mut source = graph.vertex_ref();
    let mut edges = graph.incoming_edges(vertex).expect("incoming");
    let mut labels = Vec::new();
    while let Some(e) = edges.advance(&mut edge) {
        graph.source(e, &mut source).expect("source");
        labels.push(*graph.vertex(&source).expect("vertex"));
    }
    labels
}

#[test]
fn test_add_vertex_binds_caller_proxy_with_default_attributes() {
    let mut graph = SpotGraph::new();
    let mut proxy = VertexRef::new();
    let bound = graph.add_vertex(&mut proxy);
    let slot = bound.slot();
    assert!(slot.is_some());
    assert_eq!(proxy.slot(), slot);
    assert_eq!(*graph.vertex(&proxy).unwrap(), 0);
    assert_eq!(graph.vertex_count(), 1);
    assert_eq!(graph.vertex_id(&proxy).unwrap(), 0);
}

#[test]
fn test_add_edge_appends_to_both_lists() {
    let (mut graph, v) = graph_with_vertices(4);
    let mut e = EdgeRef::new();
    graph.add_edge(&v[0], &v[1], &mut e).unwrap();
    graph.add_edge(&v[0], &v[2], &mut e).unwrap();
    graph.add_edge(&v[3], &v[2], &mut e).unwrap();

    assert_eq!(graph.source_out_index(&e).unwrap(), 0);
    assert_eq!(graph.target_in_index(&e).unwrap(), 1);
    assert_eq!(outgoing_labels(&graph, &v[0]), vec![1, 2]);
    assert_eq!(incoming_labels(&graph, &v[2]), vec![0, 3]);
    assert_eq!(graph.out_degree(&v[0]).unwrap(), 2);
    assert_eq!(graph.in_degree(&v[2]).unwrap(), 2);
}

#[test]
fn test_insert_edge_at_exact_positions() {
    let (mut graph, v) = graph_with_vertices(5);
    let mut e = EdgeRef::new();
    for target in 1..4 {
        graph.add_edge(&v[0], &v[target], &mut e).unwrap();
    }

    let mut inserted = EdgeRef::new();
    graph
        .insert_edge(&v[0], 1, &v[4], 0, &mut inserted)
        .unwrap();
    assert_eq!(outgoing_labels(&graph, &v[0]), vec![1, 4, 2, 3]);

    let mut at_index = EdgeRef::new();
    for index in 0..4 {
        graph
            .outgoing_edge_at(&v[0], index, &mut at_index)
            .unwrap()
            .expect("edge at index");
        assert_eq!(graph.source_out_index(&at_index).unwrap(), index as u32);
    }
    assert!(graph.outgoing_edge_at(&v[0], 4, &mut at_index).unwrap().is_none());
}

#[test]
fn test_insert_edge_past_end_is_rejected() {
    let (mut graph, v) = graph_with_vertices(2);
    let mut e = EdgeRef::new();

    let err = graph.insert_edge(&v[0], 10, &v[1], 0, &mut e).unwrap_err();
    assert!(matches!(
        err,
        LineageGraphError::AdjacencyIndexOutOfRange {
            direction: Direction::Outgoing,
            index: 10,
            degree: 0
        }
    ));
    let err = graph.insert_edge(&v[0], 0, &v[1], 1, &mut e).unwrap_err();
    assert!(matches!(
        err,
        LineageGraphError::AdjacencyIndexOutOfRange {
            direction: Direction::Incoming,
            index: 1,
            degree: 0
        }
    ));
    assert_eq!(graph.edge_count(), 0);
    assert!(!e.is_bound());

    graph.insert_edge(&v[0], 0, &v[1], 0, &mut e).unwrap();
    graph.insert_edge(&v[0], 1, &v[1], 1, &mut e).unwrap();
    assert_eq!(graph.source_out_index(&e).unwrap(), 1);
    assert_eq!(graph.target_in_index(&e).unwrap(), 1);
    assert!(!validate_adjacency(&graph).has_issues());
}

#[test]
fn test_remove_edge_closes_gaps() {
    let (mut graph, v) = graph_with_vertices(4);
    let mut edges = Vec::new();
    for target in 1..4 {
        let mut e = EdgeRef::new();
        graph.add_edge(&v[0], &v[target], &mut e).unwrap();
        edges.push(e);
    }
    let mut back = EdgeRef::new();
    graph.add_edge(&v[2], &v[2], &mut back).unwrap();

    graph.remove_edge(&edges[0]).unwrap();
    assert_eq!(outgoing_labels(&graph, &v[0]), vec![2, 3]);
    assert_eq!(graph.source_out_index(&edges[1]).unwrap(), 0);
    assert_eq!(graph.source_out_index(&edges[2]).unwrap(), 1);
    assert_eq!(graph.edge_count(), 3);

    graph.remove_edge(&edges[1]).unwrap();
    assert_eq!(incoming_labels(&graph, &v[2]), vec![2]);
    assert_eq!(graph.target_in_index(&back).unwrap(), 0);
}

#[test]
fn test_remove_vertex_detaches_all_incident_edges() {
    let (mut graph, v) = graph_with_vertices(3);
    let mut e = EdgeRef::new();
    graph.add_edge(&v[0], &v[1], &mut e).unwrap();
    graph.add_edge(&v[1], &v[2], &mut e).unwrap();
    graph.add_edge(&v[0], &v[2], &mut e).unwrap();
    graph.add_edge(&v[1], &v[1], &mut e).unwrap();

    graph.remove_vertex(&v[1]).unwrap();
    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(outgoing_labels(&graph, &v[0]), vec![2]);
    assert_eq!(incoming_labels(&graph, &v[2]), vec![0]);
    assert!(!graph.contains_edge(&e));
}

#[test]
fn test_freed_slots_are_reused_lifo() {
    let (mut graph, v) = graph_with_vertices(3);
    let first = v[0].slot();
    let last = v[2].slot();
    graph.remove_vertex(&v[0]).unwrap();
    graph.remove_vertex(&v[2]).unwrap();

    let mut a = VertexRef::new();
    let mut b = VertexRef::new();
    graph.add_vertex(&mut a);
    graph.add_vertex(&mut b);
    assert_eq!(a.slot(), last);
    assert_eq!(b.slot(), first);
    assert_eq!(graph.vertex_slot_capacity(), 3);
}

#[test]
fn test_churn_with_bounded_population_does_not_grow_pools() {
    let (mut graph, mut v) = graph_with_vertices(16);
    let mut e = EdgeRef::new();
    for round in 0..2000 {
        let victim = v.remove(round % v.len());
        graph.remove_vertex(&victim).unwrap();
        let mut fresh = VertexRef::new();
        graph.add_vertex(&mut fresh);
        graph.add_edge(&fresh, &v[round % v.len()], &mut e).unwrap();
        v.push(fresh);
    }
    assert_eq!(graph.vertex_count(), 16);
    assert_eq!(graph.vertex_slot_capacity(), 16);
    assert!(graph.edge_slot_capacity() <= 16);
    assert_eq!(graph.idmap().vertex_id_bimap().id_space(), 16);
}

#[test]
fn test_stable_ids_are_recycled_and_resolvable() {
    let (mut graph, v) = graph_with_vertices(3);
    let removed_id = graph.vertex_id(&v[1]).unwrap();
    graph.remove_vertex(&v[1]).unwrap();

    let mut lookup = VertexRef::new();
    let err = graph.vertex_by_id(removed_id, &mut lookup).unwrap_err();
    assert!(matches!(
        err,
        LineageGraphError::UnknownStableId {
            kind: ObjectKind::Vertex,
            ..
        }
    ));

    let mut fresh = VertexRef::new();
    graph.add_vertex(&mut fresh);
    assert_eq!(graph.vertex_id(&fresh).unwrap(), removed_id);
    graph.vertex_by_id(removed_id, &mut lookup).unwrap();
    assert_eq!(lookup, fresh);

    let other = graph.vertex_id(&v[2]).unwrap();
    graph.vertex_by_id(other, &mut lookup).unwrap();
    assert_eq!(*graph.vertex(&lookup).unwrap(), 2);
}

#[test]
fn test_stale_proxy_is_rejected_after_slot_reuse() {
    let (mut graph, v) = graph_with_vertices(1);
    let stale = v[0].clone();
    graph.remove_vertex(&v[0]).unwrap();
    let mut fresh = VertexRef::new();
    graph.add_vertex(&mut fresh);
    assert_eq!(fresh.slot(), stale.slot());

    assert!(!graph.contains_vertex(&stale));
    assert!(matches!(
        graph.vertex_mut(&stale),
        Err(LineageGraphError::StaleRef {
            kind: ObjectKind::Vertex,
            ..
        })
    ));
    assert!(matches!(
        graph.remove_vertex(&stale),
        Err(LineageGraphError::StaleRef { .. })
    ));
    assert_eq!(graph.vertex_count(), 1);
}

#[test]
fn test_unbound_proxy_is_rejected() {
    let mut graph = SpotGraph::new();
    let mut v = VertexRef::new();
    graph.add_vertex(&mut v);
    let unbound = VertexRef::new();
    let mut e = EdgeRef::new();
    assert!(matches!(
        graph.add_edge(&v, &unbound, &mut e),
        Err(LineageGraphError::UnboundRef {
            kind: ObjectKind::Vertex
        })
    ));
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_vertex_iteration_follows_slot_order() {
    let (mut graph, v) = graph_with_vertices(3);
    graph.remove_vertex(&v[0]).unwrap();
    let mut late = VertexRef::new();
    graph.add_vertex(&mut late);
    *graph.vertex_mut(&late).unwrap() = 99;

    let mut cursor = graph.vertices();
    let mut proxy = graph.vertex_ref();
    let mut labels = Vec::new();
    while let Some(bound) = cursor.advance(&mut proxy) {
        labels.push(*graph.vertex(bound).unwrap());
    }
    assert_eq!(labels, vec![99, 1, 2]);

    cursor.restart();
    assert_eq!(cursor.count(), 3);
}

#[test]
fn test_get_edge_finds_first_parallel_edge() {
    let (mut graph, v) = graph_with_vertices(2);
    let mut first = EdgeRef::new();
    let mut second = EdgeRef::new();
    graph.add_edge(&v[0], &v[1], &mut first).unwrap();
    graph.add_edge(&v[0], &v[1], &mut second).unwrap();
    *graph.edge_mut(&second).unwrap() = 7;

    let mut found = EdgeRef::new();
    graph.get_edge(&v[0], &v[1], &mut found).unwrap().expect("edge");
    assert_eq!(found, first);
    assert!(graph.get_edge(&v[1], &v[0], &mut found).unwrap().is_none());
    assert_eq!(*graph.edge(&second).unwrap(), 7);
}

#[test]
fn test_pooled_refs_are_recycled() {
    let (graph, _) = graph_with_vertices(10);
    for _ in 0..100 {
        let mut proxy = graph.vertex_ref();
        let mut cursor = graph.vertices();
        while cursor.advance(&mut proxy).is_some() {}
        graph.release_ref(proxy);
    }
    let stats = graph.vertex_ref_stats();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.idle, 1);
}

#[test]
fn test_dropped_refs_return_to_recycler_without_release_call() {
    let (graph, v) = graph_with_vertices(2);
    {
        let mut first = graph.edge_ref();
        let second = graph.edge_ref();
        assert!(graph.get_edge(&v[0], &v[1], &mut first).unwrap().is_none());
        assert_eq!(graph.edge_ref_stats().idle, 0);
        drop(second);
        assert_eq!(graph.edge_ref_stats().idle, 1);
    }
    let stats = graph.edge_ref_stats();
    assert_eq!(stats.created, 2);
    assert_eq!(stats.idle, 2);

    let reused = graph.edge_ref();
    assert!(!reused.is_bound());
    assert_eq!(graph.edge_ref_stats().created, 2);
}

#[test]
fn test_clear_resets_everything() {
    let (mut graph, v) = graph_with_vertices(3);
    let mut e = EdgeRef::new();
    graph.add_edge(&v[0], &v[1], &mut e).unwrap();
    graph.clear();
    assert_eq!(graph.vertex_count(), 0);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.vertex_slot_capacity(), 3);
    assert!(!graph.contains_vertex(&v[0]));

    let mut fresh = VertexRef::new();
    graph.add_vertex(&mut fresh);
    assert_eq!(fresh.slot(), v[0].slot());
    assert_eq!(graph.vertex_id(&fresh).unwrap(), 0);
    assert_eq!(graph.out_degree(&fresh).unwrap(), 0);
    assert!(!graph.contains_vertex(&v[0]));
}

#[test]
fn test_with_config_reserves_capacity() {
    let graph: SpotGraph = Graph::with_config(&GraphConfig::with_capacity(64, 128));
    assert_eq!(graph.vertex_count(), 0);
    assert_eq!(graph.vertex_slot_capacity(), 0);
}
