use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use lineagegraph::io::NoAttributes;
use lineagegraph::{EdgeRef, GraphConfig, SharedGraph, VertexRef};

fn shared_with_timeout(timeout_ms: u64) -> SharedGraph<(), ()> {
    SharedGraph::with_config(&GraphConfig {
        read_lock_timeout_ms: timeout_ms,
        ..GraphConfig::default()
    })
}

#[test]
fn test_bounded_reader_skips_while_writer_holds_lock() {
    let shared = Arc::new(shared_with_timeout(100));
    let highlighted = Arc::new(AtomicUsize::new(0));
    let locked = Arc::new(Barrier::new(2));

    let writer = {
        let shared = Arc::clone(&shared);
        let locked = Arc::clone(&locked);
        thread::spawn(move || {
            let mut graph = shared.write();
            locked.wait();
            graph.add_vertex(&mut VertexRef::new());
            thread::sleep(Duration::from_millis(400));
        })
    };

    locked.wait();
    let started = Instant::now();
    let outcome = shared.with_bounded_read(|graph| {
        highlighted.store(graph.vertex_count() + 1, Ordering::SeqCst);
    });
    let waited = started.elapsed();

    assert!(outcome.is_none());
    assert_eq!(highlighted.load(Ordering::SeqCst), 0);
    assert!(waited >= Duration::from_millis(100), "{waited:?}");
    assert!(waited < Duration::from_millis(350), "{waited:?}");

    writer.join().expect("writer thread");
    assert_eq!(shared.with_bounded_read(|graph| graph.vertex_count()), Some(1));
}

#[test]
fn test_try_read_for_times_out_under_writer() {
    let shared = shared_with_timeout(1000);
    let _guard = shared.write();
    assert!(shared.try_read_for(Duration::from_millis(20)).is_none());
}

#[test]
fn test_concurrent_readers_share_lock_and_proxies() {
    let shared = shared_with_timeout(1000);
    {
        let mut graph = shared.write();
        let mut previous = VertexRef::new();
        graph.add_vertex(&mut previous);
        let mut e = EdgeRef::new();
        for _ in 0..99 {
            let mut next = VertexRef::new();
            graph.add_vertex(&mut next);
            graph.add_edge(&previous, &next, &mut e).unwrap();
            previous = next;
        }
    }

    let readers = 4;
    let all_inside = Barrier::new(readers);
    thread::scope(|scope| {
        for _ in 0..readers {
            scope.spawn(|| {
                let graph = shared.read();
                all_inside.wait();
                let mut vertex = graph.vertex_ref();
                let mut cursor = graph.vertices();
                let mut degree_sum = 0;
                while let Some(v) = cursor.advance(&mut vertex) {
                    degree_sum += graph.out_degree(v).unwrap();
                }
                assert_eq!(degree_sum, 99);
            });
        }
    });

    let stats = shared.read().vertex_ref_stats();
    assert!(stats.created <= readers as u64);
    assert_eq!(stats.idle as u64, stats.created);
}

#[test]
fn test_load_runs_under_write_lock_and_returns_tables() {
    let source = shared_with_timeout(1000);
    {
        let mut graph = source.write();
        let (mut a, mut b) = (VertexRef::new(), VertexRef::new());
        graph.add_vertex(&mut a);
        graph.add_vertex(&mut b);
        graph.add_edge(&b, &a, &mut EdgeRef::new()).unwrap();
    }
    let mut bytes = Vec::new();
    let written = source.save_to(&(NoAttributes, NoAttributes), &mut bytes).unwrap();
    assert_eq!(written.edges.len(), 1);

    let target = shared_with_timeout(1000);
    let read = target.load_from(&(NoAttributes, NoAttributes), &bytes[..]).unwrap();
    let graph = target.into_inner();
    let mut v = VertexRef::new();
    read.vertex(&graph, 1, &mut v).unwrap();
    assert_eq!(graph.out_degree(&v).unwrap(), 1);
}
