//! Reader-writer lock around a [`Graph`].
//!
//! Structural edits and bulk loads take the write lock. Traversals and
//! snapshot saves take the read lock. Latency-sensitive readers use
//! [`SharedGraph::with_bounded_read`], which gives up after the configured
//! timeout and skips its unit of work instead of stalling the caller.

use std::io::{Read, Write};
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

use crate::config::GraphConfig;
use crate::errors::GraphResult;
use crate::graph::Graph;
use crate::io::{self, GraphFileIds, GraphSerializer};

#[derive(Debug)]
pub struct SharedGraph<V, E> {
    inner: RwLock<Graph<V, E>>,
    read_timeout: Duration,
}

impl<V: Default, E: Default> Default for SharedGraph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Default, E: Default> SharedGraph<V, E> {
    pub fn new() -> Self {
        Self::with_config(&GraphConfig::default())
    }

    pub fn with_config(config: &GraphConfig) -> Self {
        Self {
            inner: RwLock::new(Graph::with_config(config)),
            read_timeout: config.read_lock_timeout(),
        }
    }

    /// Read a stream into the graph under the write lock. Loaded objects are
    /// added to whatever the graph already holds.
    pub fn load_from<S, R>(&self, serializer: &S, input: R) -> GraphResult<GraphFileIds>
    where
        S: GraphSerializer<V, E>,
        R: Read,
    {
        let mut graph = self.inner.write();
        io::read(&mut *graph, serializer, input)
    }
}

impl<V, E> SharedGraph<V, E> {
    /// Wrap an existing graph, with the default read timeout.
    pub fn from_graph(graph: Graph<V, E>) -> Self {
        Self {
            inner: RwLock::new(graph),
            read_timeout: GraphConfig::default().read_lock_timeout(),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Graph<V, E>> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Graph<V, E>> {
        self.inner.write()
    }

    /// Shared guard, or `None` once `timeout` has elapsed.
    pub fn try_read_for(&self, timeout: Duration) -> Option<RwLockReadGuard<'_, Graph<V, E>>> {
        self.inner.try_read_for(timeout)
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Run `f` under a read guard acquired within the configured timeout.
    ///
    /// Returns `None` without calling `f` when the lock is not available in
    /// time. Callers are expected to retry on their next trigger.
    pub fn with_bounded_read<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&Graph<V, E>) -> R,
    {
        match self.inner.try_read_for(self.read_timeout) {
            Some(graph) => Some(f(&graph)),
            None => {
                trace!(
                    timeout_ms = self.read_timeout.as_millis() as u64,
                    "read lock busy, skipping"
                );
                None
            }
        }
    }

    /// Write a snapshot of the graph. Holds the read lock for the whole call.
    pub fn save_to<S, W>(&self, serializer: &S, out: W) -> GraphResult<GraphFileIds>
    where
        S: GraphSerializer<V, E>,
        W: Write,
    {
        let graph = self.inner.read();
        io::write(&*graph, serializer, out)
    }

    pub fn into_inner(self) -> Graph<V, E> {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::NoAttributes;
    use crate::pool::VertexRef;

    #[test]
    fn test_bounded_read_runs_when_uncontended() {
        let shared: SharedGraph<(), ()> = SharedGraph::new();
        shared.write().add_vertex(&mut VertexRef::new());
        assert_eq!(shared.with_bounded_read(|graph| graph.vertex_count()), Some(1));
    }

    #[test]
    fn test_bounded_read_skips_under_writer() {
        let config = GraphConfig {
            read_lock_timeout_ms: 10,
            ..GraphConfig::default()
        };
        let shared: SharedGraph<(), ()> = SharedGraph::with_config(&config);
        let _writer = shared.write();
        let mut ran = false;
        assert_eq!(shared.with_bounded_read(|_| ran = true), None);
        assert!(!ran);
    }

    #[test]
    fn test_save_then_load_through_locks() {
        let source: SharedGraph<(), ()> = SharedGraph::new();
        {
            let mut graph = source.write();
            let (mut a, mut b) = (VertexRef::new(), VertexRef::new());
            graph.add_vertex(&mut a);
            graph.add_vertex(&mut b);
            graph.add_edge(&a, &b, &mut Default::default()).unwrap();
        }
        let mut bytes = Vec::new();
        source.save_to(&(NoAttributes, NoAttributes), &mut bytes).unwrap();

        let target: SharedGraph<(), ()> = SharedGraph::new();
        let ids = target.load_from(&(NoAttributes, NoAttributes), &bytes[..]).unwrap();
        assert_eq!(ids.vertices.len(), 2);
        assert_eq!(target.read().edge_count(), 1);
    }
}
