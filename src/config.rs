//! Configuration for graph construction and shared-lock behavior.
//!
//! Capacity hints size the vertex and edge pools up front; the read-lock
//! timeout bounds how long latency-sensitive readers wait on a
//! [`SharedGraph`](crate::SharedGraph) before skipping their work.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::GraphResult;

/// Default bounded-wait budget for shared readers, in milliseconds.
pub const DEFAULT_READ_LOCK_TIMEOUT_MS: u64 = 1000;

/// Configuration for a [`Graph`](crate::Graph) and its shared wrapper.
///
/// # Default Configuration
///
/// ```rust
/// use lineagegraph::GraphConfig;
/// let config = GraphConfig::default();
/// assert!(config.reserve_vertex_capacity.is_none());
/// assert!(config.reserve_edge_capacity.is_none());
/// assert_eq!(config.read_lock_timeout_ms, 1000);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Optional slot pre-allocation for vertices
    ///
    /// **Default:** `None`
    ///
    /// A hint, not a limit. The vertex pool grows past it as needed.
    pub reserve_vertex_capacity: Option<usize>,

    /// Optional slot pre-allocation for edges
    ///
    /// **Default:** `None`
    pub reserve_edge_capacity: Option<usize>,

    /// Bounded-wait budget for [`SharedGraph::with_bounded_read`](crate::SharedGraph::with_bounded_read)
    ///
    /// **Default:** `1000`
    pub read_lock_timeout_ms: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            reserve_vertex_capacity: None,
            reserve_edge_capacity: None,
            read_lock_timeout_ms: DEFAULT_READ_LOCK_TIMEOUT_MS,
        }
    }
}

impl GraphConfig {
    /// Configuration sized for an expected number of vertices and edges.
    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            reserve_vertex_capacity: Some(vertices),
            reserve_edge_capacity: Some(edges),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// ```rust
    /// use lineagegraph::GraphConfig;
    /// let cfg = GraphConfig::from_json_str(r#"{ "read_lock_timeout_ms": 20 }"#).unwrap();
    /// assert_eq!(cfg.read_lock_timeout_ms, 20);
    /// ```
    pub fn from_json_str(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.read_lock_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_config_default() {
        let cfg = GraphConfig::default();
        assert!(cfg.reserve_vertex_capacity.is_none());
        assert!(cfg.reserve_edge_capacity.is_none());
        assert_eq!(cfg.read_lock_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_graph_config_with_capacity() {
        let cfg = GraphConfig::with_capacity(100, 250);
        assert_eq!(cfg.reserve_vertex_capacity, Some(100));
        assert_eq!(cfg.reserve_edge_capacity, Some(250));
        assert_eq!(cfg.read_lock_timeout_ms, DEFAULT_READ_LOCK_TIMEOUT_MS);
    }

    #[test]
    fn test_graph_config_from_partial_json() {
        let cfg = GraphConfig::from_json_str(r#"{ "reserve_edge_capacity": 8 }"#).unwrap();
        assert_eq!(cfg.reserve_edge_capacity, Some(8));
        assert!(cfg.reserve_vertex_capacity.is_none());
        assert_eq!(cfg.read_lock_timeout_ms, DEFAULT_READ_LOCK_TIMEOUT_MS);
    }

    #[test]
    fn test_graph_config_rejects_malformed_json() {
        let err = GraphConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::LineageGraphError::Json(_)));
    }
}
