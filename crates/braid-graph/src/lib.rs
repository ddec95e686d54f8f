//! # braid-graph
//!
//! Pure graph data structures for module dependency graphs.
//!
//! This crate is the in-memory substrate of a braid build. It provides:
//!
//! - [`AdjacencyList`]: compact bit-packed storage of typed directed edges,
//!   with chained hash buckets for O(1) lookup and doubly-linked endpoint
//!   lists for insertion-order iteration.
//! - [`Graph`]: a generic labelled multigraph on top of the adjacency list,
//!   with a node payload map, an optional root, orphan pruning, and
//!   depth-first and breadth-first traversals with enter/exit visitors.
//!
//! The graph is single-writer by design. All methods are synchronous and
//! never block; cross-thread transfer goes through [`Graph::to_bytes`] and
//! [`Graph::from_bytes`].
//!
//! ## Quick Start
//!
//! ```rust
//! use braid_graph::{DefaultEdgeKind, EdgeFilter, Graph};
//!
//! # fn main() -> Result<(), braid_graph::Error> {
//! let mut graph: Graph<&str> = Graph::new();
//! let a = graph.add_node("a");
//! let b = graph.add_node("b");
//! graph.set_root_node_id(a);
//! graph.add_edge(a, b, DefaultEdgeKind)?;
//!
//! assert!(graph.has_edge(a, b, DefaultEdgeKind));
//! assert_eq!(graph.get_node_ids_connected_from(a, &EdgeFilter::All), vec![b]);
//! # Ok(())
//! # }
//! ```

pub mod adjacency;
pub mod graph;
pub mod serialization;
pub mod traversal;

pub use adjacency::{AdjacencyList, Edge, EdgeFilter, NodeId};
pub use graph::{DefaultEdgeKind, EdgeKind, Graph, GraphEdge};
pub use traversal::{DfsParams, DfsVisitor, TraversalActions};

/// Error type for graph operations.
///
/// Every variant here is a contract violation by the caller or a corrupt
/// snapshot, never a problem in the user's code. User-facing problems are
/// reported as `braid_core::Diagnostic` values by the layers above.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Edge type 0 is the tombstone reserve and can never be inserted.
    #[error("edge type 0 is reserved and cannot be added")]
    InvalidEdgeType,

    /// An endpoint passed to an edge operation is not in the graph.
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    /// `remove_edge` was called for an edge that is not in the graph.
    #[error("edge from {from} to {to} with type {edge_type} does not exist")]
    EdgeNotFound {
        from: NodeId,
        to: NodeId,
        edge_type: u32,
    },

    /// A node-payload operation referenced an id with no stored payload.
    #[error("node {0} has no payload in this graph")]
    UnknownNode(NodeId),

    /// A traversal was started with no start node and no graph root.
    #[error("a start node or a graph root is required to traverse")]
    MissingRoot,

    /// Binary encoding of a graph snapshot failed.
    #[error("failed to serialize graph: {0}")]
    Serialize(String),

    /// Binary decoding of a graph snapshot failed.
    #[error("failed to deserialize graph: {0}")]
    Deserialize(String),

    /// A snapshot was produced by an incompatible version of this crate.
    #[error("incompatible graph format version: expected {expected}, got {actual}")]
    FormatVersion { expected: u32, actual: u32 },
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::InvalidEdgeType => "INVALID_EDGE_TYPE",
            Error::NodeNotFound(_) => "NODE_NOT_FOUND",
            Error::EdgeNotFound { .. } => "EDGE_NOT_FOUND",
            Error::UnknownNode(_) => "UNKNOWN_NODE",
            Error::MissingRoot => "MISSING_ROOT",
            Error::Serialize(_) => "SERIALIZE_ERROR",
            Error::Deserialize(_) => "DESERIALIZE_ERROR",
            Error::FormatVersion { .. } => "FORMAT_VERSION_MISMATCH",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::InvalidEdgeType => Some(Box::new(
                "Edge types must be non-zero. Use 1 for untyped graphs.",
            )),
            Error::MissingRoot => Some(Box::new(
                "Call set_root_node_id first, or pass an explicit start node.",
            )),
            Error::FormatVersion { .. } => Some(Box::new(
                "The snapshot was written by a different build. Discard the cache and rebuild.",
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
