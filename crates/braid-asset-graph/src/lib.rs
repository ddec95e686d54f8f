//! # braid-asset-graph
//!
//! The asset graph and cross-module symbol propagation for braid.
//!
//! The asset graph tracks every module of a build and the import/require
//! relationships between them, as a typed node graph over
//! [`braid_graph::Graph`]: `root -> dependency -> asset group -> asset`,
//! with each asset's own dependencies hanging off it in turn.
//!
//! [`propagate_symbols`] is the engine behind tree shaking. It runs two
//! passes to a fixpoint over the graph:
//!
//! 1. A root-to-leaves pass computing, for every dependency, which symbols
//!    are actually requested through it (`used_symbols_down`).
//! 2. A leaves-to-root pass computing, for every requested symbol, the
//!    asset it resolves to (`used_symbols_up`), reporting missing-export
//!    diagnostics along the way.
//!
//! Both passes are incremental: only assets reachable from the changed set
//! are revisited, driven by per-node dirty flags.
//!
//! ## Quick Start
//!
//! ```no_run
//! use braid_asset_graph::{AssetGraph, propagate_symbols, PropagationOptions};
//! use braid_core::BuildDb;
//! use rustc_hash::FxHashSet;
//!
//! let db = BuildDb::new();
//! let mut graph = AssetGraph::new();
//! // ... build the graph from resolved assets and dependencies ...
//!
//! let errors = propagate_symbols(PropagationOptions {
//!     db: &db,
//!     asset_graph: &mut graph,
//!     changed_assets: &FxHashSet::default(),
//!     asset_groups_with_removed_parents: &FxHashSet::default(),
//!     previous_errors: None,
//! });
//! for (node, diagnostics) in &errors {
//!     eprintln!("{node}: {} problem(s)", diagnostics.len());
//! }
//! ```

pub mod asset_graph;
pub mod propagation;

#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "logging")]
pub use logging::init_logging;

pub use asset_graph::{
    AssetGraph, AssetGraphEdge, AssetGraphNode, AssetGroupNode, AssetNode, ContentKey,
    DependencyNode, SymbolResolution,
};
pub use propagation::{propagate_symbols, PropagationOptions};

/// Error types for asset-graph operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from the graph foundation crate.
    #[error("graph error: {0}")]
    Graph(#[from] braid_graph::Error),

    /// A content key was used twice for different nodes.
    #[error("duplicate content key: {0}")]
    DuplicateContentKey(ContentKey),

    /// Debug export failed to encode.
    #[error("failed to encode graph export: {0}")]
    Export(String),
}

/// Result type alias for asset-graph operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests;
