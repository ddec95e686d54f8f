//! # braid-core
//!
//! Shared data model for the braid asset-graph engine.
//!
//! This crate holds the types that cross crate boundaries: the symbol
//! interner, asset and dependency payload records, source locations, and
//! diagnostics. It contains no graph logic and no I/O, so it stays cheap to
//! depend on from every other braid crate.
//!
//! Payload bodies live in a [`BuildDb`] and are referenced from graph nodes
//! by handle only. This keeps graph nodes small and means resizing the
//! database never invalidates anything a graph node holds.

pub mod asset;
pub mod db;
pub mod dependency;
pub mod diagnostics;
pub mod location;
pub mod symbols;

pub use asset::{AssetFlags, AssetInfo, AssetSymbol, AssetType, BundleBehavior};
pub use db::{AssetHandle, BuildDb, DependencyHandle};
pub use dependency::{DependencyFlags, DependencyInfo, DependencySymbol};
pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use location::{Location, SourceLocation};
pub use symbols::{SymbolFlags, SymbolId, SymbolInterner};
