//! Asset payload records.
//!
//! An asset is a source module after loading and transformation. The graph
//! stores only a handle to the record defined here; the record itself lives
//! in the [`BuildDb`](crate::db::BuildDb).

use std::path::PathBuf;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::location::SourceLocation;
use crate::symbols::{SymbolFlags, SymbolId};

bitflags! {
    /// Boolean properties of an asset, packed into one word.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AssetFlags: u32 {
        /// Evaluating the asset has observable effects beyond its exports.
        /// When unset, unused exports may be dropped entirely.
        const SIDE_EFFECTS = 1 << 0;
        /// The asset may be split into a separate bundle.
        const IS_BUNDLE_SPLITTABLE = 1 << 1;
        /// The asset comes from project source rather than a package.
        const IS_SOURCE = 1 << 2;
    }
}

/// File type of an asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    #[default]
    Js,
    Css,
    Html,
    Json,
    Other,
}

/// How an asset is placed into bundles.
///
/// `Isolated` and `Inline` assets cannot have individual symbols shaken off;
/// every requested symbol resolves to the asset itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleBehavior {
    #[default]
    Auto,
    Inline,
    Isolated,
}

/// One entry of an asset's export table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSymbol {
    /// Name the symbol is exported as.
    pub exported: SymbolId,
    /// Name of the local binding backing the export.
    pub local: SymbolId,
    pub flags: SymbolFlags,
    pub loc: Option<SourceLocation>,
}

/// An asset record.
///
/// `symbols` is `None` when the asset could not be statically analyzed; the
/// propagator then assumes the asset may provide anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub file_path: PathBuf,
    pub asset_type: AssetType,
    pub flags: AssetFlags,
    pub bundle_behavior: BundleBehavior,
    pub symbols: Option<Vec<AssetSymbol>>,
}

impl AssetInfo {
    /// Create an asset record with conservative defaults: side effects on,
    /// splittable, no symbol data.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        AssetInfo {
            file_path: file_path.into(),
            asset_type: AssetType::default(),
            flags: AssetFlags::SIDE_EFFECTS | AssetFlags::IS_BUNDLE_SPLITTABLE,
            bundle_behavior: BundleBehavior::default(),
            symbols: None,
        }
    }

    pub fn side_effects(&self) -> bool {
        self.flags.contains(AssetFlags::SIDE_EFFECTS)
    }

    /// Set or clear the side-effects flag.
    pub fn set_side_effects(&mut self, value: bool) {
        self.flags.set(AssetFlags::SIDE_EFFECTS, value);
    }

    pub fn is_bundle_splittable(&self) -> bool {
        self.flags.contains(AssetFlags::IS_BUNDLE_SPLITTABLE)
    }

    /// Set or clear the bundle-splittable flag.
    pub fn set_bundle_splittable(&mut self, value: bool) {
        self.flags.set(AssetFlags::IS_BUNDLE_SPLITTABLE, value);
    }

    /// Replace the export table.
    pub fn set_symbols(&mut self, symbols: Vec<AssetSymbol>) {
        self.symbols = Some(symbols);
    }

    /// Find the export table entry for an exported name.
    pub fn symbol(&self, exported: SymbolId) -> Option<&AssetSymbol> {
        self.symbols
            .as_ref()
            .and_then(|symbols| symbols.iter().find(|s| s.exported == exported))
    }

    /// Whether the export table declares the given exported name.
    pub fn declares(&self, exported: SymbolId) -> bool {
        self.symbol(exported).is_some()
    }
}
