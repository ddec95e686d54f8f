//! Dependency payload records.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::db::AssetHandle;
use crate::location::SourceLocation;
use crate::symbols::{SymbolFlags, SymbolId};

bitflags! {
    /// Boolean properties of a dependency.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DependencyFlags: u32 {
        /// The dependency is a build entry rather than an import found in
        /// source code.
        const ENTRY = 1 << 0;
        /// Resolution failures are tolerated.
        const OPTIONAL = 1 << 1;
    }
}

/// One entry of a dependency's import table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySymbol {
    /// Name requested from the target module.
    pub exported: SymbolId,
    /// Local binding the requested name is bound to in the importer.
    pub local: SymbolId,
    pub flags: SymbolFlags,
    /// Where the import specifier appears, for diagnostics.
    pub loc: Option<SourceLocation>,
}

/// A dependency record: a directed import/require relationship from one
/// asset to a target specifier.
///
/// `symbols` is `None` for dependencies whose requested bindings are
/// unknown (for example `require` calls that escape analysis); the
/// propagator treats those as requesting everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyInfo {
    /// The raw specifier as written in source.
    pub specifier: String,
    /// The asset the dependency originates from. `None` for entries.
    pub source_asset: Option<AssetHandle>,
    pub flags: DependencyFlags,
    pub symbols: Option<Vec<DependencySymbol>>,
}

impl DependencyInfo {
    pub fn new(specifier: impl Into<String>) -> Self {
        DependencyInfo {
            specifier: specifier.into(),
            source_asset: None,
            flags: DependencyFlags::empty(),
            symbols: None,
        }
    }

    pub fn entry(specifier: impl Into<String>) -> Self {
        let mut dep = DependencyInfo::new(specifier);
        dep.flags |= DependencyFlags::ENTRY;
        dep
    }

    pub fn is_entry(&self) -> bool {
        self.flags.contains(DependencyFlags::ENTRY)
    }

    /// Find the import table entry for a requested name.
    pub fn symbol(&self, exported: SymbolId) -> Option<&DependencySymbol> {
        self.symbols
            .as_ref()
            .and_then(|symbols| symbols.iter().find(|s| s.exported == exported))
    }

    /// Whether the symbol is a weak re-export in this dependency.
    pub fn is_weak(&self, exported: SymbolId) -> bool {
        self.symbol(exported)
            .is_some_and(|s| s.flags.contains(SymbolFlags::IS_WEAK))
    }

    /// Whether the dependency forwards the whole namespace, that is it
    /// declares a `*` entry bound to the local `*` (an `export * from`).
    pub fn reexports_all(&self, star: SymbolId) -> bool {
        self.symbol(star).is_some_and(|s| s.local == star)
    }
}
