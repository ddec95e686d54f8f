//! The build database.
//!
//! Owns every asset and dependency record plus the symbol interner. Graph
//! nodes hold only the `u32` handles minted here, so the graph stays compact
//! and the database can grow without invalidating anything.

use serde::{Deserialize, Serialize};

use crate::asset::AssetInfo;
use crate::dependency::DependencyInfo;
use crate::symbols::{SymbolId, SymbolInterner};

/// Handle to an [`AssetInfo`] record in a [`BuildDb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct AssetHandle(u32);

impl AssetHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a [`DependencyInfo`] record in a [`BuildDb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DependencyHandle(u32);

impl DependencyHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle-keyed storage for asset and dependency records.
///
/// Handles are only ever minted by the `add_*` methods, so the lookup
/// methods index directly and panic on a handle from a different database.
/// That is a contract violation on the caller's side, not a recoverable
/// condition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildDb {
    symbols: SymbolInterner,
    assets: Vec<AssetInfo>,
    dependencies: Vec<DependencyInfo>,
}

impl BuildDb {
    pub fn new() -> Self {
        BuildDb::default()
    }

    pub fn add_asset(&mut self, asset: AssetInfo) -> AssetHandle {
        let handle = AssetHandle(self.assets.len() as u32);
        self.assets.push(asset);
        handle
    }

    pub fn add_dependency(&mut self, dependency: DependencyInfo) -> DependencyHandle {
        let handle = DependencyHandle(self.dependencies.len() as u32);
        self.dependencies.push(dependency);
        handle
    }

    /// Look up an asset record.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not minted by this database.
    pub fn asset(&self, handle: AssetHandle) -> &AssetInfo {
        &self.assets[handle.index()]
    }

    pub fn asset_mut(&mut self, handle: AssetHandle) -> &mut AssetInfo {
        &mut self.assets[handle.index()]
    }

    /// Look up a dependency record.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not minted by this database.
    pub fn dependency(&self, handle: DependencyHandle) -> &DependencyInfo {
        &self.dependencies[handle.index()]
    }

    pub fn dependency_mut(&mut self, handle: DependencyHandle) -> &mut DependencyInfo {
        &mut self.dependencies[handle.index()]
    }

    /// Intern a symbol name.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        self.symbols.intern(name)
    }

    /// Resolve an interned symbol back to its name.
    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.symbols.resolve(id)
    }

    pub fn star_symbol(&self) -> SymbolId {
        self.symbols.star()
    }

    pub fn default_symbol(&self) -> SymbolId {
        self.symbols.default_export()
    }

    pub fn symbols(&self) -> &SymbolInterner {
        &self.symbols
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }
}
