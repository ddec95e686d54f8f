//! Symbol interning.
//!
//! Symbol names (`foo`, `default`, `*`) appear on every import and export
//! edge of the asset graph, so they are interned once and passed around as
//! dense `u32` ids. The two names with special meaning to propagation are
//! pre-interned and exposed as [`SymbolInterner::star`] (the module
//! namespace) and [`SymbolInterner::default_export`].

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Interned identifier for a symbol name.
///
/// Ordering follows interning order, which makes `SymbolId` usable as a
/// deterministic sort key for anything keyed by symbol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

bitflags! {
    /// Per-symbol flags shared by asset and dependency symbol tables.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SymbolFlags: u32 {
        /// The symbol is only a re-export. If nothing downstream consumes
        /// it, the re-export may be dropped entirely.
        const IS_WEAK = 1 << 0;
        /// Declared with ESM syntax.
        const IS_ESM = 1 << 1;
    }
}

/// String interner for symbol names.
///
/// `"*"` and `"default"` are interned at construction so their ids are
/// stable for the lifetime of the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInterner {
    names: Vec<String>,
    lookup: FxHashMap<String, SymbolId>,
    star: SymbolId,
    default_export: SymbolId,
}

impl SymbolInterner {
    pub fn new() -> Self {
        let mut interner = SymbolInterner {
            names: Vec::new(),
            lookup: FxHashMap::default(),
            star: SymbolId(0),
            default_export: SymbolId(0),
        };
        interner.star = interner.intern("*");
        interner.default_export = interner.intern("default");
        interner
    }

    /// Intern a symbol name, returning the existing id if already present.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = SymbolId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), id);
        id
    }

    /// Look up an id without interning.
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.lookup.get(name).copied()
    }

    /// Resolve an id back to its name.
    ///
    /// Ids minted by a different interner resolve to a placeholder rather
    /// than panicking; diagnostics stay printable either way.
    pub fn resolve(&self, id: SymbolId) -> &str {
        self.names
            .get(id.0 as usize)
            .map(String::as_str)
            .unwrap_or("<unknown symbol>")
    }

    /// The `*` namespace symbol.
    pub fn star(&self) -> SymbolId {
        self.star
    }

    /// The `default` export symbol.
    pub fn default_export(&self) -> SymbolId {
        self.default_export
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for SymbolInterner {
    fn default() -> Self {
        Self::new()
    }
}
