//! Tests for the asset graph and symbol propagation.

mod propagation_tests;

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use braid_core::{
    AssetInfo, AssetSymbol, BuildDb, DependencyInfo, DependencySymbol, Diagnostic, SourceLocation,
    SymbolFlags, SymbolId,
};
use braid_graph::NodeId;

use crate::asset_graph::{AssetGraph, AssetGraphNode};
use crate::propagation::{propagate_symbols, PropagationOptions};

/// Shorthand symbol declaration: `(exported, local, weak)`.
pub(crate) type Decl<'a> = (&'a str, &'a str, bool);

/// Builds propagation fixtures: a [`BuildDb`] plus an [`AssetGraph`] wired
/// together, with string-based helpers for assertions.
pub(crate) struct Fixture {
    pub db: BuildDb,
    pub graph: AssetGraph,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            db: BuildDb::new(),
            graph: AssetGraph::new(),
        }
    }

    pub fn sym(&mut self, name: &str) -> SymbolId {
        self.db.intern(name)
    }

    /// Add an asset whose content key equals its file path. `symbols` is
    /// `None` for assets that escape static analysis.
    pub fn asset(&mut self, path: &str, side_effects: bool, symbols: Option<&[Decl]>) -> NodeId {
        let mut info = AssetInfo::new(path);
        info.set_side_effects(side_effects);
        if let Some(decls) = symbols {
            let table = decls
                .iter()
                .map(|(exported, local, weak)| AssetSymbol {
                    exported: self.db.intern(exported),
                    local: self.db.intern(local),
                    flags: if *weak {
                        SymbolFlags::IS_WEAK
                    } else {
                        SymbolFlags::empty()
                    },
                    loc: None,
                })
                .collect();
            info.set_symbols(table);
        }
        let handle = self.db.add_asset(info);
        self.graph.add_asset(path, handle).unwrap()
    }

    /// Add a dependency node. `source` is the importing asset node, or
    /// `None` for an entry hanging off the root.
    pub fn dep(&mut self, key: &str, source: Option<NodeId>, symbols: Option<&[Decl]>) -> NodeId {
        let mut info = DependencyInfo::new(key);
        if let Some(source) = source {
            info.source_asset = Some(
                self.graph
                    .asset_node(source)
                    .expect("dependency source must be an asset node")
                    .asset,
            );
        }
        if let Some(decls) = symbols {
            info.symbols = Some(
                decls
                    .iter()
                    .map(|(exported, local, weak)| DependencySymbol {
                        exported: self.db.intern(exported),
                        local: self.db.intern(local),
                        flags: if *weak {
                            SymbolFlags::IS_WEAK
                        } else {
                            SymbolFlags::empty()
                        },
                        loc: None,
                    })
                    .collect(),
            );
        }
        let handle = self.db.add_dependency(info);
        match source {
            Some(source) => {
                let node = self.graph.add_dependency(key, handle).unwrap();
                self.graph.add_edge(source, node).unwrap();
                node
            }
            None => self.graph.add_entry_dependency(key, handle).unwrap(),
        }
    }

    /// Attach a source location to one declared symbol of a dependency.
    pub fn set_dep_symbol_loc(&mut self, dep: NodeId, name: &str, loc: SourceLocation) {
        let symbol = self.db.intern(name);
        let handle = self
            .graph
            .dependency_node(dep)
            .expect("not a dependency node")
            .dependency;
        if let Some(symbols) = self.db.dependency_mut(handle).symbols.as_mut() {
            for entry in symbols.iter_mut() {
                if entry.exported == symbol {
                    entry.loc = Some(loc.clone());
                }
            }
        }
    }

    pub fn connect(&mut self, from: NodeId, to: NodeId) {
        self.graph.add_edge(from, to).unwrap();
    }

    /// Propagate treating every asset as changed (a first build).
    pub fn propagate(&mut self) -> FxHashMap<NodeId, Vec<Diagnostic>> {
        let changed: FxHashSet<String> = self
            .graph
            .graph()
            .iter_nodes()
            .filter_map(|(_, node)| match node {
                AssetGraphNode::Asset(asset) => Some(asset.content_key.clone()),
                _ => None,
            })
            .collect();
        self.propagate_changed(&changed, None)
    }

    pub fn propagate_changed(
        &mut self,
        changed: &FxHashSet<String>,
        previous_errors: Option<FxHashMap<NodeId, Vec<Diagnostic>>>,
    ) -> FxHashMap<NodeId, Vec<Diagnostic>> {
        propagate_symbols(PropagationOptions {
            db: &self.db,
            asset_graph: &mut self.graph,
            changed_assets: changed,
            asset_groups_with_removed_parents: &FxHashSet::default(),
            previous_errors,
        })
    }

    /// A dependency's requested symbols as sorted names.
    pub fn down(&self, dep: NodeId) -> Vec<String> {
        self.graph
            .dependency_node(dep)
            .expect("not a dependency node")
            .used_symbols_down
            .iter()
            .map(|&s| self.db.symbol_name(s).to_string())
            .collect()
    }

    /// A dependency's resolutions as `(symbol, Some((asset, symbol)))`
    /// pairs, in map order. Ambiguous entries map to `None`.
    pub fn up(&self, dep: NodeId) -> Vec<(String, Option<(String, Option<String>)>)> {
        self.graph
            .dependency_node(dep)
            .expect("not a dependency node")
            .used_symbols_up
            .iter()
            .map(|(&s, resolution)| {
                (
                    self.db.symbol_name(s).to_string(),
                    resolution.as_ref().map(|r| {
                        (
                            r.asset.clone(),
                            r.symbol.map(|sym| self.db.symbol_name(sym).to_string()),
                        )
                    }),
                )
            })
            .collect()
    }

    /// An asset's exposed symbols as sorted names.
    pub fn used(&self, asset: NodeId) -> Vec<String> {
        self.graph
            .asset_node(asset)
            .expect("not an asset node")
            .used_symbols
            .iter()
            .map(|&s| self.db.symbol_name(s).to_string())
            .collect()
    }

    /// Assert that no asset or dependency still carries a dirty flag,
    /// except assets listed in `allowed` (nodes that still produce errors).
    pub fn assert_clean(&self, allowed: &[NodeId]) {
        for (id, node) in self.graph.graph().iter_nodes() {
            match node {
                AssetGraphNode::Asset(asset) => {
                    assert!(!asset.used_symbols_down_dirty, "asset {id} down-dirty");
                    if !allowed.contains(&id) {
                        assert!(!asset.used_symbols_up_dirty, "asset {id} up-dirty");
                    }
                }
                AssetGraphNode::Dependency(dep) => {
                    assert!(!dep.used_symbols_down_dirty, "dep {id} down-dirty");
                    assert!(!dep.used_symbols_up_dirty_down, "dep {id} up-dirty-down");
                    assert!(!dep.used_symbols_up_dirty_up, "dep {id} up-dirty-up");
                }
                _ => {}
            }
        }
    }

    /// Assert `used_symbols_down ⊇ keys(used_symbols_up)` on every
    /// dependency.
    pub fn assert_down_superset_of_up(&self) {
        for (id, node) in self.graph.graph().iter_nodes() {
            if let AssetGraphNode::Dependency(dep) = node {
                let up_keys: BTreeSet<SymbolId> = dep.used_symbols_up.keys().copied().collect();
                assert!(
                    up_keys.is_subset(&dep.used_symbols_down),
                    "dep {id}: used_symbols_up keys not covered by used_symbols_down"
                );
            }
        }
    }
}
