//! Cross-module symbol propagation.
//!
//! Two passes over the asset graph, run to a fixpoint:
//!
//! - The **down pass** walks from the changed set towards the leaves and
//!   computes `used_symbols_down` on every dependency: the set of symbols
//!   actually requested through it, with weak re-exports refined away via
//!   the exporting asset's symbol table.
//! - The **up pass** walks from the leaves towards the root and computes
//!   `used_symbols_up` on every dependency: where each requested symbol
//!   resolves, with re-exports forwarded through side-effect-free assets
//!   and conflicting namespace re-exports collapsed into a forced
//!   namespace import.
//!
//! The graph is freely cyclic; the up pass's work queue keeps revisiting
//! assets whose incoming resolutions changed until nothing moves. Missing
//! exports become [`Diagnostic`]s keyed by the offending dependency node;
//! propagation itself never fails.
//!
//! Propagation mutates dirty flags and symbol sets only. It never adds or
//! removes nodes or edges.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use braid_core::{BuildDb, BundleBehavior, Diagnostic, SymbolFlags, SymbolId};
use braid_graph::NodeId;

use crate::asset_graph::{
    AssetGraph, AssetGraphNode, ContentKey, SymbolResolution,
};

/// Inputs to [`propagate_symbols`].
pub struct PropagationOptions<'a> {
    pub db: &'a BuildDb,
    pub asset_graph: &'a mut AssetGraph,
    /// Content keys of assets whose body may have changed since the last
    /// propagation.
    pub changed_assets: &'a FxHashSet<ContentKey>,
    /// Asset groups that lost at least one inbound dependency.
    pub asset_groups_with_removed_parents: &'a FxHashSet<NodeId>,
    /// The error map returned by the previous propagation, if any. Entries
    /// for removed nodes are pruned; entries for nodes not revisited are
    /// retained.
    pub previous_errors: Option<FxHashMap<NodeId, Vec<Diagnostic>>>,
}

/// Run both propagation passes and return the per-node diagnostics.
#[tracing::instrument(level = "debug", skip_all, fields(changed_assets = options.changed_assets.len()))]
pub fn propagate_symbols(options: PropagationOptions<'_>) -> FxHashMap<NodeId, Vec<Diagnostic>> {
    let PropagationOptions {
        db,
        asset_graph: graph,
        changed_assets,
        asset_groups_with_removed_parents,
        previous_errors,
    } = options;

    let mut changed_asset_nodes: Vec<NodeId> = changed_assets
        .iter()
        .filter_map(|key| graph.get_node_id_by_content_key(key))
        .collect();
    changed_asset_nodes.sort();

    let mut down_seeds: BTreeSet<NodeId> = BTreeSet::new();
    let mut changed_deps: Vec<NodeId> = Vec::new();
    let mut changed_deps_seen: FxHashSet<NodeId> = FxHashSet::default();

    for &node in &changed_asset_nodes {
        if let Some(asset) = graph.asset_node_mut(node) {
            asset.used_symbols_down_dirty = true;
            down_seeds.insert(node);
        }
    }
    for &node in asset_groups_with_removed_parents {
        if let Some(group) = graph.asset_group_node_mut(node) {
            group.used_symbols_down_dirty = true;
            down_seeds.insert(node);
        }
    }
    seed_root_dependencies(
        db,
        graph,
        &mut down_seeds,
        &mut changed_deps,
        &mut changed_deps_seen,
    );

    propagate_symbols_down(db, graph, down_seeds, &mut changed_deps, &mut changed_deps_seen);
    debug!(
        changed_dependencies = changed_deps.len(),
        "requested-symbols pass finished"
    );

    let errors = propagate_symbols_up(db, graph, &changed_asset_nodes, &changed_deps, previous_errors);
    debug!(error_nodes = errors.len(), "resolved-symbols pass finished");
    errors
}

/// Dependencies hanging directly off the root have no source asset whose
/// visit would compute their requested set, so the request is their
/// declared import table.
fn seed_root_dependencies(
    db: &BuildDb,
    graph: &mut AssetGraph,
    seeds: &mut BTreeSet<NodeId>,
    changed_deps: &mut Vec<NodeId>,
    changed_deps_seen: &mut FxHashSet<NodeId>,
) {
    for child in graph.children(graph.root_node_id()) {
        let (declared, changed) = {
            let Some(dep) = graph.dependency_node(child) else {
                continue;
            };
            let declared: BTreeSet<SymbolId> = db
                .dependency(dep.dependency)
                .symbols
                .as_deref()
                .map(|symbols| symbols.iter().map(|s| s.exported).collect())
                .unwrap_or_default();
            let changed = declared != dep.used_symbols_down;
            if !changed && !dep.used_symbols_down_dirty {
                continue;
            }
            (declared, changed)
        };
        if let Some(dep) = graph.dependency_node_mut(child) {
            if changed {
                dep.used_symbols_down = declared;
                dep.used_symbols_up_dirty_down = true;
                if changed_deps_seen.insert(child) {
                    changed_deps.push(child);
                }
            }
            dep.used_symbols_down_dirty = true;
            seeds.insert(child);
        }
    }
}

// ---------------------------------------------------------------------------
// Down pass
// ---------------------------------------------------------------------------

fn propagate_symbols_down(
    db: &BuildDb,
    graph: &mut AssetGraph,
    mut unreached: BTreeSet<NodeId>,
    changed_deps: &mut Vec<NodeId>,
    changed_deps_seen: &mut FxHashSet<NodeId>,
) {
    if unreached.is_empty() {
        return;
    }

    let mut queue: VecDeque<NodeId> = VecDeque::new();
    let mut in_queue: FxHashSet<NodeId> = FxHashSet::default();
    if let Some(first) = unreached.pop_first() {
        in_queue.insert(first);
        queue.push_back(first);
    }

    while let Some(node) = queue.pop_front() {
        in_queue.remove(&node);
        unreached.remove(&node);

        let children = graph.children(node);
        let mut was_dirty = false;
        let mut visit = false;
        match graph.get_node_mut(node) {
            Some(AssetGraphNode::Dependency(dep)) => {
                was_dirty = dep.used_symbols_down_dirty;
                dep.used_symbols_down_dirty = false;
            }
            Some(AssetGraphNode::AssetGroup(group)) => {
                was_dirty = group.used_symbols_down_dirty;
                group.used_symbols_down_dirty = false;
            }
            Some(AssetGraphNode::Asset(asset)) => {
                if asset.used_symbols_down_dirty {
                    asset.used_symbols_down_dirty = false;
                    visit = true;
                }
            }
            _ => {}
        }
        if visit {
            visit_asset_down(db, graph, node, changed_deps, changed_deps_seen);
        }

        for child in children {
            let child_dirty = match graph.get_node_mut(child) {
                Some(AssetGraphNode::Asset(asset)) if was_dirty => {
                    asset.used_symbols_down_dirty = true;
                    true
                }
                Some(AssetGraphNode::AssetGroup(group)) if was_dirty => {
                    group.used_symbols_down_dirty = true;
                    true
                }
                Some(AssetGraphNode::Dependency(dep)) => dep.used_symbols_down_dirty,
                _ => false,
            };
            if child_dirty && in_queue.insert(child) {
                queue.push_back(child);
            }
        }

        if queue.is_empty() {
            if let Some(next) = unreached.pop_first() {
                in_queue.insert(next);
                queue.push_back(next);
            }
        }
    }
}

fn build_symbol_inverse(
    symbols: Option<&[braid_core::AssetSymbol]>,
) -> Option<FxHashMap<SymbolId, BTreeSet<SymbolId>>> {
    symbols.map(|symbols| {
        let mut inverse: FxHashMap<SymbolId, BTreeSet<SymbolId>> = FxHashMap::default();
        for entry in symbols {
            inverse.entry(entry.local).or_default().insert(entry.exported);
        }
        inverse
    })
}

/// Recompute the asset's `used_symbols` from what its importers request,
/// then push the refined request down into each outgoing dependency.
fn visit_asset_down(
    db: &BuildDb,
    graph: &mut AssetGraph,
    asset_id: NodeId,
    changed_deps: &mut Vec<NodeId>,
    changed_deps_seen: &mut FxHashSet<NodeId>,
) {
    let star = db.star_symbol();
    let default_export = db.default_symbol();

    let Some(asset) = graph.asset_node(asset_id) else {
        return;
    };
    let info = db.asset(asset.asset);
    let asset_symbols = info.symbols.as_deref();
    let inverse = build_symbol_inverse(asset_symbols);

    let incoming = graph.incoming_dependencies(asset_id);
    let outgoing = graph.outgoing_dependencies(asset_id);

    let has_namespace_outgoing = outgoing.iter().any(|&dep| {
        graph
            .dependency_node(dep)
            .is_some_and(|d| db.dependency(d.dependency).reexports_all(star))
    });

    let mut is_entry = false;
    let mut add_all = false;
    let mut used_symbols: BTreeSet<SymbolId> = BTreeSet::new();
    let mut namespace_reexported: BTreeSet<SymbolId> = BTreeSet::new();

    if incoming.is_empty() {
        // A runtime root. Everything it exports is live.
        used_symbols.insert(star);
        namespace_reexported.insert(star);
    } else {
        for &incoming_dep in &incoming {
            let Some(dep) = graph.dependency_node(incoming_dep) else {
                continue;
            };
            let dep_info = db.dependency(dep.dependency);
            if dep_info.symbols.is_none() {
                if dep_info.source_asset.is_none() {
                    is_entry = true;
                } else {
                    // Symbols were cleared; anything could be requested.
                    add_all = true;
                }
                continue;
            }
            for &requested in &dep.used_symbols_down {
                if requested == star {
                    used_symbols.insert(star);
                    namespace_reexported.insert(star);
                }
                let declared = asset_symbols.map(|symbols| {
                    symbols
                        .iter()
                        .any(|e| e.exported == requested || e.exported == star)
                });
                match declared {
                    // An own export, or the asset escapes static analysis.
                    None | Some(true) => {
                        used_symbols.insert(requested);
                    }
                    Some(false) => {
                        // Possibly satisfied by a namespace re-export; the
                        // assignment is deferred to the target assets.
                        if has_namespace_outgoing && requested != default_export {
                            namespace_reexported.insert(requested);
                        }
                    }
                }
            }
        }
    }

    if add_all {
        if let Some(symbols) = asset_symbols {
            for entry in symbols {
                used_symbols.insert(entry.exported);
            }
        }
    }

    let keep_outgoing = info.side_effects() || add_all || is_entry;
    for &outgoing_dep in &outgoing {
        let (dep_handle, old_down) = {
            let Some(dep) = graph.dependency_node(outgoing_dep) else {
                continue;
            };
            (dep.dependency, dep.used_symbols_down.clone())
        };
        let dep_info = db.dependency(dep_handle);
        let Some(dep_symbols) = dep_info.symbols.as_deref() else {
            continue;
        };

        let mut new_down: BTreeSet<SymbolId> = BTreeSet::new();
        // If not a single symbol is used and the asset has no side
        // effects, the entire subgraph below this dependency is unused.
        if keep_outgoing || !used_symbols.is_empty() || !namespace_reexported.is_empty() {
            if dep_info.reexports_all(star) {
                if add_all {
                    new_down.insert(star);
                } else {
                    new_down.extend(namespace_reexported.iter().copied());
                }
            }

            for entry in dep_symbols {
                if entry.local == star {
                    continue;
                }
                let requested = entry.exported;
                let weak = entry.flags.contains(SymbolFlags::IS_WEAK);
                let Some(inverse) = inverse.as_ref().filter(|_| weak) else {
                    // Bailout or a non-weak symbol: used by the asset
                    // itself, not a re-export.
                    new_down.insert(requested);
                    continue;
                };
                match inverse.get(&entry.local) {
                    None => {
                        new_down.insert(requested);
                    }
                    Some(reexports) if used_symbols.contains(&star) => {
                        new_down.insert(requested);
                        for export in reexports {
                            used_symbols.remove(export);
                        }
                    }
                    Some(reexports) => {
                        let used_reexports: Vec<SymbolId> = reexports
                            .iter()
                            .copied()
                            .filter(|export| used_symbols.contains(export))
                            .collect();
                        if !used_reexports.is_empty() {
                            new_down.insert(requested);
                            for export in used_reexports {
                                used_symbols.remove(&export);
                            }
                        }
                    }
                }
            }
        }

        if new_down != old_down {
            if let Some(dep) = graph.dependency_node_mut(outgoing_dep) {
                dep.used_symbols_down = new_down;
                dep.used_symbols_down_dirty = true;
                dep.used_symbols_up_dirty_down = true;
            }
            if changed_deps_seen.insert(outgoing_dep) {
                changed_deps.push(outgoing_dep);
            }
        }
    }

    if let Some(asset) = graph.asset_node_mut(asset_id) {
        asset.used_symbols = used_symbols;
    }
}

// ---------------------------------------------------------------------------
// Up pass
// ---------------------------------------------------------------------------

fn propagate_symbols_up(
    db: &BuildDb,
    graph: &mut AssetGraph,
    changed_asset_nodes: &[NodeId],
    changed_deps: &[NodeId],
    previous_errors: Option<FxHashMap<NodeId, Vec<Diagnostic>>>,
) -> FxHashMap<NodeId, Vec<Diagnostic>> {
    // Some nodes may have been removed since the previous build.
    let mut errors: FxHashMap<NodeId, Vec<Diagnostic>> = match previous_errors {
        Some(previous) => previous
            .into_iter()
            .filter(|(node, _)| graph.graph().has_node(*node))
            .collect(),
        None => FxHashMap::default(),
    };

    // Seed with the targets of every changed dependency (leaves before
    // their importers), then the changed assets themselves.
    let mut seeds: Vec<NodeId> = Vec::new();
    let mut seeded: FxHashSet<NodeId> = FxHashSet::default();
    for &dep in changed_deps.iter().rev() {
        for asset in graph.dependency_resolutions(dep) {
            if seeded.insert(asset) {
                seeds.push(asset);
            }
        }
    }
    for &asset in changed_asset_nodes {
        if seeded.insert(asset) {
            seeds.push(asset);
        }
    }
    if seeds.is_empty() {
        return errors;
    }

    let mut queue: VecDeque<NodeId> = VecDeque::new();
    let mut in_queue: FxHashSet<NodeId> = FxHashSet::default();

    // With enough of the graph dirty, one post-order sweep is cheaper than
    // queue churn. The queue below still runs afterwards; cycles re-dirty
    // dependencies of assets the sweep already visited.
    if seeds.len() > graph.node_count() / 6 {
        debug!(
            dirty = seeds.len(),
            nodes = graph.node_count(),
            "running full resolved-symbols sweep"
        );
        for asset_id in graph.assets_post_order() {
            run_up_visit(db, graph, asset_id, &mut errors, &mut queue, &mut in_queue);
        }
    } else {
        for &seed in &seeds {
            if let Some(asset) = graph.asset_node_mut(seed) {
                asset.used_symbols_up_dirty = true;
            }
            if in_queue.insert(seed) {
                queue.push_back(seed);
            }
        }
    }

    while let Some(node) = queue.pop_front() {
        in_queue.remove(&node);
        if matches!(graph.get_node(node), Some(AssetGraphNode::Asset(_))) {
            run_up_visit(db, graph, node, &mut errors, &mut queue, &mut in_queue);
        }
    }

    errors
}

/// Visit one asset, fold its diagnostics into the error map, and schedule
/// the source assets of any incoming dependency whose resolutions changed.
fn run_up_visit(
    db: &BuildDb,
    graph: &mut AssetGraph,
    asset_id: NodeId,
    errors: &mut FxHashMap<NodeId, Vec<Diagnostic>>,
    queue: &mut VecDeque<NodeId>,
    in_queue: &mut FxHashSet<NodeId>,
) {
    let dep_errors = visit_asset_up(db, graph, asset_id);

    let mut any_errors = false;
    for (dep, diagnostics) in dep_errors {
        if diagnostics.is_empty() {
            errors.remove(&dep);
        } else {
            any_errors = true;
            errors.insert(dep, diagnostics);
        }
    }
    if let Some(asset) = graph.asset_node_mut(asset_id) {
        // Stays dirty while the asset keeps producing errors.
        asset.used_symbols_up_dirty = any_errors;
    }

    for dep in graph.incoming_dependencies(asset_id) {
        let is_dirty = graph
            .dependency_node(dep)
            .is_some_and(|d| d.used_symbols_up_dirty_up);
        if !is_dirty {
            continue;
        }
        let mut scheduled = false;
        for parent in graph.parents(dep) {
            if matches!(graph.get_node(parent), Some(AssetGraphNode::Asset(_))) {
                if in_queue.insert(parent) {
                    queue.push_back(parent);
                }
                scheduled = true;
            }
        }
        if !scheduled {
            // An entry dependency; there is no source asset to revisit.
            if let Some(dep) = graph.dependency_node_mut(dep) {
                dep.used_symbols_up_dirty_up = false;
            }
        }
    }
}

/// Record a symbol surfaced by a namespace or named re-export. Two
/// different dependencies supplying the same name is ambiguous: the name
/// must be looked up on this asset's namespace at runtime instead.
#[allow(clippy::too_many_arguments)]
fn record_reexported_symbol(
    db: &BuildDb,
    asset_key: &ContentKey,
    requested: SymbolId,
    resolved: Option<SymbolResolution>,
    source: NodeId,
    used_symbols: &mut BTreeSet<SymbolId>,
    reexported: &mut BTreeMap<SymbolId, Option<SymbolResolution>>,
    reexported_source: &mut BTreeMap<SymbolId, NodeId>,
) {
    match reexported_source.get(&requested) {
        Some(&existing) if existing != source => {
            warn!(
                symbol = db.symbol_name(requested),
                asset = %asset_key,
                "ambiguous namespace re-export, falling back to a namespace import"
            );
            used_symbols.insert(db.star_symbol());
            reexported.insert(
                requested,
                Some(SymbolResolution {
                    asset: asset_key.clone(),
                    symbol: Some(requested),
                }),
            );
        }
        Some(_) => {}
        None => {
            reexported.insert(requested, resolved);
            reexported_source.insert(requested, source);
        }
    }
}

/// Write one resolution into a dependency's `used_symbols_up`, collapsing
/// to `None` when it conflicts with the previous build's resolution (the
/// dependency reaches multiple assets through an asset group).
fn merge_resolution(
    old: &BTreeMap<SymbolId, Option<SymbolResolution>>,
    current: &mut BTreeMap<SymbolId, Option<SymbolResolution>>,
    symbol: SymbolId,
    resolution: SymbolResolution,
) {
    // An old entry of `None` is a previous collapse or missing-export
    // marker, not a competing resolution; a fresh concrete resolution may
    // replace it.
    if let Some(Some(previous)) = old.get(&symbol) {
        if *previous != resolution {
            current.insert(symbol, None);
            return;
        }
    }
    current.insert(symbol, Some(resolution));
}

/// Compute where every symbol requested from this asset resolves, and
/// report requests the asset cannot satisfy.
fn visit_asset_up(
    db: &BuildDb,
    graph: &mut AssetGraph,
    asset_id: NodeId,
) -> Vec<(NodeId, Vec<Diagnostic>)> {
    let star = db.star_symbol();
    let default_export = db.default_symbol();

    let Some(asset) = graph.asset_node(asset_id) else {
        return Vec::new();
    };
    let content_key = asset.content_key.clone();
    let mut used_symbols = asset.used_symbols.clone();
    let info = db.asset(asset.asset);
    let asset_symbols = info.symbols.as_deref();
    let inverse = build_symbol_inverse(asset_symbols);

    let incoming = graph.incoming_dependencies(asset_id);
    let outgoing = graph.outgoing_dependencies(asset_id);

    // This visit consumes every outgoing resolution. Dependencies that
    // resolve to nothing are treated as if everything they request exists.
    for &outgoing_dep in &outgoing {
        let resolves = !graph.children(outgoing_dep).is_empty();
        if let Some(dep) = graph.dependency_node_mut(outgoing_dep) {
            dep.used_symbols_up_dirty_up = false;
            if !resolves {
                dep.used_symbols_up = dep.used_symbols_down.iter().map(|&s| (s, None)).collect();
                dep.used_symbols_up_dirty_down = false;
            }
        }
    }

    let mut reexported: BTreeMap<SymbolId, Option<SymbolResolution>> = BTreeMap::new();
    let mut reexported_source: BTreeMap<SymbolId, NodeId> = BTreeMap::new();

    for &outgoing_dep in &outgoing {
        let Some(dep) = graph.dependency_node(outgoing_dep) else {
            continue;
        };
        let dep_info = db.dependency(dep.dependency);
        if dep_info.symbols.is_none() {
            continue;
        }
        let used_up: Vec<(SymbolId, Option<SymbolResolution>)> = dep
            .used_symbols_up
            .iter()
            .map(|(s, r)| (*s, r.clone()))
            .collect();
        let used_down = dep.used_symbols_down.clone();

        if dep_info.reexports_all(star) {
            for (requested, resolved) in &used_up {
                if *requested == default_export {
                    continue;
                }
                record_reexported_symbol(
                    db,
                    &content_key,
                    *requested,
                    resolved.clone(),
                    outgoing_dep,
                    &mut used_symbols,
                    &mut reexported,
                    &mut reexported_source,
                );
            }
        }

        for (requested, resolved) in &used_up {
            if !used_down.contains(requested) {
                continue;
            }
            let Some(local) = dep_info.symbol(*requested).map(|e| e.local) else {
                continue;
            };
            let Some(inverse) = inverse.as_ref() else {
                continue;
            };
            let Some(reexports) = inverse.get(&local) else {
                continue;
            };
            for &export in reexports {
                record_reexported_symbol(
                    db,
                    &content_key,
                    export,
                    resolved.clone(),
                    outgoing_dep,
                    &mut used_symbols,
                    &mut reexported,
                    &mut reexported_source,
                );
            }
        }
    }

    let bundle_isolated = matches!(
        info.bundle_behavior,
        BundleBehavior::Inline | BundleBehavior::Isolated
    );
    let mut results: Vec<(NodeId, Vec<Diagnostic>)> = Vec::new();

    for &incoming_dep in &incoming {
        let (dep_handle, old_up, used_down) = {
            let Some(dep) = graph.dependency_node(incoming_dep) else {
                continue;
            };
            (
                dep.dependency,
                dep.used_symbols_up.clone(),
                dep.used_symbols_down.clone(),
            )
        };
        let dep_info = db.dependency(dep_handle);

        if dep_info.symbols.is_none() {
            if let Some(dep) = graph.dependency_node_mut(incoming_dep) {
                dep.used_symbols_up = BTreeMap::new();
                dep.used_symbols_up_dirty_down = false;
            }
            results.push((incoming_dep, Vec::new()));
            continue;
        }

        let has_namespace_reexport = dep_info.reexports_all(star);
        let mut new_up: BTreeMap<SymbolId, Option<SymbolResolution>> = BTreeMap::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        for &requested in &used_down {
            if asset_symbols.is_none()
                || bundle_isolated
                || requested == star
                || used_symbols.contains(&requested)
            {
                merge_resolution(
                    &old_up,
                    &mut new_up,
                    requested,
                    SymbolResolution {
                        asset: content_key.clone(),
                        symbol: Some(requested),
                    },
                );
            } else if let Some(reexport) = reexported.get(&requested) {
                // Forward the re-export only through side-effect-free
                // assets; otherwise this asset stays in the chain.
                let resolution = match reexport {
                    Some(resolution) if !info.side_effects() => resolution.clone(),
                    _ => SymbolResolution {
                        asset: content_key.clone(),
                        symbol: Some(requested),
                    },
                };
                merge_resolution(&old_up, &mut new_up, requested, resolution);
            } else if !has_namespace_reexport {
                let mut diagnostic = Diagnostic::error(format!(
                    "{} does not export '{}'",
                    info.file_path.display(),
                    db.symbol_name(requested)
                ))
                .with_file(info.file_path.clone());
                if let Some(loc) = dep_info.symbol(requested).and_then(|s| s.loc.clone()) {
                    diagnostic = diagnostic.with_loc(loc);
                }
                diagnostics.push(diagnostic);
                // The request stays recorded as ambiguous so importers
                // further up resolve against this asset instead of
                // re-reporting the same problem.
                new_up.insert(requested, None);
            }
        }

        let changed = new_up != old_up;
        let excluded = new_up.is_empty() && {
            let children = graph.children(incoming_dep);
            children.len() == 1
                && graph
                    .asset_group_node(children[0])
                    .is_some_and(|group| !group.side_effects)
        };
        if let Some(dep) = graph.dependency_node_mut(incoming_dep) {
            dep.used_symbols_up = new_up;
            dep.used_symbols_up_dirty_down = false;
            if changed {
                dep.used_symbols_up_dirty_up = true;
            }
            dep.excluded = excluded;
        }
        results.push((incoming_dep, diagnostics));
    }

    if let Some(asset) = graph.asset_node_mut(asset_id) {
        asset.used_symbols = used_symbols;
    }
    results
}
