//! The asset graph.
//!
//! Nodes are a tagged sum over the build entities: the root, dependencies,
//! asset groups, and assets. Payload bodies stay in the [`BuildDb`]; nodes
//! carry only handles plus the propagation state the symbol passes mutate.
//!
//! Every node except the root owns a [`ContentKey`], and the graph keeps a
//! side index from content key to node id so external requests can address
//! nodes stably across rebuilds.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use braid_core::{AssetHandle, DependencyHandle, SymbolId};
use braid_graph::{DfsVisitor, EdgeFilter, EdgeKind, Graph, NodeId};

use crate::{Error, Result};

/// String key assigned to a node by the asset graph, stable across builds.
pub type ContentKey = String;

/// The only edge kind of the asset graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetGraphEdge;

impl EdgeKind for AssetGraphEdge {
    fn into_raw(self) -> u32 {
        1
    }

    fn from_raw(_raw: u32) -> Self {
        AssetGraphEdge
    }
}

/// Where a requested symbol resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolResolution {
    /// Content key of the asset providing the symbol.
    pub asset: ContentKey,
    /// The symbol on that asset, or `None` for the whole namespace.
    pub symbol: Option<SymbolId>,
}

/// Propagation state carried by an asset node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetNode {
    pub content_key: ContentKey,
    pub asset: AssetHandle,
    /// Symbols this asset exposes to its importers, computed by the down
    /// pass and refined by the up pass.
    pub used_symbols: BTreeSet<SymbolId>,
    pub used_symbols_down_dirty: bool,
    pub used_symbols_up_dirty: bool,
}

impl AssetNode {
    pub fn new(content_key: ContentKey, asset: AssetHandle) -> Self {
        AssetNode {
            content_key,
            asset,
            used_symbols: BTreeSet::new(),
            used_symbols_down_dirty: true,
            used_symbols_up_dirty: true,
        }
    }
}

/// Propagation state carried by a dependency node.
///
/// `used_symbols_down` is what importers request through this dependency;
/// `used_symbols_up` records where each requested symbol resolved. A `None`
/// resolution means the request collapsed into ambiguity; an absent key
/// means the symbol is not requested or not resolved yet. Keys are ordered
/// by `SymbolId`, so downstream packaging sees a deterministic order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub content_key: ContentKey,
    pub dependency: DependencyHandle,
    pub used_symbols_down: BTreeSet<SymbolId>,
    pub used_symbols_up: BTreeMap<SymbolId, Option<SymbolResolution>>,
    pub used_symbols_down_dirty: bool,
    /// The dependency's requested set changed; its target asset must be
    /// revisited by the up pass.
    pub used_symbols_up_dirty_down: bool,
    /// The dependency's resolutions changed; its source asset must be
    /// revisited by the up pass.
    pub used_symbols_up_dirty_up: bool,
    /// Nothing is requested through this dependency and its target is
    /// side-effect free, so it can be dropped entirely.
    pub excluded: bool,
}

impl DependencyNode {
    pub fn new(content_key: ContentKey, dependency: DependencyHandle) -> Self {
        DependencyNode {
            content_key,
            dependency,
            used_symbols_down: BTreeSet::new(),
            used_symbols_up: BTreeMap::new(),
            used_symbols_down_dirty: true,
            used_symbols_up_dirty_down: true,
            used_symbols_up_dirty_up: true,
            excluded: false,
        }
    }
}

/// An unresolved request that may settle on one of several assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetGroupNode {
    pub content_key: ContentKey,
    pub file_path: PathBuf,
    pub side_effects: bool,
    pub used_symbols_down_dirty: bool,
}

impl AssetGroupNode {
    pub fn new(content_key: ContentKey, file_path: impl Into<PathBuf>, side_effects: bool) -> Self {
        AssetGroupNode {
            content_key,
            file_path: file_path.into(),
            side_effects,
            used_symbols_down_dirty: false,
        }
    }
}

/// A node of the asset graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AssetGraphNode {
    Root,
    Asset(AssetNode),
    Dependency(DependencyNode),
    AssetGroup(AssetGroupNode),
}

impl AssetGraphNode {
    pub fn content_key(&self) -> Option<&ContentKey> {
        match self {
            AssetGraphNode::Root => None,
            AssetGraphNode::Asset(asset) => Some(&asset.content_key),
            AssetGraphNode::Dependency(dep) => Some(&dep.content_key),
            AssetGraphNode::AssetGroup(group) => Some(&group.content_key),
        }
    }

    pub fn as_asset(&self) -> Option<&AssetNode> {
        match self {
            AssetGraphNode::Asset(asset) => Some(asset),
            _ => None,
        }
    }

    pub fn as_asset_mut(&mut self) -> Option<&mut AssetNode> {
        match self {
            AssetGraphNode::Asset(asset) => Some(asset),
            _ => None,
        }
    }

    pub fn as_dependency(&self) -> Option<&DependencyNode> {
        match self {
            AssetGraphNode::Dependency(dep) => Some(dep),
            _ => None,
        }
    }

    pub fn as_dependency_mut(&mut self) -> Option<&mut DependencyNode> {
        match self {
            AssetGraphNode::Dependency(dep) => Some(dep),
            _ => None,
        }
    }

    pub fn as_asset_group(&self) -> Option<&AssetGroupNode> {
        match self {
            AssetGraphNode::AssetGroup(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_asset_group_mut(&mut self) -> Option<&mut AssetGroupNode> {
        match self {
            AssetGraphNode::AssetGroup(group) => Some(group),
            _ => None,
        }
    }
}

/// The asset graph: a rooted [`Graph`] of [`AssetGraphNode`]s plus the
/// content-key side index.
#[derive(Debug, Clone)]
pub struct AssetGraph {
    graph: Graph<AssetGraphNode, AssetGraphEdge>,
    content_key_index: FxHashMap<ContentKey, NodeId>,
    root: NodeId,
}

impl AssetGraph {
    /// Create an empty graph holding only the root node.
    pub fn new() -> Self {
        let mut graph = Graph::new();
        let root = graph.add_node(AssetGraphNode::Root);
        graph.set_root_node_id(root);
        AssetGraph {
            graph,
            content_key_index: FxHashMap::default(),
            root,
        }
    }

    pub fn root_node_id(&self) -> NodeId {
        self.root
    }

    /// The underlying generic graph, for traversals and edge queries.
    pub fn graph(&self) -> &Graph<AssetGraphNode, AssetGraphEdge> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn insert_keyed(&mut self, node: AssetGraphNode) -> Result<NodeId> {
        // Every variant inserted through here carries a content key; only
        // the root, created in new(), does not.
        let Some(key) = node.content_key().cloned() else {
            return Ok(self.graph.add_node(node));
        };
        if self.content_key_index.contains_key(&key) {
            return Err(Error::DuplicateContentKey(key));
        }
        let id = self.graph.add_node(node);
        self.content_key_index.insert(key, id);
        Ok(id)
    }

    /// Add an asset node. Fresh nodes start dirty so the next propagation
    /// picks them up.
    pub fn add_asset(&mut self, content_key: impl Into<ContentKey>, asset: AssetHandle) -> Result<NodeId> {
        self.insert_keyed(AssetGraphNode::Asset(AssetNode::new(content_key.into(), asset)))
    }

    /// Add a dependency node.
    pub fn add_dependency(
        &mut self,
        content_key: impl Into<ContentKey>,
        dependency: DependencyHandle,
    ) -> Result<NodeId> {
        self.insert_keyed(AssetGraphNode::Dependency(DependencyNode::new(
            content_key.into(),
            dependency,
        )))
    }

    /// Add a dependency node wired to the root (a build entry).
    pub fn add_entry_dependency(
        &mut self,
        content_key: impl Into<ContentKey>,
        dependency: DependencyHandle,
    ) -> Result<NodeId> {
        let id = self.add_dependency(content_key, dependency)?;
        self.graph.add_edge(self.root, id, AssetGraphEdge)?;
        Ok(id)
    }

    /// Add an asset-group node.
    pub fn add_asset_group(
        &mut self,
        content_key: impl Into<ContentKey>,
        file_path: impl Into<PathBuf>,
        side_effects: bool,
    ) -> Result<NodeId> {
        self.insert_keyed(AssetGraphNode::AssetGroup(AssetGroupNode::new(
            content_key.into(),
            file_path,
            side_effects,
        )))
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<bool> {
        Ok(self.graph.add_edge(from, to, AssetGraphEdge)?)
    }

    /// Remove an edge, cascading orphaned targets away.
    pub fn remove_edge(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        self.graph.remove_edge(from, to, AssetGraphEdge, true)?;
        self.prune_content_key_index();
        Ok(())
    }

    /// Remove a node and everything orphaned by its departure.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        self.graph.remove_node(id)?;
        self.prune_content_key_index();
        Ok(())
    }

    /// Orphan cascades happen inside the generic graph, which knows nothing
    /// of content keys, so the index is re-filtered after every removal.
    fn prune_content_key_index(&mut self) {
        let graph = &self.graph;
        self.content_key_index.retain(|_, id| graph.has_node(*id));
    }

    pub fn get_node_id_by_content_key(&self, key: &str) -> Option<NodeId> {
        self.content_key_index.get(key).copied()
    }

    pub fn get_node(&self, id: NodeId) -> Option<&AssetGraphNode> {
        self.graph.get_node(id)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut AssetGraphNode> {
        self.graph.get_node_mut(id)
    }

    pub fn asset_node(&self, id: NodeId) -> Option<&AssetNode> {
        self.graph.get_node(id).and_then(AssetGraphNode::as_asset)
    }

    pub fn asset_node_mut(&mut self, id: NodeId) -> Option<&mut AssetNode> {
        self.graph
            .get_node_mut(id)
            .and_then(AssetGraphNode::as_asset_mut)
    }

    pub fn dependency_node(&self, id: NodeId) -> Option<&DependencyNode> {
        self.graph
            .get_node(id)
            .and_then(AssetGraphNode::as_dependency)
    }

    pub fn dependency_node_mut(&mut self, id: NodeId) -> Option<&mut DependencyNode> {
        self.graph
            .get_node_mut(id)
            .and_then(AssetGraphNode::as_dependency_mut)
    }

    pub fn asset_group_node(&self, id: NodeId) -> Option<&AssetGroupNode> {
        self.graph
            .get_node(id)
            .and_then(AssetGraphNode::as_asset_group)
    }

    pub fn asset_group_node_mut(&mut self, id: NodeId) -> Option<&mut AssetGroupNode> {
        self.graph
            .get_node_mut(id)
            .and_then(AssetGraphNode::as_asset_group_mut)
    }

    /// Direct children of a node.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.graph.get_node_ids_connected_from(id, &EdgeFilter::All)
    }

    /// Direct parents of a node.
    pub fn parents(&self, id: NodeId) -> Vec<NodeId> {
        self.graph.get_node_ids_connected_to(id, &EdgeFilter::All)
    }

    /// Dependency nodes importing from the given asset, looking through
    /// asset-group indirection.
    pub fn incoming_dependencies(&self, asset: NodeId) -> Vec<NodeId> {
        let mut deps = Vec::new();
        for parent in self.parents(asset) {
            match self.graph.get_node(parent) {
                Some(AssetGraphNode::Dependency(_)) => deps.push(parent),
                Some(AssetGraphNode::AssetGroup(_)) => {
                    for grandparent in self.parents(parent) {
                        if matches!(
                            self.graph.get_node(grandparent),
                            Some(AssetGraphNode::Dependency(_))
                        ) {
                            deps.push(grandparent);
                        }
                    }
                }
                _ => {}
            }
        }
        deps
    }

    /// Dependency nodes hanging off the given asset (its own imports).
    pub fn outgoing_dependencies(&self, asset: NodeId) -> Vec<NodeId> {
        self.children(asset)
            .into_iter()
            .filter(|&child| {
                matches!(
                    self.graph.get_node(child),
                    Some(AssetGraphNode::Dependency(_))
                )
            })
            .collect()
    }

    /// The asset(s) a dependency resolves to, looking through asset-group
    /// indirection. Empty for excluded/external dependencies.
    pub fn dependency_resolutions(&self, dependency: NodeId) -> Vec<NodeId> {
        let mut assets = Vec::new();
        for child in self.children(dependency) {
            match self.graph.get_node(child) {
                Some(AssetGraphNode::Asset(_)) => assets.push(child),
                Some(AssetGraphNode::AssetGroup(_)) => {
                    for grandchild in self.children(child) {
                        if matches!(
                            self.graph.get_node(grandchild),
                            Some(AssetGraphNode::Asset(_))
                        ) {
                            assets.push(grandchild);
                        }
                    }
                }
                _ => {}
            }
        }
        assets
    }

    /// Asset nodes in post-order from the root (leaves first).
    pub fn assets_post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        // The visitor only collects, so the traversal cannot fail beyond a
        // missing root, which new() always installs.
        let _ = self.graph.traverse::<()>(
            DfsVisitor::exit(|node, _, _| {
                if matches!(self.graph.get_node(node), Some(AssetGraphNode::Asset(_))) {
                    order.push(node);
                }
            }),
            None,
            &EdgeFilter::All,
        );
        order
    }

    /// Serialize to the binary snapshot format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.graph.to_bytes()?)
    }

    /// Restore from a binary snapshot. The content-key index is rebuilt
    /// from the node payloads.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let graph: Graph<AssetGraphNode, AssetGraphEdge> = Graph::from_bytes(bytes)?;
        let root = graph
            .root_node_id()
            .ok_or_else(|| Error::Export("snapshot has no root node".to_string()))?;
        let mut content_key_index = FxHashMap::default();
        for (id, node) in graph.iter_nodes() {
            if let Some(key) = node.content_key() {
                content_key_index.insert(key.clone(), id);
            }
        }
        Ok(AssetGraph {
            graph,
            content_key_index,
            root,
        })
    }

    /// Export as Graphviz DOT for debugging.
    pub fn to_dot(&self) -> String {
        fn escape_label(label: &str) -> String {
            label.replace('"', "\\\"")
        }

        let mut output = String::from("digraph AssetGraph {\n");
        let mut ids: Vec<NodeId> = self.graph.iter_nodes().map(|(id, _)| id).collect();
        ids.sort();

        for id in &ids {
            let label = match self.graph.get_node(*id) {
                Some(AssetGraphNode::Root) => "root".to_string(),
                Some(AssetGraphNode::Asset(a)) => format!("asset: {}", a.content_key),
                Some(AssetGraphNode::Dependency(d)) => format!("dep: {}", d.content_key),
                Some(AssetGraphNode::AssetGroup(g)) => format!("group: {}", g.content_key),
                None => continue,
            };
            output.push_str(&format!("    \"{id}\" [label=\"{}\"];\n", escape_label(&label)));
        }
        let mut edges: Vec<_> = self
            .graph
            .get_all_edges()
            .map(|e| (e.from, e.to))
            .collect();
        edges.sort();
        for (from, to) in edges {
            output.push_str(&format!("    \"{from}\" -> \"{to}\";\n"));
        }
        output.push_str("}\n");
        output
    }

    /// Export nodes and edges to JSON for debugging.
    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct GraphJson<'a> {
            nodes: Vec<(NodeId, &'a AssetGraphNode)>,
            edges: Vec<(NodeId, NodeId)>,
        }

        let mut nodes: Vec<_> = self.graph.iter_nodes().collect();
        nodes.sort_by_key(|(id, _)| *id);
        let mut edges: Vec<_> = self
            .graph
            .get_all_edges()
            .map(|e| (e.from, e.to))
            .collect();
        edges.sort();

        serde_json::to_string_pretty(&GraphJson { nodes, edges })
            .map_err(|e| Error::Export(e.to_string()))
    }
}

impl Default for AssetGraph {
    fn default() -> Self {
        Self::new()
    }
}
