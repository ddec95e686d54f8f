//! Generic labelled multigraph.

use std::marker::PhantomData;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::adjacency::{AdjacencyList, EdgeFilter, NodeId};
use crate::{Error, Result};

/// Typed edge kinds for a [`Graph`].
///
/// Raw values must be non-zero; 0 is the adjacency tombstone reserve.
pub trait EdgeKind: Copy + Eq + std::fmt::Debug {
    fn into_raw(self) -> u32;
    fn from_raw(raw: u32) -> Self;
}

/// The sole edge kind of graphs that do not distinguish edge types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefaultEdgeKind;

impl EdgeKind for DefaultEdgeKind {
    fn into_raw(self) -> u32 {
        1
    }

    fn from_raw(_raw: u32) -> Self {
        DefaultEdgeKind
    }
}

/// A typed edge returned by [`Graph::get_all_edges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge<E> {
    pub from: NodeId,
    pub to: NodeId,
    pub edge_type: E,
}

/// A directed multigraph with labelled nodes and typed edges.
///
/// Node payloads live in a hash map keyed by the dense [`NodeId`]s the
/// adjacency list allocates; edge storage is entirely inside
/// [`AdjacencyList`]. A graph optionally has a root node, which anchors
/// default traversals and defines orphanhood.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph<N, E: EdgeKind = DefaultEdgeKind> {
    pub(crate) nodes: FxHashMap<NodeId, N>,
    pub(crate) adjacency: AdjacencyList,
    pub(crate) root_node_id: Option<NodeId>,
    #[serde(skip)]
    pub(crate) _edge_kind: PhantomData<E>,
}

impl<N, E: EdgeKind> Graph<N, E> {
    pub fn new() -> Self {
        Graph {
            nodes: FxHashMap::default(),
            adjacency: AdjacencyList::new(),
            root_node_id: None,
            _edge_kind: PhantomData,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate node ids and payloads, in unspecified order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, &N)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.edge_count()
    }

    /// Add a node with the given payload, returning its id.
    pub fn add_node(&mut self, node: N) -> NodeId {
        let id = self.adjacency.add_node();
        self.nodes.insert(id, node);
        id
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&N> {
        self.nodes.get(&id)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut N> {
        self.nodes.get_mut(&id)
    }

    /// Replace the payload of an existing node.
    pub fn update_node(&mut self, id: NodeId, node: N) -> Result<()> {
        match self.nodes.get_mut(&id) {
            Some(slot) => {
                *slot = node;
                Ok(())
            }
            None => Err(Error::UnknownNode(id)),
        }
    }

    pub fn set_root_node_id(&mut self, id: NodeId) {
        self.root_node_id = Some(id);
    }

    pub fn root_node_id(&self) -> Option<NodeId> {
        self.root_node_id
    }

    /// Insert a typed edge. Returns `Ok(false)` if it already exists.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, edge_type: E) -> Result<bool> {
        self.adjacency.add_edge(from, to, edge_type.into_raw())
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId, edge_type: E) -> bool {
        self.adjacency.has_edge(from, to, edge_type.into_raw())
    }

    /// Remove an edge. With `remove_orphans` set, `to` is cascaded away if
    /// the removal orphaned it.
    pub fn remove_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        edge_type: E,
        remove_orphans: bool,
    ) -> Result<()> {
        self.adjacency.remove_edge(from, to, edge_type.into_raw())?;
        if remove_orphans && self.is_orphaned_node(to) {
            self.remove_node(to)?;
        }
        Ok(())
    }

    /// Remove every outbound edge of the given type, pruning orphans.
    pub fn remove_edges(&mut self, node: NodeId, edge_type: E) -> Result<()> {
        let raw = edge_type.into_raw();
        let targets: Vec<NodeId> = self
            .adjacency
            .get_outbound_edges_by_type(node)
            .filter(|(ty, _)| *ty == raw)
            .map(|(_, to)| to)
            .collect();
        for to in targets {
            // A previous removal in this loop may have cascaded the edge away.
            if self.adjacency.has_edge(node, to, raw) {
                self.remove_edge(node, to, edge_type, true)?;
            }
        }
        Ok(())
    }

    /// Remove a node and every edge incident to it.
    ///
    /// Inbound edges are removed with orphan pruning disabled: this node is
    /// about to go, so far-side nodes must not be cascaded on its account.
    /// Outbound removal prunes normally.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if !self.nodes.contains_key(&id) {
            return Err(Error::UnknownNode(id));
        }

        let inbound: Vec<(u32, NodeId)> = self.adjacency.get_inbound_edges_by_type(id).collect();
        for (edge_type, from) in inbound {
            self.adjacency.remove_edge(from, id, edge_type)?;
        }

        let outbound: Vec<(u32, NodeId)> = self.adjacency.get_outbound_edges_by_type(id).collect();
        for (edge_type, to) in outbound {
            // A cascade triggered by an earlier iteration may already have
            // taken this edge with it.
            if self.adjacency.has_edge(id, to, edge_type) {
                self.remove_edge(id, to, E::from_raw(edge_type), true)?;
            }
        }

        self.nodes.remove(&id);
        Ok(())
    }

    /// Make `from`'s outbound neighbours of `edge_type` equal `new_tos`
    /// plus any pre-existing neighbours not matching `filter`.
    ///
    /// Removed edges obey orphan pruning; added edges are fresh inserts.
    pub fn replace_node_ids_connected_to(
        &mut self,
        from: NodeId,
        new_tos: &[NodeId],
        filter: Option<&dyn Fn(NodeId) -> bool>,
        edge_type: E,
    ) -> Result<()> {
        let current = self.get_node_ids_connected_from(from, &EdgeFilter::One(edge_type));
        let mut to_remove: FxHashSet<NodeId> = match filter {
            Some(filter) => current.into_iter().filter(|id| filter(*id)).collect(),
            None => current.into_iter().collect(),
        };

        for &to in new_tos {
            to_remove.remove(&to);
            if !self.has_edge(from, to, edge_type) {
                self.add_edge(from, to, edge_type)?;
            }
        }

        for to in to_remove {
            self.remove_edge(from, to, edge_type, true)?;
        }
        Ok(())
    }

    /// Deduplicated outbound neighbours, in first-seen insertion order.
    pub fn get_node_ids_connected_from(&self, id: NodeId, filter: &EdgeFilter<E>) -> Vec<NodeId> {
        let raw = raw_filter(filter);
        let mut seen = FxHashSet::default();
        self.adjacency
            .get_nodes_connected_from(id, raw)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Deduplicated inbound neighbours, in first-seen insertion order.
    pub fn get_node_ids_connected_to(&self, id: NodeId, filter: &EdgeFilter<E>) -> Vec<NodeId> {
        let raw = raw_filter(filter);
        let mut seen = FxHashSet::default();
        self.adjacency
            .get_nodes_connected_to(id, raw)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Stream all live edges with their typed edge kinds.
    pub fn get_all_edges(&self) -> impl Iterator<Item = GraphEdge<E>> + '_ {
        self.adjacency.get_all_edges().map(|edge| GraphEdge {
            from: edge.from,
            to: edge.to,
            edge_type: E::from_raw(edge.edge_type),
        })
    }

    /// Whether a node is unreachable.
    ///
    /// Without a root, a node is orphaned when it has no inbound edges at
    /// all. With a root, it is orphaned when no directed path of any edge
    /// type leads from the root to it.
    pub fn is_orphaned_node(&self, id: NodeId) -> bool {
        if !self.nodes.contains_key(&id) {
            return true;
        }

        let Some(root) = self.root_node_id else {
            return self.adjacency.get_inbound_edges_by_type(id).next().is_none();
        };

        // Walk ancestors across every edge type looking for the root.
        let mut stack = vec![id];
        let mut visited = FxHashSet::default();
        while let Some(node) = stack.pop() {
            if node == root {
                return false;
            }
            if !visited.insert(node) {
                continue;
            }
            for (_, from) in self.adjacency.get_inbound_edges_by_type(node) {
                if !visited.contains(&from) {
                    stack.push(from);
                }
            }
        }
        true
    }

    pub(crate) fn raw_nodes_connected_from(&self, id: NodeId) -> Vec<NodeId> {
        let mut seen = FxHashSet::default();
        self.adjacency
            .get_nodes_connected_from(id, EdgeFilter::All)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

impl<N, E: EdgeKind> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn raw_filter<E: EdgeKind>(filter: &EdgeFilter<E>) -> EdgeFilter<u32> {
    match filter {
        EdgeFilter::All => EdgeFilter::All,
        EdgeFilter::One(t) => EdgeFilter::One(t.into_raw()),
        EdgeFilter::Any(types) => {
            EdgeFilter::Any(types.iter().map(|t| t.into_raw()).collect())
        }
    }
}
