//! Bit-packed adjacency storage.
//!
//! Edges live in one flat `Vec<u32>`, eight fields per edge: the edge type,
//! both endpoints, a hash-chain pointer, and the four pointers that thread
//! the edge into the inbound list of its `to` node and the outbound list of
//! its `from` node. Nodes contribute four fields each: head and tail
//! pointers for both lists. A power-of-two hash table keyed by
//! `(from, to, type)` gives O(1) expected insert/lookup/remove.
//!
//! Removal tombstones the slot (type 0) rather than shifting anything;
//! tombstones are reclaimed by the compaction that runs whenever the load
//! factor over used slots crosses 4/5.
//!
//! Endpoint lists are FIFO, so neighbour iteration observes insertion
//! order. Compaction re-links live edges in slot order, which preserves it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Sentinel for "no slot / no node" inside the packed arrays.
const NULL: u32 = u32::MAX;

/// Edge type value marking a deleted slot. Never a valid edge type.
const TOMBSTONE: u32 = 0;

const NODE_SIZE: usize = 4;
const FIRST_IN: usize = 0;
const LAST_IN: usize = 1;
const FIRST_OUT: usize = 2;
const LAST_OUT: usize = 3;

const EDGE_SIZE: usize = 8;
const TYPE: usize = 0;
const FROM: usize = 1;
const TO: usize = 2;
const NEXT_HASH: usize = 3;
const NEXT_IN: usize = 4;
const PREV_IN: usize = 5;
const NEXT_OUT: usize = 6;
const PREV_OUT: usize = 7;

/// Resize when `(live + tombstones) / capacity > 4/5`.
const MAX_LOAD_NUM: usize = 4;
const MAX_LOAD_DEN: usize = 5;

/// Below this live density a resize compacts at the same capacity instead
/// of doubling: the region is mostly tombstones, not genuinely full.
const SHRINK_NUM: usize = 2;
const SHRINK_DEN: usize = 5;

const MIN_EDGE_CAPACITY: usize = 4;
const MIN_HASH_SIZE: usize = 4;

/// Dense identifier of a node in an [`AdjacencyList`].
///
/// Ids are allocated by [`AdjacencyList::add_node`] as a monotonically
/// increasing counter and stay stable for the lifetime of the graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(raw: u32) -> Self {
        NodeId(raw)
    }

    pub fn to_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single stored edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub edge_type: u32,
}

/// Selects which edge types a query observes.
///
/// `All` is the "every type" sentinel; `One` and `Any` restrict to the
/// given raw type or set of types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeFilter<T = u32> {
    All,
    One(T),
    Any(Vec<T>),
}

impl<T: PartialEq> EdgeFilter<T> {
    pub fn matches(&self, edge_type: &T) -> bool {
        match self {
            EdgeFilter::All => true,
            EdgeFilter::One(t) => t == edge_type,
            EdgeFilter::Any(types) => types.contains(edge_type),
        }
    }
}

/// Compact storage for the edges of a directed multigraph.
///
/// At most one edge of a given type exists between an ordered node pair.
/// Self-loops and parallel edges of different types are permitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyList {
    nodes: Vec<u32>,
    node_count: u32,
    edges: Vec<u32>,
    edge_count: u32,
    deleted_count: u32,
    next_slot: u32,
    hash_table: Vec<u32>,
}

impl AdjacencyList {
    pub fn new() -> Self {
        AdjacencyList {
            nodes: Vec::new(),
            node_count: 0,
            edges: vec![NULL; MIN_EDGE_CAPACITY * EDGE_SIZE],
            edge_count: 0,
            deleted_count: 0,
            next_slot: 0,
            hash_table: vec![NULL; MIN_HASH_SIZE],
        }
    }

    /// Number of allocated nodes.
    pub fn node_count(&self) -> usize {
        self.node_count as usize
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count as usize
    }

    pub fn has_node(&self, node: NodeId) -> bool {
        node.0 < self.node_count
    }

    /// Allocate a new node slot. O(1) amortized; the packed array doubles
    /// when exhausted.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.node_count;
        let needed = (id as usize + 1) * NODE_SIZE;
        if self.nodes.len() < needed {
            let grown = (self.nodes.len() * 2).max(needed);
            self.nodes.resize(grown, NULL);
        }
        self.node_count += 1;
        NodeId(id)
    }

    /// Insert an edge. Returns `Ok(false)` if the exact `(from, to, type)`
    /// triple is already present.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, edge_type: u32) -> Result<bool> {
        if edge_type == TOMBSTONE {
            return Err(Error::InvalidEdgeType);
        }
        if !self.has_node(from) {
            return Err(Error::NodeNotFound(from));
        }
        if !self.has_node(to) {
            return Err(Error::NodeNotFound(to));
        }
        if self.find_edge(from, to, edge_type).is_some() {
            return Ok(false);
        }

        if self.over_loaded() {
            self.resize_edges();
        }
        self.link_edge(from.0, to.0, edge_type);
        Ok(true)
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId, edge_type: u32) -> bool {
        self.find_edge(from, to, edge_type).is_some()
    }

    /// Remove an edge, tombstoning its slot.
    pub fn remove_edge(&mut self, from: NodeId, to: NodeId, edge_type: u32) -> Result<()> {
        let Some(slot) = self.find_edge(from, to, edge_type) else {
            return Err(Error::EdgeNotFound {
                from,
                to,
                edge_type,
            });
        };
        let base = slot as usize * EDGE_SIZE;

        // Unlink from the hash bucket chain.
        let bucket = self.bucket_of(from.0, to.0, edge_type);
        let mut cursor = self.hash_table[bucket];
        if cursor == slot {
            self.hash_table[bucket] = self.edges[base + NEXT_HASH];
        } else {
            while cursor != NULL {
                let cursor_base = cursor as usize * EDGE_SIZE;
                if self.edges[cursor_base + NEXT_HASH] == slot {
                    self.edges[cursor_base + NEXT_HASH] = self.edges[base + NEXT_HASH];
                    break;
                }
                cursor = self.edges[cursor_base + NEXT_HASH];
            }
        }

        // Unlink from the inbound list of `to`.
        let prev = self.edges[base + PREV_IN];
        let next = self.edges[base + NEXT_IN];
        if prev == NULL {
            self.set_node_field(to.0, FIRST_IN, next);
        } else {
            self.edges[prev as usize * EDGE_SIZE + NEXT_IN] = next;
        }
        if next == NULL {
            self.set_node_field(to.0, LAST_IN, prev);
        } else {
            self.edges[next as usize * EDGE_SIZE + PREV_IN] = prev;
        }

        // Unlink from the outbound list of `from`.
        let prev = self.edges[base + PREV_OUT];
        let next = self.edges[base + NEXT_OUT];
        if prev == NULL {
            self.set_node_field(from.0, FIRST_OUT, next);
        } else {
            self.edges[prev as usize * EDGE_SIZE + NEXT_OUT] = next;
        }
        if next == NULL {
            self.set_node_field(from.0, LAST_OUT, prev);
        } else {
            self.edges[next as usize * EDGE_SIZE + PREV_OUT] = prev;
        }

        for field in [TYPE, FROM, TO, NEXT_HASH, NEXT_IN, PREV_IN, NEXT_OUT, PREV_OUT] {
            self.edges[base + field] = if field == TYPE { TOMBSTONE } else { NULL };
        }
        self.edge_count -= 1;
        self.deleted_count += 1;
        Ok(())
    }

    /// Outbound neighbours of a node, in insertion order, restricted to the
    /// given edge types. Duplicates appear once per matching edge.
    pub fn get_nodes_connected_from(
        &self,
        node: NodeId,
        filter: EdgeFilter<u32>,
    ) -> impl Iterator<Item = NodeId> + '_ {
        let mut slot = self.list_head(node, FIRST_OUT);
        std::iter::from_fn(move || {
            while slot != NULL {
                let base = slot as usize * EDGE_SIZE;
                let edge_type = self.edges[base + TYPE];
                let to = self.edges[base + TO];
                slot = self.edges[base + NEXT_OUT];
                if filter.matches(&edge_type) {
                    return Some(NodeId(to));
                }
            }
            None
        })
    }

    /// Inbound neighbours of a node, in insertion order.
    pub fn get_nodes_connected_to(
        &self,
        node: NodeId,
        filter: EdgeFilter<u32>,
    ) -> impl Iterator<Item = NodeId> + '_ {
        let mut slot = self.list_head(node, FIRST_IN);
        std::iter::from_fn(move || {
            while slot != NULL {
                let base = slot as usize * EDGE_SIZE;
                let edge_type = self.edges[base + TYPE];
                let from = self.edges[base + FROM];
                slot = self.edges[base + NEXT_IN];
                if filter.matches(&edge_type) {
                    return Some(NodeId(from));
                }
            }
            None
        })
    }

    /// Every inbound edge of a node as `(edge_type, from)` pairs.
    pub fn get_inbound_edges_by_type(
        &self,
        node: NodeId,
    ) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        let mut slot = self.list_head(node, FIRST_IN);
        std::iter::from_fn(move || {
            if slot == NULL {
                return None;
            }
            let base = slot as usize * EDGE_SIZE;
            let entry = (self.edges[base + TYPE], NodeId(self.edges[base + FROM]));
            slot = self.edges[base + NEXT_IN];
            Some(entry)
        })
    }

    /// Every outbound edge of a node as `(edge_type, to)` pairs.
    pub fn get_outbound_edges_by_type(
        &self,
        node: NodeId,
    ) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        let mut slot = self.list_head(node, FIRST_OUT);
        std::iter::from_fn(move || {
            if slot == NULL {
                return None;
            }
            let base = slot as usize * EDGE_SIZE;
            let entry = (self.edges[base + TYPE], NodeId(self.edges[base + TO]));
            slot = self.edges[base + NEXT_OUT];
            Some(entry)
        })
    }

    /// Stream all live edges in slot order.
    pub fn get_all_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.next_slot as usize).filter_map(move |slot| {
            let base = slot * EDGE_SIZE;
            let edge_type = self.edges[base + TYPE];
            if edge_type == TOMBSTONE {
                return None;
            }
            Some(Edge {
                from: NodeId(self.edges[base + FROM]),
                to: NodeId(self.edges[base + TO]),
                edge_type,
            })
        })
    }

    fn list_head(&self, node: NodeId, field: usize) -> u32 {
        if !self.has_node(node) {
            return NULL;
        }
        self.node_field(node.0, field)
    }

    fn node_field(&self, node: u32, field: usize) -> u32 {
        self.nodes[node as usize * NODE_SIZE + field]
    }

    fn set_node_field(&mut self, node: u32, field: usize, value: u32) {
        self.nodes[node as usize * NODE_SIZE + field] = value;
    }

    /// Byte-wise FNV-1a over `(from, to, type)`, masked to the table size.
    fn bucket_of(&self, from: u32, to: u32, edge_type: u32) -> usize {
        let mut hash: u32 = 0x811c_9dc5;
        let bytes = [
            from.to_le_bytes(),
            to.to_le_bytes(),
            edge_type.to_le_bytes(),
        ];
        for byte in bytes.iter().flatten() {
            hash ^= u32::from(*byte);
            hash = hash.wrapping_mul(0x0100_0193);
        }
        hash as usize & (self.hash_table.len() - 1)
    }

    fn find_edge(&self, from: NodeId, to: NodeId, edge_type: u32) -> Option<u32> {
        let mut slot = self.hash_table[self.bucket_of(from.0, to.0, edge_type)];
        while slot != NULL {
            let base = slot as usize * EDGE_SIZE;
            if self.edges[base + TYPE] == edge_type
                && self.edges[base + FROM] == from.0
                && self.edges[base + TO] == to.0
            {
                return Some(slot);
            }
            slot = self.edges[base + NEXT_HASH];
        }
        None
    }

    fn over_loaded(&self) -> bool {
        let capacity = self.edges.len() / EDGE_SIZE;
        (self.edge_count + self.deleted_count + 1) as usize * MAX_LOAD_DEN
            > capacity * MAX_LOAD_NUM
    }

    /// Rebuild edge storage. Doubles capacity unless live density is below
    /// the shrink threshold, in which case capacity is kept and tombstones
    /// are reclaimed. Either way the hash table is rebuilt at the smallest
    /// power of two holding twice the live edges, and live edges re-link in
    /// slot order so neighbour iteration order is unchanged.
    fn resize_edges(&mut self) {
        let capacity = self.edges.len() / EDGE_SIZE;
        let live = self.edge_count as usize;
        let new_capacity = if live * SHRINK_DEN < capacity * SHRINK_NUM {
            capacity
        } else {
            capacity * 2
        }
        .max(MIN_EDGE_CAPACITY);
        let table_size = (live.max(1) * 2).next_power_of_two().max(MIN_HASH_SIZE);

        let old_edges = std::mem::replace(&mut self.edges, vec![NULL; new_capacity * EDGE_SIZE]);
        let old_used = self.next_slot as usize;
        self.hash_table = vec![NULL; table_size];
        self.nodes.fill(NULL);
        self.edge_count = 0;
        self.deleted_count = 0;
        self.next_slot = 0;

        for slot in 0..old_used {
            let base = slot * EDGE_SIZE;
            if old_edges[base + TYPE] == TOMBSTONE {
                continue;
            }
            self.link_edge(
                old_edges[base + FROM],
                old_edges[base + TO],
                old_edges[base + TYPE],
            );
        }
    }

    fn link_edge(&mut self, from: u32, to: u32, edge_type: u32) {
        let slot = self.next_slot;
        self.next_slot += 1;
        let base = slot as usize * EDGE_SIZE;
        self.edges[base + TYPE] = edge_type;
        self.edges[base + FROM] = from;
        self.edges[base + TO] = to;

        // New edge becomes the bucket chain head.
        let bucket = self.bucket_of(from, to, edge_type);
        self.edges[base + NEXT_HASH] = self.hash_table[bucket];
        self.hash_table[bucket] = slot;

        // Append at the tail of `to`'s inbound list.
        let tail = self.node_field(to, LAST_IN);
        self.edges[base + PREV_IN] = tail;
        self.edges[base + NEXT_IN] = NULL;
        if tail == NULL {
            self.set_node_field(to, FIRST_IN, slot);
        } else {
            self.edges[tail as usize * EDGE_SIZE + NEXT_IN] = slot;
        }
        self.set_node_field(to, LAST_IN, slot);

        // Append at the tail of `from`'s outbound list.
        let tail = self.node_field(from, LAST_OUT);
        self.edges[base + PREV_OUT] = tail;
        self.edges[base + NEXT_OUT] = NULL;
        if tail == NULL {
            self.set_node_field(from, FIRST_OUT, slot);
        } else {
            self.edges[tail as usize * EDGE_SIZE + NEXT_OUT] = slot;
        }
        self.set_node_field(from, LAST_OUT, slot);

        self.edge_count += 1;
    }
}

impl Default for AdjacencyList {
    fn default() -> Self {
        Self::new()
    }
}
