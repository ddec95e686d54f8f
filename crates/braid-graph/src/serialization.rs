//! Binary graph snapshots.
//!
//! Snapshots are self-contained: the packed adjacency arrays, the hash
//! table, the node payload map, and the root id all travel together, so a
//! restore is a memcpy-equivalent that recomputes nothing. The format
//! starts with a version number and readers reject snapshots from other
//! versions.

use std::marker::PhantomData;

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::adjacency::{AdjacencyList, NodeId};
use crate::graph::{EdgeKind, Graph};
use crate::{Error, Result};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SerializedGraphRef<'a, N> {
    version: u32,
    nodes: &'a FxHashMap<NodeId, N>,
    adjacency_list: &'a AdjacencyList,
    root_node_id: Option<NodeId>,
    next_node_id: u32,
}

#[derive(Deserialize)]
#[serde(bound = "N: DeserializeOwned")]
struct SerializedGraph<N> {
    version: u32,
    nodes: FxHashMap<NodeId, N>,
    adjacency_list: AdjacencyList,
    root_node_id: Option<NodeId>,
    #[allow(dead_code)]
    next_node_id: u32,
}

impl<N, E: EdgeKind> Graph<N, E> {
    /// Serialize the graph to its binary snapshot format.
    pub fn to_bytes(&self) -> Result<Vec<u8>>
    where
        N: Serialize,
    {
        let serialized = SerializedGraphRef {
            version: FORMAT_VERSION,
            nodes: &self.nodes,
            adjacency_list: &self.adjacency,
            root_node_id: self.root_node_id,
            next_node_id: self.adjacency.node_count() as u32,
        };

        bincode::serde::encode_to_vec(&serialized, bincode::config::standard())
            .map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Restore a graph from a binary snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self>
    where
        N: DeserializeOwned,
    {
        let (serialized, _): (SerializedGraph<N>, _) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| Error::Deserialize(e.to_string()))?;

        if serialized.version != FORMAT_VERSION {
            return Err(Error::FormatVersion {
                expected: FORMAT_VERSION,
                actual: serialized.version,
            });
        }

        Ok(Graph {
            nodes: serialized.nodes,
            adjacency: serialized.adjacency_list,
            root_node_id: serialized.root_node_id,
            _edge_kind: PhantomData,
        })
    }
}
