//! Channel nodes and the node table arena
//!
//! A node is one sample along a flow path as written by the terrain
//! analysis tool. Nodes reference each other only through ids: the
//! `receiver` field names the single node immediately downstream.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Node identifier as written by the terrain analysis tool.
pub type NodeId = i64;

/// Identifier of an unbranched headwater-to-junction reach.
pub type SourceKey = i64;

/// One sample point along a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Downstream neighbour. `None` when the tool wrote no receiver.
    pub receiver: Option<NodeId>,
    pub source_key: SourceKey,
    pub longitude: f64,
    pub latitude: f64,
    pub elevation: f64,
    /// Cumulative distance along the flow path, in meters.
    pub flow_distance: f64,
    /// Upstream drainage area, in square meters.
    pub drainage_area: f64,
    pub chi: Option<f64>,
    /// Normalized channel steepness (k_sn proxy).
    pub m_chi: Option<f64>,
    pub basin_key: Option<i64>,
    /// Values of columns not interpreted by rivernet, aligned with
    /// [`NodeTable::extra_columns`].
    pub extra: Vec<String>,
}

impl Node {
    /// Create a node with the required fields and no optional data.
    pub fn new(id: NodeId, receiver: Option<NodeId>, source_key: SourceKey) -> Self {
        Self {
            id,
            receiver,
            source_key,
            longitude: 0.0,
            latitude: 0.0,
            elevation: 0.0,
            flow_distance: 0.0,
            drainage_area: 0.0,
            chi: None,
            m_chi: None,
            basin_key: None,
            extra: Vec::new(),
        }
    }

    /// Receiver id, unless the node routes to itself or to nothing.
    pub fn downstream(&self) -> Option<NodeId> {
        self.receiver.filter(|&r| r != self.id)
    }
}

/// Role of a node in the assembled network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ChannelHead,
    Confluence,
    Mouth,
    Channel,
}

impl NodeKind {
    /// Label used in the node export.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChannelHead => "channel_head",
            Self::Confluence => "confluence",
            Self::Mouth => "mouth",
            Self::Channel => "",
        }
    }
}

/// Which optional columns were present in the source table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalColumns {
    pub chi: bool,
    pub m_chi: bool,
    pub basin_key: bool,
}

/// Arena of nodes keyed by id, preserving input order.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    columns: OptionalColumns,
    extra_columns: Vec<String>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table that will hold the given optional and extra columns.
    pub fn with_columns(columns: OptionalColumns, extra_columns: Vec<String>) -> Self {
        Self {
            columns,
            extra_columns,
            ..Self::default()
        }
    }

    /// Build a table from nodes, failing on duplicate ids.
    ///
    /// Optional columns are marked present when any node carries a value.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self> {
        let mut table = Self::new();
        for node in nodes {
            table.columns.chi |= node.chi.is_some();
            table.columns.m_chi |= node.m_chi.is_some();
            table.columns.basin_key |= node.basin_key.is_some();
            table.push(node)?;
        }
        Ok(table)
    }

    /// Append a node. Duplicate ids are a schema error.
    pub fn push(&mut self, node: Node) -> Result<()> {
        if self.index.contains_key(&node.id) {
            return Err(Error::Schema(format!("duplicate node id {}", node.id)));
        }
        self.index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Append a node unless one with the same id is already present.
    ///
    /// Returns `true` if the node was inserted.
    pub fn push_or_keep(&mut self, node: Node) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        self.index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up a node that must exist.
    pub fn require(&self, id: NodeId) -> Result<&Node> {
        self.get(id)
            .ok_or_else(|| Error::Schema(format!("node {} is not in the table", id)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn columns(&self) -> OptionalColumns {
        self.columns
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Copy of the table restricted to nodes of one basin.
    ///
    /// Receivers outside the basin are left untouched; they simply no
    /// longer resolve, which turns their upstream neighbours into mouths.
    pub fn filter_basin(&self, basin_key: i64) -> Self {
        let mut filtered = Self::with_columns(self.columns, self.extra_columns.clone());
        for node in self.nodes.iter().filter(|n| n.basin_key == Some(basin_key)) {
            filtered.push_or_keep(node.clone());
        }
        filtered
    }
}

impl<'a> IntoIterator for &'a NodeTable {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: NodeId, receiver: NodeId, key: SourceKey, basin: i64) -> Node {
        let mut n = Node::new(id, Some(receiver), key);
        n.basin_key = Some(basin);
        n
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = NodeTable::from_nodes(vec![node(1, 2, 0, 0), node(1, 3, 0, 0)]);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_self_receiver_has_no_downstream() {
        let n = Node::new(4, Some(4), 0);
        assert_eq!(n.downstream(), None);
        assert_eq!(Node::new(4, Some(5), 0).downstream(), Some(5));
    }

    #[test]
    fn test_filter_basin_keeps_order_and_source() {
        let table = NodeTable::from_nodes(vec![
            node(1, 2, 0, 7),
            node(2, 3, 0, 8),
            node(3, 3, 0, 7),
        ])
        .unwrap();

        let filtered = table.filter_basin(7);
        let ids: Vec<NodeId> = filtered.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(filtered.columns().basin_key);
        // The caller's table is unchanged.
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_require_missing_node() {
        let table = NodeTable::new();
        assert!(table.require(9).is_err());
    }
}
