//! Topological events of a node table
//!
//! Classifies nodes into channel heads, confluences and mouths from the
//! receiver pointers and source keys alone.

use std::collections::{HashMap, HashSet};

use rivernet_core::node::{NodeId, NodeKind, NodeTable, SourceKey};
use rivernet_core::{Error, Result};
use tracing::debug;

/// Channel heads, confluences and mouths of one node table.
///
/// All lists are in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    /// Most upstream node of each reach.
    pub channel_heads: Vec<NodeId>,
    /// First node of a downstream reach that receives another reach.
    pub confluences: Vec<NodeId>,
    /// Nodes whose receiver is off the mapped area.
    pub mouths: Vec<NodeId>,
    /// Receiver ids that do not resolve to a node of the table.
    pub offmap_receivers: HashSet<NodeId>,
}

impl Topology {
    /// Analyze a node table.
    ///
    /// # Errors
    /// - [`Error::Branching`] if a node has more than one upstream
    ///   neighbour with its own source key.
    /// - [`Error::CycleDetected`] if a reach has no channel head.
    pub fn analyze(nodes: &NodeTable) -> Result<Self> {
        // Source key of each node's receiver; None marks a mouth.
        let mut receiver_keys: Vec<Option<SourceKey>> = Vec::with_capacity(nodes.len());
        let mut offmap_receivers = HashSet::new();

        for node in nodes {
            match node.downstream().and_then(|r| nodes.get(r)) {
                Some(receiver) => receiver_keys.push(Some(receiver.source_key)),
                None => {
                    debug!(
                        "Found mouth node {}. Off-map receiver node ID: {:?}",
                        node.id, node.receiver
                    );
                    if let Some(r) = node.receiver.filter(|&r| !nodes.contains(r)) {
                        offmap_receivers.insert(r);
                    }
                    receiver_keys.push(None);
                }
            }
        }

        let mouths: Vec<NodeId> = nodes
            .iter()
            .zip(&receiver_keys)
            .filter(|(_, key)| key.is_none())
            .map(|(n, _)| n.id)
            .collect();

        let mut confluences = Vec::new();
        let mut seen = HashSet::new();
        // Number of same-reach upstream neighbours per node.
        let mut same_key_upstream: HashMap<NodeId, usize> = HashMap::new();

        for (node, key) in nodes.iter().zip(&receiver_keys) {
            let (Some(key), Some(receiver)) = (key, node.receiver) else {
                continue;
            };
            if *key == node.source_key {
                let count = same_key_upstream.entry(receiver).or_insert(0);
                *count += 1;
                if *count > 1 {
                    return Err(Error::Branching {
                        node: receiver,
                        count: *count,
                        claimants: "upstream nodes of the same reach",
                    });
                }
            } else if !offmap_receivers.contains(&receiver) && seen.insert(receiver) {
                confluences.push(receiver);
            }
        }

        let channel_heads: Vec<NodeId> = nodes
            .iter()
            .filter(|n| !same_key_upstream.contains_key(&n.id))
            .map(|n| n.id)
            .collect();

        let keys_with_head: HashSet<SourceKey> = channel_heads
            .iter()
            .filter_map(|&id| nodes.get(id))
            .map(|n| n.source_key)
            .collect();
        if let Some(node) = nodes.iter().find(|n| !keys_with_head.contains(&n.source_key)) {
            return Err(Error::CycleDetected(format!(
                "reach {} has no channel head (node {} flows in a loop)",
                node.source_key, node.id
            )));
        }

        Ok(Self {
            channel_heads,
            confluences,
            mouths,
            offmap_receivers,
        })
    }

    /// Nodes that start a segment: channel heads, then confluences not
    /// already listed.
    pub fn segment_sources(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        self.channel_heads
            .iter()
            .chain(&self.confluences)
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Nodes that end a segment: confluences and mouths.
    pub fn segment_terminations(&self) -> HashSet<NodeId> {
        self.confluences.iter().chain(&self.mouths).copied().collect()
    }

    pub fn mouth_set(&self) -> HashSet<NodeId> {
        self.mouths.iter().copied().collect()
    }

    /// Role of every special node. Mouth wins over confluence, which wins
    /// over channel head.
    pub fn node_kinds(&self) -> HashMap<NodeId, NodeKind> {
        let mut kinds = HashMap::new();
        for &id in &self.channel_heads {
            kinds.insert(id, NodeKind::ChannelHead);
        }
        for &id in &self.confluences {
            kinds.insert(id, NodeKind::Confluence);
        }
        for &id in &self.mouths {
            kinds.insert(id, NodeKind::Mouth);
        }
        kinds
    }
}
