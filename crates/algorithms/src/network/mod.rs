//! Channel network construction
//!
//! Builds segments from a node table:
//! - Topology: channel heads, confluences and mouths from receivers and source keys
//! - Segments: node chains between those events, linked through `toseg`
//! - Statistics: optional per-segment summaries

pub mod segments;
pub mod topology;

use std::collections::HashMap;

use rivernet_core::node::{NodeId, NodeKind, NodeTable};
use rivernet_core::segment::{Segment, SegmentAttributes, SegmentId};
use rivernet_core::vector::{Feature, FeatureCollection};
use rivernet_core::{Algorithm, Error, Result};
use tracing::{debug, info, warn};

use crate::stats::{check_columns, compute_stats};

pub use segments::{link_segments, trace_segments, verify_acyclic};
pub use topology::Topology;

/// Parameters for network construction
#[derive(Debug, Clone, Default)]
pub struct NetworkParams {
    /// Keep only nodes of this basin before building.
    pub basin_key: Option<i64>,
    /// Statistics to compute for each segment.
    pub attributes: SegmentAttributes,
}

/// A built channel network.
#[derive(Debug, Clone)]
pub struct Network {
    /// Nodes the network was built from, after basin filtering.
    pub nodes: NodeTable,
    /// Segments in id order.
    pub segments: Vec<Segment>,
    pub topology: Topology,
    pub attributes: SegmentAttributes,
}

impl Network {
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        // Builds assign ids by position.
        self.segments
            .get(id.0 as usize)
            .filter(|s| s.id == id)
            .or_else(|| self.segments.iter().find(|s| s.id == id))
    }

    pub fn node_kinds(&self) -> HashMap<NodeId, NodeKind> {
        self.topology.node_kinds()
    }

    /// One LineString feature per segment with id, toseg and the requested statistics.
    pub fn to_features(&self) -> FeatureCollection {
        self.segments
            .iter()
            .map(|s| Feature::from_segment(s, &self.nodes, &self.attributes))
            .collect()
    }

    /// Segment features carrying only the identifiers used for path selection.
    pub fn selection_features(&self) -> FeatureCollection {
        self.segments
            .iter()
            .map(|s| Feature::selection_from_segment(s, &self.nodes))
            .collect()
    }
}

/// Network construction algorithm
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder;

impl Algorithm for NetworkBuilder {
    type Input = NodeTable;
    type Output = Network;
    type Params = NetworkParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Network Builder"
    }

    fn description(&self) -> &'static str {
        "Split a channel node table into linked segments"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        build_network(&input, &params)
    }
}

/// Build the segment network of a node table.
///
/// The input table is not modified; basin filtering works on a copy.
///
/// # Errors
/// - [`Error::Schema`] if a requested statistic or the basin filter needs a
///   column the table lacks.
/// - [`Error::Branching`] / [`Error::CycleDetected`] for malformed topology.
pub fn build_network(nodes: &NodeTable, params: &NetworkParams) -> Result<Network> {
    check_columns(nodes, &params.attributes)?;

    let nodes = match params.basin_key {
        Some(key) => {
            if !nodes.columns().basin_key {
                return Err(Error::Schema(format!(
                    "basin {} requested but the table has no basin_key column",
                    key
                )));
            }
            let filtered = nodes.filter_basin(key);
            info!("Basin {}: kept {} of {} nodes", key, filtered.len(), nodes.len());
            filtered
        }
        None => nodes.clone(),
    };

    if nodes.is_empty() {
        warn!("No nodes to build a network from");
        return Ok(Network {
            nodes,
            segments: Vec::new(),
            topology: Topology::default(),
            attributes: params.attributes,
        });
    }

    let topology = Topology::analyze(&nodes)?;
    info!(
        "Found {} channel heads, {} confluences, {} mouths",
        topology.channel_heads.len(),
        topology.confluences.len(),
        topology.mouths.len()
    );

    let chains = trace_segments(&nodes, &topology)?;
    let mut segments = link_segments(chains, &topology.mouth_set())?;
    verify_acyclic(&segments)?;
    debug!("Linked {} segments", segments.len());

    compute_stats(&mut segments, &nodes, &params.attributes)?;
    info!("Built {} segments from {} nodes", segments.len(), nodes.len());

    Ok(Network {
        nodes,
        segments,
        topology,
        attributes: params.attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivernet_core::segment::ToSegment;
    use rivernet_core::vector::AttributeValue;
    use rivernet_core::Node;

    fn table(rows: &[(NodeId, Option<NodeId>, i64)]) -> NodeTable {
        NodeTable::from_nodes(rows.iter().map(|&(id, r, k)| {
            let mut n = Node::new(id, r, k);
            n.elevation = 100.0 - id as f64;
            n.flow_distance = 1000.0 - 100.0 * id as f64;
            n.drainage_area = 1e6 * id as f64;
            n
        }))
        .unwrap()
    }

    fn y_junction() -> NodeTable {
        table(&[
            (1, Some(2), 0),
            (2, Some(5), 0),
            (3, Some(4), 1),
            (4, Some(5), 1),
            (5, Some(6), 0),
            (6, Some(99), 0),
        ])
    }

    #[test]
    fn test_straight_chain_is_one_segment() {
        let nodes = table(&[(1, Some(2), 0), (2, Some(3), 0), (3, None, 0)]);
        let network = build_network(&nodes, &NetworkParams::default()).unwrap();

        assert_eq!(network.segments.len(), 1);
        assert_eq!(network.segments[0].toseg, ToSegment::Outlet);
        assert_eq!(network.segments[0].nodes, vec![1, 2, 3]);
    }

    #[test]
    fn test_two_heads_join_downstream_segment() {
        let network = build_network(&y_junction(), &NetworkParams::default()).unwrap();

        assert_eq!(network.segments.len(), 3);
        let downstream = network
            .segments
            .iter()
            .find(|s| s.first_node() == Some(5))
            .unwrap();
        assert_eq!(downstream.toseg, ToSegment::Outlet);
        for s in network.segments.iter().filter(|s| s.id != downstream.id) {
            assert_eq!(s.toseg, ToSegment::Segment(downstream.id));
            assert_eq!(s.last_node(), Some(5));
        }
    }

    fn owner_counts(network: &Network) -> HashMap<NodeId, usize> {
        let mut owners = HashMap::new();
        for segment in &network.segments {
            for &id in segment.owned_nodes() {
                *owners.entry(id).or_insert(0) += 1;
            }
        }
        owners
    }

    #[test]
    fn test_tributary_joining_mouth() {
        // 1 -> (off map), 2 -> 1
        let nodes = table(&[(1, Some(99), 0), (2, Some(1), 1)]);
        let network = build_network(&nodes, &NetworkParams::default()).unwrap();

        assert_eq!(network.segments.len(), 2);
        let mouth = network.segments.iter().find(|s| s.nodes == vec![1]).unwrap();
        let tributary = network.segments.iter().find(|s| s.nodes == vec![2, 1]).unwrap();
        assert_eq!(mouth.toseg, ToSegment::Outlet);
        assert_eq!(tributary.toseg, ToSegment::Segment(mouth.id));
        assert!(owner_counts(&network).values().all(|&count| count == 1));
    }

    #[test]
    fn test_self_receiving_outlet_is_owned_once() {
        // 5 -> 6 -> 6, 3 -> 4 -> 6
        let nodes = table(&[
            (5, Some(6), 0),
            (6, Some(6), 0),
            (3, Some(4), 1),
            (4, Some(6), 1),
        ]);
        let network = build_network(&nodes, &NetworkParams::default()).unwrap();

        assert_eq!(network.segments.len(), 3);
        let outlet = network.segments.iter().find(|s| s.nodes == vec![6]).unwrap();
        assert_eq!(outlet.toseg, ToSegment::Outlet);
        for s in network.segments.iter().filter(|s| s.id != outlet.id) {
            assert_eq!(s.toseg, ToSegment::Segment(outlet.id));
        }
        let owners = owner_counts(&network);
        assert_eq!(owners.len(), 4);
        assert_eq!(owners[&6], 1);
        assert!(owners.values().all(|&count| count == 1));
    }

    #[test]
    fn test_basin_filter_turns_confluence_into_outlet() {
        let mut nodes = Vec::new();
        for n in &y_junction() {
            let mut n = n.clone();
            n.basin_key = Some(if n.id <= 4 { 1 } else { 2 });
            nodes.push(n);
        }
        let nodes = NodeTable::from_nodes(nodes).unwrap();
        let params = NetworkParams {
            basin_key: Some(1),
            ..NetworkParams::default()
        };
        let network = build_network(&nodes, &params).unwrap();

        assert_eq!(network.segments.len(), 2);
        assert!(network.segments.iter().all(|s| s.toseg == ToSegment::Outlet));
        assert_eq!(network.topology.mouths, vec![2, 4]);
        // The caller's table still holds every node.
        assert_eq!(nodes.len(), 6);
    }

    #[test]
    fn test_basin_filter_needs_column() {
        let params = NetworkParams {
            basin_key: Some(1),
            ..NetworkParams::default()
        };
        assert!(matches!(build_network(&y_junction(), &params), Err(Error::Schema(_))));
    }

    #[test]
    fn test_empty_table_gives_empty_network() {
        let network = build_network(&NodeTable::new(), &NetworkParams::default()).unwrap();
        assert!(network.segments.is_empty());
        assert!(network.to_features().is_empty());
    }

    #[test]
    fn test_features_carry_requested_stats() {
        let params = NetworkParams {
            attributes: SegmentAttributes {
                slope: true,
                ..SegmentAttributes::none()
            },
            ..NetworkParams::default()
        };
        let network = NetworkBuilder.execute(y_junction(), params).unwrap();
        let features = network.to_features();

        assert_eq!(features.len(), 3);
        for f in features.iter() {
            assert!(matches!(f.get_property("slope"), Some(AttributeValue::Float(_))));
            assert!(f.get_property("z mean").is_none());
        }
        let selection = network.selection_features();
        assert!(selection.iter().all(|f| f.get_property("segment_ID").is_some()));
    }

    #[test]
    fn test_segment_lookup() {
        let network = build_network(&y_junction(), &NetworkParams::default()).unwrap();
        assert_eq!(network.segment(SegmentId(2)).map(|s| s.id), Some(SegmentId(2)));
        assert!(network.segment(SegmentId(7)).is_none());
        assert_eq!(network.node_kinds()[&5], NodeKind::Confluence);
    }
}
