//! Long profiles along a node sequence
//!
//! Distances come from the node `flow_distance`, which the terrain tool
//! measures upstream from the outlet; a profile walked downstream therefore
//! has decreasing distance.

use rivernet_core::node::{NodeId, NodeTable};
use rivernet_core::segment::Segment;
use rivernet_core::Result;

use crate::path::FlowPath;

/// One point of a long profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    pub node: NodeId,
    /// Flow distance in kilometers
    pub distance_km: f64,
    pub elevation: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub m_chi: Option<f64>,
}

/// Elevation profile along a sequence of nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LongProfile {
    pub points: Vec<ProfilePoint>,
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

impl LongProfile {
    /// Profile through `ids` in the given order.
    pub fn from_nodes(nodes: &NodeTable, ids: &[NodeId]) -> Result<Self> {
        let points = ids
            .iter()
            .map(|&id| {
                let n = nodes.require(id)?;
                Ok(ProfilePoint {
                    node: n.id,
                    distance_km: n.flow_distance / 1000.0,
                    elevation: n.elevation,
                    longitude: n.longitude,
                    latitude: n.latitude,
                    m_chi: n.m_chi,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { points })
    }

    pub fn for_segment(segment: &Segment, nodes: &NodeTable) -> Result<Self> {
        Self::from_nodes(nodes, &segment.nodes)
    }

    /// Profile of a whole flow path, junction nodes listed once.
    pub fn for_path(path: &FlowPath, nodes: &NodeTable) -> Result<Self> {
        Self::from_nodes(nodes, &path.node_ids())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn distance_range(&self) -> Option<(f64, f64)> {
        range(self.points.iter().map(|p| p.distance_km))
    }

    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        range(self.points.iter().map(|p| p.elevation))
    }

    pub fn longitude_range(&self) -> Option<(f64, f64)> {
        range(self.points.iter().map(|p| p.longitude))
    }

    pub fn latitude_range(&self) -> Option<(f64, f64)> {
        range(self.points.iter().map(|p| p.latitude))
    }

    /// `log10(m_chi)` per point; `None` where m_chi is missing or not positive.
    pub fn log_ksn(&self) -> Vec<Option<f64>> {
        self.points
            .iter()
            .map(|p| p.m_chi.filter(|&k| k > 0.0).map(f64::log10))
            .collect()
    }
}
