//! Channel segments
//!
//! A segment is a maximal run of nodes between two topological events
//! (channel head, confluence or mouth), ordered upstream to downstream.

use std::fmt;

use crate::node::{NodeId, NodeTable};

/// Raw value written for "no downstream segment".
pub const OUTLET_SENTINEL: i64 = -1;

/// Segment identifier, sequential within one network build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub u32);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Downstream link of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToSegment {
    Segment(SegmentId),
    /// The segment leaves the mapped network.
    Outlet,
}

impl ToSegment {
    /// Encode as the persisted integer (`-1` for the outlet).
    pub fn to_raw(self) -> i64 {
        match self {
            Self::Segment(id) => i64::from(id.0),
            Self::Outlet => OUTLET_SENTINEL,
        }
    }

    /// Decode a persisted integer. Returns `None` for values that are
    /// neither a valid id nor the sentinel.
    pub fn from_raw(raw: i64) -> Option<Self> {
        if raw == OUTLET_SENTINEL {
            return Some(Self::Outlet);
        }
        u32::try_from(raw).ok().map(|id| Self::Segment(SegmentId(id)))
    }

    pub fn is_outlet(self) -> bool {
        matches!(self, Self::Outlet)
    }
}

impl fmt::Display for ToSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_raw())
    }
}

/// Which summary statistics to compute for each segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentAttributes {
    /// Chord slope over the whole segment.
    pub slope: bool,
    /// Mean, maximum and minimum elevation.
    pub elevation: bool,
    /// Mean drainage area in km².
    pub drainage_area: bool,
    pub chi: bool,
    /// Mean m_chi.
    pub ksn: bool,
}

impl SegmentAttributes {
    pub fn all() -> Self {
        Self {
            slope: true,
            elevation: true,
            drainage_area: true,
            chi: true,
            ksn: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.slope || self.elevation || self.drainage_area || self.chi || self.ksn
    }
}

/// Per-segment summary statistics. Fields are `None` when not requested
/// or not computable (e.g. a slope over zero flow distance).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentStats {
    pub slope: Option<f64>,
    pub z_mean: Option<f64>,
    pub z_max: Option<f64>,
    pub z_min: Option<f64>,
    pub drainage_area_km2: Option<f64>,
    pub chi: Option<f64>,
    pub ksn: Option<f64>,
}

impl SegmentStats {
    /// Property names and values for the requested attributes, in output order.
    pub fn named(&self, attributes: &SegmentAttributes) -> Vec<(&'static str, Option<f64>)> {
        let mut out = Vec::new();
        if attributes.slope {
            out.push(("slope", self.slope));
        }
        if attributes.elevation {
            out.push(("z mean", self.z_mean));
            out.push(("z_max", self.z_max));
            out.push(("z_min", self.z_min));
        }
        if attributes.drainage_area {
            out.push(("drainage area (mean) [km2]", self.drainage_area_km2));
        }
        if attributes.chi {
            out.push(("chi", self.chi));
        }
        if attributes.ksn {
            out.push(("ksn", self.ksn));
        }
        out
    }
}

/// A channel segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    pub toseg: ToSegment,
    /// Member nodes ordered upstream to downstream. A segment ending at a
    /// confluence includes the confluence node, which is also the first
    /// node of the downstream segment.
    pub nodes: Vec<NodeId>,
    pub stats: SegmentStats,
}

impl Segment {
    pub fn new(id: SegmentId, toseg: ToSegment, nodes: Vec<NodeId>) -> Self {
        Self {
            id,
            toseg,
            nodes,
            stats: SegmentStats::default(),
        }
    }

    pub fn first_node(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Nodes this segment owns: all members except a terminal confluence
    /// node, which belongs to the downstream segment.
    pub fn owned_nodes(&self) -> &[NodeId] {
        match self.toseg {
            ToSegment::Segment(_) if self.nodes.len() > 1 => &self.nodes[..self.nodes.len() - 1],
            _ => &self.nodes,
        }
    }

    /// (longitude, latitude, elevation) polyline of the member nodes.
    ///
    /// Members missing from `nodes` are skipped.
    pub fn coordinates(&self, nodes: &NodeTable) -> Vec<[f64; 3]> {
        self.nodes
            .iter()
            .filter_map(|&id| nodes.get(id))
            .map(|n| [n.longitude, n.latitude, n.elevation])
            .collect()
    }
}
