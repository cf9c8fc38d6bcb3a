//! Per-segment summary statistics
//!
//! Slope is the chord slope over the whole segment: total elevation drop
//! divided by the flow-distance run between its extreme nodes. It is not a
//! regression fit.

use rivernet_core::node::{Node, NodeTable};
use rivernet_core::segment::{Segment, SegmentAttributes, SegmentStats};
use rivernet_core::{Error, Result};

use crate::maybe_rayon::*;

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Summarize the member nodes of one segment.
pub fn summarize(members: &[&Node], attributes: &SegmentAttributes) -> SegmentStats {
    let mut stats = SegmentStats::default();
    let elevation = min_max(members.iter().map(|n| n.elevation));

    if attributes.slope {
        let run = min_max(members.iter().map(|n| n.flow_distance));
        stats.slope = match (elevation, run) {
            (Some((z_min, z_max)), Some((d_min, d_max))) if d_max > d_min => {
                Some((z_max - z_min) / (d_max - d_min))
            }
            _ => None,
        };
    }

    if attributes.elevation {
        stats.z_mean = mean(members.iter().map(|n| n.elevation));
        stats.z_min = elevation.map(|(lo, _)| lo);
        stats.z_max = elevation.map(|(_, hi)| hi);
    }

    if attributes.drainage_area {
        stats.drainage_area_km2 = mean(members.iter().map(|n| n.drainage_area)).map(|a| a / 1e6);
    }

    if attributes.chi {
        stats.chi = mean(members.iter().filter_map(|n| n.chi));
    }

    if attributes.ksn {
        stats.ksn = mean(members.iter().filter_map(|n| n.m_chi));
    }

    stats
}

/// Fail early when a requested attribute needs a column the table lacks.
pub fn check_columns(nodes: &NodeTable, attributes: &SegmentAttributes) -> Result<()> {
    let cols = nodes.columns();
    if attributes.chi && !cols.chi {
        return Err(Error::Schema("chi statistics requested but the table has no chi column".into()));
    }
    if attributes.ksn && !cols.m_chi {
        return Err(Error::Schema("ksn statistics requested but the table has no m_chi column".into()));
    }
    Ok(())
}

/// Fill in `stats` for every segment.
pub fn compute_stats(segments: &mut [Segment], nodes: &NodeTable, attributes: &SegmentAttributes) -> Result<()> {
    if !attributes.any() {
        return Ok(());
    }
    segments.par_iter_mut().try_for_each(|segment| -> Result<()> {
        let members = segment
            .nodes
            .iter()
            .map(|&id| nodes.require(id))
            .collect::<Result<Vec<_>>>()?;
        segment.stats = summarize(&members, attributes);
        Ok(())
    })
}
