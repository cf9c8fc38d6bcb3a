//! Flow path extraction
//!
//! Walks the `toseg` links from a chosen segment down to the network
//! outlet. Segment ids are treated as opaque keys, so the segment
//! collection may come straight from a build or from a reloaded export.

use std::collections::HashMap;

use rivernet_core::node::NodeId;
use rivernet_core::segment::{Segment, SegmentId, ToSegment};
use rivernet_core::{Algorithm, Error, Result};
use tracing::debug;

/// Parameters for path extraction
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    /// Upstream-most segment of the path
    pub start: SegmentId,
}

/// Flow path extraction algorithm
#[derive(Debug, Clone, Default)]
pub struct PathExtractor;

impl Algorithm for PathExtractor {
    type Input = Vec<Segment>;
    type Output = FlowPath;
    type Params = PathParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Path Extractor"
    }

    fn description(&self) -> &'static str {
        "Follow segment links from a start segment to the network outlet"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        extract_path(&input, params.start)
    }
}

/// Ordered segments from a start segment to the outlet-adjacent segment.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPath {
    start: SegmentId,
    segments: Vec<Segment>,
}

impl FlowPath {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn ids(&self) -> Vec<SegmentId> {
        self.segments.iter().map(|s| s.id).collect()
    }

    pub fn start(&self) -> SegmentId {
        self.start
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Member nodes of the whole path, upstream to downstream.
    ///
    /// The junction node shared by consecutive segments is listed once.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = Vec::new();
        for segment in &self.segments {
            let skip = match (ids.last(), segment.first_node()) {
                (Some(last), Some(first)) if *last == first => 1,
                _ => 0,
            };
            ids.extend(segment.nodes.iter().skip(skip).copied());
        }
        ids
    }
}

/// Index segments by id, rejecting duplicates.
fn index_segments(segments: &[Segment]) -> Result<HashMap<SegmentId, &Segment>> {
    let mut index = HashMap::with_capacity(segments.len());
    for segment in segments {
        if index.insert(segment.id, segment).is_some() {
            return Err(Error::Schema(format!("duplicate segment id {}", segment.id)));
        }
    }
    Ok(index)
}

/// Extract the flow path starting at `start`.
///
/// # Errors
/// - [`Error::SegmentNotFound`] if `start` is not in `segments`.
/// - [`Error::DanglingReference`] if a `toseg` names a missing segment.
/// - [`Error::CycleDetected`] if the walk takes more hops than there are
///   segments.
/// - [`Error::Schema`] if two segments share an id.
pub fn extract_path(segments: &[Segment], start: SegmentId) -> Result<FlowPath> {
    let index = index_segments(segments)?;
    let first = index.get(&start).ok_or(Error::SegmentNotFound(start))?;

    let mut path = vec![(*first).clone()];
    let mut current = *first;
    while let ToSegment::Segment(to) = current.toseg {
        let next = index.get(&to).ok_or(Error::DanglingReference {
            from: current.id,
            to,
        })?;
        if path.len() >= segments.len() {
            return Err(Error::CycleDetected(format!(
                "path from segment {} exceeds {} segments",
                start,
                segments.len()
            )));
        }
        path.push((*next).clone());
        current = *next;
    }

    debug!("Path from segment {} spans {} segments", start, path.len());
    Ok(FlowPath {
        start,
        segments: path,
    })
}
