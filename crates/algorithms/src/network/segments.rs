//! Segment tracing and downstream linkage

use std::collections::{HashMap, HashSet};

use rivernet_core::node::{NodeId, NodeTable};
use rivernet_core::segment::{Segment, SegmentId, ToSegment};
use rivernet_core::{Error, Result};
use tracing::warn;

use super::topology::Topology;

/// Follow receivers from `source` to the first termination node, inclusive.
///
/// A source whose receiver is off the map yields a single-node chain.
fn walk(nodes: &NodeTable, source: NodeId, terminations: &HashSet<NodeId>) -> Result<Vec<NodeId>> {
    let mut chain = vec![source];
    let mut current = nodes.require(source)?;

    loop {
        let next = match current.downstream() {
            Some(next) if nodes.contains(next) => next,
            _ => break,
        };
        chain.push(next);
        if terminations.contains(&next) {
            break;
        }
        if chain.len() > nodes.len() {
            return Err(Error::CycleDetected(format!(
                "walk from node {} revisits nodes without reaching a confluence or mouth",
                source
            )));
        }
        current = nodes.require(next)?;
    }

    Ok(chain)
}

/// Node chains of every segment, in source order.
pub fn trace_segments(nodes: &NodeTable, topology: &Topology) -> Result<Vec<Vec<NodeId>>> {
    let terminations = topology.segment_terminations();
    topology
        .segment_sources()
        .into_iter()
        .map(|source| walk(nodes, source, &terminations))
        .collect()
}

fn segment_id(index: usize) -> Result<SegmentId> {
    u32::try_from(index).map(SegmentId).map_err(|_| Error::InvalidParameter {
        name: "segments",
        value: index.to_string(),
        reason: "too many segments for 32-bit ids".into(),
    })
}

/// Assign sequential ids to node chains and resolve each chain's `toseg`.
///
/// A chain flows into the chain that starts at its last node. A last node
/// that starts no chain is an outlet; if it is not a known mouth this is
/// logged, since the builder never produces such a chain.
///
/// # Errors
/// [`Error::Branching`] when the last node starts more than one other chain.
pub fn link_segments(chains: Vec<Vec<NodeId>>, mouths: &HashSet<NodeId>) -> Result<Vec<Segment>> {
    let mut starts: HashMap<NodeId, Vec<SegmentId>> = HashMap::new();
    for (i, chain) in chains.iter().enumerate() {
        if let Some(&first) = chain.first() {
            starts.entry(first).or_default().push(segment_id(i)?);
        }
    }

    let mut segments = Vec::with_capacity(chains.len());
    for (i, chain) in chains.into_iter().enumerate() {
        let id = segment_id(i)?;
        let Some(&last) = chain.last() else {
            return Err(Error::Schema(format!("segment {} has no nodes", id)));
        };

        let candidates: Vec<SegmentId> = starts
            .get(&last)
            .map(|ids| ids.iter().copied().filter(|&s| s != id).collect())
            .unwrap_or_default();

        let toseg = match candidates.as_slice() {
            [] => {
                if !mouths.contains(&last) {
                    warn!(
                        "Segment {} ends at node {}, which is neither a mouth nor a segment source; treating it as a mouth",
                        id, last
                    );
                }
                ToSegment::Outlet
            }
            [next] => ToSegment::Segment(*next),
            many => {
                return Err(Error::Branching {
                    node: last,
                    count: many.len(),
                    claimants: "downstream segments",
                })
            }
        };
        segments.push(Segment::new(id, toseg, chain));
    }

    Ok(segments)
}

/// Check that following `toseg` from every segment reaches the outlet.
pub fn verify_acyclic(segments: &[Segment]) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        Active,
        Done,
    }

    let index: HashMap<SegmentId, usize> = segments.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
    let mut marks = vec![Mark::Unvisited; segments.len()];

    for start in 0..segments.len() {
        let mut trail = Vec::new();
        let mut current = start;
        loop {
            match marks[current] {
                Mark::Done => break,
                Mark::Active => {
                    return Err(Error::CycleDetected(format!(
                        "segment {} flows back into itself",
                        segments[current].id
                    )))
                }
                Mark::Unvisited => {}
            }
            marks[current] = Mark::Active;
            trail.push(current);
            match segments[current].toseg {
                ToSegment::Outlet => break,
                ToSegment::Segment(to) => match index.get(&to) {
                    Some(&next) => current = next,
                    None => {
                        return Err(Error::DanglingReference {
                            from: segments[current].id,
                            to,
                        })
                    }
                },
            }
        }
        for i in trail {
            marks[i] = Mark::Done;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_confluence() {
        let chains = vec![vec![1, 2, 5], vec![3, 4, 5], vec![5, 6]];
        let segments = link_segments(chains, &HashSet::from([6])).unwrap();

        assert_eq!(segments[0].toseg, ToSegment::Segment(SegmentId(2)));
        assert_eq!(segments[1].toseg, ToSegment::Segment(SegmentId(2)));
        assert_eq!(segments[2].toseg, ToSegment::Outlet);
        verify_acyclic(&segments).unwrap();
    }

    #[test]
    fn test_target_claimed_twice_is_branching() {
        // Corrupt chains: two downstream segments both start at confluence 5,
        // so the three segments ending there cannot be linked unambiguously.
        let chains = vec![vec![1, 5], vec![3, 5], vec![5, 6], vec![5, 7]];
        let err = link_segments(chains, &HashSet::from([6, 7])).unwrap_err();
        assert!(matches!(
            err,
            Error::Branching { node: 5, count: 2, claimants: "downstream segments" }
        ));
    }

    #[test]
    fn test_single_node_segment_does_not_link_to_itself() {
        let chains = vec![vec![1, 2], vec![2]];
        let segments = link_segments(chains, &HashSet::from([2])).unwrap();
        assert_eq!(segments[0].toseg, ToSegment::Segment(SegmentId(1)));
        assert_eq!(segments[1].toseg, ToSegment::Outlet);
    }

    #[test]
    fn test_unknown_terminus_falls_back_to_outlet() {
        let segments = link_segments(vec![vec![1, 2]], &HashSet::new()).unwrap();
        assert_eq!(segments[0].toseg, ToSegment::Outlet);
    }

    #[test]
    fn test_verify_acyclic_detects_loop() {
        let segments = vec![
            Segment::new(SegmentId(0), ToSegment::Segment(SegmentId(1)), vec![1, 2]),
            Segment::new(SegmentId(1), ToSegment::Segment(SegmentId(0)), vec![2, 1]),
        ];
        assert!(matches!(verify_acyclic(&segments), Err(Error::CycleDetected(_))));
    }

    #[test]
    fn test_verify_acyclic_detects_dangling() {
        let segments = vec![Segment::new(SegmentId(0), ToSegment::Segment(SegmentId(9)), vec![1])];
        assert!(matches!(
            verify_acyclic(&segments),
            Err(Error::DanglingReference { to: SegmentId(9), .. })
        ));
    }
}
