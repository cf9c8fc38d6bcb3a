//! # rivernet Algorithms
//!
//! Drainage network analysis on channel node tables.
//!
//! ## Available Algorithms
//!
//! - **network**: Channel heads, confluences and mouths; segment tracing and linkage
//! - **stats**: Chord slope, elevation, drainage area, chi and ksn per segment
//! - **path**: Flow path from a segment down to the outlet
//! - **profile**: Long profiles along segments and paths

pub(crate) mod maybe_rayon;
pub mod network;
pub mod path;
pub mod profile;
pub mod stats;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::network::{build_network, Network, NetworkBuilder, NetworkParams, Topology};
    pub use crate::path::{extract_path, FlowPath, PathExtractor, PathParams};
    pub use crate::profile::{LongProfile, ProfilePoint};
    pub use crate::stats::{compute_stats, summarize};
    pub use rivernet_core::prelude::*;
}
