//! # rivernet Core
//!
//! Core types, configuration and I/O for rivernet drainage networks.
//!
//! This crate provides:
//! - `Node` / `NodeTable`: channel samples stored in an id-keyed arena
//! - `Segment`: an unbranched reach with its downstream link
//! - `NodeSchema`: configurable column names for node tables
//! - Vector features and CSV / GeoJSON I/O
//! - Algorithm trait for a consistent API

pub mod error;
pub mod io;
pub mod node;
pub mod schema;
pub mod segment;
pub mod vector;

pub use error::{Error, Result};
pub use node::{Node, NodeId, NodeKind, NodeTable, SourceKey};
pub use schema::NodeSchema;
pub use segment::{Segment, SegmentAttributes, SegmentId, SegmentStats, ToSegment, OUTLET_SENTINEL};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::node::{Node, NodeId, NodeKind, NodeTable};
    pub use crate::schema::NodeSchema;
    pub use crate::segment::{Segment, SegmentAttributes, SegmentId, ToSegment};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in rivernet.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
