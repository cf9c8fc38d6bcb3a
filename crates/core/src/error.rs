//! Error types for rivernet

use thiserror::Error;

use crate::node::NodeId;
use crate::segment::SegmentId;

/// Main error type for rivernet operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A required column is missing or a value has the wrong kind.
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("No segment with id {0}")]
    SegmentNotFound(SegmentId),

    /// The single-receiver assumption does not hold at `node`.
    #[error("Network is branching at node {node}: claimed by {count} {claimants}")]
    Branching {
        node: NodeId,
        count: usize,
        claimants: &'static str,
    },

    #[error("Segment {from} flows to segment {to}, which does not exist")]
    DanglingReference { from: SegmentId, to: SegmentId },

    #[error("Cycle detected: {0}")]
    CycleDetected(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

/// Result type alias for rivernet operations
pub type Result<T> = std::result::Result<T, Error>;
