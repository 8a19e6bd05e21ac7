//! Error taxonomy for the blending core.
//!
//! None of these escape a blend operation: the orchestrator logs them and
//! degrades to "nothing blended" or "channel excluded". Validation helpers
//! (run construction, partitioning, config parsing) return them directly.

use thiserror::Error;

use crate::ids::ChannelId;

#[derive(Debug, Error)]
pub enum TweenError {
    #[error("curve host is no longer available")]
    UnavailableHost,
    #[error("curve host is already borrowed")]
    HostBusy,
    #[error("zero-width time span between boundary keys ({span})")]
    DegenerateGeometry { span: f64 },
    #[error("channel {channel:?} cannot produce a buffered snapshot")]
    UnsupportedSnapshot { channel: ChannelId },
    #[error("snapshot evaluation failed at x={x}")]
    EvaluationFailure { x: f64 },
    #[error("key arrays differ in length: {positions} positions vs {handles} handles")]
    MismatchedKeyArrays { positions: usize, handles: usize },
    #[error("key index {index} out of range for {len} keys")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("run is empty or has a gap before index {index}")]
    NonContiguousRun { index: usize },
    #[error("boundary index {boundary} is not adjacent to run edge {edge}")]
    InvalidBoundary { boundary: usize, edge: usize },
    #[error("invalid blend config: {0}")]
    Config(#[from] serde_json::Error),
}
