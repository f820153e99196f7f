//! Error types
//!
//! Structural misuse (bad scale configuration, dangling ids) is reported
//! through [`TimelineError`]. Pointer events that land outside any tracked
//! item are not errors: interaction states simply ignore them.

use crate::time_context::ContextId;
use uuid::Uuid;

/// Errors raised by the coordinate engine and the track/layer containers
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    /// Zero-width or non-finite domain or range
    #[error("invalid scale configuration: domain {domain:?}, range {range:?}")]
    InvalidScale { domain: [f64; 2], range: [f64; 2] },

    #[error("time context {0:?} does not exist")]
    UnknownContext(ContextId),

    /// A layer was rendered before being attached to a time context
    #[error("layer {0} has no time context")]
    MissingTimeContext(Uuid),

    #[error("track {0} does not exist")]
    UnknownTrack(Uuid),

    #[error("layer {0} does not exist")]
    UnknownLayer(Uuid),

    #[error("the root time context cannot be detached")]
    DetachRoot,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised when converting between row and column data views
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("column `{column}` has {found} values, expected {expected}")]
    Inconsistent {
        column: String,
        expected: usize,
        found: usize,
    },
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
