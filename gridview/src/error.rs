// error.rs - Error types for the grid model, the host protocol and configuration

use std::path::PathBuf;

use thiserror::Error;

use crate::grid::CellId;

/// Rejected mutations of the grid or its frame history.
///
/// None of these are fatal: the operation that produced one left the prior
/// state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid grid dimensions {rows}x{cols}: both must be positive")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("state sequence has {actual} entries but the grid has {expected} cells")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("frame {requested} is outside 1..={len}")]
    FrameOutOfRange { requested: usize, len: usize },

    #[error("no cell with id {0}")]
    UnknownCell(CellId),
}

/// Failures while decoding or encoding host messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed inbound message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("could not encode outbound message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("host channel I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors surfaced by user-initiated actions on a [`crate::session::Session`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("action unavailable while the simulation is running")]
    Running,

    #[error("the simulation is not running")]
    NotRunning,

    #[error(transparent)]
    Grid(#[from] GridError),
}
