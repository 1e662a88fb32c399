//! Simulation error types.
//!
//! One enum covers the whole crate. Algorithmic fallbacks (eigenvector
//! ranking, community detection) are **not** errors: they are typed reason
//! codes carried inside successful results, so only genuine failures land
//! here.

use thiserror::Error;

/// Simulation errors.
#[derive(Error, Debug)]
pub enum PolarityError {
    /// Invalid construction or configuration parameters.
    #[error("Config error: {0}")]
    Config(String),

    /// Temperature must be strictly positive; the Metropolis acceptance
    /// rule divides by `T`.
    #[error("Invalid temperature {0}: Metropolis dynamics require T > 0")]
    InvalidTemperature(f64),

    /// A node id referenced a node outside `0..n_users`.
    #[error("Node {node} out of range for a network of {n_users} users")]
    NodeOutOfRange {
        /// The offending node id.
        node: usize,
        /// Number of nodes in the network.
        n_users: usize,
    },

    /// A spin snapshot was restored into a state of a different length.
    #[error("Snapshot of {snapshot} spins cannot restore a state of {state}")]
    SnapshotMismatch {
        /// Length of the snapshot.
        snapshot: usize,
        /// Length of the live state.
        state: usize,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for simulation operations
pub type Result<T> = std::result::Result<T, PolarityError>;

impl From<toml::de::Error> for PolarityError {
    fn from(err: toml::de::Error) -> Self {
        PolarityError::Config(err.to_string())
    }
}
