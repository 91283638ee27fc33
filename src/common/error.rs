//! Error types for sampling_mpc

use thiserror::Error;

/// Main error type for the controller and its collaborators
#[derive(Debug, Error)]
pub enum MpcError {
    /// Track is empty or a waypoint index falls outside it
    #[error("Invalid track: {0}")]
    InvalidTrack(String),
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The dynamics produced a non-finite state
    #[error("Numeric divergence: {0}")]
    NumericDivergence(String),
    /// Plotting failed
    #[error("Visualization error: {0}")]
    VisualizationError(String),
}

/// Result type alias for controller operations
pub type MpcResult<T> = Result<T, MpcError>;
