//! Error types for heart rate analysis.

use thiserror::Error;

/// Errors surfaced by the clustering and analysis routines.
///
/// All failures propagate directly to the caller; nothing is retried and no
/// partial result is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The input is empty, too short for a two-way split, or contains a
    /// reading without a usable heart rate value.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Every reading carries the same value, so no meaningful two-way split
    /// exists. Only raised under [`DegeneratePolicy::Reject`].
    ///
    /// [`DegeneratePolicy::Reject`]: crate::analysis::anomaly::DegeneratePolicy::Reject
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
    /// The clustering routine failed to produce a result.
    #[error("computation failed: {0}")]
    Computation(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
