//! Error types reported across the crate's boundary.

use thiserror::Error;

/// Errors produced by the analysis and defense operations.
///
/// Infeasible-but-contractual situations (an optimizer run on a graph with
/// fewer than two edges, a reinforcement pass with no eligible candidates)
/// are *not* errors: those operations return the input graph unchanged with a
/// zeroed report and log a warning instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A curve handed to the R-index integration failed validation.
    #[error("malformed robustness curve: {0}")]
    MalformedCurve(String),

    /// A removal order is not a permutation of the graph's vertex set.
    #[error("removal order is not a permutation of the graph's vertex set")]
    InvalidOrder,

    /// A vertex referenced by the caller is not part of the graph.
    #[error("vertex {0} is not in the graph")]
    UnknownVertex(String),

    /// The requested attack strategy cannot drive the given operation.
    #[error("unsupported attack strategy: {0}")]
    UnsupportedStrategy(&'static str),
}
