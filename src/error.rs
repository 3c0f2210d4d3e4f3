//! Errors surfaced by a scoring run.
//!
//! Sparse history is never an error: each feature falls back to its neutral
//! default. A driver missing from the standings is an `Option::None` from the
//! extractor, not a variant here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// The standings collection was empty, so there is nothing to rank.
    #[error("no standings data available")]
    EmptyStandings,

    /// The raw scores of the normalization pool summed to exactly zero.
    #[error("top-{pool_size} score sum is zero; win probabilities are undefined")]
    DegenerateNormalization { pool_size: usize },

    /// A weight table failed validation.
    #[error("invalid feature weights: {0}")]
    InvalidWeights(String),
}
