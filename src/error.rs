//! Categorical error kinds for the routing core.
//!
//! `Unreachable` and `Skipped` from the design notes are deliberately not
//! variants here: an unreachable target is `Ok(vec![])` from [`crate::query`],
//! and a skipped ingestion record is data (a `SkippedSegment`) returned
//! alongside a successful build, not an error.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A vertex id, arc key, or rank was referenced but does not exist.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal consistency rule was broken; always a programming error.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Crate-specific result alias.
pub type Result<T> = std::result::Result<T, Error>;
