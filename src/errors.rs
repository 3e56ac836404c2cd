//! Error types for the crate.
//!
//! Only recoverable conditions are represented here. Violations of internal
//! algebraic invariants (a generator of the wrong order, a degenerate pairing
//! after disambiguation) indicate a bug in the field or curve construction
//! and abort via `panic!` instead of returning a silently-wrong curve.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No suitable BN parameters were found for the requested bit length.
    /// Retrying with a larger bit length usually succeeds.
    #[error("no BN curve with a {bits}-bit characteristic found; retry with a larger bit length")]
    ParameterSearchExhausted { bits: u64 },

    /// The requested threshold lies outside `[2, identity length]`.
    #[error("threshold {threshold} outside the valid range [2, {identity_len}]")]
    InvalidThreshold {
        threshold: usize,
        identity_len: usize,
    },

    /// An attribute was referenced that setup never provisioned.
    #[error("attribute {0} was not provisioned at setup")]
    UnknownAttribute(u64),

    /// Setup requires at least one attribute in the universe.
    #[error("attribute universe is empty")]
    EmptyUniverse,

    /// Attribute identifiers must be nonzero and distinct modulo the group
    /// order; an identifier of zero would evaluate the share polynomial at
    /// its secret constant term.
    #[error("attribute identifier {0} is zero or collides modulo the group order")]
    InvalidAttribute(u64),
}
