//! Protocol error taxonomy. These are peer-misbehavior/transport-corruption
//! errors (`spec.md` §7 "Protocol errors") — always returned as `Result`,
//! never panics, and distinguishable so a caller can log and classify the
//! offending peer. Programmer errors (bad constructor preconditions) are
//! deliberately *not* part of this enum; they are `panic!`/`assert!` per
//! §7's "Programmer errors / invariant violations".

use thiserror::Error;

/// Errors `MulOpen::handle_share_batch` can return, matching the six
/// enumerated protocol errors of `spec.md` §6.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MulOpenError {
    #[error("message batch has {got} elements, expected {expected}")]
    IncorrectBatchSize { expected: usize, got: usize },

    #[error("share index is not a member of the agreed index set")]
    InvalidIndex,

    #[error("not every share in the batch carries the same index")]
    InconsistentShares,

    #[error("a share at this index has already been accepted")]
    DuplicateIndex,

    #[error("zero-knowledge proof of correct multiplication failed to verify")]
    InvalidZKP,

    #[error("share value is inconsistent with its claimed commitment")]
    InvalidShares,
}

/// Errors `Inverter::handle_share_batch` can return: everything `MulOpen`
/// can surface, forwarded verbatim, plus the inverter-specific failure
/// mode of the reconstructed product being zero.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InverterError {
    #[error(transparent)]
    MulOpen(#[from] MulOpenError),

    /// A reconstructed product batch entry was zero, so its field inverse
    /// does not exist. Resolves the Open Question in `spec.md` §9 in
    /// favor of a distinguishable error over a panic.
    #[error("reconstructed product at batch slot {slot} is zero; cannot invert")]
    ZeroProduct { slot: usize },
}
