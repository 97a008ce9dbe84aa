//! Error types for diffing and replay.

use thiserror::Error;

use arbor_types::{NodeId, TypeError};

/// Errors surfaced when comparing two snapshots.
#[derive(Debug, Error)]
pub enum DiffError {
    /// The two snapshots describe different root objects.
    #[error("cannot diff snapshots of different objects ({left} vs {right})")]
    IdentityMismatch { left: NodeId, right: NodeId },

    /// One of the snapshots carries no identity.
    #[error("cannot diff a null snapshot")]
    NullMemento,
}

/// Errors surfaced while replaying a diff against a live tree.
///
/// Replay is not transactional: when an error is returned, records that
/// replayed before the failing one have already mutated the tree. Callers
/// must discard the live tree on error.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// A change group or child record named an identity the live tree does
    /// not contain.
    #[error("no node with identity {0} in the live tree")]
    UnresolvedIdentity(NodeId),

    /// A change record was structurally invalid or carried a value that
    /// failed to decode.
    #[error("malformed change record: {0}")]
    MalformedRecord(String),

    /// A container record named a container the target node does not have.
    #[error("target node has no container `{0}`")]
    UnknownContainer(String),

    /// A container record named an entry the container does not hold.
    #[error("container `{container}` has no entry `{entry}`")]
    UnknownEntry { container: String, entry: String },

    /// A container entry index points past the end of the container.
    #[error("entry index {index} out of range for container of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl From<TypeError> for ReplayError {
    fn from(err: TypeError) -> Self {
        Self::MalformedRecord(err.to_string())
    }
}
