//! Snapshot comparison and replay for the Arbor persistence engine.
//!
//! [`diff`] compares two [`ObjectMemento`](arbor_memento::ObjectMemento)
//! snapshots of the same object into an ordered [`MementoDiff`]: change
//! groups addressed by node identity, with modified descendants ordered
//! before their parents. [`apply`] replays a diff against a live tree and
//! [`revert`] undoes it exactly, which is what an undo/redo stack stores.
//!
//! Child reorderings are reported net of the movement already implied by
//! sibling insertions and removals; [`compute_index_shifts`] is that
//! bookkeeping on its own.

pub mod differ;
pub mod error;
pub mod model;
pub mod replay;
pub mod shifts;

pub use differ::diff;
pub use error::{DiffError, ReplayError};
pub use model::{ChangeGroup, ChangeRecord, MementoDiff};
pub use replay::{apply, revert};
pub use shifts::compute_index_shifts;
