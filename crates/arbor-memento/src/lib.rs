//! Object snapshots for the Arbor persistence engine.
//!
//! This crate captures a live [`ObjectNode`](arbor_tree::ObjectNode) tree
//! into an immutable [`ObjectMemento`], summarizes it with lazy
//! Merkle-style digests, restores or merges it back through an
//! [`ObjectFactory`](arbor_tree::ObjectFactory), and maps it losslessly
//! onto a format-agnostic [`TreeElement`] document.
//!
//! Capture and restore form a round trip: re-capturing a restored tree
//! reproduces the original memento hash for hash, even when unknown
//! classes were restored as placeholders.

pub mod codec;
pub mod error;
pub mod memento;
mod merge;

pub use codec::TreeElement;
pub use error::MementoError;
pub use memento::ObjectMemento;
