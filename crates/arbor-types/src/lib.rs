//! Core types for the Arbor object-tree persistence engine.
//!
//! This crate defines the vocabulary shared by every other Arbor crate:
//!
//! - [`NodeId`]: stable, globally unique node identity (UUID-backed)
//! - [`Digest`] / [`TreeHasher`]: domain-separated BLAKE3 content hashes
//! - [`PropertyData`] / [`PropertyValue`]: the tagged property union
//!   (scalar, enumeration, homogeneous list, nested struct) with a stable
//!   textual round-trip encoding and a cached per-property hash

pub mod digest;
pub mod error;
pub mod id;
pub mod property;
pub mod value;

pub use digest::{Digest, TreeHasher};
pub use error::TypeError;
pub use id::NodeId;
pub use property::{find_property, find_property_mut, PropertyData};
pub use value::{ListType, ListValue, PropertyValue, ScalarValue};
