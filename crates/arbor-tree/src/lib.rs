//! Live object-tree capability boundary for Arbor.
//!
//! The snapshot, diff, and replay engines never own the application's object
//! tree; they reach it through the [`ObjectNode`] trait defined here. Any
//! application node type that implements `ObjectNode` can be captured,
//! diffed, patched, and merged.
//!
//! # Key Types
//!
//! - [`ObjectNode`]: the capability interface: identity, display name,
//!   class name, structured properties, dynamic containers, children, and a
//!   generic attribute fallback
//! - [`ObjectFactory`] / [`ClassRegistry`]: instantiation of nodes from a
//!   class-name string; passed explicitly to every restore/merge call
//! - [`BasicNode`]: a reference implementation, doubling as the
//!   placeholder node that carries data of unknown classes opaquely

pub mod node;
pub mod registry;
pub mod traits;

pub use node::BasicNode;
pub use registry::ClassRegistry;
pub use traits::{find_node, find_node_mut, ObjectFactory, ObjectNode};
