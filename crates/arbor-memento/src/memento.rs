//! The [`ObjectMemento`] snapshot and its Merkle-style hashing.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use arbor_tree::{ObjectFactory, ObjectNode};
use arbor_types::{Digest, NodeId, PropertyData, TreeHasher};

/// An immutable, deep snapshot of one node and its subtree.
///
/// A memento records everything needed to reconstruct the node: class name,
/// identity, display name, structured properties, dynamic containers, and
/// child mementos in order. Two digests summarize the content. The node
/// hash covers this node's own data; the full hash additionally folds in
/// every descendant, so equal full hashes mean identical subtrees and the
/// comparison machinery can skip them wholesale.
///
/// Both digests are computed lazily on first access and cached. Cloning or
/// deserializing a memento resets the caches, so a memento assembled by
/// hand can never carry a stale digest.
#[derive(Debug, Serialize, Deserialize)]
pub struct ObjectMemento {
    /// Runtime class name of the captured node.
    pub class_name: String,
    /// Stable identity of the captured node.
    pub id: NodeId,
    /// Display name of the captured node.
    pub ident: String,
    /// Structured properties in declaration order.
    pub properties: Vec<PropertyData>,
    /// Dynamic-size containers; each entry of a container is a
    /// struct-typed child property.
    pub containers: Vec<PropertyData>,
    /// Child snapshots in tree order.
    pub children: Vec<ObjectMemento>,
    #[serde(skip)]
    property_hash: OnceLock<Digest>,
    #[serde(skip)]
    full_hash: OnceLock<Digest>,
}

impl ObjectMemento {
    /// Assemble a memento from parts. The hashes are computed on demand.
    pub fn new(
        class_name: impl Into<String>,
        id: NodeId,
        ident: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            id,
            ident: ident.into(),
            properties: Vec::new(),
            containers: Vec::new(),
            children: Vec::new(),
            property_hash: OnceLock::new(),
            full_hash: OnceLock::new(),
        }
    }

    /// Deep-capture a live node, preserving every identity in the subtree.
    pub fn capture(node: &dyn ObjectNode) -> Self {
        Self::capture_inner(node, false)
    }

    /// Deep-capture a live node as a clone: every node in the captured
    /// subtree gets a fresh identity. Restoring such a memento yields an
    /// independent copy that never collides with the original tree.
    pub fn capture_as_clone(node: &dyn ObjectNode) -> Self {
        Self::capture_inner(node, true)
    }

    fn capture_inner(node: &dyn ObjectNode, fresh_ids: bool) -> Self {
        Self {
            class_name: node.class_name().to_owned(),
            id: if fresh_ids { NodeId::random() } else { node.id() },
            ident: node.name().to_owned(),
            properties: node.properties().to_vec(),
            containers: node.containers().to_vec(),
            children: node
                .children()
                .iter()
                .map(|child| Self::capture_inner(child.as_ref(), fresh_ids))
                .collect(),
            property_hash: OnceLock::new(),
            full_hash: OnceLock::new(),
        }
    }

    /// Returns `true` for a memento carrying no identity. Null mementos
    /// arise only from hand-assembled or deserialized data; capture always
    /// records a real identity.
    pub fn is_null(&self) -> bool {
        self.id.is_nil()
    }

    /// Digest of this node's own data: class name, identity, display name,
    /// and the content hash of every property and container.
    pub fn property_hash(&self) -> &Digest {
        self.property_hash.get_or_init(|| {
            let mut hasher = TreeHasher::node();
            hasher
                .update_str(&self.class_name)
                .update_str(&self.id.to_string())
                .update_str(&self.ident);
            for property in &self.properties {
                hasher.update_digest(property.hash());
            }
            for container in &self.containers {
                hasher.update_digest(container.hash());
            }
            hasher.finalize()
        })
    }

    /// Digest of the whole subtree: this node's [`property_hash`] followed
    /// by every child's full hash, in order.
    ///
    /// [`property_hash`]: ObjectMemento::property_hash
    pub fn full_hash(&self) -> &Digest {
        self.full_hash.get_or_init(|| {
            let mut hasher = TreeHasher::subtree();
            hasher.update_digest(self.property_hash());
            for child in &self.children {
                hasher.update_digest(child.full_hash());
            }
            hasher.finalize()
        })
    }

    /// Force both digests (and every descendant digest) to be computed now.
    /// Useful before sharing a memento across threads, so later reads are
    /// pure cache hits.
    pub fn calculate_hashes(&self) {
        let _ = self.full_hash();
    }

    /// Direct child snapshot with the given identity.
    pub fn find_child_by_id(&self, id: &NodeId) -> Option<&ObjectMemento> {
        self.children.iter().find(|c| c.id == *id)
    }

    /// Returns `true` if every class in the subtree is known to the
    /// factory, i.e. a restore would produce no placeholders. Unknown
    /// classes are logged.
    pub fn is_restorable(&self, factory: &dyn ObjectFactory) -> bool {
        if self.is_null() {
            warn!("snapshot without identity is not restorable");
            return false;
        }
        if !factory.known_class(&self.class_name) {
            warn!(class = %self.class_name, "class not registered with factory");
            return false;
        }
        self.children.iter().all(|c| c.is_restorable(factory))
    }
}

impl Clone for ObjectMemento {
    fn clone(&self) -> Self {
        Self {
            class_name: self.class_name.clone(),
            id: self.id,
            ident: self.ident.clone(),
            properties: self.properties.clone(),
            containers: self.containers.clone(),
            children: self.children.clone(),
            property_hash: OnceLock::new(),
            full_hash: OnceLock::new(),
        }
    }
}

impl PartialEq for ObjectMemento {
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name
            && self.id == other.id
            && self.ident == other.ident
            && self.properties == other.properties
            && self.containers == other.containers
            && self.children == other.children
    }
}
