//! The [`ObjectNode`] and [`ObjectFactory`] traits.
//!
//! These traits are the seam between the persistence engine and the
//! application's live object tree. The engine mutates nodes only through
//! them; it never assumes a concrete node type.

use arbor_types::{find_property, find_property_mut, NodeId, PropertyData};

/// A live, mutable, identity-bearing node in the application's object tree.
///
/// Implementations own their children exclusively (a tree, no sharing, no
/// cycles). The trait is deliberately synchronous; callers synchronize
/// access to the live tree themselves.
pub trait ObjectNode {
    /// Stable identity of this node.
    fn id(&self) -> NodeId;

    /// Replace the identity. Used by merge when reconciling a snapshot into
    /// an existing node.
    fn set_id(&mut self, id: NodeId);

    /// Human-readable, non-unique display name.
    fn name(&self) -> &str;

    /// Set the display name.
    fn set_name(&mut self, name: &str);

    /// Runtime class name. Placeholder nodes report the recorded class of
    /// the original object, so re-capturing a placeholder loses nothing.
    fn class_name(&self) -> &str;

    /// Returns `true` if this node stands in for a class unknown to the
    /// local factory.
    fn is_placeholder(&self) -> bool {
        false
    }

    /// Default children are protected: a merge never deletes them even when
    /// the snapshot has no matching child.
    fn is_default(&self) -> bool {
        false
    }

    /// Structured properties in declaration order.
    fn properties(&self) -> &[PropertyData];

    /// Structured properties, mutably.
    fn properties_mut(&mut self) -> &mut [PropertyData];

    /// Dynamic-size property containers. Each container is a
    /// [`PropertyData`] whose children are struct-typed entries keyed by
    /// entry identity.
    fn containers(&self) -> &[PropertyData];

    /// Dynamic-size property containers, mutably.
    fn containers_mut(&mut self) -> &mut [PropertyData];

    /// Look up a structured property by name.
    fn find_property(&self, name: &str) -> Option<&PropertyData> {
        find_property(self.properties(), name)
    }

    /// Look up a structured property by name, mutably.
    fn find_property_mut(&mut self, name: &str) -> Option<&mut PropertyData> {
        find_property_mut(self.properties_mut(), name)
    }

    /// Look up a container by name, mutably.
    fn find_container_mut(&mut self, name: &str) -> Option<&mut PropertyData> {
        find_property_mut(self.containers_mut(), name)
    }

    /// Generic attribute fallback for values outside the structured set.
    fn attr(&self, _name: &str) -> Option<String> {
        None
    }

    /// Set a generic attribute. Returns `false` if the node does not accept
    /// the attribute.
    fn set_attr(&mut self, _name: &str, _value: &str) -> bool {
        false
    }

    /// Direct children, in order.
    fn children(&self) -> &[Box<dyn ObjectNode>];

    /// Direct children, mutably.
    fn children_mut(&mut self) -> &mut Vec<Box<dyn ObjectNode>>;

    /// Append a child at the end.
    fn append_child(&mut self, child: Box<dyn ObjectNode>) {
        self.children_mut().push(child);
    }

    /// Insert a child at `index`; an index past the end appends.
    fn insert_child(&mut self, index: usize, child: Box<dyn ObjectNode>) {
        let children = self.children_mut();
        if index >= children.len() {
            children.push(child);
        } else {
            children.insert(index, child);
        }
    }

    /// Remove and return the child at `index`.
    fn remove_child(&mut self, index: usize) -> Option<Box<dyn ObjectNode>> {
        let children = self.children_mut();
        if index < children.len() {
            Some(children.remove(index))
        } else {
            None
        }
    }

    /// Position of the direct child with the given identity.
    fn direct_child_index(&self, id: &NodeId) -> Option<usize> {
        self.children().iter().position(|c| c.id() == *id)
    }

    /// Wholesale import of recorded property data. Only placeholder nodes
    /// accept this; it preserves unknown-class data verbatim.
    fn import_opaque(&mut self, _properties: &[PropertyData], _containers: &[PropertyData]) -> bool {
        false
    }

    /// Invoked once per node after a merge or diff replay touched it.
    fn on_merged(&mut self) {}
}

/// Instantiates nodes from a class-name string.
///
/// Passed explicitly to every restore/merge/replay call; there is no global
/// factory. Applications typically use a [`ClassRegistry`](crate::ClassRegistry)
/// but may implement the trait directly.
pub trait ObjectFactory {
    /// Create a fresh node of the named class, or `None` if the class is
    /// unknown. Callers fall back to a placeholder node on `None`.
    fn create(&self, class_name: &str) -> Option<Box<dyn ObjectNode>>;

    /// Whether the class name is known to this factory.
    fn known_class(&self, class_name: &str) -> bool;
}

/// Find a node by identity in the subtree rooted at `root` (inclusive).
pub fn find_node<'a>(root: &'a dyn ObjectNode, id: &NodeId) -> Option<&'a dyn ObjectNode> {
    if root.id() == *id {
        return Some(root);
    }
    for child in root.children() {
        if let Some(found) = find_node(child.as_ref(), id) {
            return Some(found);
        }
    }
    None
}

/// Find a node by identity in the subtree rooted at `root` (inclusive),
/// mutably.
pub fn find_node_mut<'a>(
    root: &'a mut dyn ObjectNode,
    id: &NodeId,
) -> Option<&'a mut dyn ObjectNode> {
    if root.id() == *id {
        return Some(root);
    }
    for child in root.children_mut() {
        if let Some(found) = find_node_mut(child.as_mut(), id) {
            return Some(found);
        }
    }
    None
}
