//! A reference [`ObjectNode`] implementation.

use std::collections::BTreeMap;

use arbor_types::{NodeId, PropertyData};

use crate::traits::ObjectNode;

/// General-purpose node backing tests, examples, and the placeholder path.
///
/// A `BasicNode` stores its structured properties and containers directly
/// as [`PropertyData`]. Constructed via [`BasicNode::placeholder`] it
/// stands in for a class the local factory does not know, carrying every
/// recorded property opaquely so nothing is lost on a later re-capture.
pub struct BasicNode {
    id: NodeId,
    name: String,
    class_name: String,
    placeholder: bool,
    default_child: bool,
    properties: Vec<PropertyData>,
    containers: Vec<PropertyData>,
    attrs: BTreeMap<String, String>,
    children: Vec<Box<dyn ObjectNode>>,
}

impl BasicNode {
    /// Create a node of the given class with a fresh identity.
    pub fn new(class_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::random(),
            name: name.into(),
            class_name: class_name.into(),
            placeholder: false,
            default_child: false,
            properties: Vec::new(),
            containers: Vec::new(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Create a placeholder for an unknown class. The recorded class name
    /// is reported as this node's class, so re-capturing reproduces the
    /// original class string.
    pub fn placeholder(class_name: impl Into<String>) -> Self {
        let mut node = Self::new(class_name, "");
        node.placeholder = true;
        node
    }

    /// Add a structured property (builder).
    pub fn with_property(mut self, property: PropertyData) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a dynamic-size container (builder).
    pub fn with_container(mut self, container: PropertyData) -> Self {
        self.containers.push(container);
        self
    }

    /// Mark this node as a protected default child (builder).
    pub fn as_default(mut self) -> Self {
        self.default_child = true;
        self
    }
}

impl ObjectNode for BasicNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    fn is_default(&self) -> bool {
        self.default_child
    }

    fn properties(&self) -> &[PropertyData] {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut [PropertyData] {
        &mut self.properties
    }

    fn containers(&self) -> &[PropertyData] {
        &self.containers
    }

    fn containers_mut(&mut self) -> &mut [PropertyData] {
        &mut self.containers
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.attrs.get(name).cloned()
    }

    fn set_attr(&mut self, name: &str, value: &str) -> bool {
        self.attrs.insert(name.to_owned(), value.to_owned());
        true
    }

    fn children(&self) -> &[Box<dyn ObjectNode>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Box<dyn ObjectNode>> {
        &mut self.children
    }

    fn import_opaque(&mut self, properties: &[PropertyData], containers: &[PropertyData]) -> bool {
        if !self.placeholder {
            return false;
        }
        self.properties = properties.to_vec();
        self.containers = containers.to_vec();
        true
    }
}
