//! Explicit class registry implementing [`ObjectFactory`].

use std::collections::BTreeMap;
use std::fmt;

use crate::traits::{ObjectFactory, ObjectNode};

type Constructor = Box<dyn Fn() -> Box<dyn ObjectNode> + Send + Sync>;

/// Maps class-name strings to node constructors.
///
/// The registry is an explicit object owned by the application root and
/// passed by reference to every restore/merge/replay call. Registering the
/// same class twice replaces the earlier constructor.
#[derive(Default)]
pub struct ClassRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for a class name.
    pub fn register<F>(&mut self, class_name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn ObjectNode> + Send + Sync + 'static,
    {
        self.constructors
            .insert(class_name.into(), Box::new(constructor));
    }

    /// All registered class names, sorted.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` if no classes are registered.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl ObjectFactory for ClassRegistry {
    fn create(&self, class_name: &str) -> Option<Box<dyn ObjectNode>> {
        self.constructors.get(class_name).map(|ctor| ctor())
    }

    fn known_class(&self, class_name: &str) -> bool {
        self.constructors.contains_key(class_name)
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::BasicNode;

    #[test]
    fn create_known_class() {
        let mut registry = ClassRegistry::new();
        registry.register("Widget", || Box::new(BasicNode::new("Widget", "widget")));

        assert!(registry.known_class("Widget"));
        let node = registry.create("Widget").unwrap();
        assert_eq!(node.class_name(), "Widget");
    }

    #[test]
    fn unknown_class_returns_none() {
        let registry = ClassRegistry::new();
        assert!(!registry.known_class("Ghost"));
        assert!(registry.create("Ghost").is_none());
    }

    #[test]
    fn reregistering_replaces() {
        let mut registry = ClassRegistry::new();
        registry.register("W", || Box::new(BasicNode::new("W", "first")));
        registry.register("W", || Box::new(BasicNode::new("W", "second")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.create("W").unwrap().name(), "second");
    }

    #[test]
    fn each_create_is_a_fresh_instance() {
        let mut registry = ClassRegistry::new();
        registry.register("W", || Box::new(BasicNode::new("W", "w")));
        let a = registry.create("W").unwrap();
        let b = registry.create("W").unwrap();
        assert_ne!(a.id(), b.id());
    }
}
