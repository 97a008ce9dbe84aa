//! Restoring snapshots into live nodes and merging them in place.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use arbor_tree::{BasicNode, ObjectFactory, ObjectNode};
use arbor_types::{find_property, find_property_mut, PropertyData};

use crate::error::MementoError;
use crate::memento::ObjectMemento;

impl ObjectMemento {
    /// Reconstruct a live node from this snapshot.
    ///
    /// Classes the factory does not know become placeholder nodes that
    /// carry the recorded data opaquely; restore itself never fails. Use
    /// [`is_restorable`](ObjectMemento::is_restorable) to check up front
    /// whether placeholders would be produced.
    pub fn restore(&self, factory: &dyn ObjectFactory) -> Box<dyn ObjectNode> {
        let mut node = factory.create(&self.class_name).unwrap_or_else(|| {
            debug!(class = %self.class_name, "unknown class, restoring as placeholder");
            Box::new(BasicNode::placeholder(self.class_name.clone()))
        });
        merge_into(self, node.as_mut(), factory);
        node
    }

    /// Merge this snapshot into an existing live node, reconciling
    /// properties, containers, and children in place so surviving children
    /// keep their allocations and local state.
    ///
    /// The node must be of the recorded class (placeholders accept any
    /// class). Children are matched by display name, merged when the class
    /// agrees and the identity matches or the child is a protected default,
    /// and otherwise restored fresh; unmatched live children are removed
    /// unless they are defaults.
    pub fn merge_to(
        &self,
        node: &mut dyn ObjectNode,
        factory: &dyn ObjectFactory,
    ) -> Result<(), MementoError> {
        if !node.is_placeholder() && node.class_name() != self.class_name {
            return Err(MementoError::ClassMismatch {
                expected: self.class_name.clone(),
                actual: node.class_name().to_owned(),
            });
        }
        merge_into(self, node, factory);
        Ok(())
    }
}

fn merge_into(memento: &ObjectMemento, node: &mut dyn ObjectNode, factory: &dyn ObjectFactory) {
    node.set_id(memento.id);
    node.set_name(&memento.ident);

    if node.is_placeholder() {
        node.import_opaque(&memento.properties, &memento.containers);
    } else {
        apply_properties(memento, node);
        merge_containers(memento, node);
    }

    let original_len = node.children().len();
    let mut merged: BTreeSet<usize> = BTreeSet::new();

    for child_memento in &memento.children {
        let candidate = node
            .children()
            .iter()
            .position(|c| c.name() == child_memento.ident)
            .filter(|&i| {
                let child = &node.children()[i];
                child.class_name() == child_memento.class_name
                    && (child.id() == child_memento.id || child.is_default())
            });
        match candidate {
            Some(index) => {
                merge_into(child_memento, node.children_mut()[index].as_mut(), factory);
                merged.insert(index);
            }
            None => {
                let restored = child_memento.restore(factory);
                node.append_child(restored);
            }
        }
    }

    // live children the snapshot does not account for go away, except
    // protected defaults
    for index in (0..original_len).rev() {
        if !merged.contains(&index) && !node.children()[index].is_default() {
            node.remove_child(index);
        }
    }

    node.on_merged();
}

fn apply_properties(memento: &ObjectMemento, node: &mut dyn ObjectNode) {
    for recorded in &memento.properties {
        if let Some(live) = node.find_property_mut(&recorded.name) {
            live.set_value(recorded.value.clone());
            live.set_active(recorded.is_active);
            live.children = recorded.children.clone();
            continue;
        }
        let accepted = recorded
            .value
            .encode()
            .is_some_and(|encoded| node.set_attr(&recorded.name, &encoded));
        if !accepted {
            warn!(
                property = %recorded.name,
                object = %memento.ident,
                "recorded property not present on live node, skipping"
            );
        }
    }
}

fn merge_containers(memento: &ObjectMemento, node: &mut dyn ObjectNode) {
    for recorded in &memento.containers {
        match node.find_container_mut(&recorded.name) {
            Some(live) => merge_container(recorded, live),
            None => warn!(
                container = %recorded.name,
                object = %memento.ident,
                "recorded container not present on live node, skipping"
            ),
        }
    }
}

/// Reconcile one live container against its recorded counterpart. Entries
/// are keyed by name: live entries absent from the record (or with a
/// different struct type) are dropped, matching entries have their members
/// updated in place, and new entries are appended in recorded order.
fn merge_container(recorded: &PropertyData, live: &mut PropertyData) {
    live.children.retain(|entry| {
        recorded
            .children
            .iter()
            .any(|r| r.name == entry.name && r.data_type() == entry.data_type())
    });
    for entry in &recorded.children {
        match find_property_mut(&mut live.children, &entry.name) {
            Some(live_entry) => import_entry_members(entry, live_entry),
            None => live.children.push(entry.clone()),
        }
    }
}

fn import_entry_members(recorded: &PropertyData, live: &mut PropertyData) {
    live.set_active(recorded.is_active);
    for member in &mut live.children {
        match find_property(&recorded.children, &member.name) {
            Some(source) => {
                member.set_value(source.value.clone());
                member.set_active(source.is_active);
            }
            None => warn!(member = %member.name, entry = %live.name, "member missing in recorded entry"),
        }
    }
}
