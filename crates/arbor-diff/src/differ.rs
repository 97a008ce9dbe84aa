//! Computing the change groups between two snapshots.

use tracing::debug;

use arbor_memento::ObjectMemento;
use arbor_types::{find_property, NodeId, PropertyData};

use crate::error::DiffError;
use crate::model::{ChangeGroup, ChangeRecord, MementoDiff};
use crate::shifts::compute_index_shifts;

/// Compare two snapshots of the same object.
///
/// Returns the ordered change groups that transform `left` into `right`.
/// Hashes are computed on demand, so callers need not prepare the
/// mementos. Equal full hashes short-circuit to an empty diff without
/// walking the trees.
pub fn diff(left: &ObjectMemento, right: &ObjectMemento) -> Result<MementoDiff, DiffError> {
    if left.is_null() || right.is_null() {
        return Err(DiffError::NullMemento);
    }
    if left.id != right.id {
        return Err(DiffError::IdentityMismatch {
            left: left.id,
            right: right.id,
        });
    }
    let mut diff = MementoDiff::new();
    diff_nodes(left, right, &mut diff.groups);
    Ok(diff)
}

fn diff_nodes(left: &ObjectMemento, right: &ObjectMemento, groups: &mut Vec<ChangeGroup>) {
    if left.full_hash() == right.full_hash() {
        return;
    }

    // modified surviving children first, so their groups replay before
    // the parent's own group
    for right_child in &right.children {
        if let Some(left_child) = left.find_child_by_id(&right_child.id) {
            if left_child.full_hash() != right_child.full_hash() {
                diff_nodes(left_child, right_child, groups);
            }
        }
    }

    let mut records = Vec::new();
    if left.property_hash() != right.property_hash() {
        if left.class_name != right.class_name {
            records.push(ChangeRecord::AttributeChanged {
                attr: "class".to_owned(),
                old: left.class_name.clone(),
                new: right.class_name.clone(),
            });
        }
        if left.ident != right.ident {
            records.push(ChangeRecord::AttributeChanged {
                attr: "name".to_owned(),
                old: left.ident.clone(),
                new: right.ident.clone(),
            });
        }
        diff_properties(left, right, &mut records);
        diff_containers(left, right, &mut records);
    }
    diff_children(left, right, &mut records);

    if !records.is_empty() {
        groups.push(ChangeGroup {
            target: left.id,
            ident: left.ident.clone(),
            class_name: left.class_name.clone(),
            records,
        });
    }
}

fn diff_properties(left: &ObjectMemento, right: &ObjectMemento, records: &mut Vec<ChangeRecord>) {
    for left_prop in &left.properties {
        match find_property(&right.properties, &left_prop.name) {
            Some(right_prop) => {
                if left_prop.hash() != right_prop.hash() {
                    records.push(property_change(left_prop, right_prop));
                }
            }
            None => debug!(
                property = %left_prop.name,
                object = %left.ident,
                "property absent from newer snapshot, ignored"
            ),
        }
    }
    for right_prop in &right.properties {
        if find_property(&left.properties, &right_prop.name).is_none() {
            debug!(
                property = %right_prop.name,
                object = %left.ident,
                "property absent from older snapshot, ignored"
            );
        }
    }
}

fn property_change(left: &PropertyData, right: &PropertyData) -> ChangeRecord {
    let value = match (left.value.encode(), right.value.encode()) {
        (Some(old), Some(new)) if old != new || left.value != right.value => Some((old, new)),
        _ => None,
    };
    ChangeRecord::PropertyChanged {
        name: left.name.clone(),
        data_type: right.data_type().to_owned(),
        is_list: right.value.is_list(),
        value,
        active: (left.is_active != right.is_active).then_some((left.is_active, right.is_active)),
    }
}

fn diff_containers(left: &ObjectMemento, right: &ObjectMemento, records: &mut Vec<ChangeRecord>) {
    for left_container in &left.containers {
        let Some(right_container) = find_property(&right.containers, &left_container.name) else {
            debug!(
                container = %left_container.name,
                object = %left.ident,
                "container absent from newer snapshot, ignored"
            );
            continue;
        };
        if left_container.hash() == right_container.hash() {
            continue;
        }
        diff_container(left_container, right_container, records);
    }
    for right_container in &right.containers {
        if find_property(&left.containers, &right_container.name).is_none() {
            debug!(
                container = %right_container.name,
                object = %left.ident,
                "container absent from older snapshot, ignored"
            );
        }
    }
}

/// Entries are identified by name. Removals are recorded with their old
/// index, additions with their new index, and surviving entries with
/// differing member data get a nested change list.
fn diff_container(left: &PropertyData, right: &PropertyData, records: &mut Vec<ChangeRecord>) {
    for (index, entry) in left.children.iter().enumerate() {
        if find_property(&right.children, &entry.name).is_none() {
            records.push(ChangeRecord::ContainerEntryRemoved {
                container: left.name.clone(),
                index,
                entry: entry.clone(),
            });
        }
    }
    for (index, entry) in right.children.iter().enumerate() {
        match find_property(&left.children, &entry.name) {
            None => records.push(ChangeRecord::ContainerEntryAdded {
                container: left.name.clone(),
                index,
                entry: entry.clone(),
            }),
            Some(left_entry) => {
                if left_entry.hash() == entry.hash() {
                    continue;
                }
                let mut changes = Vec::new();
                for left_member in &left_entry.children {
                    if let Some(right_member) = find_property(&entry.children, &left_member.name) {
                        if left_member.hash() != right_member.hash() {
                            changes.push(property_change(left_member, right_member));
                        }
                    }
                }
                if !changes.is_empty() {
                    records.push(ChangeRecord::ContainerEntryChanged {
                        container: left.name.clone(),
                        entry_id: entry.name.clone(),
                        changes,
                    });
                }
            }
        }
    }
}

fn diff_children(left: &ObjectMemento, right: &ObjectMemento, records: &mut Vec<ChangeRecord>) {
    let left_ids: Vec<NodeId> = left.children.iter().map(|c| c.id).collect();
    let right_ids: Vec<NodeId> = right.children.iter().map(|c| c.id).collect();

    // removals first: they replay by identity, so the later addition
    // indices are valid against the thinned list
    for (index, child) in left.children.iter().enumerate() {
        if !right_ids.contains(&child.id) {
            records.push(ChangeRecord::ChildRemoved {
                index,
                child: child.clone(),
            });
        }
    }
    for (index, child) in right.children.iter().enumerate() {
        if !left_ids.contains(&child.id) {
            records.push(ChangeRecord::ChildAdded {
                index,
                child: child.clone(),
            });
        }
    }

    let shifts = compute_index_shifts(&left_ids, &right_ids);
    for (index, id) in left_ids.iter().enumerate() {
        if shifts.contains_key(id) {
            // shifted survivors always exist on both sides
            if let Some(new_index) = right_ids.iter().position(|r| r == id) {
                records.push(ChangeRecord::ChildIndexChanged {
                    child: *id,
                    old_index: index,
                    new_index,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use arbor_tree::{BasicNode, ObjectNode};
    use arbor_types::{ListValue, PropertyValue, ScalarValue};

    use super::*;

    fn assembly() -> BasicNode {
        let mut root = BasicNode::new("Assembly", "root")
            .with_property(PropertyData::scalar("mass", ScalarValue::Double(12.5)))
            .with_property(PropertyData::scalar("count", ScalarValue::Int(3)))
            .with_property(PropertyData::scalar("visible", ScalarValue::Bool(true)))
            .with_property(PropertyData::scalar("label", ScalarValue::Str("hub".into())))
            .with_property(PropertyData::list(
                "samples",
                ListValue::Double(vec![1.0, 2.0]),
            ));
        root.append_child(Box::new(BasicNode::new("Part", "wing")));
        root.append_child(Box::new(BasicNode::new("Part", "tail")));
        root
    }

    fn set_scalar(node: &mut BasicNode, name: &str, value: ScalarValue) {
        node.find_property_mut(name)
            .unwrap()
            .set_value(PropertyValue::Scalar(value));
    }

    #[test]
    fn identical_snapshots_diff_empty() {
        let tree = assembly();
        let a = ObjectMemento::capture(&tree);
        let b = ObjectMemento::capture(&tree);
        assert!(diff(&a, &b).unwrap().is_empty());
    }

    #[test]
    fn different_roots_are_rejected() {
        let a = ObjectMemento::capture(&assembly());
        let b = ObjectMemento::capture(&assembly());
        assert!(matches!(
            diff(&a, &b),
            Err(DiffError::IdentityMismatch { .. })
        ));
    }

    #[test]
    fn null_snapshot_is_rejected() {
        let a = ObjectMemento::capture(&assembly());
        let null = ObjectMemento::new("Assembly", NodeId::nil(), "root");
        assert!(matches!(diff(&a, &null), Err(DiffError::NullMemento)));
        assert!(matches!(diff(&null, &a), Err(DiffError::NullMemento)));
    }

    #[test]
    fn scalar_property_changes_for_every_type() {
        let mut tree = assembly();
        let before = ObjectMemento::capture(&tree);
        set_scalar(&mut tree, "mass", ScalarValue::Double(13.0));
        set_scalar(&mut tree, "count", ScalarValue::Int(4));
        set_scalar(&mut tree, "visible", ScalarValue::Bool(false));
        set_scalar(&mut tree, "label", ScalarValue::Str("spoke".into()));
        let after = ObjectMemento::capture(&tree);

        let diff = diff(&before, &after).unwrap();
        assert_eq!(diff.len(), 1);
        let records = &diff.groups[0].records;
        assert_eq!(records.len(), 4);
        let mass = records
            .iter()
            .find_map(|r| match r {
                ChangeRecord::PropertyChanged { name, value, .. } if name == "mass" => {
                    value.clone()
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(mass, ("12.5".to_owned(), "13".to_owned()));
    }

    #[test]
    fn single_property_change_yields_single_record() {
        let mut tree = BasicNode::new("Point", "p")
            .with_property(PropertyData::scalar("x", ScalarValue::Double(1.0)));
        let before = ObjectMemento::capture(&tree);
        set_scalar(&mut tree, "x", ScalarValue::Double(2.0));
        let after = ObjectMemento::capture(&tree);

        let diff = diff(&before, &after).unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.groups[0].target, tree.id());
        assert_eq!(diff.groups[0].records.len(), 1);
        match &diff.groups[0].records[0] {
            ChangeRecord::PropertyChanged { name, value, .. } => {
                assert_eq!(name, "x");
                assert_eq!(value.as_ref().unwrap(), &("1".to_owned(), "2".to_owned()));
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn first_child_added_to_childless_parent() {
        let mut tree = BasicNode::new("Group", "g");
        let before = ObjectMemento::capture(&tree);
        tree.append_child(Box::new(BasicNode::new("Part", "c")));
        let after = ObjectMemento::capture(&tree);

        let diff = diff(&before, &after).unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.groups[0].records.len(), 1);
        assert!(matches!(
            &diff.groups[0].records[0],
            ChangeRecord::ChildAdded { index: 0, child } if child.id == tree.children()[0].id()
        ));
    }

    #[test]
    fn list_property_change() {
        let mut tree = assembly();
        let before = ObjectMemento::capture(&tree);
        tree.find_property_mut("samples")
            .unwrap()
            .set_value(PropertyValue::List(ListValue::Double(vec![1.0, 2.0, 3.0])));
        let after = ObjectMemento::capture(&tree);

        let diff = diff(&before, &after).unwrap();
        match &diff.groups[0].records[0] {
            ChangeRecord::PropertyChanged {
                name,
                is_list,
                value,
                ..
            } => {
                assert_eq!(name, "samples");
                assert!(*is_list);
                assert_eq!(
                    value.as_ref().unwrap(),
                    &("1;2".to_owned(), "1;2;3".to_owned())
                );
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn active_flag_change_without_value_change() {
        let mut tree = BasicNode::new("C", "n").with_property(
            PropertyData::scalar("opt", ScalarValue::Int(1)).optional(true),
        );
        let before = ObjectMemento::capture(&tree);
        tree.find_property_mut("opt").unwrap().set_active(false);
        let after = ObjectMemento::capture(&tree);

        let diff = diff(&before, &after).unwrap();
        match &diff.groups[0].records[0] {
            ChangeRecord::PropertyChanged { value, active, .. } => {
                assert!(value.is_none());
                assert_eq!(*active, Some((true, false)));
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn display_name_change_is_an_attribute_record() {
        let mut tree = assembly();
        let before = ObjectMemento::capture(&tree);
        tree.set_name("renamed");
        let after = ObjectMemento::capture(&tree);

        let diff = diff(&before, &after).unwrap();
        match &diff.groups[0].records[0] {
            ChangeRecord::AttributeChanged { attr, old, new } => {
                assert_eq!(attr, "name");
                assert_eq!(old, "root");
                assert_eq!(new, "renamed");
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn child_added_and_removed() {
        let mut tree = assembly();
        let before = ObjectMemento::capture(&tree);
        tree.remove_child(0).unwrap();
        tree.append_child(Box::new(BasicNode::new("Part", "fin")));
        let after = ObjectMemento::capture(&tree);

        let diff = diff(&before, &after).unwrap();
        assert!(diff.has_tree_changes());
        let records = &diff.groups[0].records;
        assert!(records.iter().any(|r| matches!(
            r,
            ChangeRecord::ChildAdded { index: 1, child } if child.ident == "fin"
        )));
        assert!(records.iter().any(|r| matches!(
            r,
            ChangeRecord::ChildRemoved { index: 0, child } if child.ident == "wing"
        )));
        // tail stays at net position; no index record
        assert!(!records
            .iter()
            .any(|r| matches!(r, ChangeRecord::ChildIndexChanged { .. })));
    }

    #[test]
    fn child_swap_emits_index_records_only() {
        let mut tree = assembly();
        let before = ObjectMemento::capture(&tree);
        let first = tree.remove_child(0).unwrap();
        tree.append_child(first);
        let after = ObjectMemento::capture(&tree);

        let diff = diff(&before, &after).unwrap();
        let records = &diff.groups[0].records;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| matches!(
            r,
            ChangeRecord::ChildIndexChanged { .. }
        )));
    }

    #[test]
    fn modified_grandchild_groups_come_first() {
        let mut child = BasicNode::new("Part", "wing");
        child.append_child(Box::new(
            BasicNode::new("Part", "tip")
                .with_property(PropertyData::scalar("len", ScalarValue::Double(1.0))),
        ));
        let mut root = BasicNode::new("Assembly", "root");
        root.append_child(Box::new(child));

        let before = ObjectMemento::capture(&root);
        let tip_id = root.children()[0].children()[0].id();
        root.children_mut()[0].children_mut()[0]
            .find_property_mut("len")
            .unwrap()
            .set_value(PropertyValue::Scalar(ScalarValue::Double(2.0)));
        root.set_name("renamed");
        let after = ObjectMemento::capture(&root);

        let diff = diff(&before, &after).unwrap();
        assert_eq!(diff.len(), 2);
        assert_eq!(diff.groups[0].target, tip_id);
        assert_eq!(diff.groups[1].target, root.id());
    }

    #[test]
    fn container_entry_lifecycle() {
        let entry = |name: &str, factor: f64| {
            PropertyData::structure(name, "Stage")
                .with_child(PropertyData::scalar("factor", ScalarValue::Double(factor)))
        };
        let mut tree = BasicNode::new("Assembly", "root").with_container(
            PropertyData::structure("stages", "Stage[]")
                .with_child(entry("a", 1.0))
                .with_child(entry("b", 2.0)),
        );
        let before = ObjectMemento::capture(&tree);

        let container = tree.find_container_mut("stages").unwrap();
        container.children.remove(0);
        container.children[0].children[0]
            .set_value(PropertyValue::Scalar(ScalarValue::Double(9.0)));
        container.children.push(entry("c", 3.0));
        let after = ObjectMemento::capture(&tree);

        let diff = diff(&before, &after).unwrap();
        let records = &diff.groups[0].records;
        assert!(records.iter().any(|r| matches!(
            r,
            ChangeRecord::ContainerEntryRemoved { index: 0, entry, .. } if entry.name == "a"
        )));
        assert!(records.iter().any(|r| matches!(
            r,
            ChangeRecord::ContainerEntryAdded { index: 1, entry, .. } if entry.name == "c"
        )));
        assert!(records.iter().any(|r| matches!(
            r,
            ChangeRecord::ContainerEntryChanged { entry_id, changes, .. }
                if entry_id == "b" && changes.len() == 1
        )));
    }

    #[test]
    fn property_appearing_between_snapshots_is_ignored() {
        let tree = BasicNode::new("C", "n")
            .with_property(PropertyData::scalar("x", ScalarValue::Int(1)));
        let before = ObjectMemento::capture(&tree);

        let richer = BasicNode::new("C", "n")
            .with_property(PropertyData::scalar("x", ScalarValue::Int(1)))
            .with_property(PropertyData::scalar("y", ScalarValue::Int(2)));
        let mut after = ObjectMemento::capture(&richer);
        after.id = before.id;

        let diff = diff(&before, &after).unwrap();
        // the extra property itself produces no record, but the node hash
        // differs, so an empty-looking group never appears
        assert!(diff
            .groups
            .iter()
            .flat_map(|g| &g.records)
            .all(|r| !matches!(r, ChangeRecord::PropertyChanged { name, .. } if name == "y")));
    }
}
