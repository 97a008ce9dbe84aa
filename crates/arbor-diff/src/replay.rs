//! Replaying change groups against a live tree, forward and backward.

use tracing::{debug, warn};

use arbor_tree::{find_node_mut, ObjectFactory, ObjectNode};
use arbor_types::{
    find_property_mut, ListType, ListValue, NodeId, PropertyData, PropertyValue, ScalarValue,
    TypeError,
};

use crate::error::ReplayError;
use crate::model::{ChangeRecord, MementoDiff};

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn pick<'a, T: ?Sized>(&self, old: &'a T, new: &'a T) -> &'a T {
        match self {
            Direction::Forward => new,
            Direction::Backward => old,
        }
    }

    fn forward(&self) -> bool {
        matches!(self, Direction::Forward)
    }
}

/// Replay a diff forward, transforming the tree the diff's left snapshot
/// describes into its right snapshot.
///
/// Replay is not transactional: on error the tree may already be partially
/// mutated and must be discarded by the caller.
pub fn apply(
    diff: &MementoDiff,
    root: &mut dyn ObjectNode,
    factory: &dyn ObjectFactory,
) -> Result<(), ReplayError> {
    replay(diff, root, factory, Direction::Forward)
}

/// Replay a diff backward, undoing a previous [`apply`]. Groups and
/// records run in reverse order with every old/new orientation swapped,
/// so `revert` is the exact inverse of `apply`.
pub fn revert(
    diff: &MementoDiff,
    root: &mut dyn ObjectNode,
    factory: &dyn ObjectFactory,
) -> Result<(), ReplayError> {
    replay(diff, root, factory, Direction::Backward)
}

fn replay(
    diff: &MementoDiff,
    root: &mut dyn ObjectNode,
    factory: &dyn ObjectFactory,
    direction: Direction,
) -> Result<(), ReplayError> {
    let mut groups: Vec<_> = diff.groups.iter().collect();
    if !direction.forward() {
        groups.reverse();
    }
    for group in groups {
        let target = find_node_mut(root, &group.target)
            .ok_or(ReplayError::UnresolvedIdentity(group.target))?;
        if direction.forward() {
            for record in &group.records {
                replay_record(record, target, factory, direction)?;
            }
        } else {
            // The recorded indices of removal and move records are only
            // valid against a sibling list with full left-side membership.
            // The backward pass therefore mirrors the forward phases:
            // value changes and deletions of added subtrees run reversed,
            // removed subtrees re-insert at their recorded indices front
            // to back, and survivor moves replay last, ordered by the
            // position the forward pass put them at.
            for record in group.records.iter().rev() {
                if !is_insertion_inverse(record) && !is_index_move(record) {
                    replay_record(record, target, factory, direction)?;
                }
            }
            for record in group.records.iter().filter(|r| is_insertion_inverse(r)) {
                replay_record(record, target, factory, direction)?;
            }
            let mut moves: Vec<&ChangeRecord> =
                group.records.iter().filter(|r| is_index_move(r)).collect();
            moves.sort_by_key(|r| match r {
                ChangeRecord::ChildIndexChanged { new_index, .. } => *new_index,
                _ => 0,
            });
            for record in moves {
                replay_record(record, target, factory, direction)?;
            }
        }
        target.on_merged();
    }
    Ok(())
}

fn is_insertion_inverse(record: &ChangeRecord) -> bool {
    matches!(
        record,
        ChangeRecord::ChildRemoved { .. } | ChangeRecord::ContainerEntryRemoved { .. }
    )
}

fn is_index_move(record: &ChangeRecord) -> bool {
    matches!(record, ChangeRecord::ChildIndexChanged { .. })
}

fn replay_record(
    record: &ChangeRecord,
    target: &mut dyn ObjectNode,
    factory: &dyn ObjectFactory,
    direction: Direction,
) -> Result<(), ReplayError> {
    match record {
        ChangeRecord::AttributeChanged { attr, old, new } => {
            if attr == "name" {
                target.set_name(direction.pick(old.as_str(), new.as_str()));
            } else {
                debug!(attr = %attr, "attribute change cannot be replayed in place, ignored");
            }
            Ok(())
        }
        ChangeRecord::PropertyChanged {
            name,
            data_type,
            is_list,
            value,
            active,
        } => {
            let text = value.as_ref().map(|(old, new)| direction.pick(old, new));
            match target.find_property_mut(name) {
                Some(live) => {
                    if let Some(text) = text {
                        live.set_value(parse_value(data_type, *is_list, text)?);
                    }
                    if let Some((old, new)) = active {
                        live.set_active(*direction.pick(old, new));
                    }
                }
                None => {
                    let accepted = match text {
                        Some(text) => target.set_attr(name, text),
                        None => false,
                    };
                    if !accepted {
                        warn!(property = %name, "property unknown to target node, skipped");
                    }
                }
            }
            Ok(())
        }
        ChangeRecord::ChildAdded { index, child } => {
            if direction.forward() {
                target.insert_child(*index, child.restore(factory));
                Ok(())
            } else {
                detach_child(target, &child.id).map(drop)
            }
        }
        ChangeRecord::ChildRemoved { index, child } => {
            if direction.forward() {
                detach_child(target, &child.id).map(drop)
            } else {
                target.insert_child(*index, child.restore(factory));
                Ok(())
            }
        }
        ChangeRecord::ChildIndexChanged {
            child,
            old_index,
            new_index,
        } => {
            let node = detach_child(target, child)?;
            target.insert_child(*direction.pick(old_index, new_index), node);
            Ok(())
        }
        ChangeRecord::ContainerEntryAdded {
            container,
            index,
            entry,
        } => {
            if direction.forward() {
                insert_entry(target, container, *index, entry)
            } else {
                remove_entry(target, container, &entry.name)
            }
        }
        ChangeRecord::ContainerEntryRemoved {
            container,
            index,
            entry,
        } => {
            if direction.forward() {
                remove_entry(target, container, &entry.name)
            } else {
                insert_entry(target, container, *index, entry)
            }
        }
        ChangeRecord::ContainerEntryChanged {
            container,
            entry_id,
            changes,
        } => {
            let live = find_container(target, container)?;
            let entry = find_property_mut(&mut live.children, entry_id).ok_or_else(|| {
                ReplayError::UnknownEntry {
                    container: container.clone(),
                    entry: entry_id.clone(),
                }
            })?;
            for change in changes {
                apply_member_change(&mut entry.children, change, direction)?;
            }
            Ok(())
        }
    }
}

fn parse_value(data_type: &str, is_list: bool, text: &str) -> Result<PropertyValue, ReplayError> {
    if is_list {
        let element_type = ListType::parse_name(data_type)?;
        return Ok(PropertyValue::List(ListValue::parse(element_type, text)?));
    }
    match ScalarValue::parse(data_type, text) {
        Ok(scalar) => Ok(PropertyValue::Scalar(scalar)),
        Err(TypeError::UnknownPropertyType(_)) => Ok(PropertyValue::Enum {
            type_name: data_type.to_owned(),
            value: text.to_owned(),
        }),
        Err(err) => Err(err.into()),
    }
}

fn detach_child(
    target: &mut dyn ObjectNode,
    id: &NodeId,
) -> Result<Box<dyn ObjectNode>, ReplayError> {
    let index = target
        .direct_child_index(id)
        .ok_or(ReplayError::UnresolvedIdentity(*id))?;
    target
        .remove_child(index)
        .ok_or(ReplayError::UnresolvedIdentity(*id))
}

fn find_container<'a>(
    target: &'a mut dyn ObjectNode,
    name: &str,
) -> Result<&'a mut PropertyData, ReplayError> {
    target
        .find_container_mut(name)
        .ok_or_else(|| ReplayError::UnknownContainer(name.to_owned()))
}

fn insert_entry(
    target: &mut dyn ObjectNode,
    container: &str,
    index: usize,
    entry: &PropertyData,
) -> Result<(), ReplayError> {
    let live = find_container(target, container)?;
    let len = live.children.len();
    if index > len {
        return Err(ReplayError::IndexOutOfRange { index, len });
    }
    live.children.insert(index, entry.clone());
    Ok(())
}

fn remove_entry(
    target: &mut dyn ObjectNode,
    container: &str,
    entry_name: &str,
) -> Result<(), ReplayError> {
    let live = find_container(target, container)?;
    let position = live
        .children
        .iter()
        .position(|e| e.name == entry_name)
        .ok_or_else(|| ReplayError::UnknownEntry {
            container: container.to_owned(),
            entry: entry_name.to_owned(),
        })?;
    live.children.remove(position);
    Ok(())
}

fn apply_member_change(
    members: &mut [PropertyData],
    record: &ChangeRecord,
    direction: Direction,
) -> Result<(), ReplayError> {
    let ChangeRecord::PropertyChanged {
        name,
        data_type,
        is_list,
        value,
        active,
    } = record
    else {
        return Err(ReplayError::MalformedRecord(
            "container entry changes may only carry property changes".to_owned(),
        ));
    };
    match find_property_mut(members, name) {
        Some(member) => {
            if let Some((old, new)) = value {
                member.set_value(parse_value(data_type, *is_list, direction.pick(old, new))?);
            }
            if let Some((old, new)) = active {
                member.set_active(*direction.pick(old, new));
            }
        }
        None => warn!(member = %name, "member unknown to container entry, skipped"),
    }
    Ok(())
}
