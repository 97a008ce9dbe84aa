//! The change-record model: what a diff between two snapshots contains.

use serde::{Deserialize, Serialize};

use arbor_memento::ObjectMemento;
use arbor_tree::ObjectNode;
use arbor_types::{NodeId, PropertyData};

/// An ordered list of change groups describing how to get from one
/// snapshot to another.
///
/// Groups are ordered with modified descendants before their parents, so
/// replaying the groups front to back applies deep changes first. A diff
/// with no groups means the snapshots were identical.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MementoDiff {
    pub groups: Vec<ChangeGroup>,
}

/// All changes that target one node, addressed by its identity.
///
/// `ident` and `class_name` record the target as it looked on the left
/// side; replay resolves the target by `target` alone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeGroup {
    pub target: NodeId,
    pub ident: String,
    pub class_name: String,
    pub records: Vec<ChangeRecord>,
}

/// One atomic change inside a group. Every record carries both its old
/// and its new side, so the same record replays forward and backward.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChangeRecord {
    /// A node attribute changed; `attr` is `"name"` or `"class"`.
    AttributeChanged {
        attr: String,
        old: String,
        new: String,
    },
    /// A property's value and/or active flag changed. `value` holds the
    /// canonical old/new encodings; structs carry no encoding and diff
    /// through their container entries instead.
    PropertyChanged {
        name: String,
        data_type: String,
        is_list: bool,
        value: Option<(String, String)>,
        active: Option<(bool, bool)>,
    },
    /// A container gained an entry at `index`.
    ContainerEntryAdded {
        container: String,
        index: usize,
        entry: PropertyData,
    },
    /// A container lost the entry at `index`.
    ContainerEntryRemoved {
        container: String,
        index: usize,
        entry: PropertyData,
    },
    /// Members of a container entry changed; `changes` holds
    /// [`ChangeRecord::PropertyChanged`] records for the affected members.
    ContainerEntryChanged {
        container: String,
        entry_id: String,
        changes: Vec<ChangeRecord>,
    },
    /// A child subtree appeared at `index`; the full snapshot is embedded
    /// so replay can reconstruct it.
    ChildAdded { index: usize, child: ObjectMemento },
    /// The child subtree at `index` disappeared.
    ChildRemoved { index: usize, child: ObjectMemento },
    /// A surviving child moved from `old_index` to `new_index`, beyond
    /// what sibling insertions and removals already account for.
    ChildIndexChanged {
        child: NodeId,
        old_index: usize,
        new_index: usize,
    },
}

impl MementoDiff {
    /// A diff with no changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the diff contains no change groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of change groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if any record adds or removes a child subtree.
    pub fn has_tree_changes(&self) -> bool {
        self.groups.iter().flat_map(|g| &g.records).any(|r| {
            matches!(
                r,
                ChangeRecord::ChildAdded { .. } | ChangeRecord::ChildRemoved { .. }
            )
        })
    }

    /// Append another diff's groups, forming a multi-step diff that
    /// replays both in sequence.
    pub fn append(&mut self, other: MementoDiff) {
        self.groups.extend(other.groups);
    }

    /// Synthesize the diff for a child that was just added to `parent` in
    /// a live edit. Returns `None` when the child is not a direct child of
    /// the parent.
    pub fn child_add_branch(parent: &dyn ObjectNode, child: &dyn ObjectNode) -> Option<Self> {
        let index = parent.direct_child_index(&child.id())?;
        Some(Self::branch(
            parent,
            ChangeRecord::ChildAdded {
                index,
                child: ObjectMemento::capture(child),
            },
        ))
    }

    /// Synthesize the diff for a child that is about to be removed from
    /// `parent`. Returns `None` when the child is not a direct child of
    /// the parent.
    pub fn child_remove_branch(parent: &dyn ObjectNode, child: &dyn ObjectNode) -> Option<Self> {
        let index = parent.direct_child_index(&child.id())?;
        Some(Self::branch(
            parent,
            ChangeRecord::ChildRemoved {
                index,
                child: ObjectMemento::capture(child),
            },
        ))
    }

    fn branch(parent: &dyn ObjectNode, record: ChangeRecord) -> Self {
        Self {
            groups: vec![ChangeGroup {
                target: parent.id(),
                ident: parent.name().to_owned(),
                class_name: parent.class_name().to_owned(),
                records: vec![record],
            }],
        }
    }
}
