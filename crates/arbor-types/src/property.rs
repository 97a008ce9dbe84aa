//! Named property slots and the per-property content hash.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::digest::{Digest, TreeHasher};
use crate::value::{ListValue, PropertyValue, ScalarValue};

/// One named property of a node, a struct member, or a container entry.
///
/// A `PropertyData` is a snapshot-side value: once it is part of a captured
/// snapshot it is treated as immutable, and its content hash is computed
/// lazily and cached. Cloning resets the cache, so a clone that is later
/// mutated can never leak a stale digest.
#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyData {
    /// Unique key within the owning scope (node or struct entry).
    pub name: String,
    /// Whether this property may be toggled off entirely.
    pub is_optional: bool,
    /// Whether an optional property is currently enabled.
    pub is_active: bool,
    /// The value slot.
    pub value: PropertyValue,
    /// Struct members, or container entries for a container property.
    pub children: Vec<PropertyData>,
    #[serde(skip)]
    hash: OnceLock<Digest>,
}

impl PropertyData {
    /// Create a scalar property, active and non-optional.
    pub fn scalar(name: impl Into<String>, value: ScalarValue) -> Self {
        Self::with_value(name, PropertyValue::Scalar(value))
    }

    /// Create an enumeration property.
    pub fn enumeration(
        name: impl Into<String>,
        type_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::with_value(
            name,
            PropertyValue::Enum {
                type_name: type_name.into(),
                value: value.into(),
            },
        )
    }

    /// Create a list property.
    pub fn list(name: impl Into<String>, value: ListValue) -> Self {
        Self::with_value(name, PropertyValue::List(value))
    }

    /// Create a struct property; members go into `children`.
    pub fn structure(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::with_value(
            name,
            PropertyValue::Struct {
                type_name: type_name.into(),
            },
        )
    }

    /// Create a property from an arbitrary value slot.
    pub fn with_value(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            name: name.into(),
            is_optional: false,
            is_active: true,
            value,
            children: Vec::new(),
            hash: OnceLock::new(),
        }
    }

    /// Mark the property optional with the given active state (builder).
    pub fn optional(mut self, active: bool) -> Self {
        self.is_optional = true;
        self.is_active = active;
        self
    }

    /// Append a struct member (builder).
    pub fn with_child(mut self, child: PropertyData) -> Self {
        self.children.push(child);
        self
    }

    /// Canonical type-name string of the value.
    pub fn data_type(&self) -> &str {
        self.value.data_type()
    }

    /// Replace the value slot, discarding any cached hash.
    pub fn set_value(&mut self, value: PropertyValue) {
        self.value = value;
        self.hash = OnceLock::new();
    }

    /// Set the active state, discarding any cached hash.
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.hash = OnceLock::new();
    }

    /// Content hash of this property.
    ///
    /// Covers name, optional/active flags, data type, a kind discriminator,
    /// the encoded value, and (recursively) every child property's hash.
    /// Computed once and cached; repeated calls are free and always return
    /// the same digest for unmodified data.
    pub fn hash(&self) -> &Digest {
        self.hash.get_or_init(|| {
            let mut hasher = TreeHasher::property();
            hasher
                .update_str(&self.name)
                .update_bool(self.is_optional)
                .update_bool(self.is_active)
                .update_str(self.value.data_type())
                .update_u8(self.value.kind_tag());
            self.value.hash_into(&mut hasher);
            for child in &self.children {
                hasher.update_digest(child.hash());
            }
            hasher.finalize()
        })
    }
}

impl Clone for PropertyData {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            is_optional: self.is_optional,
            is_active: self.is_active,
            value: self.value.clone(),
            children: self.children.clone(),
            hash: OnceLock::new(),
        }
    }
}

impl PartialEq for PropertyData {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.is_optional == other.is_optional
            && self.is_active == other.is_active
            && self.value == other.value
            && self.children == other.children
    }
}

/// Find a property by name in a list.
pub fn find_property<'a>(list: &'a [PropertyData], name: &str) -> Option<&'a PropertyData> {
    list.iter().find(|p| p.name == name)
}

/// Find a property by name in a list, mutably.
pub fn find_property_mut<'a>(
    list: &'a mut [PropertyData],
    name: &str,
) -> Option<&'a mut PropertyData> {
    list.iter_mut().find(|p| p.name == name)
}
