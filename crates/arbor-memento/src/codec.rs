//! Lossless mapping between [`ObjectMemento`] and a generic tree-structured
//! document element.
//!
//! [`TreeElement`] is deliberately format-agnostic: it is the shape an XML
//! or JSON layer serializes, with a fixed vocabulary of element names and
//! attributes. `to_element` and `from_element` are pure and inverse to each
//! other, so a decode of an encode reproduces the memento (and therefore
//! its hashes) exactly.

use serde::{Deserialize, Serialize};

use arbor_types::{ListType, ListValue, NodeId, PropertyData, PropertyValue, ScalarValue};

use crate::error::MementoError;
use crate::memento::ObjectMemento;

pub const OBJECT_TAG: &str = "object";
pub const OBJECT_LIST_TAG: &str = "objectlist";
pub const PROPERTY_TAG: &str = "property";
pub const PROPERTY_LIST_TAG: &str = "propertylist";
pub const CONTAINER_TAG: &str = "property-container";

const CLASS_ATTR: &str = "class";
const UUID_ATTR: &str = "uuid";
const NAME_ATTR: &str = "name";
const TYPE_ATTR: &str = "type";
const KIND_ATTR: &str = "kind";
const ACTIVE_ATTR: &str = "active";

const ENUM_KIND: &str = "enum";

/// One element of a tree-structured document: a name, ordered attributes,
/// optional text content, and ordered child elements.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<TreeElement>,
}

impl TreeElement {
    /// Create an empty element with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value of the same name.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Child elements with the given element name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TreeElement> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

impl ObjectMemento {
    /// Encode this memento as a document element.
    pub fn to_element(&self) -> TreeElement {
        let mut element = TreeElement::new(OBJECT_TAG);
        element.set_attr(CLASS_ATTR, &self.class_name);
        element.set_attr(UUID_ATTR, self.id.to_string());
        element.set_attr(NAME_ATTR, &self.ident);

        for property in &self.properties {
            element.children.push(property_to_element(property));
        }
        for container in &self.containers {
            let mut child = TreeElement::new(CONTAINER_TAG);
            child.set_attr(NAME_ATTR, &container.name);
            child.set_attr(TYPE_ATTR, container.data_type());
            for entry in &container.children {
                child.children.push(property_to_element(entry));
            }
            element.children.push(child);
        }
        if !self.children.is_empty() {
            let mut list = TreeElement::new(OBJECT_LIST_TAG);
            for child in &self.children {
                list.children.push(child.to_element());
            }
            element.children.push(list);
        }
        element
    }

    /// Decode a document element back into a memento.
    pub fn from_element(element: &TreeElement) -> Result<Self, MementoError> {
        if element.name != OBJECT_TAG {
            return Err(MementoError::MalformedDocument(format!(
                "expected <{OBJECT_TAG}> element, found <{}>",
                element.name
            )));
        }
        let class_name = require_attr(element, CLASS_ATTR)?;
        let uuid = require_attr(element, UUID_ATTR)?;
        let id = NodeId::parse(uuid)?;
        let ident = element.attr(NAME_ATTR).unwrap_or_default();

        let mut memento = ObjectMemento::new(class_name, id, ident);
        for child in &element.children {
            match child.name.as_str() {
                PROPERTY_TAG | PROPERTY_LIST_TAG => {
                    memento.properties.push(property_from_element(child)?);
                }
                CONTAINER_TAG => {
                    let name = require_attr(child, NAME_ATTR)?;
                    let type_name = require_attr(child, TYPE_ATTR)?;
                    let mut container = PropertyData::structure(name, type_name);
                    for entry in &child.children {
                        container.children.push(property_from_element(entry)?);
                    }
                    memento.containers.push(container);
                }
                OBJECT_LIST_TAG => {
                    for object in child.children_named(OBJECT_TAG) {
                        memento.children.push(ObjectMemento::from_element(object)?);
                    }
                }
                other => {
                    return Err(MementoError::MalformedDocument(format!(
                        "unexpected <{other}> element inside <{OBJECT_TAG}>"
                    )));
                }
            }
        }
        Ok(memento)
    }
}

fn require_attr<'a>(element: &'a TreeElement, name: &str) -> Result<&'a str, MementoError> {
    element.attr(name).ok_or_else(|| {
        MementoError::MalformedDocument(format!(
            "<{}> element missing `{name}` attribute",
            element.name
        ))
    })
}

fn property_to_element(property: &PropertyData) -> TreeElement {
    let mut element = match &property.value {
        PropertyValue::List(list) => {
            let mut element = TreeElement::new(PROPERTY_LIST_TAG);
            element.set_attr(NAME_ATTR, &property.name);
            element.set_attr(TYPE_ATTR, list.element_type().type_name());
            element.text = list.encode();
            element
        }
        PropertyValue::Struct { type_name } => {
            let mut element = TreeElement::new(PROPERTY_TAG);
            element.set_attr(NAME_ATTR, &property.name);
            element.set_attr(TYPE_ATTR, type_name);
            for member in &property.children {
                element.children.push(property_to_element(member));
            }
            element
        }
        PropertyValue::Enum { type_name, value } => {
            let mut element = TreeElement::new(PROPERTY_TAG);
            element.set_attr(NAME_ATTR, &property.name);
            element.set_attr(TYPE_ATTR, type_name);
            element.set_attr(KIND_ATTR, ENUM_KIND);
            element.text = value.clone();
            element
        }
        PropertyValue::Scalar(scalar) => {
            let mut element = TreeElement::new(PROPERTY_TAG);
            element.set_attr(NAME_ATTR, &property.name);
            element.set_attr(TYPE_ATTR, scalar.type_name());
            element.text = scalar.encode();
            element
        }
    };
    if property.is_optional {
        element.set_attr(ACTIVE_ATTR, property.is_active.to_string());
    }
    element
}

fn property_from_element(element: &TreeElement) -> Result<PropertyData, MementoError> {
    let name = require_attr(element, NAME_ATTR)?;
    let type_name = require_attr(element, TYPE_ATTR)?;

    let mut property = match element.name.as_str() {
        PROPERTY_LIST_TAG => {
            let element_type = ListType::parse_name(type_name)?;
            let list = ListValue::parse(element_type, &element.text)?;
            PropertyData::list(name, list)
        }
        PROPERTY_TAG => {
            if element.attr(KIND_ATTR) == Some(ENUM_KIND) {
                PropertyData::enumeration(name, type_name, element.text.clone())
            } else if is_scalar_type(type_name) {
                let scalar = ScalarValue::parse(type_name, &element.text)?;
                PropertyData::scalar(name, scalar)
            } else {
                let mut structure = PropertyData::structure(name, type_name);
                for member in &element.children {
                    structure.children.push(property_from_element(member)?);
                }
                structure
            }
        }
        other => {
            return Err(MementoError::MalformedDocument(format!(
                "expected property element, found <{other}>"
            )));
        }
    };
    if let Some(active) = element.attr(ACTIVE_ATTR) {
        let active = active.parse().map_err(|_| {
            MementoError::MalformedDocument(format!(
                "invalid `{ACTIVE_ATTR}` attribute on property `{}`",
                property.name
            ))
        })?;
        property = property.optional(active);
    }
    Ok(property)
}

fn is_scalar_type(type_name: &str) -> bool {
    matches!(type_name, "bool" | "int" | "double" | "string")
}
