//! The tagged property value union and its canonical textual encoding.
//!
//! Every value round-trips through a stable string form: scalars via a
//! full-precision display encoding, lists as `';'`-joined element
//! encodings, enumerations as the symbolic member name. The encoding is
//! what gets persisted, hashed, and carried inside diff records.

use serde::{Deserialize, Serialize};

use crate::digest::TreeHasher;
use crate::error::TypeError;

/// Element type of a homogeneous list property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListType {
    Bool,
    Int,
    Double,
    Str,
}

impl ListType {
    /// Canonical type-name string.
    pub fn type_name(&self) -> &'static str {
        match self {
            ListType::Bool => "bool",
            ListType::Int => "int",
            ListType::Double => "double",
            ListType::Str => "string",
        }
    }

    /// Map a type-name string back to the element type.
    pub fn parse_name(s: &str) -> Result<Self, TypeError> {
        match s {
            "bool" => Ok(ListType::Bool),
            "int" => Ok(ListType::Int),
            "double" => Ok(ListType::Double),
            "string" => Ok(ListType::Str),
            other => Err(TypeError::UnknownPropertyType(other.to_owned())),
        }
    }
}

/// A single scalar value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
}

impl ScalarValue {
    /// Canonical type-name string.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Bool(_) => "bool",
            ScalarValue::Int(_) => "int",
            ScalarValue::Double(_) => "double",
            ScalarValue::Str(_) => "string",
        }
    }

    /// Canonical textual encoding. Doubles use the shortest representation
    /// that parses back to the identical bit pattern, so no precision is
    /// lost on round-trip.
    pub fn encode(&self) -> String {
        match self {
            ScalarValue::Bool(b) => b.to_string(),
            ScalarValue::Int(i) => i.to_string(),
            ScalarValue::Double(d) => d.to_string(),
            ScalarValue::Str(s) => s.clone(),
        }
    }

    /// Decode a textual value as the named scalar type.
    pub fn parse(type_name: &str, text: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidValue {
            data_type: type_name.to_owned(),
            text: text.to_owned(),
        };
        match type_name {
            "bool" => text.parse().map(ScalarValue::Bool).map_err(|_| invalid()),
            "int" => text.parse().map(ScalarValue::Int).map_err(|_| invalid()),
            "double" => text.parse().map(ScalarValue::Double).map_err(|_| invalid()),
            "string" => Ok(ScalarValue::Str(text.to_owned())),
            other => Err(TypeError::UnknownPropertyType(other.to_owned())),
        }
    }
}

/// Ordered, homogeneous list of scalar elements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ListValue {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Double(Vec<f64>),
    Str(Vec<String>),
}

impl ListValue {
    /// The element type of this list.
    pub fn element_type(&self) -> ListType {
        match self {
            ListValue::Bool(_) => ListType::Bool,
            ListValue::Int(_) => ListType::Int,
            ListValue::Double(_) => ListType::Double,
            ListValue::Str(_) => ListType::Str,
        }
    }

    /// Canonical `';'`-joined encoding.
    pub fn encode(&self) -> String {
        fn join<T, F: Fn(&T) -> String>(items: &[T], f: F) -> String {
            items.iter().map(f).collect::<Vec<_>>().join(";")
        }
        match self {
            ListValue::Bool(v) => join(v, |b| b.to_string()),
            ListValue::Int(v) => join(v, |i| i.to_string()),
            ListValue::Double(v) => join(v, |d| d.to_string()),
            ListValue::Str(v) => v.join(";"),
        }
    }

    /// Decode a `';'`-joined encoding as a list of the given element type.
    ///
    /// Empty input decodes to an empty list for every element type; for
    /// `string` the encoding cannot distinguish `[]` from `[""]`, and both
    /// decode to the empty list, mirroring the hashing relaxation in
    /// [`PropertyData::hash`](crate::PropertyData::hash). Empty segments
    /// anywhere else are decode errors, not skippable filler.
    pub fn parse(element_type: ListType, text: &str) -> Result<Self, TypeError> {
        if text.is_empty() {
            return Ok(match element_type {
                ListType::Bool => ListValue::Bool(Vec::new()),
                ListType::Int => ListValue::Int(Vec::new()),
                ListType::Double => ListValue::Double(Vec::new()),
                ListType::Str => ListValue::Str(Vec::new()),
            });
        }
        let invalid = || TypeError::InvalidValue {
            data_type: element_type.type_name().to_owned(),
            text: text.to_owned(),
        };
        let parts = || text.split(';');
        match element_type {
            ListType::Bool => parts()
                .map(|p| p.parse().map_err(|_| invalid()))
                .collect::<Result<_, _>>()
                .map(ListValue::Bool),
            ListType::Int => parts()
                .map(|p| p.parse().map_err(|_| invalid()))
                .collect::<Result<_, _>>()
                .map(ListValue::Int),
            ListType::Double => parts()
                .map(|p| p.parse().map_err(|_| invalid()))
                .collect::<Result<_, _>>()
                .map(ListValue::Double),
            ListType::Str => Ok(ListValue::Str(parts().map(str::to_owned).collect())),
        }
    }
}

/// The value slot of a property: one of four kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Plain typed scalar.
    Scalar(ScalarValue),
    /// Enumerated value, stored as the symbolic member name.
    Enum { type_name: String, value: String },
    /// Homogeneous ordered list.
    List(ListValue),
    /// Nested structure. Members live in the owning
    /// [`PropertyData::children`](crate::PropertyData) vector.
    Struct { type_name: String },
}

impl PropertyValue {
    /// Canonical type-name string of this value.
    pub fn data_type(&self) -> &str {
        match self {
            PropertyValue::Scalar(s) => s.type_name(),
            PropertyValue::Enum { type_name, .. } => type_name,
            PropertyValue::List(l) => l.element_type().type_name(),
            PropertyValue::Struct { type_name } => type_name,
        }
    }

    /// Returns `true` for list values.
    pub fn is_list(&self) -> bool {
        matches!(self, PropertyValue::List(_))
    }

    /// Returns `true` for struct values.
    pub fn is_struct(&self) -> bool {
        matches!(self, PropertyValue::Struct { .. })
    }

    /// Canonical textual encoding; `None` for structs, which carry no data
    /// of their own.
    pub fn encode(&self) -> Option<String> {
        match self {
            PropertyValue::Scalar(s) => Some(s.encode()),
            PropertyValue::Enum { value, .. } => Some(value.clone()),
            PropertyValue::List(l) => Some(l.encode()),
            PropertyValue::Struct { .. } => None,
        }
    }

    /// Kind discriminator fed into the property hash.
    pub(crate) fn kind_tag(&self) -> u8 {
        match self {
            PropertyValue::Scalar(_) => 0,
            PropertyValue::Enum { .. } => 1,
            PropertyValue::List(_) => 2,
            PropertyValue::Struct { .. } => 3,
        }
    }

    /// Feed the encoded value into a hasher.
    ///
    /// Intentional relaxation carried over from the reference
    /// implementation: an empty string scalar contributes the same bytes as
    /// an absent value, and lists hash their joined encoding, so a string
    /// list `[]` agrees with `[""]`. Other types are not normalized.
    pub(crate) fn hash_into(&self, hasher: &mut TreeHasher) {
        match self {
            PropertyValue::Scalar(ScalarValue::Str(s)) if s.is_empty() => {}
            PropertyValue::Struct { .. } => {}
            other => {
                if let Some(encoded) = other.encode() {
                    hasher.update(encoded.as_bytes());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_encode_parse_roundtrip() {
        let cases = [
            ScalarValue::Bool(true),
            ScalarValue::Int(-42),
            ScalarValue::Double(0.30000000000000004),
            ScalarValue::Str("hello world".into()),
        ];
        for value in cases {
            let encoded = value.encode();
            let parsed = ScalarValue::parse(value.type_name(), &encoded).unwrap();
            assert_eq!(value, parsed);
        }
    }

    #[test]
    fn double_keeps_full_precision() {
        let value = ScalarValue::Double(1.0 / 3.0);
        let parsed = ScalarValue::parse("double", &value.encode()).unwrap();
        assert_eq!(value, parsed);
    }

    #[test]
    fn unknown_scalar_type_is_an_error() {
        assert!(matches!(
            ScalarValue::parse("quaternion", "1"),
            Err(TypeError::UnknownPropertyType(_))
        ));
    }

    #[test]
    fn invalid_scalar_text_is_an_error() {
        assert!(matches!(
            ScalarValue::parse("int", "three"),
            Err(TypeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn list_encode_parse_roundtrip() {
        let cases = [
            ListValue::Bool(vec![true, false, true]),
            ListValue::Int(vec![1, -2, 3]),
            ListValue::Double(vec![0.5, 1.25, -9.75]),
            ListValue::Str(vec!["a".into(), "b".into(), "c".into()]),
        ];
        for value in cases {
            let encoded = value.encode();
            let parsed = ListValue::parse(value.element_type(), &encoded).unwrap();
            assert_eq!(value, parsed);
        }
    }

    #[test]
    fn empty_list_roundtrip() {
        for ty in [ListType::Bool, ListType::Int, ListType::Double, ListType::Str] {
            let parsed = ListValue::parse(ty, "").unwrap();
            assert_eq!(parsed.encode(), "");
        }
    }

    #[test]
    fn empty_segments_in_numeric_lists_are_errors() {
        for text in ["1;;2", ";1", "1;"] {
            assert!(matches!(
                ListValue::parse(ListType::Int, text),
                Err(TypeError::InvalidValue { .. })
            ));
        }
        assert!(matches!(
            ListValue::parse(ListType::Bool, "true;;false"),
            Err(TypeError::InvalidValue { .. })
        ));
        assert!(matches!(
            ListValue::parse(ListType::Double, ";0.5"),
            Err(TypeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn string_list_keeps_interior_empty_segments() {
        let parsed = ListValue::parse(ListType::Str, "a;;b").unwrap();
        assert_eq!(
            parsed,
            ListValue::Str(vec!["a".into(), "".into(), "b".into()])
        );
    }

    #[test]
    fn struct_value_has_no_encoding() {
        let value = PropertyValue::Struct {
            type_name: "Entry".into(),
        };
        assert_eq!(value.encode(), None);
        assert_eq!(value.data_type(), "Entry");
    }

    #[test]
    fn enum_encodes_symbolic_name() {
        let value = PropertyValue::Enum {
            type_name: "Mode".into(),
            value: "Automatic".into(),
        };
        assert_eq!(value.encode().as_deref(), Some("Automatic"));
        assert_eq!(value.data_type(), "Mode");
    }
}
