//! # Canonical Schema Model
//!
//! The normalized form of a body schema after parsing: every `$ref` has been
//! replaced by an owned copy of its target and `nullable` has been flattened
//! away. Objects and arrays that accept `null` become
//! `OneOf[original, Null]`; primitives that accept `null` render their type
//! as the two-element array `[T, "null"]`.
//!
//! The model carries no behaviour beyond rendering itself as the JSON-Schema
//! document consumed by the evaluator.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// A validated, `$ref`-free schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalSchema {
    Object(ObjectSchema),
    Array(ArraySchema),
    String(StringSchema),
    Integer(IntegerSchema),
    Boolean(BooleanSchema),
    Float(FloatSchema),
    Null,
    OneOf(Vec<CanonicalSchema>),
}

/// `type: object` node.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    pub properties: BTreeMap<String, CanonicalSchema>,
    /// Always a subset of `properties` keys.
    pub required: BTreeSet<String>,
    pub additional_properties: AdditionalProperties,
}

/// Value of `additionalProperties`; absent in the document means `Allowed(false)`.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<CanonicalSchema>),
}

impl Default for AdditionalProperties {
    fn default() -> Self {
        Self::Allowed(false)
    }
}

/// `type: array` node.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub items: Box<CanonicalSchema>,
}

/// `type: string` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    /// Renders as `type: ["string", "null"]`.
    pub accepts_null: bool,
    pub enum_values: Option<Vec<String>>,
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
}

/// `type: integer` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegerSchema {
    pub accepts_null: bool,
    pub enum_values: Option<Vec<i64>>,
}

/// `type: boolean` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanSchema {
    pub accepts_null: bool,
    pub enum_values: Option<Vec<bool>>,
}

/// `type: float` node. Rendered as JSON-Schema `number`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatSchema {
    pub accepts_null: bool,
    pub enum_values: Option<Vec<f64>>,
}

impl CanonicalSchema {
    /// Wrap `self` so that `null` is also accepted.
    ///
    /// Objects, arrays and unions become `OneOf[self, Null]`; primitives
    /// widen their type to `[T, "null"]`.
    pub fn or_null(self) -> Self {
        match self {
            Self::String(mut s) => {
                s.accepts_null = true;
                Self::String(s)
            }
            Self::Integer(mut s) => {
                s.accepts_null = true;
                Self::Integer(s)
            }
            Self::Boolean(mut s) => {
                s.accepts_null = true;
                Self::Boolean(s)
            }
            Self::Float(mut s) => {
                s.accepts_null = true;
                Self::Float(s)
            }
            Self::Null => Self::Null,
            other => Self::OneOf(vec![other, Self::Null]),
        }
    }

    /// Render as a JSON-Schema document.
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::Object(object) => {
                let properties: Map<String, Value> = object
                    .properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.to_json_schema()))
                    .collect();
                let mut out = Map::new();
                out.insert("type".into(), json!("object"));
                out.insert("properties".into(), Value::Object(properties));
                // Draft 4 rejects an empty `required` array.
                if !object.required.is_empty() {
                    out.insert("required".into(), json!(object.required));
                }
                let additional = match &object.additional_properties {
                    AdditionalProperties::Allowed(flag) => Value::Bool(*flag),
                    AdditionalProperties::Schema(schema) => schema.to_json_schema(),
                };
                out.insert("additionalProperties".into(), additional);
                Value::Object(out)
            }
            Self::Array(array) => json!({
                "type": "array",
                "items": array.items.to_json_schema(),
            }),
            Self::String(s) => {
                let mut out = primitive("string", s.accepts_null);
                if let Some(values) = &s.enum_values {
                    out.insert("enum".into(), json!(values));
                }
                if let Some(pattern) = &s.pattern {
                    out.insert("pattern".into(), json!(pattern));
                }
                if let Some(min) = s.min_length {
                    out.insert("minLength".into(), json!(min));
                }
                Value::Object(out)
            }
            Self::Integer(s) => {
                let mut out = primitive("integer", s.accepts_null);
                if let Some(values) = &s.enum_values {
                    out.insert("enum".into(), json!(values));
                }
                Value::Object(out)
            }
            Self::Boolean(s) => {
                let mut out = primitive("boolean", s.accepts_null);
                if let Some(values) = &s.enum_values {
                    out.insert("enum".into(), json!(values));
                }
                Value::Object(out)
            }
            Self::Float(s) => {
                let mut out = primitive("number", s.accepts_null);
                if let Some(values) = &s.enum_values {
                    out.insert("enum".into(), json!(values));
                }
                Value::Object(out)
            }
            Self::Null => json!({"type": "null"}),
            Self::OneOf(branches) => json!({
                "oneOf": branches.iter().map(Self::to_json_schema).collect::<Vec<_>>(),
            }),
        }
    }
}

fn primitive(type_name: &str, accepts_null: bool) -> Map<String, Value> {
    let mut out = Map::new();
    let ty = if accepts_null {
        json!([type_name, "null"])
    } else {
        json!(type_name)
    };
    out.insert("type".into(), ty);
    out
}

impl Serialize for CanonicalSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_schema().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_object() -> CanonicalSchema {
        CanonicalSchema::Object(ObjectSchema {
            properties: BTreeMap::from([(
                "name".to_string(),
                CanonicalSchema::String(StringSchema::default()),
            )]),
            required: BTreeSet::from(["name".to_string()]),
            additional_properties: AdditionalProperties::default(),
        })
    }

    #[test]
    fn object_renders_closed_by_default() {
        assert_eq!(
            name_object().to_json_schema(),
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "required": ["name"],
                "additionalProperties": false,
            })
        );
    }

    #[test]
    fn empty_required_is_omitted() {
        let schema = CanonicalSchema::Object(ObjectSchema {
            properties: BTreeMap::new(),
            required: BTreeSet::new(),
            additional_properties: AdditionalProperties::Allowed(true),
        });
        let rendered = schema.to_json_schema();
        assert!(rendered.get("required").is_none());
        assert_eq!(rendered["additionalProperties"], json!(true));
    }

    #[test]
    fn nullable_object_becomes_one_of() {
        let rendered = name_object().or_null().to_json_schema();
        assert_eq!(rendered["oneOf"][1], json!({"type": "null"}));
        assert_eq!(rendered["oneOf"][0]["type"], json!("object"));
    }

    #[test]
    fn nullable_string_widens_type_and_keeps_siblings() {
        let schema = CanonicalSchema::String(StringSchema {
            pattern: Some("^[a-z]+$".into()),
            ..StringSchema::default()
        })
        .or_null();
        assert_eq!(
            schema.to_json_schema(),
            json!({"type": ["string", "null"], "pattern": "^[a-z]+$"})
        );
    }

    #[test]
    fn float_renders_as_number() {
        let schema = CanonicalSchema::Float(FloatSchema::default());
        assert_eq!(schema.to_json_schema(), json!({"type": "number"}));
    }

    #[test]
    fn clones_are_independent() {
        let original = name_object();
        let widened = original.clone().or_null();
        assert!(matches!(original, CanonicalSchema::Object(_)));
        assert!(matches!(widened, CanonicalSchema::OneOf(_)));
    }
}
