//! Structural shape inference for JSON documents
//!
//! A [`SchemaShape`] mirrors the nesting of a document but replaces every
//! primitive leaf with its type name. Arrays collapse to a single exemplar
//! taken from their first element, so heterogeneous arrays lose information.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Type tag of a primitive JSON leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Number,
    Boolean,
    Null,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Null => "null",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape descriptor derived from a JSON value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaShape {
    Primitive(PrimitiveType),
    /// Exemplar of the first element; `None` for an empty array.
    Array(Option<Box<SchemaShape>>),
    Object(BTreeMap<String, SchemaShape>),
}

/// Infer the shape of a JSON value.
///
/// # Example
/// ```
/// use jmc_core::infer;
/// use serde_json::json;
///
/// let shape = infer(&json!({"tags": ["a", "b"], "id": 7}));
/// assert_eq!(shape.to_string(), r#"{"id":"number","tags":["string"]}"#);
/// ```
pub fn infer(value: &Value) -> SchemaShape {
    match value {
        Value::Array(items) => {
            SchemaShape::Array(items.first().map(|first| Box::new(infer(first))))
        }
        Value::Object(map) => SchemaShape::Object(
            map.iter()
                .map(|(key, child)| (key.clone(), infer(child)))
                .collect(),
        ),
        Value::String(_) => SchemaShape::Primitive(PrimitiveType::String),
        Value::Number(_) => SchemaShape::Primitive(PrimitiveType::Number),
        Value::Bool(_) => SchemaShape::Primitive(PrimitiveType::Boolean),
        Value::Null => SchemaShape::Primitive(PrimitiveType::Null),
    }
}

impl SchemaShape {
    /// Convert the shape into its JSON representation.
    pub fn to_value(&self) -> Value {
        match self {
            SchemaShape::Primitive(ty) => Value::String(ty.name().to_string()),
            SchemaShape::Array(exemplar) => {
                Value::Array(exemplar.iter().map(|shape| shape.to_value()).collect())
            }
            SchemaShape::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, shape)| (key.clone(), shape.to_value()))
                    .collect(),
            ),
        }
    }
}

impl Serialize for SchemaShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SchemaShape::Primitive(ty) => serializer.serialize_str(ty.name()),
            SchemaShape::Array(exemplar) => {
                let mut seq = serializer.serialize_seq(Some(usize::from(exemplar.is_some())))?;
                if let Some(shape) = exemplar {
                    seq.serialize_element(shape.as_ref())?;
                }
                seq.end()
            }
            SchemaShape::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, shape) in fields {
                    map.serialize_entry(key, shape)?;
                }
                map.end()
            }
        }
    }
}

/// Compact JSON text, as embedded in generation prompts
impl fmt::Display for SchemaShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives() {
        assert_eq!(infer(&json!("x")).to_value(), json!("string"));
        assert_eq!(infer(&json!(1.5)).to_value(), json!("number"));
        assert_eq!(infer(&json!(-3)).to_value(), json!("number"));
        assert_eq!(infer(&json!(false)).to_value(), json!("boolean"));
    }

    #[test]
    fn test_null_is_own_tag() {
        assert_eq!(infer(&Value::Null), SchemaShape::Primitive(PrimitiveType::Null));
        assert_eq!(infer(&json!({"a": null})).to_string(), r#"{"a":"null"}"#);
    }

    #[test]
    fn test_array_uses_first_element() {
        let long = json!([{"x": 1}, {"y": "z"}, 3]);
        let short = json!([{"x": 2}]);
        assert_eq!(infer(&long), infer(&short));
        assert_eq!(infer(&long).to_value(), json!([{"x": "number"}]));
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(infer(&json!([])), SchemaShape::Array(None));
        assert_eq!(infer(&json!({"items": []})).to_string(), r#"{"items":[]}"#);
    }

    #[test]
    fn test_object_keeps_key_set() {
        let doc = json!({"name": "n", "tags": ["t"], "meta": {"ok": true}});
        let SchemaShape::Object(fields) = infer(&doc) else {
            unreachable!("object input must infer an object shape");
        };
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["meta", "name", "tags"]);
        for (key, shape) in &fields {
            assert_eq!(shape, &infer(&doc[key.as_str()]));
        }
    }

    #[test]
    fn test_nested_arrays() {
        assert_eq!(infer(&json!([[[true]]])).to_value(), json!([[["boolean"]]]));
        assert_eq!(infer(&json!([[], [1]])).to_value(), json!([[]]));
    }

    #[test]
    fn test_serialize_matches_to_value() {
        let shape = infer(&json!({"a": [{"b": 1, "c": [null]}], "d": "s"}));
        assert_eq!(serde_json::to_value(&shape).unwrap(), shape.to_value());
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(infer(&json!({})).to_string(), "{}");
    }
}
