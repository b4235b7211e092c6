//! Typed-field document representation.
//!
//! Wire shape of a single value:
//!
//! ```text
//! {"stringValue": "…"}
//! {"integerValue": "123"}               // decimal string; numbers accepted on read
//! {"arrayValue": {"values": [ … ]}}     // "values" may be absent
//! {"mapValue": {"fields": { … }}}       // "fields" may be absent
//! ```
//!
//! Decoding never fails. Anything that is not one of the shapes above
//! becomes [`FieldValue::Unsupported`], which every accessor treats as
//! absent.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// One typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Array(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
    /// Null, boolean, timestamp, malformed… anything this client does not model
    Unsupported,
}

impl FieldValue {
    /// Decode one wire value.
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(tagged) = value else {
            return Self::Unsupported;
        };

        if let Some(inner) = tagged.get("stringValue") {
            return match inner {
                Value::String(s) => Self::String(s.clone()),
                _ => Self::Unsupported,
            };
        }
        if let Some(inner) = tagged.get("integerValue") {
            return decode_integer(inner);
        }
        if let Some(inner) = tagged.get("doubleValue") {
            return decode_integer(inner);
        }
        if let Some(inner) = tagged.get("arrayValue") {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(Self::from_json).collect())
                .unwrap_or_default();
            return Self::Array(values);
        }
        if let Some(inner) = tagged.get("mapValue") {
            return Self::Map(decode_fields(inner.get("fields")));
        }

        Self::Unsupported
    }

    /// Encode as a wire value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => json!({ "stringValue": s }),
            Self::Integer(i) => json!({ "integerValue": i.to_string() }),
            Self::Array(values) => {
                let values: Vec<Value> = values.iter().map(Self::to_json).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Self::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
            Self::Unsupported => json!({ "nullValue": null }),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            Self::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }
}

fn decode_integer(value: &Value) -> FieldValue {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        _ => None,
    };
    parsed.map_or(FieldValue::Unsupported, FieldValue::Integer)
}

fn decode_fields(fields: Option<&Value>) -> BTreeMap<String, FieldValue> {
    fields
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .map(|(name, value)| (name.clone(), FieldValue::from_json(value)))
                .collect()
        })
        .unwrap_or_default()
}

fn encode_fields(fields: &BTreeMap<String, FieldValue>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect()
}

/// A remote document: resource name plus top-level fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Server-assigned resource name (read only)
    pub name: Option<String>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Decode a document body; a body without `fields` is an empty document.
    pub fn from_json(value: &Value) -> Self {
        Self {
            name: value.get("name").and_then(Value::as_str).map(str::to_string),
            fields: decode_fields(value.get("fields")),
        }
    }

    /// Encode the body of a full-document write.
    pub fn to_json(&self) -> Value {
        json!({ "fields": encode_fields(&self.fields) })
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn insert(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }
}
