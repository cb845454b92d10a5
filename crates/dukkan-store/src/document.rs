//! # Documents
//!
//! The raw unit of storage and the typed encode/decode helpers that keep
//! field-name drift out of the repositories.
//!
//! A document is a JSON object plus its store-assigned id. Repositories
//! never build field maps by hand: they serialize a typed value with
//! [`encode`] and read one back with [`Document::decode`], so the wire
//! names live in exactly one place (the serde renames on the domain types).

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// The fields of one document: a JSON object without its id.
pub type Fields = serde_json::Map<String, Value>;

/// A stored document: id plus fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned id (or caller-chosen for `set`, e.g. counter names).
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Document {
            id: id.into(),
            fields,
        }
    }

    /// Decodes into a typed value, injecting the document id under `"id"`.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        let mut object = self.fields.clone();
        object.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// Reads a single field, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Encodes a typed value into document fields.
///
/// The value must serialize to a JSON object; an `"id"` field, if any, is
/// stripped (ids live beside the fields, never inside them).
pub fn encode<T: Serialize>(value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        Value::Null => Err(StoreError::NotAnObject("null")),
        Value::Bool(_) => Err(StoreError::NotAnObject("bool")),
        Value::Number(_) => Err(StoreError::NotAnObject("number")),
        Value::String(_) => Err(StoreError::NotAnObject("string")),
        Value::Array(_) => Err(StoreError::NotAnObject("array")),
    }
}
