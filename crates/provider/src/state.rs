//! Terraform State Values
//!
//! The host hands resource configuration and state around as a generic
//! value bag. This module holds that representation, its byte encoding,
//! and the per-field decoders used at the boundary to turn it into typed
//! models. Nothing past the boundary should touch `DynamicValue`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dynamic value that can be encoded/decoded from Terraform state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<DynamicValue>),
    Map(HashMap<String, DynamicValue>),
}

impl DynamicValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            DynamicValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DynamicValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, DynamicValue>> {
        match self {
            DynamicValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.as_map()?.get(key)
    }
}

impl Default for DynamicValue {
    fn default() -> Self {
        DynamicValue::Null
    }
}

/// Decode state bytes; an empty payload means the resource is absent
pub fn decode_dynamic_value(data: &[u8]) -> Result<DynamicValue> {
    if data.is_empty() {
        return Ok(DynamicValue::Null);
    }

    Ok(serde_json::from_slice(data)?)
}

/// Encode a value to state bytes
pub fn encode_dynamic_value(value: &DynamicValue) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Decode a required string attribute
pub fn required_string(value: &DynamicValue, field: &'static str) -> Result<String> {
    match value.get(field) {
        None | Some(DynamicValue::Null) => Err(Error::MissingField(field)),
        Some(DynamicValue::String(s)) => Ok(s.clone()),
        Some(_) => Err(Error::Decode {
            field,
            expected: "a string",
        }),
    }
}

/// Decode an optional string attribute; empty strings count as unset
pub fn optional_string(value: &DynamicValue, field: &'static str) -> Result<Option<String>> {
    match value.get(field) {
        None | Some(DynamicValue::Null) => Ok(None),
        Some(DynamicValue::String(s)) if s.is_empty() => Ok(None),
        Some(DynamicValue::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::Decode {
            field,
            expected: "a string",
        }),
    }
}

/// Decode an optional integer attribute
pub fn optional_int(value: &DynamicValue, field: &'static str) -> Result<Option<i64>> {
    match value.get(field) {
        None | Some(DynamicValue::Null) => Ok(None),
        Some(v @ DynamicValue::Number(_)) => v
            .as_i64()
            .map(Some)
            .ok_or(Error::Decode {
                field,
                expected: "a whole number",
            }),
        Some(_) => Err(Error::Decode {
            field,
            expected: "a whole number",
        }),
    }
}

/// Create a DynamicValue map with the given attributes
pub fn make_state(attrs: Vec<(&str, DynamicValue)>) -> DynamicValue {
    let mut map = HashMap::new();
    for (key, value) in attrs {
        map.insert(key.to_string(), value);
    }
    DynamicValue::Map(map)
}

/// Create a string DynamicValue
pub fn string_value(s: impl Into<String>) -> DynamicValue {
    DynamicValue::String(s.into())
}

/// Create a number DynamicValue from i64
pub fn int_value(n: i64) -> DynamicValue {
    DynamicValue::Number(serde_json::Number::from(n))
}

/// String value, or null when unset
pub fn optional_string_value(s: Option<&str>) -> DynamicValue {
    s.map(string_value).unwrap_or(DynamicValue::Null)
}

/// Number value, or null when unset
pub fn optional_int_value(n: Option<i64>) -> DynamicValue {
    n.map(int_value).unwrap_or(DynamicValue::Null)
}
