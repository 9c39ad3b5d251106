//! Serialization layer - convert operations to/from the JSON wire format

use crate::error::{Result, SyncError};
use crate::ot::{Attributes, TextOp, TextOperation};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Encode an operation as its JSON array form
pub fn encode_operation(operation: &TextOperation) -> Value {
    let mut items = Vec::with_capacity(operation.ops().len());

    for op in operation.ops() {
        if !op.has_empty_attributes() {
            if let Some(attributes) = op.attributes() {
                items.push(attributes_to_json(attributes));
            }
        }

        items.push(match op {
            TextOp::Retain { chars, .. } => Value::from(*chars),
            TextOp::Insert { text, .. } => Value::from(text.as_str()),
            TextOp::Delete { chars } => Value::from(-(*chars as i64)),
        });
    }

    if items.is_empty() {
        items.push(Value::from(0));
    }

    Value::Array(items)
}

/// Decode an operation from its JSON array form
pub fn decode_operation(value: &Value) -> Result<TextOperation> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid(format!("expected an array, got {}", value)))?;

    let mut operation = TextOperation::new();
    let mut pending: Option<Attributes> = None;

    for item in items {
        match item {
            Value::Object(map) => {
                if pending.is_some() {
                    return Err(invalid("two attribute objects in a row"));
                }
                pending = Some(attributes_from_json(map));
            }
            Value::String(text) => {
                operation.insert_with(text, pending.take().unwrap_or_default());
            }
            Value::Number(number) => {
                let n = number
                    .as_i64()
                    .ok_or_else(|| invalid(format!("{} is not an integer", number)))?;

                if n < 0 {
                    if pending.is_some() {
                        return Err(invalid("a delete cannot carry attributes"));
                    }
                    let count = n
                        .checked_neg()
                        .ok_or_else(|| invalid("delete length out of range"))?;
                    operation.try_delete(count)?;
                } else {
                    operation.try_retain(n, pending.take())?;
                }
            }
            other => return Err(invalid(format!("unexpected element {}", other))),
        }
    }

    if pending.is_some() {
        return Err(invalid("attributes are not followed by a retain or insert"));
    }

    Ok(operation)
}

/// Encode an operation to a JSON string
pub fn encode_message(operation: &TextOperation) -> Result<String> {
    Ok(serde_json::to_string(&encode_operation(operation))?)
}

/// Decode an operation from a JSON string
pub fn decode_message(text: &str) -> Result<TextOperation> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| invalid(format!("not valid JSON: {}", e)))?;
    decode_operation(&value)
}

impl TextOperation {
    /// JSON array form (see [`crate::protocol`])
    pub fn to_json(&self) -> Value {
        encode_operation(self)
    }

    pub fn from_json(value: &Value) -> Result<TextOperation> {
        decode_operation(value)
    }
}

impl Serialize for TextOperation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        encode_operation(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TextOperation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode_operation(&value).map_err(D::Error::custom)
    }
}

fn attributes_to_json(attributes: &Attributes) -> Value {
    Value::Object(
        attributes
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    )
}

fn attributes_from_json(map: &Map<String, Value>) -> Attributes {
    map.iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn invalid(message: impl Into<String>) -> SyncError {
    SyncError::InvalidOperation(format!("Malformed operation: {}", message.into()))
}
