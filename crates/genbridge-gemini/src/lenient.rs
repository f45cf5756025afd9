// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tolerant extraction of [`Content`] from loosely-typed JSON.
//!
//! Callers hand over histories that may contain foreign or half-built
//! elements. Only objects carrying a `parts` array survive; inside them,
//! parts that are not text, function calls, or function responses are
//! skipped. Nothing here returns an error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::types::{Content, Part, Role};

/// Extract every well-formed content element from a JSON array.
///
/// Non-array input yields an empty history.
#[must_use]
pub fn contents_from_value(value: &Value) -> Vec<Content> {
    let Some(items) = value.as_array() else {
        debug!(target: "genbridge.request", kind = json_kind(value), "contents is not an array");
        return Vec::new();
    };

    let contents: Vec<Content> = items.iter().filter_map(content_from_value).collect();
    if contents.len() != items.len() {
        debug!(
            target: "genbridge.request",
            dropped = items.len() - contents.len(),
            "dropped malformed content elements"
        );
    }
    contents
}

/// Parse one content element, or `None` if it has no `parts` array.
#[must_use]
pub fn content_from_value(value: &Value) -> Option<Content> {
    let obj = value.as_object()?;
    let parts = obj.get("parts")?.as_array()?;
    let role = obj
        .get("role")
        .and_then(Value::as_str)
        .map(Role::from_wire)
        .unwrap_or_default();
    Some(Content {
        role,
        parts: parts.iter().filter_map(part_from_value).collect(),
    })
}

/// Parse one part, ignoring any sibling keys (signatures, flags, ...).
#[must_use]
pub fn part_from_value(value: &Value) -> Option<Part> {
    let obj = value.as_object()?;

    if let Some(text) = obj.get("text").and_then(Value::as_str) {
        return Some(Part::Text(text.to_string()));
    }
    if let Some(call) = obj.get("functionCall").and_then(Value::as_object) {
        let name = call.get("name").and_then(Value::as_str)?;
        return Some(Part::FunctionCall {
            name: name.to_string(),
            args: call.get("args").cloned().unwrap_or(Value::Null),
        });
    }
    if let Some(resp) = obj.get("functionResponse").and_then(Value::as_object) {
        let name = resp.get("name").and_then(Value::as_str)?;
        return Some(Part::FunctionResponse {
            name: name.to_string(),
            response: resp.get("response").cloned().unwrap_or(Value::Null),
        });
    }
    None
}

/// `deserialize_with` hook used by request types.
pub(crate) fn deserialize_contents<'de, D>(deserializer: D) -> Result<Vec<Content>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(contents_from_value(&value))
}

/// `deserialize_with` hook for an optional single content such as
/// `systemInstruction`. Anything [`content_from_value`] rejects becomes `None`.
pub(crate) fn deserialize_optional_content<'de, D>(
    deserializer: D,
) -> Result<Option<Content>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let content = content_from_value(&value);
    if content.is_none() {
        debug!(target: "genbridge.request", kind = json_kind(&value), "dropped malformed system instruction");
    }
    Ok(content)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
