//! Tool-related types.

use super::ToolError;
use serde_json::{Map, Value};

/// Parsed named arguments for a tool call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(pub Map<String, Value>);

impl ToolArguments {
    /// Parse the raw payload from a tool call.
    ///
    /// A blank payload means no arguments. Anything else must be a JSON object.
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ToolError::InvalidInput(e.to_string()))?;
        Self::try_from(value)
    }

    /// Fetch a required string parameter.
    pub fn required_str(&self, key: &str) -> Result<&str, ToolError> {
        match self.0.get(key) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(ToolError::InvalidInput(format!(
                "parameter '{key}' must be a string, got {other}"
            ))),
            None => Err(ToolError::InvalidInput(format!(
                "missing required parameter '{key}'"
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Value> for ToolArguments {
    type Error = ToolError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(ToolError::InvalidInput(format!(
                "arguments must be an object, got {other}"
            ))),
        }
    }
}
