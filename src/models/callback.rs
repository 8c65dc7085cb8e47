// models/callback.rs
use serde_json::{Map, Value};

use crate::errors::{AppError, Result};

/// Key under which some gateway deliveries nest the real result fields.
pub const NESTED_KEY: &str = "response";

/// The untyped body of a PayHero STK-push result callback.
///
/// PayHero sometimes delivers the result fields at the top level and sometimes under
/// `response`; no field is guaranteed to exist or to have the expected type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundCallback {
    raw: Map<String, Value>,
}

impl InboundCallback {
    pub fn new(raw: Map<String, Value>) -> Self {
        InboundCallback { raw }
    }

    /// Parses a request body. Anything other than a JSON object is rejected.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(raw) => Ok(Self::new(raw)),
            other => Err(AppError::malformed(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// The object under `response`, when that key holds an object.
    pub fn nested(&self) -> Option<&Map<String, Value>> {
        self.raw.get(NESTED_KEY).and_then(Value::as_object)
    }

    /// Lookup sources in priority order: nested payload first, then the top level.
    pub fn sources(&self) -> Vec<&Map<String, Value>> {
        let mut sources = Vec::with_capacity(2);
        if let Some(nested) = self.nested() {
            sources.push(nested);
        }
        sources.push(&self.raw);
        sources
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
