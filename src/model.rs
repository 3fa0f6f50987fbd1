use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One row of an entity table, including the store-assigned `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Record(Map<String, JsonValue>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(JsonValue::as_i64)
    }

    pub fn created_at(&self) -> Option<&str> {
        self.0.get("created_at").and_then(JsonValue::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(JsonValue::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: JsonValue) {
        self.0.insert(field.into(), value);
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
