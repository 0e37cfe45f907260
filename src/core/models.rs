use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One employee row. Missing JSON fields fall back to their defaults so the
/// validator, not the deserializer, reports what is wrong with a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Employee {
    /// Assigned by the store; ignored on create, overridden by the path on update.
    #[serde(deserialize_with = "lenient_id")]
    pub id: i32,
    pub name: String,
    pub position: String,
    pub salary: f64,
    pub hire_date: String,
    pub department: String,
}

impl Employee {
    #[must_use]
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }
}

// Callers never choose the id, so null, strings and out-of-range numbers read as 0.
fn lenient_id<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let id = match raw {
        Some(Value::Number(n)) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<i32>().ok(),
        _ => None,
    };
    Ok(id.unwrap_or(0))
}
