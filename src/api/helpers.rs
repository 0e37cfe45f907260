//! Response builders for the gateway proxy envelope.
//!
//! Every response carries a JSON content type and a string body.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Wraps an already-serialized JSON body.
#[must_use]
pub fn json_response(status_code: u16, body: String) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "Content-Type": CONTENT_TYPE_JSON },
        "body": body
    })
}

/// Serializes `payload` as the body; a serialization failure becomes a 500.
#[must_use]
pub fn ok_json<T: Serialize + ?Sized>(status_code: u16, payload: &T) -> Value {
    match serde_json::to_string(payload) {
        Ok(body) => json_response(status_code, body),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            err_response(500, &format!("Internal error: {e}"))
        }
    }
}

/// Returns a `{"message": ...}` body.
#[must_use]
pub fn message_response(status_code: u16, message: &str) -> Value {
    json_response(status_code, json!({ "message": message }).to_string())
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json_response(status_code, json!({ "error": message }).to_string())
}
