use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::errors::EmployeeError;

/// The parts of a gateway proxy event the router looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyRequest {
    pub method: String,
    /// Path without the leading slash, e.g. `employees/42`.
    pub path: Option<String>,
    pub body: Option<String>,
}

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// Reads a REST (v1) or HTTP API (v2) proxy event.
///
/// # Errors
///
/// Returns an error if the body is flagged base64 but does not decode to UTF-8.
pub fn parse_proxy_request(payload: &Value) -> Result<ProxyRequest, EmployeeError> {
    let method = v_str(payload, &["httpMethod"])
        .or_else(|| v_str(payload, &["requestContext", "http", "method"]))
        .unwrap_or_default()
        .to_ascii_uppercase();

    let path = v_str(payload, &["pathParameters", "proxy"])
        .or_else(|| v_str(payload, &["rawPath"]))
        .or_else(|| v_str(payload, &["path"]))
        .map(|p| p.trim_start_matches('/').to_string());

    let encoded = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let body = match v_str(payload, &["body"]) {
        Some(raw) if encoded => Some(decode_base64_body(raw)?),
        Some(raw) => Some(raw.to_string()),
        None => None,
    };

    Ok(ProxyRequest { method, path, body })
}

fn decode_base64_body(raw: &str) -> Result<String, EmployeeError> {
    let bytes = STANDARD
        .decode(raw)
        .map_err(|e| EmployeeError::Validation(format!("invalid base64 body: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| EmployeeError::Validation(format!("body is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rest_proxy_event() {
        let event = json!({
            "path": "/employees/3",
            "httpMethod": "PUT",
            "pathParameters": { "proxy": "employees/3" },
            "body": "{\"name\":\"x\"}"
        });
        let req = parse_proxy_request(&event).unwrap();
        assert_eq!(req.method, "PUT");
        assert_eq!(req.path.as_deref(), Some("employees/3"));
        assert_eq!(req.body.as_deref(), Some("{\"name\":\"x\"}"));
    }

    #[test]
    fn test_http_api_event() {
        let event = json!({
            "rawPath": "/employees/salary/top",
            "requestContext": { "http": { "method": "get" } }
        });
        let req = parse_proxy_request(&event).unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path.as_deref(), Some("employees/salary/top"));
        assert!(req.body.is_none());
    }

    #[test]
    fn test_base64_body() {
        let event = json!({
            "httpMethod": "POST",
            "path": "/employees",
            "isBase64Encoded": true,
            "body": STANDARD.encode("{\"salary\":1}")
        });
        let req = parse_proxy_request(&event).unwrap();
        assert_eq!(req.body.as_deref(), Some("{\"salary\":1}"));

        let bad = json!({ "isBase64Encoded": true, "body": "***" });
        assert!(matches!(
            parse_proxy_request(&bad),
            Err(EmployeeError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_everything() {
        let req = parse_proxy_request(&json!({})).unwrap();
        assert_eq!(req, ProxyRequest::default());
    }
}
