use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, HeaderMap},
};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Decode a JSON request body. An empty body reads as `{}`; any other body
/// must be declared as JSON.
pub fn parse_json_body(headers: &HeaderMap, body: Bytes) -> Result<Value, ApiError> {
    if body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !is_json_content_type(content_type) {
        return Err(ApiError::unsupported_media_type(content_type));
    }

    serde_json::from_slice(&body).map_err(|e| ApiError::invalid_json(format!("JSON parse error - {}", e)))
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}
