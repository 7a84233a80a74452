use axum::http::{HeaderMap, Uri};
use serde_json::{json, Value};

use crate::api::pagination::request_url;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/ - Index of the registered resources
pub async fn api_root_get(headers: HeaderMap, uri: Uri) -> ApiResult<Value> {
    let items = request_url(&headers, &uri)
        .and_then(|base| base.join("items/").ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| "/api/items/".to_string());

    Ok(ApiResponse::success(json!({ "items": items })))
}
