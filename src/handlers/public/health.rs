use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/health/ - Liveness probe; touches no dependencies
pub async fn health_get() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "status": "ok" })))
}
