use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
};
use serde::Serialize;

use crate::api::format::{expect_object, required_string};
use crate::app::AppState;
use crate::error::{ApiError, FieldErrors};
use crate::handlers::utils::parse_json_body;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

/// POST /api/token/refresh/ - Trade a refresh token for a new access token
pub async fn token_refresh_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<AccessToken> {
    let body = parse_json_body(&headers, body?)?;
    let object = expect_object(&body)?;

    let mut errors = FieldErrors::new();
    let Some(refresh) = required_string(object, "refresh", true, &mut errors) else {
        return Err(ApiError::validation_error(errors));
    };

    let access = state.auth.refresh(&refresh).await?;
    Ok(ApiResponse::success(AccessToken { access }))
}
