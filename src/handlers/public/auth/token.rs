use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
};

use crate::api::format::{expect_object, required_string};
use crate::app::AppState;
use crate::auth::TokenPair;
use crate::error::{ApiError, FieldErrors};
use crate::handlers::utils::parse_json_body;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/token/ - Exchange username and password for an access/refresh pair
///
/// ```json
/// { "username": "alice", "password": "secret" }
/// ```
pub async fn token_obtain_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<TokenPair> {
    let body = parse_json_body(&headers, body?)?;
    let object = expect_object(&body)?;

    let mut errors = FieldErrors::new();
    let username = required_string(object, "username", true, &mut errors);
    let password = required_string(object, "password", false, &mut errors);

    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::validation_error(errors));
    };

    let pair = state.auth.obtain_pair(&username, &password).await?;
    Ok(ApiResponse::success(pair))
}
