use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::HeaderMap,
    Extension,
};

use crate::api::{ItemRepresentation, ItemSerializer};
use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::utils::parse_json_body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::utils::parse_item_id;

/// GET /api/items/:id/ - Retrieve one item
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ItemRepresentation> {
    let id = parse_item_id(&id)?;
    let item = state.items.find(id).await?.ok_or_else(ApiError::not_found)?;
    Ok(ApiResponse::success(item.into()))
}

/// PUT /api/items/:id/ - Replace every writable field
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ItemRepresentation> {
    update(&state, &user, &id, &headers, body, false).await
}

/// PATCH /api/items/:id/ - Update only the fields present in the body
pub async fn patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ItemRepresentation> {
    update(&state, &user, &id, &headers, body, true).await
}

/// DELETE /api/items/:id/ - Delete an item
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_item_id(&id)?;
    if !state.items.delete(id).await? {
        return Err(ApiError::not_found());
    }

    tracing::info!("User '{}' ({}) deleted item {}", user.username, user.id, id);
    Ok(ApiResponse::no_content())
}

/// The record is resolved before the body is looked at, so an unknown id
/// is reported even when the payload is also invalid.
async fn update(
    state: &AppState,
    user: &AuthUser,
    raw_id: &str,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
    partial: bool,
) -> ApiResult<ItemRepresentation> {
    let id = parse_item_id(raw_id)?;
    if state.items.find(id).await?.is_none() {
        return Err(ApiError::not_found());
    }

    let body = parse_json_body(headers, body?)?;
    let changes = ItemSerializer::validate_update(&body, partial)?;

    let item = state
        .items
        .update(id, changes)
        .await?
        .ok_or_else(ApiError::not_found)?;
    tracing::info!("User '{}' ({}) updated item {}", user.username, user.id, item.id);

    Ok(ApiResponse::success(item.into()))
}
