use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, Uri},
    Extension,
};

use crate::api::pagination::request_url;
use crate::api::{ItemRepresentation, ItemSerializer, PaginatedResponse};
use crate::app::AppState;
use crate::filter::{ItemFilter, ItemQuery, Page};
use crate::handlers::utils::parse_json_body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/items/ - Filtered, searched, ordered and paginated item list
///
/// Query parameters: `name` (exact), `search` (all terms within `name`),
/// `ordering` (`name`, `price`, `created_at`, `-` for descending) and `page`.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<PaginatedResponse<ItemRepresentation>> {
    let query = ItemQuery::parse(uri.query());
    let filter = ItemFilter::from_query(&query);

    let count = state.items.count_filtered(&filter).await?;
    let page = Page::resolve(query.page.as_deref(), count, state.config.api.page_size)?;
    let items = state.items.list_filtered(&filter, page.window()).await?;

    let results = items.iter().map(ItemRepresentation::from).collect();
    let url = request_url(&headers, &uri);

    Ok(ApiResponse::success(PaginatedResponse::new(&page, url.as_ref(), results)))
}

/// POST /api/items/ - Create an item
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ItemRepresentation> {
    let body = parse_json_body(&headers, body?)?;
    let new_item = ItemSerializer::validate_create(&body)?;

    let item = state.items.insert(new_item).await?;
    tracing::info!("User '{}' ({}) created item {}", user.username, user.id, item.id);

    Ok(ApiResponse::created(item.into()))
}
