use axum::{
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::api::openapi::{openapi_document, redoc_html, swagger_ui_html};
use crate::app::AppState;
use crate::error::ApiError;

const YAML_MEDIA_TYPE: &str = "application/vnd.oai.openapi; charset=utf-8";
const JSON_MEDIA_TYPE: &str = "application/vnd.oai.openapi+json; charset=utf-8";

#[derive(Debug, Deserialize)]
pub struct SchemaQuery {
    /// `yaml` (default) or `json`
    pub format: Option<String>,
}

/// GET /api/schema/ - OpenAPI document
pub async fn schema_get(
    State(state): State<AppState>,
    Query(query): Query<SchemaQuery>,
) -> Result<Response, ApiError> {
    let document = openapi_document(&state.config.docs);

    match query.format.as_deref() {
        None | Some("yaml") | Some("openapi") => {
            let body = serde_yaml::to_string(&document).map_err(|e| {
                tracing::error!("Failed to render schema as YAML: {}", e);
                ApiError::server_fault()
            })?;
            Ok(([(CONTENT_TYPE, YAML_MEDIA_TYPE)], body).into_response())
        }
        Some("json") | Some("openapi-json") => {
            let body = serde_json::to_string_pretty(&document).map_err(|e| {
                tracing::error!("Failed to render schema as JSON: {}", e);
                ApiError::server_fault()
            })?;
            Ok(([(CONTENT_TYPE, JSON_MEDIA_TYPE)], body).into_response())
        }
        Some(other) => {
            tracing::debug!("Unknown schema format '{}'", other);
            Err(ApiError::not_found())
        }
    }
}

/// GET /api/docs/ - Swagger UI
pub async fn swagger_get(State(state): State<AppState>) -> Html<String> {
    Html(swagger_ui_html(&state.config.docs.title))
}

/// GET /api/redoc/ - ReDoc
pub async fn redoc_get(State(state): State<AppState>) -> Html<String> {
    Html(redoc_html(&state.config.docs.title))
}
