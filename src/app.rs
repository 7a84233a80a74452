use std::any::Any;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{AuthService, TokenManager};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::{DatabaseManager, ItemRepository, SqliteItemRepository, SqliteUserRepository};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{allowed_hosts_middleware, jwt_auth_middleware};

/// Request context shared by every handler. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub items: Arc<dyn ItemRepository>,
    pub auth: Arc<AuthService>,
    pub allowed_hosts: Arc<[String]>,
}

impl AppState {
    pub fn new(config: AppConfig, db: &DatabaseManager) -> Self {
        let users = Arc::new(SqliteUserRepository::new(db.pool().clone()));
        let auth = AuthService::new(users, TokenManager::from_config(&config));

        Self {
            allowed_hosts: config.effective_allowed_hosts().into(),
            items: Arc::new(SqliteItemRepository::new(db.pool().clone())),
            auth: Arc::new(auth),
            config: Arc::new(config),
        }
    }
}

/// The complete HTTP application.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(middleware::from_fn_with_state(state.clone(), allowed_hosts_middleware));

    let router = match cors_layer(&state.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/health/", get(public::health_get))
        // Token acquisition
        .route("/api/token/", post(auth::token_obtain_post))
        .route("/api/token/refresh/", post(auth::token_refresh_post))
        // OpenAPI schema and UIs
        .route("/api/schema/", get(public::schema_get))
        .route("/api/docs/", get(public::swagger_get))
        .route("/api/redoc/", get(public::redoc_get))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::items;

    Router::new()
        .route("/api/", get(protected::api_root_get))
        .route("/api/items/", get(items::items_list).post(items::items_create))
        .route(
            "/api/items/:id/",
            get(items::item_get)
                .put(items::item_put)
                .patch(items::item_patch)
                .delete(items::item_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!("Request handler panicked: {}", detail);

    ApiError::server_fault().into_response()
}

/// Connect, migrate and serve until Ctrl-C.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    db.migrate().await.context("failed to apply migrations")?;

    let bind_addr = config.bind_addr();
    let state = AppState::new(config, &db);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Item API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let config = AppConfig {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                connection_timeout: 5,
            },
            ..AppConfig::default()
        };
        let db = DatabaseManager::connect(&config.database).await.unwrap();
        db.migrate().await.unwrap();
        app(AppState::new(config, &db))
    }

    fn request(method: &str, uri: &str, host: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::HOST, host)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_app()
            .await
            .oneshot(request("GET", "/api/health/", "localhost:8000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn rejects_unknown_hosts() {
        let response = test_app()
            .await
            .oneshot(request("GET", "/api/health/", "evil.example.com"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "invalid_host");
    }

    #[tokio::test]
    async fn unknown_paths_are_json_404() {
        let response = test_app()
            .await
            .oneshot(request("GET", "/nope", "localhost"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["detail"], "Not found.");
    }

    #[tokio::test]
    async fn items_require_a_bearer_token() {
        let response = test_app()
            .await
            .oneshot(request("GET", "/api/items/", "localhost"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer realm=\"api\""
        );
        assert_eq!(
            body_json(response).await,
            json!({
                "detail": "Authentication credentials were not provided.",
                "code": "not_authenticated"
            })
        );
    }

    #[tokio::test]
    async fn schema_defaults_to_yaml() {
        let response = test_app()
            .await
            .oneshot(request("GET", "/api/schema/", "localhost"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/vnd.oai.openapi"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let yaml = String::from_utf8_lossy(&bytes);
        assert!(yaml.contains("openapi:"));
        assert!(yaml.contains("/api/items/{id}/"));
    }

    #[tokio::test]
    async fn panics_render_as_opaque_500() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "A server error occurred.", "code": "error"})
        );
    }
}
