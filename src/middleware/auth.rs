use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::AuthError;
use crate::database::models::User;
use crate::error::ApiError;

/// Authenticated caller, inserted into request extensions by
/// `jwt_auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Rejects the request before the handler runs unless it carries a valid
/// access token for an active user.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map(str::to_owned)
                .map_err(|_| AuthError::BadAuthorizationHeader)
        })
        .transpose()?;

    let user = state.auth.authenticate(header.as_deref()).await.map_err(|e| {
        tracing::debug!("Rejected bearer authentication: {}", e);
        e
    })?;

    request.extensions_mut().insert(AuthUser::from(user));
    Ok(next.run(request).await)
}
