pub mod password;
pub mod service;
pub mod tokens;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::DatabaseError;

pub use password::{hash_password, hash_password_blocking, verify_password, verify_password_blocking};
pub use service::AuthService;
pub use tokens::TokenManager;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication credentials were not provided")]
    NotAuthenticated,

    #[error("malformed authorization header")]
    BadAuthorizationHeader,

    #[error("invalid access token: {0}")]
    InvalidToken(String),

    #[error("invalid refresh token: {0}")]
    InvalidRefreshToken(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("user is inactive")]
    UserInactive,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: TokenType,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    pub user_id: i64,
}

/// Body of a successful token obtain request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}
