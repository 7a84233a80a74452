use std::sync::Arc;

use super::password::verify_password_blocking;
use super::{AuthError, TokenManager, TokenPair, TokenType};
use crate::database::models::User;
use crate::database::UserRepository;

const BEARER: &str = "Bearer";

/// Token issuance and bearer authentication over the user store.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenManager,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenManager) -> Self {
        Self { users, tokens }
    }

    /// Exchange credentials for an access/refresh pair. Unknown users,
    /// wrong passwords and inactive accounts are indistinguishable.
    pub async fn obtain_pair(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Token request for unknown user '{}'", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password_blocking(password.to_string(), user.password_hash.clone()).await? {
            tracing::warn!("Token request with wrong password for '{}'", username);
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::warn!("Token request for inactive user '{}'", username);
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!("Issued token pair for '{}'", username);
        self.tokens.issue_pair(user.id)
    }

    /// Issue a fresh access token from a valid refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.tokens.validate(refresh_token, TokenType::Refresh)?;

        match self.users.find_by_id(claims.user_id).await? {
            Some(user) if user.is_active => self.tokens.issue(user.id, TokenType::Access),
            _ => {
                tracing::warn!("Refresh for missing or inactive user {}", claims.user_id);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Resolve the caller from an `Authorization` header value.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<User, AuthError> {
        let header = header.ok_or(AuthError::NotAuthenticated)?;

        let parts: Vec<&str> = header.split_whitespace().collect();
        match parts.first() {
            Some(&scheme) if scheme == BEARER => {}
            _ => return Err(AuthError::NotAuthenticated),
        }
        if parts.len() != 2 {
            return Err(AuthError::BadAuthorizationHeader);
        }

        let claims = self.tokens.validate(parts[1], TokenType::Access)?;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            return Err(AuthError::UserInactive);
        }

        Ok(user)
    }
}
