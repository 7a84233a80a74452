use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::{AuthError, Claims, TokenPair, TokenType};
use crate::config::AppConfig;

/// Issues and validates HS256 tokens signed with the application secret.
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl TokenManager {
    pub fn new(secret: &str, access_lifetime: Duration, refresh_lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime,
            refresh_lifetime,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.secret_key,
            Duration::minutes(config.jwt.access_token_lifetime_minutes),
            Duration::days(config.jwt.refresh_token_lifetime_days),
        )
    }

    pub fn issue(&self, user_id: i64, token_type: TokenType) -> Result<String, AuthError> {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        };

        let claims = Claims {
            token_type,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().simple().to_string(),
            user_id,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenType::Access)?,
            refresh: self.issue(user_id, TokenType::Refresh)?,
        })
    }

    /// Decode `token` and require it to be of `expected` type. Expiry is
    /// checked without leeway.
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let reject = |reason: String| match expected {
            TokenType::Access => AuthError::InvalidToken(reason),
            TokenType::Refresh => AuthError::InvalidRefreshToken(reason),
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| reject(e.to_string()))?
            .claims;

        if claims.token_type != expected {
            return Err(reject(format!("token has wrong type {:?}", claims.token_type)));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> TokenManager {
        TokenManager::new("test-secret", Duration::minutes(30), Duration::days(7))
    }

    #[test]
    fn issued_pair_validates_by_type() {
        let tokens = manager();
        let pair = tokens.issue_pair(7).unwrap();

        let access = tokens.validate(&pair.access, TokenType::Access).unwrap();
        assert_eq!(access.user_id, 7);
        assert_eq!(access.exp - access.iat, 30 * 60);
        assert_eq!(access.jti.len(), 32);

        let refresh = tokens.validate(&pair.refresh, TokenType::Refresh).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 60 * 60);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn rejects_wrong_token_type() {
        let tokens = manager();
        let pair = tokens.issue_pair(1).unwrap();

        assert!(matches!(
            tokens.validate(&pair.refresh, TokenType::Access),
            Err(AuthError::InvalidToken(_))
        ));
        assert!(matches!(
            tokens.validate(&pair.access, TokenType::Refresh),
            Err(AuthError::InvalidRefreshToken(_))
        ));
    }

    #[test]
    fn rejects_expired_and_foreign_tokens() {
        let expired = TokenManager::new("test-secret", Duration::seconds(-5), Duration::days(7));
        let token = expired.issue(1, TokenType::Access).unwrap();
        assert!(manager().validate(&token, TokenType::Access).is_err());

        let other = TokenManager::new("other-secret", Duration::minutes(30), Duration::days(7));
        let token = other.issue(1, TokenType::Access).unwrap();
        assert!(manager().validate(&token, TokenType::Access).is_err());

        assert!(manager().validate("not-a-token", TokenType::Access).is_err());
    }
}
