//! Identity provider: turns an inbound request into an authenticated user.
//!
//! Tokens are minted elsewhere; this service only verifies them. [`issue_token`]
//! exists for local development and tests.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    models::{AuthUser, Claims},
};

pub trait IdentityProvider: Send + Sync {
    fn identify(&self, headers: &HeaderMap) -> Result<AuthUser, ApiError>;
}

/// Verifies HS256 bearer tokens carrying `{ user: { id }, exp }` claims.
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

impl IdentityProvider for JwtIdentityProvider {
    fn identify(&self, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized("Missing Bearer token"))?;

        match decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) => Ok(data.claims.user),
            Err(err) => {
                log::debug!("rejected bearer token: {err}");
                Err(ApiError::Unauthorized("Invalid or expired token"))
            }
        }
    }
}

pub fn issue_token(secret: &str, user_id: Uuid, ttl: Duration) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + ttl).timestamp().max(0) as usize;
    let claims = Claims { user: AuthUser { id: user_id }, exp };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::HeaderValue;

    use super::*;

    const SECRET: &str = "test-secret";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_token_signed_with_same_secret() {
        let user_id = Uuid::new_v4();
        let token = issue_token(SECRET, user_id, Duration::minutes(15)).unwrap();

        let provider = JwtIdentityProvider::new(SECRET);
        let user = provider.identify(&headers_with(&format!("Bearer {token}"))).unwrap();
        assert_eq!(user.id, user_id);
    }

    #[test]
    fn rejects_missing_header() {
        let provider = JwtIdentityProvider::new(SECRET);
        assert!(matches!(
            provider.identify(&HeaderMap::new()),
            Err(ApiError::Unauthorized("Missing Bearer token"))
        ));
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        let provider = JwtIdentityProvider::new(SECRET);

        let foreign = issue_token("other-secret", Uuid::new_v4(), Duration::minutes(15)).unwrap();
        assert!(provider.identify(&headers_with(&format!("Bearer {foreign}"))).is_err());

        let expired = issue_token(SECRET, Uuid::new_v4(), Duration::hours(-2)).unwrap();
        assert!(provider.identify(&headers_with(&format!("Bearer {expired}"))).is_err());

        assert!(provider.identify(&headers_with("Basic dXNlcjpwYXNz")).is_err());
    }
}
