use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::User;

/// Claims carried by the access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub exp: i64,
    pub iat: i64,
}

/// Claims carried by the refresh token. `jti` keeps two tokens issued in the
/// same second distinct, so a rotated token never equals the one it replaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Invalid JWT: {0}")]
    Invalid(String),
}

pub fn generate_access_token(user: &User, security: &SecurityConfig) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: user.id,
        jti: Uuid::new_v4(),
        email: user.email.clone(),
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        exp: (now + Duration::hours(security.access_token_expiry_hours as i64)).timestamp(),
        iat: now.timestamp(),
    };
    sign(&claims, &security.access_token_secret)
}

pub fn generate_refresh_token(user_id: Uuid, security: &SecurityConfig) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = RefreshClaims {
        sub: user_id,
        jti: Uuid::new_v4(),
        exp: (now + Duration::hours(security.refresh_token_expiry_hours as i64)).timestamp(),
        iat: now.timestamp(),
    };
    sign(&claims, &security.refresh_token_secret)
}

pub fn validate_access_token(token: &str, security: &SecurityConfig) -> Result<AccessClaims, TokenError> {
    verify(token, &security.access_token_secret)
}

pub fn validate_refresh_token(token: &str, security: &SecurityConfig) -> Result<RefreshClaims, TokenError> {
    verify(token, &security.refresh_token_secret)
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::Generation("signing secret not configured".to_string()));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| TokenError::Generation(e.to_string()))
}

fn verify<T: for<'de> Deserialize<'de>>(token: &str, secret: &str) -> Result<T, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::Invalid("verification secret not configured".to_string()));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<T>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| TokenError::Invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::testing::sample_user;

    #[test]
    fn access_token_round_trip_carries_identity() {
        let security = AppConfig::development().security;
        let user = sample_user("alice");

        let token = generate_access_token(&user, &security).unwrap();
        let claims = validate_access_token(&token, &security).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, user.email);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let security = AppConfig::development().security;
        let user = sample_user("bob");

        let refresh = generate_refresh_token(user.id, &security).unwrap();
        assert!(validate_refresh_token(&refresh, &security).is_ok());
        assert!(validate_access_token(&refresh, &security).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let security = AppConfig::development().security;
        let user = sample_user("carol");

        let claims = RefreshClaims {
            sub: user.id,
            jti: Uuid::new_v4(),
            exp: Utc::now().timestamp() - 60,
            iat: Utc::now().timestamp() - 120,
        };
        let token = sign(&claims, &security.refresh_token_secret).unwrap();
        assert!(matches!(validate_refresh_token(&token, &security), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn back_to_back_tokens_differ() {
        let security = AppConfig::development().security;
        let user = sample_user("erin");

        let first = generate_refresh_token(user.id, &security).unwrap();
        let rotated = generate_refresh_token(user.id, &security).unwrap();
        assert_ne!(first, rotated);

        let first = generate_access_token(&user, &security).unwrap();
        let second = generate_access_token(&user, &security).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let security = AppConfig::development().security;
        let user = sample_user("dave");
        let mut token = generate_access_token(&user, &security).unwrap();
        token.push('x');
        assert!(validate_access_token(&token, &security).is_err());
    }
}
