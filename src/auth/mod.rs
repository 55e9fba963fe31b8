use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::types::{ObjectId, Role};

/// The authenticated caller: a user without its password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: ObjectId,
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub principal: Principal,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(principal: Principal, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            principal,
            exp,
            iat: now.timestamp(),
        }
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        claims.principal
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("password hashing error: {0}")]
    Hashing(String),
}

fn secret(security: &SecurityConfig) -> Result<&[u8], AuthError> {
    security
        .jwt_secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::as_bytes)
        .ok_or(AuthError::MissingSecret)
}

/// Sign a token for `principal`, valid for `jwt_expiry_hours`.
pub fn generate_jwt(security: &SecurityConfig, principal: Principal) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_secret(secret(security)?);
    let claims = Claims::new(principal, security.jwt_expiry_hours);

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Check signature and expiry, returning the embedded principal.
pub fn verify_jwt(security: &SecurityConfig, token: &str) -> Result<Principal, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret(security)?);
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims.into())
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// A hash that cannot be parsed counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security() -> SecurityConfig {
        let mut config = AppConfig::development().security;
        config.jwt_secret = Some("test-secret".to_string());
        config
    }

    fn principal() -> Principal {
        Principal {
            id: ObjectId::new(),
            user_name: "keeper".to_string(),
            email: "keeper@zoo.test".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn token_round_trip_yields_same_principal() {
        let p = principal();
        let token = generate_jwt(&security(), p.clone()).unwrap();
        assert_eq!(verify_jwt(&security(), &token).unwrap(), p);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt(&security(), principal()).unwrap();
        let mut other = security();
        other.jwt_secret = Some("another-secret".to_string());
        assert!(matches!(verify_jwt(&other, &token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            principal: principal(),
            exp: Utc::now().timestamp() - 3600,
            iat: Utc::now().timestamp() - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(verify_jwt(&security(), &token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn missing_secret_is_a_config_error() {
        let mut config = security();
        config.jwt_secret = None;
        assert!(matches!(generate_jwt(&config, principal()), Err(AuthError::MissingSecret)));
        assert!(matches!(verify_jwt(&config, "x.y.z"), Err(AuthError::MissingSecret)));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("s3cret!", 4).unwrap();
        assert_ne!(hash, "s3cret!");
        assert!(verify_password("s3cret!", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret!", "not-a-bcrypt-hash"));
    }
}
