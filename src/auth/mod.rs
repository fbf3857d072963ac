use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::types::ObjectId;

/// Bearer-token claims. The subject is the user id; tokens expire
/// `jwt_expiry_days` after issuance (7 days by default).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: &ObjectId, expiry_days: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(expiry_days)).timestamp(),
        }
    }
}

/// Sign a bearer token for the given user.
pub fn sign_token(security: &SecurityConfig, user_id: &ObjectId) -> Result<String, ApiError> {
    let claims = Claims::new(user_id, security.jwt_expiry_days);
    let key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), &claims, &key)
        .map_err(|e| ApiError::internal_server_error(format!("failed to sign token: {}", e)))
}

/// Verify a bearer token and return its claims. Callers treat every
/// failure the same way; expiry is not distinguished from forgery.
pub fn verify_token(
    security: &SecurityConfig,
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    decode::<Claims>(token, &key, &Validation::default()).map(|data| data.claims)
}
