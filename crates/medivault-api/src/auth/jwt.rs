//! HS256 JWT issuance and verification.
//!
//! Two token kinds are issued: a short-lived access token and a longer-lived
//! refresh token. The `token_use` claim distinguishes them; a refresh token
//! presented as a bearer credential is rejected.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use medivault_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TOKEN_USE_ACCESS: &str = "access";
pub const TOKEN_USE_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
    pub token_use: String,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_expiry: Duration,
    refresh_expiry: Duration,
}

impl JwtService {
    pub fn new(secret: &str, access_expiry_hours: i64, refresh_expiry_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_expiry: Duration::hours(access_expiry_hours),
            refresh_expiry: Duration::days(refresh_expiry_days),
        }
    }

    fn generate(&self, user_id: Uuid, token_use: &str, expiry: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + expiry).timestamp(),
            iat: now.timestamp(),
            token_use: token_use.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Issue an (access, refresh) token pair for the user.
    pub fn generate_token_pair(&self, user_id: Uuid) -> Result<(String, String), AppError> {
        let access = self.generate(user_id, TOKEN_USE_ACCESS, self.access_expiry)?;
        let refresh = self.generate(user_id, TOKEN_USE_REFRESH, self.refresh_expiry)?;
        Ok((access, refresh))
    }

    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String, AppError> {
        self.generate(user_id, TOKEN_USE_ACCESS, self.access_expiry)
    }

    fn verify(&self, token: &str, expected_use: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        if data.claims.token_use != expected_use {
            return Err(AppError::Unauthorized("Invalid token type".to_string()));
        }

        Ok(data.claims)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.verify(token, TOKEN_USE_ACCESS)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.verify(token, TOKEN_USE_REFRESH)
    }
}
