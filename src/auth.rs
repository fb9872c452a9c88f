//! Password hashing, bearer tokens and the authenticated-user extractor.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use model::entities::user::{self, UserRole};
use rand::RngCore;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::schemas::AppState;

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_hours", &self.ttl.num_hours())
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user_id: Uuid, role: UserRole) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                ApiError::Unauthorized
            })
    }
}

/// Hashes a password with Argon2id and a random 16 byte salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| ApiError::Internal(format!("Failed to encode salt: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

/// The caller identified by a valid bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    /// Rejects the request with 403 unless the caller has `role`.
    pub fn require(&self, role: UserRole) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            warn!(user_id = %self.id, role = %self.role, required = %role, "Role check failed");
            Err(ApiError::Forbidden(format!("Only a {role} can do this")))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let claims = state.tokens.verify(token)?;

        if let Some(role) = state.cache.get(&claims.sub).await {
            trace!(user_id = %claims.sub, "Role served from cache");
            return Ok(AuthUser { id: claims.sub, role });
        }

        // The user must still exist; the role is read from the store, not the token
        let user = user::Entity::find_by_id(claims.sub)
            .one(&state.db)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        state.cache.insert(user.id, user.role).await;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}
