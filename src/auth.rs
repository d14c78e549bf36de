//! Credential gate: stateless bearer-token verification.
//!
//! Verification is pure; the extracted subject id is the sole source of
//! truth for ownership checks downstream. No database lookup happens here.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use http::request::Parts;
use http::StatusCode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Sign a token carrying the user id as its subject, valid for `ttl`.
pub fn issue_token(
    user_id: &Uuid,
    secret: &str,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a bearer token (scheme prefix optional) and extract the subject
/// id. An elapsed validity window is reported as `TokenExpired`; every
/// other failure collapses into `Unauthorized` so verification internals
/// are not leaked.
pub fn authenticate(header_value: &str, secret: &str) -> Result<Uuid, AuthError> {
    let token = header_value
        .strip_prefix(BEARER_PREFIX)
        .unwrap_or(header_value);

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::Unauthorized),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(AuthError::TokenExpired),
        Err(_) => Err(AuthError::Unauthorized),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("token expired")]
    TokenExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// The authenticated caller, extracted from the `Authorization` header on
/// owner-scoped routes.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::Unauthorized)?;

        let user_id = authenticate(header_value, &state.config().jwt_secret)?;
        Ok(AuthUser(user_id))
    }
}
