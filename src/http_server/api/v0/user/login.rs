use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::database::StoreError;
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, LoginError> {
    let user = state
        .database()
        .user_by_email(&req.email)
        .await?
        .ok_or(LoginError::UnknownUser)?;

    let password_valid = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|_| LoginError::InvalidCredentials)?;
    if !password_valid {
        return Err(LoginError::InvalidCredentials);
    }

    let token = auth::issue_token(
        &user.user_id,
        &state.config().jwt_secret,
        state.config().token_ttl(),
    )
    .map_err(|e| LoginError::TokenIssue(e.to_string()))?;

    tracing::info!(user_id = %user.user_id, "user logged in");

    Ok((
        http::StatusCode::OK,
        Json(LoginResponse {
            message: "user logged in successfully".to_string(),
            token,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("user doesn't exist")]
    UnknownUser,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("could not issue token: {0}")]
    TokenIssue(String),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        match self {
            LoginError::UnknownUser => (
                http::StatusCode::NOT_FOUND,
                axum::Json(serde_json::json!({ "error": self.to_string() })),
            )
                .into_response(),
            LoginError::InvalidCredentials => (
                http::StatusCode::UNAUTHORIZED,
                axum::Json(serde_json::json!({ "error": self.to_string() })),
            )
                .into_response(),
            LoginError::TokenIssue(_) => {
                tracing::error!("LOGIN ERROR: {:?}", self);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(serde_json::json!({ "error": "unexpected error" })),
                )
                    .into_response()
            }
            LoginError::Store(e) => crate::http_server::store_error_response(e, "LOGIN ERROR"),
        }
    }
}
