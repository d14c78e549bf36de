use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::database::{CreateUserParams, StoreError};
use crate::validate;
use crate::validate::ValidationError;
use crate::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupResponse {
    pub message: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, SignupError> {
    let first_name = validate::first_name(&req.first_name)?;
    let email = validate::email(&req.email)?;
    validate::password(&req.password)?;

    // The plaintext never goes further than this call
    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)?;

    let user = state
        .database()
        .create_user(CreateUserParams {
            first_name,
            last_name: req.last_name,
            email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.user_id, "user signed up");

    Ok((
        http::StatusCode::CREATED,
        Json(SignupResponse {
            message: "user signed up successfully".to_string(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("could not hash password")]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for SignupError {
    fn into_response(self) -> Response {
        match self {
            SignupError::Validation(e) => (
                http::StatusCode::BAD_REQUEST,
                axum::Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response(),
            SignupError::PasswordHash(e) => {
                tracing::error!("SIGNUP ERROR: {:?}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(serde_json::json!({ "error": "unexpected error" })),
                )
                    .into_response()
            }
            SignupError::Store(e) => {
                crate::http_server::store_error_response(e, "SIGNUP ERROR")
            }
        }
    }
}
