//! Public share route. The only operation reachable without a valid
//! credential: resolves a share hash to the public view of one content
//! item.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::database::StoreError;
use crate::AppState;

pub async fn handler(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<impl IntoResponse, ResolveShareError> {
    let shared = state.database().resolve_share(&hash).await?;
    Ok((http::StatusCode::OK, Json(shared)).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveShareError {
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ResolveShareError {
    fn into_response(self) -> Response {
        let ResolveShareError::Store(err) = self;
        super::store_error_response(err, "SHARE RESOLVE ERROR")
    }
}
