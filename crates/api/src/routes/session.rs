//! Session Routes

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::{ApiError, SharedState};

/// Response for session reset
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub session_id: Uuid,
}

/// Restart monitoring (new camera session)
pub async fn reset_session(State(state): State<SharedState>) -> Result<Json<ResetResponse>, ApiError> {
    let session = state.read().await.session.clone();
    let session_id = session.reset().await?;

    Ok(Json(ResetResponse { session_id }))
}
