//! Status Routes

use axum::{extract::State, Json};
use drowsiness::Overlay;
use monitor::Snapshot;
use serde::Serialize;

use crate::SharedState;

/// Response for status endpoint
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub overlay: Overlay,
}

/// Get the latest published session snapshot
pub async fn get_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let snapshot = state.read().await.session.snapshot();
    let overlay = snapshot.overlay();

    Json(StatusResponse { snapshot, overlay })
}
