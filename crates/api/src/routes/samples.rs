//! Sample Ingest Routes

use axum::{extract::State, http::StatusCode, Json};
use drowsiness::Sample;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{ApiError, SharedState};

/// One sample or a batch, in capture order
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SampleBatch {
    One(Sample),
    Many(Vec<Sample>),
}

impl SampleBatch {
    fn into_vec(self) -> Vec<Sample> {
        match self {
            SampleBatch::One(sample) => vec![sample],
            SampleBatch::Many(samples) => samples,
        }
    }
}

/// Raw classifier scores for one frame
#[derive(Debug, Deserialize)]
pub struct FrameScores {
    pub timestamp: f64,
    pub scores: Vec<f32>,
}

/// Response for ingest endpoints
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub accepted: usize,
    pub session_id: Uuid,
}

/// Queue classifier samples for the monitoring session
pub async fn post_samples(
    State(state): State<SharedState>,
    Json(batch): Json<SampleBatch>,
) -> Result<(StatusCode, Json<AcceptedResponse>), ApiError> {
    let session = state.read().await.session.clone();
    let samples = batch.into_vec();

    for sample in &samples {
        session.submit(*sample).await?;
    }
    debug!("Queued {} samples", samples.len());

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse {
            accepted: samples.len(),
            session_id: session.snapshot().session_id,
        }),
    ))
}

/// Map raw scores through the configured layout and queue the sample
pub async fn post_frame(
    State(state): State<SharedState>,
    Json(frame): Json<FrameScores>,
) -> Result<(StatusCode, Json<AcceptedResponse>), ApiError> {
    let (session, sample) = {
        let state = state.read().await;
        (
            state.session.clone(),
            state.score_layout.observe(&frame.scores, frame.timestamp)?,
        )
    };
    session.submit(sample).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse {
            accepted: 1,
            session_id: session.snapshot().session_id,
        }),
    ))
}
