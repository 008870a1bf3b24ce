use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::extractors::JsonBody;
use crate::response::AppError;
use crate::signs::classifier::Prediction;
use crate::signs::{HandPose, RawLandmark};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct PredictRequest {
    landmarks: Vec<RawLandmark>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(predict))
}

async fn predict(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<PredictRequest>,
) -> Result<Json<Prediction>, AppError> {
    let pose = HandPose::from_raw(&req.landmarks)?;
    let prediction = state.classifier().predict(&pose)?;
    tracing::debug!(
        sign = %prediction.predicted_sign,
        confidence = prediction.confidence,
        "Pose classified"
    );
    Ok(Json(prediction))
}
