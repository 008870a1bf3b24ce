use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::constants::MAX_FRAMES_PER_ATTEMPT;
use crate::extractors::JsonBody;
use crate::response::AppError;
use crate::signs::scorer::score_raw_attempt;
use crate::signs::{RawLandmark, ScoreResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct FrameInput {
    landmarks: Vec<RawLandmark>,
}

#[derive(Debug, Deserialize)]
struct ScoreRequest {
    word: String,
    frames: Vec<FrameInput>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(score_attempt))
}

async fn score_attempt(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ScoreRequest>,
) -> Result<Json<ScoreResult>, AppError> {
    if req.frames.len() > MAX_FRAMES_PER_ATTEMPT {
        return Err(AppError::bad_request(
            "TOO_MANY_FRAMES",
            &format!(
                "at most {MAX_FRAMES_PER_ATTEMPT} frames per attempt, got {}",
                req.frames.len()
            ),
        ));
    }

    let template = state.templates().get(&req.word)?;
    let frames: Vec<Vec<RawLandmark>> = req.frames.into_iter().map(|f| f.landmarks).collect();
    let result = score_raw_attempt(&frames, template)?;

    tracing::info!(
        sign = %template.info.id,
        frames = frames.len(),
        score = result.score,
        passed = result.passed,
        low_confidence = result.low_confidence,
        "Attempt scored"
    );

    // 回显调用方提交的 word，保持与既有客户端一致
    Ok(Json(ScoreResult {
        word: req.word,
        ..result
    }))
}
