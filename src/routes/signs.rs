use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::response::AppError;
use crate::signs::{Difficulty, RawLandmark, SignInfo};
use crate::state::AppState;

/// Catalog entry plus the reference pose, for clients that draw the target shape.
#[derive(Debug, Serialize)]
pub struct SignDetail {
    id: String,
    display_name: String,
    difficulty: Difficulty,
    pass_threshold: f64,
    landmarks: Vec<RawLandmark>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_signs))
        .route("/:id", get(get_sign))
}

async fn list_signs(State(state): State<AppState>) -> Json<Vec<SignInfo>> {
    Json(state.templates().catalog())
}

async fn get_sign(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SignDetail>, AppError> {
    let template = state.templates().get(&id)?;
    Ok(Json(SignDetail {
        id: template.info.id.clone(),
        display_name: template.info.display_name.clone(),
        difficulty: template.info.difficulty,
        pass_threshold: template.effective_threshold(),
        landmarks: template.pose.to_raw(),
    }))
}
