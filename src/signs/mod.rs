pub mod classifier;
pub mod scorer;
pub mod shapes;
pub mod templates;
pub mod types;
pub mod validate;

use thiserror::Error;

pub use types::{Difficulty, Finger, HandPose, Landmark, RawLandmark, ScoreResult, SignInfo};
pub use validate::{validate, ValidationError};

#[derive(Debug, Error)]
pub enum SignError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unknown sign: {0}")]
    UnknownSymbol(String),
}
