//! Structural gate for incoming landmark arrays. Everything downstream
//! (scorer, classifier) only ever sees a normalized [`HandPose`].

use thiserror::Error;

use crate::constants::{DEFAULT_VISIBILITY, LANDMARK_COUNT};
use crate::signs::types::{HandPose, Landmark, RawLandmark};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("expected {expected} landmarks, got {actual}")]
    WrongCount { expected: usize, actual: usize },
    #[error("landmark {index} is missing numeric field `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("attempt contains no frames")]
    NoFrames,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::WrongCount { .. } => "WRONG_LANDMARK_COUNT",
            ValidationError::MissingField { .. } => "MISSING_FIELD",
            ValidationError::NoFrames => "NO_FRAMES",
        }
    }
}

/// Count is checked first, then the first landmark lacking `x` or `y` is reported.
/// `z` and `v` are optional here.
pub fn validate(landmarks: &[RawLandmark]) -> Result<(), ValidationError> {
    if landmarks.len() != LANDMARK_COUNT {
        return Err(ValidationError::WrongCount {
            expected: LANDMARK_COUNT,
            actual: landmarks.len(),
        });
    }

    for (index, lm) in landmarks.iter().enumerate() {
        if lm.x.is_none() {
            return Err(ValidationError::MissingField { index, field: "x" });
        }
        if lm.y.is_none() {
            return Err(ValidationError::MissingField { index, field: "y" });
        }
    }

    Ok(())
}

/// Applies the optional-field defaults: `z` → 0.0, `v` → 1.0 (clamped to [0, 1]).
/// Callers must run [`validate`] first; [`HandPose::from_raw`] does both.
fn normalize(landmarks: &[RawLandmark]) -> HandPose {
    let mut out = [Landmark {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        v: DEFAULT_VISIBILITY,
    }; LANDMARK_COUNT];

    for (slot, raw) in out.iter_mut().zip(landmarks) {
        *slot = Landmark {
            x: raw.x.unwrap_or_default(),
            y: raw.y.unwrap_or_default(),
            z: raw.z.unwrap_or(0.0),
            v: raw.v.unwrap_or(DEFAULT_VISIBILITY).clamp(0.0, 1.0),
        };
    }

    HandPose::from_landmarks(out)
}

impl HandPose {
    pub fn from_raw(landmarks: &[RawLandmark]) -> Result<Self, ValidationError> {
        validate(landmarks)?;
        Ok(normalize(landmarks))
    }
}
