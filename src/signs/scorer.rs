//! Template-comparison scoring: visibility-weighted MSE mapped through an
//! exponential decay onto [0, 100].

use crate::constants::{DECAY_RATE, EXCELLENT_THRESHOLD, MAX_SCORE};
use crate::signs::templates::ReferenceTemplate;
use crate::signs::types::{Finger, HandPose, Landmark, RawLandmark, ScoreResult};
use crate::signs::validate::ValidationError;
use crate::signs::SignError;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedError {
    pub mse: f64,
    pub weight_sum: f64,
    /// Weighted mean squared error per finger, indexed by [`Finger::index`].
    pub per_finger: [f64; 5],
}

impl WeightedError {
    pub fn is_degenerate(&self) -> bool {
        self.weight_sum <= 0.0
    }

    pub fn worst_finger(&self) -> Finger {
        worst_finger(&self.per_finger)
    }
}

/// Finger with the largest error; ties resolve toward the thumb.
pub fn worst_finger(per_finger: &[f64; 5]) -> Finger {
    let mut worst = Finger::Thumb;
    for finger in Finger::ALL {
        if per_finger[finger.index()] > per_finger[worst.index()] {
            worst = finger;
        }
    }
    worst
}

/// Weighted squared-error sum over landmark pairs. Points invisible on either
/// side are skipped entirely, so their coordinates never reach the sum.
fn accumulate<'a>(pairs: impl Iterator<Item = (&'a Landmark, &'a Landmark)>) -> (f64, f64) {
    pairs.fold((0.0, 0.0), |(num, den), (u, r)| {
        let w = u.v.min(r.v);
        if w > 0.0 {
            (num + w * u.squared_distance(r), den + w)
        } else {
            (num, den)
        }
    })
}

/// A zero weight sum yields `mse = 0`; see [`WeightedError::is_degenerate`].
pub fn weighted_error(user: &HandPose, reference: &HandPose) -> WeightedError {
    let (weighted_sum, weight_sum) = accumulate(user.landmarks().iter().zip(reference.landmarks()));
    let mse = if weight_sum > 0.0 {
        weighted_sum / weight_sum
    } else {
        0.0
    };

    let mut per_finger = [0.0; 5];
    for finger in Finger::ALL {
        let (num, den) = accumulate(
            finger
                .joints()
                .into_iter()
                .map(|idx| (&user.landmarks()[idx], &reference.landmarks()[idx])),
        );
        per_finger[finger.index()] = if den > 0.0 { num / den } else { 0.0 };
    }

    WeightedError {
        mse,
        weight_sum,
        per_finger,
    }
}

/// Non-finite or NaN error counts as maximal error.
pub fn score_from_mse(mse: f64) -> f64 {
    if mse.is_nan() {
        return 0.0;
    }
    (MAX_SCORE * (-DECAY_RATE * mse).exp()).clamp(0.0, MAX_SCORE)
}

pub fn is_passing(score: f64, threshold: f64) -> bool {
    score >= threshold
}

/// Order-independent arithmetic mean of per-frame scores.
pub fn mean_score(scores: &[f64]) -> Result<f64, ValidationError> {
    if scores.is_empty() {
        return Err(ValidationError::NoFrames);
    }
    Ok(scores.iter().sum::<f64>() / scores.len() as f64)
}

pub fn tips_for(score: f64, threshold: f64, worst: Finger) -> Vec<String> {
    if score >= EXCELLENT_THRESHOLD.max(threshold) {
        vec!["Great job! Your hand shape matches the sign.".to_string()]
    } else if is_passing(score, threshold) {
        vec!["Almost there! Hold the pose steady and fine-tune your finger positions.".to_string()]
    } else {
        vec![
            "Try to realign your fingers to match the reference shape.".to_string(),
            format!("Check the position of your {}.", worst.as_str()),
        ]
    }
}

pub fn score_pose(user: &HandPose, template: &ReferenceTemplate) -> ScoreResult {
    let error = weighted_error(user, &template.pose);
    if error.is_degenerate() {
        tracing::debug!(sign = %template.info.id, "No mutually visible landmarks, score is untrustworthy");
    }
    let score = score_from_mse(error.mse);
    build_result(template, score, &error.per_finger, error.is_degenerate())
}

/// Scores each frame independently and averages; verdict and tips follow the mean.
pub fn score_attempt(
    frames: &[HandPose],
    template: &ReferenceTemplate,
) -> Result<ScoreResult, SignError> {
    if frames.is_empty() {
        return Err(ValidationError::NoFrames.into());
    }

    let mut scores = Vec::with_capacity(frames.len());
    let mut finger_totals = [0.0; 5];
    let mut low_confidence = false;

    for frame in frames {
        let error = weighted_error(frame, &template.pose);
        low_confidence |= error.is_degenerate();
        for (total, e) in finger_totals.iter_mut().zip(error.per_finger) {
            *total += e;
        }
        scores.push(score_from_mse(error.mse));
    }

    if low_confidence {
        tracing::debug!(sign = %template.info.id, frames = frames.len(), "Attempt contains frames without visible landmarks");
    }

    let score = mean_score(&scores)?;
    let n = frames.len() as f64;
    let finger_means = finger_totals.map(|t| t / n);
    Ok(build_result(template, score, &finger_means, low_confidence))
}

/// Validating entry point for callers holding unchecked landmark arrays.
pub fn score_raw_attempt(
    frames: &[Vec<RawLandmark>],
    template: &ReferenceTemplate,
) -> Result<ScoreResult, SignError> {
    let poses = frames
        .iter()
        .map(|f| HandPose::from_raw(f))
        .collect::<Result<Vec<_>, _>>()?;
    score_attempt(&poses, template)
}

fn build_result(
    template: &ReferenceTemplate,
    score: f64,
    per_finger: &[f64; 5],
    low_confidence: bool,
) -> ScoreResult {
    let threshold = template.effective_threshold();
    let worst = worst_finger(per_finger);

    ScoreResult {
        word: template.info.id.clone(),
        score,
        passed: is_passing(score, threshold),
        tips: tips_for(score, threshold, worst),
        low_confidence,
    }
}
