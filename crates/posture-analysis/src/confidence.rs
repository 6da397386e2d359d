//! Detection confidence from landmark visibility.

use posture_core::{PoseLandmark, PoseView};

/// Lowest confidence ever reported
pub const MIN_CONFIDENCE: f64 = 0.5;

/// Highest confidence ever reported
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Arithmetic mean visibility of the key landmarks (nose, eyes, ears,
/// shoulders, hips), before clamping
pub fn mean_key_visibility(pose: &PoseView<'_>) -> f64 {
    let sum: f64 = PoseLandmark::KEY
        .iter()
        .map(|role| pose.get(*role).effective_visibility())
        .sum();
    sum / PoseLandmark::KEY.len() as f64
}

/// Overall detection confidence in [`MIN_CONFIDENCE`, `MAX_CONFIDENCE`].
///
/// The floor keeps an imperfect detection from collapsing the final score.
pub fn estimate_confidence(pose: &PoseView<'_>) -> f64 {
    mean_key_visibility(pose).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
