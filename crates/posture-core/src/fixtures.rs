//! Deterministic reference poses.
//!
//! The detector is an external collaborator, so tests and benchmarks build
//! landmark sets from fixed coordinates here instead of synthesizing random
//! ones. Only compiled for tests and with the `test-fixtures` feature.
//!
//! The role setters index the landmark set directly: calling them after
//! [`PoseBuilder::truncate`] has dropped that role panics.

use crate::types::{Landmark, PoseLandmark, REQUIRED_LANDMARKS};

/// Builder for a full 33-point landmark set
#[derive(Debug, Clone)]
pub struct PoseBuilder {
    landmarks: Vec<Landmark>,
}

impl PoseBuilder {
    /// Every landmark at the image center, fully visible
    pub fn blank() -> Self {
        Self {
            landmarks: vec![Landmark::visible(0.5, 0.5); REQUIRED_LANDMARKS],
        }
    }

    /// Upright, symmetric pose with ears, shoulders and hips stacked on x = 0.5.
    ///
    /// Coordinates are exact binary fractions so every derived measurement is
    /// exact: no forward head, level eyes and shoulders, zero spinal deviation
    /// and a 45° neck angle.
    pub fn upright() -> Self {
        Self::blank()
            .set(PoseLandmark::Nose, 0.625, 0.375)
            .set(PoseLandmark::LeftEye, 0.4375, 0.25)
            .set(PoseLandmark::RightEye, 0.5625, 0.25)
            .set(PoseLandmark::LeftEar, 0.375, 0.25)
            .set(PoseLandmark::RightEar, 0.625, 0.25)
            .set(PoseLandmark::LeftShoulder, 0.25, 0.5)
            .set(PoseLandmark::RightShoulder, 0.75, 0.5)
            .set(PoseLandmark::LeftElbow, 0.1875, 0.625)
            .set(PoseLandmark::RightElbow, 0.8125, 0.625)
            .set(PoseLandmark::LeftHip, 0.375, 0.75)
            .set(PoseLandmark::RightHip, 0.625, 0.75)
            .set(PoseLandmark::LeftKnee, 0.375, 0.875)
            .set(PoseLandmark::RightKnee, 0.625, 0.875)
    }

    /// Move a landmark, keeping its visibility.
    ///
    /// # Panics
    ///
    /// If the set no longer holds `role`.
    pub fn set(mut self, role: PoseLandmark, x: f64, y: f64) -> Self {
        let lm = &mut self.landmarks[role.index()];
        lm.x = x;
        lm.y = y;
        self
    }

    /// Shift a landmark by `(dx, dy)`.
    ///
    /// # Panics
    ///
    /// If the set no longer holds `role`.
    pub fn shift(mut self, role: PoseLandmark, dx: f64, dy: f64) -> Self {
        let lm = &mut self.landmarks[role.index()];
        lm.x += dx;
        lm.y += dy;
        self
    }

    /// Set the visibility of a single landmark.
    ///
    /// # Panics
    ///
    /// If the set no longer holds `role`.
    pub fn visibility_of(mut self, role: PoseLandmark, visibility: f64) -> Self {
        self.landmarks[role.index()].visibility = visibility;
        self
    }

    /// Set the visibility of every landmark
    pub fn visibility(mut self, visibility: f64) -> Self {
        for lm in &mut self.landmarks {
            lm.visibility = visibility;
        }
        self
    }

    /// Keep only the first `len` landmarks
    pub fn truncate(mut self, len: usize) -> Self {
        self.landmarks.truncate(len);
        self
    }

    pub fn build(self) -> Vec<Landmark> {
        self.landmarks
    }
}

impl Default for PoseBuilder {
    fn default() -> Self {
        Self::upright()
    }
}
