//! Fundamental types for posture scoring.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Minimum number of landmarks a detector must deliver for a pose to be scored
pub const REQUIRED_LANDMARKS: usize = 33;

/// Unique identifier for a captured photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoId(pub Uuid);

impl PhotoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PhotoId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PhotoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A single pose landmark in normalized image coordinates.
///
/// `x` and `y` are fractions of the image width/height (y grows downward).
/// They are conceptually in [0, 1] but out-of-range values are accepted.
/// `z` is a small depth offset that scoring ignores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    /// Detection confidence in [0, 1]; absent means 0
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Fully visible landmark at `(x, y)` with zero depth
    pub fn visible(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Visibility with non-finite values treated as undetected
    pub fn effective_visibility(&self) -> f64 {
        if self.visibility.is_finite() {
            self.visibility
        } else {
            0.0
        }
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// Anatomical roles of the landmark indices used by posture scoring.
///
/// Indices follow the detector's 33-point layout; the remaining indices are
/// accepted but carry no meaning for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 7,
    RightEar = 8,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
}

impl PoseLandmark {
    pub const ALL: [PoseLandmark; 13] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
    ];

    /// Landmarks whose visibility drives the overall detection confidence
    pub const KEY: [PoseLandmark; 9] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftHip,
        Self::RightHip,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.index() == idx)
    }
}

/// A landmark sequence that passed validation.
///
/// Holding a `PoseView` guarantees at least [`REQUIRED_LANDMARKS`] entries,
/// so every [`PoseLandmark`] lookup is in bounds.
#[derive(Debug, Clone, Copy)]
pub struct PoseView<'a> {
    landmarks: &'a [Landmark],
}

impl<'a> PoseView<'a> {
    /// Validate a possibly absent landmark sequence
    pub fn try_new(landmarks: Option<&'a [Landmark]>) -> Result<Self> {
        let landmarks = landmarks.unwrap_or_default();
        if landmarks.len() < REQUIRED_LANDMARKS {
            return Err(Error::InsufficientLandmarks {
                required: REQUIRED_LANDMARKS,
                available: landmarks.len(),
            });
        }
        Ok(Self { landmarks })
    }

    pub fn from_slice(landmarks: &'a [Landmark]) -> Result<Self> {
        Self::try_new(Some(landmarks))
    }

    pub fn get(&self, role: PoseLandmark) -> &'a Landmark {
        &self.landmarks[role.index()]
    }

    pub fn position(&self, role: PoseLandmark) -> Point2<f64> {
        self.get(role).position()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn landmarks(&self) -> &'a [Landmark] {
        self.landmarks
    }
}

/// Which side of the body a lateral finding refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn capitalized(&self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}
