//! Geometric feature extraction from pose landmarks.
//!
//! ## Measurements
//!
//! | Measurement | Formula |
//! |-------------|---------|
//! | head_forward_ratio | \|ear.x - shoulder.x\| / \|shoulder.y - ear.y\| |
//! | shoulder_imbalance_ratio | \|lS.y - rS.y\| / \|shoulder.y - hip.y\| |
//! | head_tilt_degrees | \|atan2(rEye.y - lEye.y, rEye.x - lEye.x)\| |
//! | shoulder_protraction | (shoulder.x - hip.x) / \|rS.x - lS.x\| |
//! | spinal_deviation | distance of shoulder from the ear-hip line |
//! | neck_angle | angle at the ear between ear→shoulder and ear→nose |
//!
//! `ear`, `shoulder` and `hip` are left/right midpoints. A measurement that
//! comes out non-finite (zero denominator, coincident points) is unmeasurable
//! and is reported as `None`.

use std::collections::BTreeMap;

use nalgebra::Point2;
use posture_core::{
    angle_between_degrees, direction_degrees, midpoint, perpendicular_distance, PoseLandmark,
    PoseView, Side,
};
use serde::{Deserialize, Serialize};

/// Neck angle reported when the ear coincides with the shoulder or the nose
pub const NECK_ANGLE_FALLBACK: f64 = 45.0;

/// Named scalar measurements, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    HeadForwardRatio,
    ShoulderImbalanceRatio,
    HeadTiltDegrees,
    ShoulderProtraction,
    SpinalDeviation,
    NeckAngle,
}

impl Measurement {
    pub const ALL: [Measurement; 6] = [
        Self::HeadForwardRatio,
        Self::ShoulderImbalanceRatio,
        Self::HeadTiltDegrees,
        Self::ShoulderProtraction,
        Self::SpinalDeviation,
        Self::NeckAngle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Measurement::HeadForwardRatio => "head_forward_ratio",
            Measurement::ShoulderImbalanceRatio => "shoulder_imbalance_ratio",
            Measurement::HeadTiltDegrees => "head_tilt_degrees",
            Measurement::ShoulderProtraction => "shoulder_protraction",
            Measurement::SpinalDeviation => "spinal_deviation",
            Measurement::NeckAngle => "neck_angle",
        }
    }
}

/// Rotation of the eye line relative to horizontal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiltDirection {
    Clockwise,
    Counterclockwise,
}

impl TiltDirection {
    /// Positive signed angles are clockwise (image y grows downward)
    pub fn from_signed_degrees(angle: f64) -> Self {
        if angle > 0.0 {
            TiltDirection::Clockwise
        } else {
            TiltDirection::Counterclockwise
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TiltDirection::Clockwise => "clockwise",
            TiltDirection::Counterclockwise => "counterclockwise",
        }
    }
}

/// Left/right midpoints of the paired landmarks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Midpoints {
    pub eye: Point2<f64>,
    pub ear: Point2<f64>,
    pub shoulder: Point2<f64>,
    pub hip: Point2<f64>,
}

impl Midpoints {
    pub fn from_pose(pose: &PoseView<'_>) -> Self {
        let pair = |left: PoseLandmark, right: PoseLandmark| {
            midpoint(&pose.position(left), &pose.position(right))
        };

        Self {
            eye: pair(PoseLandmark::LeftEye, PoseLandmark::RightEye),
            ear: pair(PoseLandmark::LeftEar, PoseLandmark::RightEar),
            shoulder: pair(PoseLandmark::LeftShoulder, PoseLandmark::RightShoulder),
            hip: pair(PoseLandmark::LeftHip, PoseLandmark::RightHip),
        }
    }
}

/// All measurements of one pose, plus the lateral findings they imply
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureFeatures {
    pub head_forward_ratio: Option<f64>,
    pub shoulder_imbalance_ratio: Option<f64>,
    /// Visually higher shoulder (smaller y)
    pub elevated_shoulder: Side,
    pub head_tilt_degrees: Option<f64>,
    pub tilt_direction: TiltDirection,
    /// Signed; issue detection uses the magnitude
    pub shoulder_protraction: Option<f64>,
    pub spinal_deviation: Option<f64>,
    pub neck_angle: Option<f64>,
}

impl PostureFeatures {
    /// Extract all six measurements from a validated pose
    pub fn extract(pose: &PoseView<'_>) -> Self {
        let mid = Midpoints::from_pose(pose);

        let left_eye = pose.position(PoseLandmark::LeftEye);
        let right_eye = pose.position(PoseLandmark::RightEye);
        let left_shoulder = pose.position(PoseLandmark::LeftShoulder);
        let right_shoulder = pose.position(PoseLandmark::RightShoulder);
        let nose = pose.position(PoseLandmark::Nose);

        // 1. Ear ahead of shoulder, relative to neck height
        let head_forward_ratio =
            (mid.ear.x - mid.shoulder.x).abs() / (mid.shoulder.y - mid.ear.y).abs();

        // 2. Shoulder height difference, relative to torso height
        let shoulder_imbalance_ratio =
            (left_shoulder.y - right_shoulder.y).abs() / (mid.shoulder.y - mid.hip.y).abs();
        let elevated_shoulder = if left_shoulder.y < right_shoulder.y {
            Side::Left
        } else {
            Side::Right
        };

        // 3. Eye line rotation
        let head_tilt_angle = direction_degrees(&(right_eye - left_eye));
        let head_tilt_degrees = head_tilt_angle.abs();

        // 4. Shoulders ahead of hips, relative to shoulder width
        let shoulder_width = (right_shoulder.x - left_shoulder.x).abs();
        let shoulder_protraction = (mid.shoulder.x - mid.hip.x) / shoulder_width;

        // 5. Shoulder off the ear-hip line
        let spinal_deviation = perpendicular_distance(&mid.shoulder, &mid.ear, &mid.hip);

        // 6. Angle at the ear between the neck and head segments
        let neck_angle =
            angle_between_degrees(&(mid.shoulder - mid.ear), &(nose - mid.ear))
                .unwrap_or(NECK_ANGLE_FALLBACK);

        Self {
            head_forward_ratio: measured(head_forward_ratio),
            shoulder_imbalance_ratio: measured(shoulder_imbalance_ratio),
            elevated_shoulder,
            head_tilt_degrees: measured(head_tilt_degrees),
            tilt_direction: TiltDirection::from_signed_degrees(head_tilt_angle),
            shoulder_protraction: measured(shoulder_protraction),
            spinal_deviation: spinal_deviation.and_then(measured),
            neck_angle: measured(neck_angle),
        }
    }

    /// A pose with no deviation at all: zero ratios, level eyes and a
    /// mid-range neck angle
    pub fn aligned() -> Self {
        Self {
            head_forward_ratio: Some(0.0),
            shoulder_imbalance_ratio: Some(0.0),
            elevated_shoulder: Side::Right,
            head_tilt_degrees: Some(0.0),
            tilt_direction: TiltDirection::Counterclockwise,
            shoulder_protraction: Some(0.0),
            spinal_deviation: Some(0.0),
            neck_angle: Some(NECK_ANGLE_FALLBACK),
        }
    }

    pub fn get(&self, measurement: Measurement) -> Option<f64> {
        match measurement {
            Measurement::HeadForwardRatio => self.head_forward_ratio,
            Measurement::ShoulderImbalanceRatio => self.shoulder_imbalance_ratio,
            Measurement::HeadTiltDegrees => self.head_tilt_degrees,
            Measurement::ShoulderProtraction => self.shoulder_protraction,
            Measurement::SpinalDeviation => self.spinal_deviation,
            Measurement::NeckAngle => self.neck_angle,
        }
    }

    /// Measurable values keyed by measurement
    pub fn measurements(&self) -> BTreeMap<Measurement, f64> {
        Measurement::ALL
            .into_iter()
            .filter_map(|m| self.get(m).map(|value| (m, value)))
            .collect()
    }

    /// Measurements that could not be computed for this pose
    pub fn unmeasurable(&self) -> Vec<Measurement> {
        Measurement::ALL
            .into_iter()
            .filter(|m| self.get(*m).is_none())
            .collect()
    }
}

fn measured(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
