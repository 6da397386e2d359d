//! Issue detection: threshold ladders and the text tables attached to them.
//!
//! ## Thresholds
//!
//! | Issue | Emit if | Moderate above | Severe above |
//! |-------|---------|----------------|--------------|
//! | forward_head_posture | ratio > 0.15 | 0.25 | 0.35 |
//! | shoulder_imbalance | ratio > 0.08 | 0.14 | 0.20 |
//! | head_tilt | degrees > 5 | 10 | 15 |
//! | rounded_shoulders | \|protraction\| > 0.12 | 0.18 | 0.25 |
//! | spinal_misalignment | deviation > 0.08 | 0.12 | 0.15 |
//! | cervical_curve | angle outside 35-55° | outside 30-60° | outside 25-65° |
//!
//! All bounds are exclusive.

use posture_core::Side;
use serde::{Deserialize, Serialize};

use crate::features::{Measurement, PostureFeatures, TiltDirection};

/// Ordinal severity of a detected issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Contribution to the aggregate severity score
    pub fn weight(&self) -> u32 {
        match self {
            Severity::Mild => 1,
            Severity::Moderate => 2,
            Severity::Severe => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

/// Kinds of posture issue, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    ForwardHeadPosture,
    ShoulderImbalance,
    HeadTilt,
    RoundedShoulders,
    SpinalMisalignment,
    CervicalCurve,
}

impl IssueType {
    pub const COUNT: usize = 6;

    pub const ALL: [IssueType; Self::COUNT] = [
        Self::ForwardHeadPosture,
        Self::ShoulderImbalance,
        Self::HeadTilt,
        Self::RoundedShoulders,
        Self::SpinalMisalignment,
        Self::CervicalCurve,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IssueType::ForwardHeadPosture => "forward_head_posture",
            IssueType::ShoulderImbalance => "shoulder_imbalance",
            IssueType::HeadTilt => "head_tilt",
            IssueType::RoundedShoulders => "rounded_shoulders",
            IssueType::SpinalMisalignment => "spinal_misalignment",
            IssueType::CervicalCurve => "cervical_curve",
        }
    }

    /// Measurement this issue is evaluated on
    pub fn measurement(&self) -> Measurement {
        match self {
            IssueType::ForwardHeadPosture => Measurement::HeadForwardRatio,
            IssueType::ShoulderImbalance => Measurement::ShoulderImbalanceRatio,
            IssueType::HeadTilt => Measurement::HeadTiltDegrees,
            IssueType::RoundedShoulders => Measurement::ShoulderProtraction,
            IssueType::SpinalMisalignment => Measurement::SpinalDeviation,
            IssueType::CervicalCurve => Measurement::NeckAngle,
        }
    }

    /// Threshold ladder for the issues graded on a single upper bound
    pub fn ladder(&self) -> Option<&'static SeverityLadder> {
        match self {
            IssueType::ForwardHeadPosture => Some(&FORWARD_HEAD_LADDER),
            IssueType::ShoulderImbalance => Some(&SHOULDER_IMBALANCE_LADDER),
            IssueType::HeadTilt => Some(&HEAD_TILT_LADDER),
            IssueType::RoundedShoulders => Some(&ROUNDED_SHOULDERS_LADDER),
            IssueType::SpinalMisalignment => Some(&SPINAL_MISALIGNMENT_LADDER),
            IssueType::CervicalCurve => None,
        }
    }

    pub fn impact(&self, severity: Severity) -> &'static str {
        match (self, severity) {
            (IssueType::ForwardHeadPosture, Severity::Severe) => {
                "High risk of neck strain and headaches"
            }
            (IssueType::ForwardHeadPosture, Severity::Moderate) => "Moderate neck tension likely",
            (IssueType::ForwardHeadPosture, Severity::Mild) => "Mild postural deviation",

            (IssueType::ShoulderImbalance, Severity::Severe) => {
                "Significant muscle imbalance, potential for chronic pain"
            }
            (IssueType::ShoulderImbalance, Severity::Moderate) => {
                "Noticeable asymmetry, muscle compensation patterns"
            }
            (IssueType::ShoulderImbalance, Severity::Mild) => "Minor imbalance",

            (IssueType::HeadTilt, Severity::Severe) => {
                "High risk of cervical strain and muscle tension"
            }
            (IssueType::HeadTilt, Severity::Moderate) => "Moderate neck muscle imbalance",
            (IssueType::HeadTilt, Severity::Mild) => "Minor head positioning issue",

            (IssueType::RoundedShoulders, Severity::Severe) => {
                "High risk of thoracic kyphosis and shoulder impingement"
            }
            (IssueType::RoundedShoulders, Severity::Moderate) => {
                "Increased upper back tension and reduced lung capacity"
            }
            (IssueType::RoundedShoulders, Severity::Mild) => "Mild postural deviation",

            (IssueType::SpinalMisalignment, Severity::Severe) => {
                "Significant postural dysfunction, multiple compensation patterns"
            }
            (IssueType::SpinalMisalignment, Severity::Moderate) => {
                "Moderate postural imbalance affecting multiple regions"
            }
            (IssueType::SpinalMisalignment, Severity::Mild) => "Minor alignment issues",

            (IssueType::CervicalCurve, Severity::Severe) => {
                "High risk of disc problems and nerve compression"
            }
            (IssueType::CervicalCurve, Severity::Moderate) => "Increased cervical spine stress",
            (IssueType::CervicalCurve, Severity::Mild) => "Minor cervical curve variation",
        }
    }
}

/// Exclusive lower bounds for emitting an issue and escalating its severity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityLadder {
    pub emit_above: f64,
    pub moderate_above: f64,
    pub severe_above: f64,
}

impl SeverityLadder {
    pub fn classify(&self, value: f64) -> Option<Severity> {
        if !(value > self.emit_above) {
            None
        } else if value > self.severe_above {
            Some(Severity::Severe)
        } else if value > self.moderate_above {
            Some(Severity::Moderate)
        } else {
            Some(Severity::Mild)
        }
    }
}

pub const FORWARD_HEAD_LADDER: SeverityLadder = SeverityLadder {
    emit_above: 0.15,
    moderate_above: 0.25,
    severe_above: 0.35,
};

pub const SHOULDER_IMBALANCE_LADDER: SeverityLadder = SeverityLadder {
    emit_above: 0.08,
    moderate_above: 0.14,
    severe_above: 0.20,
};

pub const HEAD_TILT_LADDER: SeverityLadder = SeverityLadder {
    emit_above: 5.0,
    moderate_above: 10.0,
    severe_above: 15.0,
};

pub const ROUNDED_SHOULDERS_LADDER: SeverityLadder = SeverityLadder {
    emit_above: 0.12,
    moderate_above: 0.18,
    severe_above: 0.25,
};

pub const SPINAL_MISALIGNMENT_LADDER: SeverityLadder = SeverityLadder {
    emit_above: 0.08,
    moderate_above: 0.12,
    severe_above: 0.15,
};

/// Two-sided band for the neck angle, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleBand {
    /// Healthy range; anything outside emits an issue
    pub normal: (f64, f64),
    pub moderate_outside: (f64, f64),
    pub severe_outside: (f64, f64),
}

impl AngleBand {
    pub fn classify(&self, angle: f64) -> Option<Severity> {
        let outside = |(low, high): (f64, f64)| angle < low || angle > high;

        if !outside(self.normal) {
            return None;
        }

        if outside(self.severe_outside) {
            Some(Severity::Severe)
        } else if outside(self.moderate_outside) {
            Some(Severity::Moderate)
        } else {
            Some(Severity::Mild)
        }
    }

    /// Side of the healthy range an abnormal angle falls on
    pub fn condition(&self, angle: f64) -> CervicalCondition {
        if angle < self.normal.0 {
            CervicalCondition::LossOfLordosis
        } else {
            CervicalCondition::ExcessiveExtension
        }
    }
}

pub const NECK_ANGLE_BAND: AngleBand = AngleBand {
    normal: (35.0, 55.0),
    moderate_outside: (30.0, 60.0),
    severe_outside: (25.0, 65.0),
};

/// Direction in which the cervical curve departs from normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CervicalCondition {
    LossOfLordosis,
    ExcessiveExtension,
}

impl CervicalCondition {
    pub fn description(&self) -> &'static str {
        match self {
            CervicalCondition::LossOfLordosis => "loss of cervical lordosis",
            CervicalCondition::ExcessiveExtension => "excessive cervical extension",
        }
    }

    pub fn primary_exercise(&self) -> &'static str {
        match self {
            CervicalCondition::LossOfLordosis => "Practice cervical extension exercises",
            CervicalCondition::ExcessiveExtension => "Focus on chin tuck movements",
        }
    }
}

const FORWARD_HEAD_RECOMMENDATIONS: [&str; 5] = [
    "Perform chin tuck exercises (10 reps, 3 times daily)",
    "Raise screen to eye level",
    "Take posture breaks every 20 minutes",
    "Strengthen deep neck flexor muscles",
    "Sleep with proper pillow support",
];

const SHOULDER_IMBALANCE_RECOMMENDATIONS: [&str; 3] = [
    "Check bag carrying habits and workspace setup",
    "Practice shoulder blade squeezes",
    "Consider professional assessment if severe",
];

const HEAD_TILT_RECOMMENDATIONS: [&str; 5] = [
    "Practice head leveling exercises",
    "Check monitor and workspace positioning",
    "Stretch tight neck muscles on the shortened side",
    "Strengthen weak neck muscles on the lengthened side",
    "Be conscious of phone and reading posture",
];

const ROUNDED_SHOULDERS_RECOMMENDATIONS: [&str; 5] = [
    "Perform doorway chest stretches (30 seconds, 3x daily)",
    "Strengthen rhomboids and middle trapezius",
    "Practice wall slides exercise",
    "Adjust workstation ergonomics",
    "Focus on opening chest throughout the day",
];

const SPINAL_MISALIGNMENT_RECOMMENDATIONS: [&str; 5] = [
    "Practice wall posture exercises daily",
    "Focus on stacking head over shoulders over hips",
    "Strengthen postural support muscles",
    "Consider ergonomic assessment",
    "Maintain awareness of posture throughout day",
];

const CERVICAL_CURVE_RECOMMENDATIONS: [&str; 4] = [
    "Maintain neutral spine during activities",
    "Use proper pillow support while sleeping",
    "Consider physiotherapy evaluation",
    "Avoid prolonged neck flexion/extension",
];

/// Issue type together with the sub-condition its text depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finding {
    ForwardHeadPosture,
    ShoulderImbalance { elevated: Side },
    HeadTilt(TiltDirection),
    RoundedShoulders,
    SpinalMisalignment,
    CervicalCurve(CervicalCondition),
}

impl Finding {
    pub fn kind(&self) -> IssueType {
        match self {
            Finding::ForwardHeadPosture => IssueType::ForwardHeadPosture,
            Finding::ShoulderImbalance { .. } => IssueType::ShoulderImbalance,
            Finding::HeadTilt(_) => IssueType::HeadTilt,
            Finding::RoundedShoulders => IssueType::RoundedShoulders,
            Finding::SpinalMisalignment => IssueType::SpinalMisalignment,
            Finding::CervicalCurve(_) => IssueType::CervicalCurve,
        }
    }

    /// Finding for `kind` as observed in `features`
    pub fn observed(kind: IssueType, features: &PostureFeatures, value: f64) -> Self {
        match kind {
            IssueType::ForwardHeadPosture => Finding::ForwardHeadPosture,
            IssueType::ShoulderImbalance => Finding::ShoulderImbalance {
                elevated: features.elevated_shoulder,
            },
            IssueType::HeadTilt => Finding::HeadTilt(features.tilt_direction),
            IssueType::RoundedShoulders => Finding::RoundedShoulders,
            IssueType::SpinalMisalignment => Finding::SpinalMisalignment,
            IssueType::CervicalCurve => Finding::CervicalCurve(NECK_ANGLE_BAND.condition(value)),
        }
    }

    pub fn recommendations(&self) -> Vec<String> {
        match self {
            Finding::ForwardHeadPosture => fixed(&FORWARD_HEAD_RECOMMENDATIONS),
            Finding::ShoulderImbalance { elevated } => {
                let mut lines = vec![
                    format!("Stretch the elevated {} shoulder and neck", elevated.name()),
                    format!("Strengthen the lower {} shoulder", elevated.opposite().name()),
                ];
                lines.extend(fixed(&SHOULDER_IMBALANCE_RECOMMENDATIONS));
                lines
            }
            Finding::HeadTilt(_) => fixed(&HEAD_TILT_RECOMMENDATIONS),
            Finding::RoundedShoulders => fixed(&ROUNDED_SHOULDERS_RECOMMENDATIONS),
            Finding::SpinalMisalignment => fixed(&SPINAL_MISALIGNMENT_RECOMMENDATIONS),
            Finding::CervicalCurve(condition) => {
                let mut lines = vec![condition.primary_exercise().to_string()];
                lines.extend(fixed(&CERVICAL_CURVE_RECOMMENDATIONS));
                lines
            }
        }
    }

    /// Human-readable description for a graded value
    pub fn describe(&self, value: f64) -> String {
        match self {
            Finding::ForwardHeadPosture => format!(
                "Forward head posture detected ({}% deviation)",
                one_decimal(value * 100.0)
            ),
            Finding::ShoulderImbalance { elevated } => format!(
                "{} shoulder elevated ({}% imbalance)",
                elevated.capitalized(),
                one_decimal(value * 100.0)
            ),
            Finding::HeadTilt(direction) => {
                format!("Head tilted {}° {}", one_decimal(value), direction.name())
            }
            Finding::RoundedShoulders => format!(
                "Rounded shoulders detected ({}% forward position)",
                one_decimal(value * 100.0)
            ),
            Finding::SpinalMisalignment => format!(
                "Spinal misalignment detected ({}% deviation)",
                one_decimal(value * 100.0)
            ),
            Finding::CervicalCurve(condition) => format!(
                "{} ({}° - normal: 40-45°)",
                condition.description(),
                one_decimal(value)
            ),
        }
    }
}

fn fixed(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

/// One decimal place with ties rounded away from zero (31.25 -> "31.3")
pub fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

/// A detected posture issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueType,
    pub severity: Severity,
    pub description: String,
    /// Value the severity was graded on
    pub measurement: f64,
    pub impact: String,
    pub recommendations: Vec<String>,
}

impl Issue {
    pub fn new(finding: Finding, severity: Severity, measurement: f64) -> Self {
        let kind = finding.kind();
        Self {
            kind,
            severity,
            description: finding.describe(measurement),
            measurement,
            impact: kind.impact(severity).to_string(),
            recommendations: finding.recommendations(),
        }
    }
}

/// Grade one issue type against the extracted features
pub fn evaluate(kind: IssueType, features: &PostureFeatures) -> Option<Issue> {
    let raw = features.get(kind.measurement())?;

    let (severity, value) = match kind {
        IssueType::CervicalCurve => (NECK_ANGLE_BAND.classify(raw)?, raw),
        IssueType::RoundedShoulders => {
            let value = raw.abs();
            (kind.ladder()?.classify(value)?, value)
        }
        _ => (kind.ladder()?.classify(raw)?, raw),
    };

    Some(Issue::new(Finding::observed(kind, features, value), severity, value))
}

/// Detect all issues, in evaluation order
pub fn detect_issues(features: &PostureFeatures) -> Vec<Issue> {
    IssueType::ALL
        .into_iter()
        .filter_map(|kind| evaluate(kind, features))
        .collect()
}
