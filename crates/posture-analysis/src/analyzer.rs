//! Posture analysis entry point and result records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use posture_core::{Landmark, PoseView, Result};
use serde::{Deserialize, Serialize};

use crate::confidence::estimate_confidence;
use crate::features::{Measurement, PostureFeatures};
use crate::issues::{detect_issues, Issue, IssueType, Severity};
use crate::scoring::{self, posture_score, Assessment};

/// Provenance label attached to reports by default
pub const DEFAULT_ANALYSIS_METHOD: &str = "Enhanced Rule-based + MediaPipe Landmarks v2.0";

/// Complete assessment of one pose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureAnalysis {
    pub landmarks_count: usize,
    /// Detection confidence in [0.5, 1.0]
    pub confidence: f64,
    pub measurements: BTreeMap<Measurement, f64>,
    /// Measurements whose geometry was degenerate for this pose
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmeasurable: Vec<Measurement>,
    pub issues: Vec<Issue>,
    pub posture_score: u8,
    pub overall_assessment: Assessment,
    pub quality_color: String,
    pub status_message: String,
}

impl PostureAnalysis {
    pub fn issue(&self, kind: IssueType) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.kind == kind)
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn severity_score(&self) -> u32 {
        scoring::severity_score(&self.issues)
    }

    pub fn worst_severity(&self) -> Option<Severity> {
        scoring::worst_severity(&self.issues)
    }

    pub fn measurement(&self, measurement: Measurement) -> Option<f64> {
        self.measurements.get(&measurement).copied()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Analyze a landmark sequence.
///
/// Fails only when fewer than 33 landmarks are supplied.
pub fn analyze(landmarks: &[Landmark]) -> Result<PostureAnalysis> {
    let pose = PoseView::from_slice(landmarks)?;
    Ok(analyze_pose(&pose))
}

/// Analyze an already validated pose
pub fn analyze_pose(pose: &PoseView<'_>) -> PostureAnalysis {
    let confidence = estimate_confidence(pose);
    let features = PostureFeatures::extract(pose);
    let issues = detect_issues(&features);

    let score = posture_score(scoring::severity_score(&issues), confidence);
    let assessment = Assessment::from_score(score);

    tracing::debug!(
        "Posture analyzed: score {} ({}), {} issues, confidence {:.2}",
        score,
        assessment.label(),
        issues.len(),
        confidence
    );

    PostureAnalysis {
        landmarks_count: pose.len(),
        confidence,
        measurements: features.measurements(),
        unmeasurable: features.unmeasurable(),
        issues,
        posture_score: score,
        overall_assessment: assessment,
        quality_color: assessment.color().to_string(),
        status_message: assessment.status_message().to_string(),
    }
}

/// Analysis result with the caller-attached provenance fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub analysis: PostureAnalysis,
    pub timestamp: DateTime<Utc>,
    pub analysis_method: String,
    /// Opaque reference to the source image
    pub image_uri: String,
}

impl AnalysisReport {
    /// Stamp an analysis with the current time and the default method label
    pub fn new(analysis: PostureAnalysis, image_uri: impl Into<String>) -> Self {
        Self {
            analysis,
            timestamp: Utc::now(),
            analysis_method: DEFAULT_ANALYSIS_METHOD.to_string(),
            image_uri: image_uri.into(),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.analysis_method = method.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
