//! Score aggregation and qualitative assessment.
//!
//! ```text
//! severity_score = Σ weight(issue.severity)          mild=1, moderate=2, severe=3
//! raw_score      = max(0, (18 - severity_score) / 18)
//! posture_score  = round(raw_score × confidence × 100)
//! ```
//!
//! The denominator is fixed at six issue types at full severity, regardless of
//! how many issues were actually emitted.

use serde::{Deserialize, Serialize};

use crate::issues::{Issue, IssueType, Severity};

/// Severity score of a pose showing every issue type at severe
pub const MAX_SEVERITY_SCORE: u32 = IssueType::COUNT as u32 * 3;

/// Sum of severity weights, independent of issue order
pub fn severity_score(issues: &[Issue]) -> u32 {
    issues.iter().map(|issue| issue.severity.weight()).sum()
}

/// Fraction of the maximum severity budget left unused, in [0, 1]
pub fn raw_score(severity_score: u32) -> f64 {
    let max = MAX_SEVERITY_SCORE as f64;
    ((max - severity_score as f64) / max).max(0.0)
}

/// Final 0-100 posture score
pub fn posture_score(severity_score: u32, confidence: f64) -> u8 {
    let score = (raw_score(severity_score) * confidence * 100.0).round();
    score.clamp(0.0, 100.0) as u8
}

/// Qualitative band of a posture score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Assessment {
    Critical,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Assessment {
    /// Band containing `score`; lower bounds are inclusive
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Assessment::Excellent,
            75..=89 => Assessment::Good,
            60..=74 => Assessment::Fair,
            40..=59 => Assessment::Poor,
            _ => Assessment::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Assessment::Excellent => "Excellent",
            Assessment::Good => "Good",
            Assessment::Fair => "Fair",
            Assessment::Poor => "Poor",
            Assessment::Critical => "Critical",
        }
    }

    /// Display color token
    pub fn color(&self) -> &'static str {
        match self {
            Assessment::Excellent => "#34C759",
            Assessment::Good => "#30D158",
            Assessment::Fair => "#FF9500",
            Assessment::Poor => "#FF6B35",
            Assessment::Critical => "#FF3B30",
        }
    }

    pub fn status_message(&self) -> &'static str {
        match self {
            Assessment::Excellent => "Outstanding posture! Keep up the great work.",
            Assessment::Good => "Good posture with minor areas for improvement.",
            Assessment::Fair => "Moderate posture issues detected. Focus on corrections.",
            Assessment::Poor => "Multiple posture problems. Consistent effort needed.",
            Assessment::Critical => "Severe posture issues. Consider professional help.",
        }
    }
}

/// Highest severity among the issues, if any
pub fn worst_severity(issues: &[Issue]) -> Option<Severity> {
    issues.iter().map(|issue| issue.severity).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::TiltDirection;
    use crate::issues::Finding;

    fn issue(severity: Severity) -> Issue {
        Issue::new(Finding::HeadTilt(TiltDirection::Clockwise), severity, 12.0)
    }

    #[test]
    fn test_max_severity_score() {
        assert_eq!(MAX_SEVERITY_SCORE, 18);
    }

    #[test]
    fn test_no_issues_score_is_confidence() {
        assert_eq!(posture_score(0, 1.0), 100);
        assert_eq!(posture_score(0, 0.5), 50);
        assert_eq!(posture_score(0, 0.834), 83);
    }

    #[test]
    fn test_severity_weights() {
        let issues = vec![
            issue(Severity::Severe),
            issue(Severity::Mild),
            issue(Severity::Moderate),
        ];
        assert_eq!(severity_score(&issues), 6);
        // (18 - 6) / 18 * 100
        assert_eq!(posture_score(6, 1.0), 67);
        assert_eq!(worst_severity(&issues), Some(Severity::Severe));
    }

    #[test]
    fn test_all_severe_scores_zero() {
        assert_eq!(posture_score(MAX_SEVERITY_SCORE, 1.0), 0);
        assert_eq!(raw_score(MAX_SEVERITY_SCORE + 3), 0.0);
    }

    #[test]
    fn test_single_severe_issue() {
        // 15 / 18 = 0.8333...
        assert_eq!(posture_score(3, 1.0), 83);
        assert_eq!(Assessment::from_score(83), Assessment::Good);
    }

    #[test]
    fn test_assessment_bands() {
        assert_eq!(Assessment::from_score(100), Assessment::Excellent);
        assert_eq!(Assessment::from_score(90), Assessment::Excellent);
        assert_eq!(Assessment::from_score(89), Assessment::Good);
        assert_eq!(Assessment::from_score(75), Assessment::Good);
        assert_eq!(Assessment::from_score(74), Assessment::Fair);
        assert_eq!(Assessment::from_score(60), Assessment::Fair);
        assert_eq!(Assessment::from_score(59), Assessment::Poor);
        assert_eq!(Assessment::from_score(40), Assessment::Poor);
        assert_eq!(Assessment::from_score(39), Assessment::Critical);
        assert_eq!(Assessment::from_score(0), Assessment::Critical);
    }

    #[test]
    fn test_assessment_serializes_as_label() {
        for assessment in [
            Assessment::Excellent,
            Assessment::Good,
            Assessment::Fair,
            Assessment::Poor,
            Assessment::Critical,
        ] {
            let json = serde_json::to_string(&assessment).unwrap();
            assert_eq!(json, format!("\"{}\"", assessment.label()));
        }
    }

    #[test]
    fn test_score_bounds() {
        for severity in 0..=MAX_SEVERITY_SCORE {
            for confidence in [0.5, 0.75, 1.0] {
                let score = posture_score(severity, confidence);
                assert!(score <= 100);
            }
        }
    }
}
