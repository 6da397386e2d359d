//! Capture session state machine.
//!
//! Photos are registered synchronously and analyzed on spawned tasks joined
//! through a `JoinSet`. Each task yields `(photo id, outcome)`; the session
//! applies completions to the matching record, whatever order they arrive in.
//! A provider that panics fails its own photo and nothing else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;

use posture_analysis::{analyze, AnalysisReport};
use posture_core::{Error, PhotoId, Result};

use crate::config::{CameraFacing, CaptureConfig};
use crate::provider::LandmarkProvider;

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Capturing,
    Analyzing,
}

/// Analysis progress of one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PhotoStatus {
    Pending,
    Analyzed(AnalysisReport),
    Failed(String),
}

/// A captured photo and its analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: PhotoId,
    pub image_uri: String,
    pub captured_at: DateTime<Utc>,
    pub camera_facing: CameraFacing,
    pub auto_capture: bool,
    /// Position within the auto-capture sequence, starting at 1
    pub photo_number: Option<u32>,
    pub status: PhotoStatus,
}

impl PhotoRecord {
    pub fn report(&self) -> Option<&AnalysisReport> {
        match &self.status {
            PhotoStatus::Analyzed(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, PhotoStatus::Pending)
    }
}

/// Aggregate counts over a session's photos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: usize,
    pub analyzed: usize,
    pub failed: usize,
    pub pending: usize,
    /// Mean posture score of analyzed photos
    pub mean_score: Option<f64>,
}

/// Result of one analysis task
#[derive(Debug)]
struct Completion {
    photo_id: PhotoId,
    outcome: Result<AnalysisReport>,
}

/// Photo capture session dispatching one analysis task per photo
pub struct CaptureSession<P: LandmarkProvider + 'static> {
    config: CaptureConfig,
    provider: Arc<P>,
    camera_facing: CameraFacing,
    capturing: bool,
    photos: Vec<PhotoRecord>,
    auto_count: u32,
    analyses: JoinSet<Completion>,
}

impl<P: LandmarkProvider + 'static> CaptureSession<P> {
    pub fn new(config: CaptureConfig, provider: P) -> Result<Self> {
        Self::with_shared_provider(config, Arc::new(provider))
    }

    /// Create a session over a provider shared with other owners
    pub fn with_shared_provider(config: CaptureConfig, provider: Arc<P>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            camera_facing: config.default_camera_facing,
            config,
            provider,
            capturing: false,
            photos: Vec::new(),
            auto_count: 0,
            analyses: JoinSet::new(),
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        if self.capturing {
            SessionState::Capturing
        } else if !self.analyses.is_empty() {
            SessionState::Analyzing
        } else {
            SessionState::Idle
        }
    }

    /// Number of analyses not yet applied
    pub fn in_flight(&self) -> usize {
        self.analyses.len()
    }

    pub fn camera_facing(&self) -> CameraFacing {
        self.camera_facing
    }

    /// Applies to photos captured from now on
    pub fn set_camera_facing(&mut self, facing: CameraFacing) {
        self.camera_facing = facing;
    }

    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    pub fn photo(&self, id: PhotoId) -> Option<&PhotoRecord> {
        self.photos.iter().find(|p| p.id == id)
    }

    /// Auto captures taken in the current sequence
    pub fn auto_count(&self) -> u32 {
        self.auto_count
    }

    /// Start a capture before the image is available
    pub fn begin_capture(&mut self) -> Result<()> {
        if self.capturing {
            return Err(Error::Session("capture already in progress".to_string()));
        }
        self.capturing = true;
        Ok(())
    }

    pub fn cancel_capture(&mut self) {
        self.capturing = false;
    }

    /// Start a new auto-capture sequence numbered from 1
    pub fn reset_auto_sequence(&mut self) {
        self.auto_count = 0;
    }

    /// Register a captured photo and dispatch its analysis.
    ///
    /// Must be called from within a tokio runtime.
    pub fn capture(&mut self, image_uri: impl Into<String>, auto: bool) -> Result<PhotoId> {
        if auto && self.auto_count >= self.config.max_auto_photos {
            return Err(Error::Session(format!(
                "auto capture limit of {} photos reached",
                self.config.max_auto_photos
            )));
        }
        if self.analyses.len() >= self.config.max_in_flight {
            return Err(Error::Session(format!(
                "{} analyses already in flight",
                self.analyses.len()
            )));
        }

        self.capturing = false;

        let photo_number = if auto {
            self.auto_count += 1;
            Some(self.auto_count)
        } else {
            None
        };

        let image_uri = image_uri.into();
        let record = PhotoRecord {
            id: PhotoId::new(),
            image_uri: image_uri.clone(),
            captured_at: Utc::now(),
            camera_facing: self.camera_facing,
            auto_capture: auto,
            photo_number,
            status: PhotoStatus::Pending,
        };
        let photo_id = record.id;
        self.photos.push(record);

        tracing::info!(
            "Captured photo {} ({}) for {} provider{}",
            photo_id,
            image_uri,
            self.provider.name(),
            photo_number
                .map(|n| format!(" auto {}/{}", n, self.config.max_auto_photos))
                .unwrap_or_default()
        );

        self.dispatch(photo_id, image_uri);
        Ok(photo_id)
    }

    fn dispatch(&mut self, photo_id: PhotoId, image_uri: String) {
        let provider = Arc::clone(&self.provider);
        let method = self.config.analysis_method.clone();

        self.analyses.spawn(async move {
            let provider_name = provider.name().to_string();

            // Inner task so a panicking provider surfaces as a JoinError
            let detection = tokio::spawn(async move {
                let landmarks = provider.detect(&image_uri).await?;
                let analysis = analyze(&landmarks)?;
                Ok::<_, Error>(AnalysisReport::new(analysis, image_uri).with_method(method))
            });

            let outcome = match detection.await {
                Ok(outcome) => outcome,
                Err(e) => Err(Error::Provider(format!(
                    "{} provider aborted: {}",
                    provider_name, e
                ))),
            };

            Completion { photo_id, outcome }
        });
    }

    /// Wait for the next analysis to finish and apply it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Result<Option<PhotoRecord>> {
        let Some(joined) = self.analyses.join_next().await else {
            return Ok(None);
        };

        let completion =
            joined.map_err(|e| Error::Session(format!("analysis task cancelled: {}", e)))?;

        self.apply(completion).map(Some)
    }

    fn apply(&mut self, completion: Completion) -> Result<PhotoRecord> {
        let Completion { photo_id, outcome } = completion;

        let record = self
            .photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| Error::UnknownPhoto(photo_id.to_string()))?;

        record.status = match outcome {
            Ok(report) => {
                tracing::debug!(
                    "Photo {} scored {} ({})",
                    photo_id,
                    report.analysis.posture_score,
                    report.analysis.overall_assessment.label()
                );
                PhotoStatus::Analyzed(report)
            }
            Err(e) => {
                tracing::warn!("Analysis of photo {} failed: {}", photo_id, e);
                PhotoStatus::Failed(e.to_string())
            }
        };

        Ok(record.clone())
    }

    /// Wait for every in-flight analysis, returning records in completion order
    pub async fn drain(&mut self) -> Result<Vec<PhotoRecord>> {
        let mut completed = Vec::with_capacity(self.analyses.len());
        while let Some(record) = self.next_completion().await? {
            completed.push(record);
        }
        Ok(completed)
    }

    pub fn summary(&self) -> SessionSummary {
        let scores: Vec<f64> = self
            .photos
            .iter()
            .filter_map(|p| p.report())
            .map(|r| f64::from(r.analysis.posture_score))
            .collect();
        let failed = self
            .photos
            .iter()
            .filter(|p| matches!(p.status, PhotoStatus::Failed(_)))
            .count();

        SessionSummary {
            total: self.photos.len(),
            analyzed: scores.len(),
            failed,
            pending: self.photos.iter().filter(|p| p.is_pending()).count(),
            mean_score: if scores.is_empty() {
                None
            } else {
                Some(scores.iter().sum::<f64>() / scores.len() as f64)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::FixtureProvider;
    use async_trait::async_trait;
    use posture_analysis::{Assessment, IssueType};
    use posture_core::fixtures::PoseBuilder;
    use posture_core::PoseLandmark;
    use std::time::Duration;

    const UPRIGHT: &str = "file:///photos/upright.jpg";
    const SLOUCHED: &str = "file:///photos/slouched.jpg";
    const CROPPED: &str = "file:///photos/cropped.jpg";

    fn slouched() -> Vec<posture_core::Landmark> {
        PoseBuilder::upright()
            .shift(PoseLandmark::LeftEar, 0.125, 0.0)
            .shift(PoseLandmark::RightEar, 0.125, 0.0)
            .set(PoseLandmark::Nose, 0.75, 0.625)
            .build()
    }

    fn provider() -> FixtureProvider {
        FixtureProvider::new()
            .with_pose(UPRIGHT, PoseBuilder::upright().build())
            .with_pose(SLOUCHED, slouched())
            .with_pose(CROPPED, PoseBuilder::upright().truncate(10).build())
    }

    fn session(provider: FixtureProvider) -> CaptureSession<FixtureProvider> {
        CaptureSession::new(CaptureConfig::default(), provider).unwrap()
    }

    #[tokio::test]
    async fn test_capture_and_analyze() {
        let mut session = session(provider());
        assert_eq!(session.state(), SessionState::Idle);

        let id = session.capture(UPRIGHT, false).unwrap();
        assert_eq!(session.state(), SessionState::Analyzing);
        assert!(session.photo(id).unwrap().is_pending());

        let record = session.next_completion().await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(session.state(), SessionState::Idle);

        let report = record.report().unwrap();
        assert_eq!(report.analysis.posture_score, 100);
        assert_eq!(report.analysis.overall_assessment, Assessment::Excellent);
        assert_eq!(report.image_uri, UPRIGHT);
        assert_eq!(report.analysis_method, posture_analysis::DEFAULT_ANALYSIS_METHOD);

        assert!(session.next_completion().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_out_of_order_completion() {
        let provider = provider().with_delay(UPRIGHT, Duration::from_millis(100));
        let mut session = session(provider);

        let slow = session.capture(UPRIGHT, false).unwrap();
        let fast = session.capture(SLOUCHED, false).unwrap();
        assert_eq!(session.in_flight(), 2);

        let completed = session.drain().await.unwrap();
        assert_eq!(completed.len(), 2);
        assert_eq!(completed[0].id, fast);
        assert_eq!(completed[1].id, slow);

        let slow_report = session.photo(slow).unwrap().report().unwrap();
        assert_eq!(slow_report.image_uri, UPRIGHT);
        assert_eq!(slow_report.analysis.posture_score, 100);

        let fast_report = session.photo(fast).unwrap().report().unwrap();
        assert_eq!(fast_report.image_uri, SLOUCHED);
        assert!(fast_report.analysis.issue(IssueType::ForwardHeadPosture).is_some());

        // Records keep capture order
        assert_eq!(session.photos()[0].id, slow);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_provider_failure_marks_photo_failed() {
        let mut session = session(provider());

        let id = session.capture("file:///photos/unknown.jpg", false).unwrap();
        session.drain().await.unwrap();

        match &session.photo(id).unwrap().status {
            PhotoStatus::Failed(message) => assert!(message.contains("provider")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_insufficient_landmarks_marks_photo_failed() {
        let mut session = session(provider());

        let id = session.capture(CROPPED, false).unwrap();
        session.drain().await.unwrap();

        match &session.photo(id).unwrap().status {
            PhotoStatus::Failed(message) => {
                assert_eq!(message, "Insufficient landmarks detected: need 33, have 10")
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_auto_capture_limit() {
        let config = CaptureConfig {
            max_auto_photos: 2,
            ..Default::default()
        };
        let mut session = CaptureSession::new(config, provider()).unwrap();

        let first = session.capture(UPRIGHT, true).unwrap();
        let second = session.capture(UPRIGHT, true).unwrap();
        assert!(matches!(session.capture(UPRIGHT, true), Err(Error::Session(_))));

        // Manual captures are not counted
        let manual = session.capture(UPRIGHT, false).unwrap();

        assert_eq!(session.photo(first).unwrap().photo_number, Some(1));
        assert_eq!(session.photo(second).unwrap().photo_number, Some(2));
        assert_eq!(session.photo(manual).unwrap().photo_number, None);
        assert_eq!(session.photos().len(), 3);

        session.reset_auto_sequence();
        let restarted = session.capture(UPRIGHT, true).unwrap();
        assert_eq!(session.photo(restarted).unwrap().photo_number, Some(1));

        session.drain().await.unwrap();
    }

    #[tokio::test]
    async fn test_begin_capture_state() {
        let mut session = session(provider());

        session.begin_capture().unwrap();
        assert_eq!(session.state(), SessionState::Capturing);
        assert!(matches!(session.begin_capture(), Err(Error::Session(_))));

        session.cancel_capture();
        assert_eq!(session.state(), SessionState::Idle);

        session.begin_capture().unwrap();
        session.capture(UPRIGHT, false).unwrap();
        assert_eq!(session.state(), SessionState::Analyzing);

        session.drain().await.unwrap();
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_camera_facing_applies_to_later_captures() {
        let mut session = session(provider());

        let front = session.capture(UPRIGHT, false).unwrap();
        session.set_camera_facing(CameraFacing::Back);
        let back = session.capture(UPRIGHT, false).unwrap();

        assert_eq!(session.photo(front).unwrap().camera_facing, CameraFacing::Front);
        assert_eq!(session.photo(back).unwrap().camera_facing, CameraFacing::Back);

        session.drain().await.unwrap();
    }

    #[tokio::test]
    async fn test_summary() {
        let mut session = session(provider());

        session.capture(UPRIGHT, false).unwrap();
        session.capture(SLOUCHED, false).unwrap();
        session.capture(CROPPED, false).unwrap();

        let pending = session.summary();
        assert_eq!(pending.total, 3);
        assert_eq!(pending.pending, 3);
        assert_eq!(pending.mean_score, None);

        session.drain().await.unwrap();

        let summary = session.summary();
        assert_eq!(summary.analyzed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.pending, 0);
        assert_eq!(summary.mean_score, Some((100.0 + 83.0) / 2.0));
    }

    #[tokio::test]
    async fn test_configured_method_label() {
        let config = CaptureConfig {
            analysis_method: "Fixture landmarks".to_string(),
            ..Default::default()
        };
        let mut session = CaptureSession::new(config, provider()).unwrap();

        session.capture(UPRIGHT, false).unwrap();
        let record = session.next_completion().await.unwrap().unwrap();
        assert_eq!(record.report().unwrap().analysis_method, "Fixture landmarks");
    }

    #[tokio::test]
    async fn test_record_json_round_trip() {
        let mut session = session(provider());

        session.capture(SLOUCHED, true).unwrap();
        let record = session.next_completion().await.unwrap().unwrap();

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"status\":\"analyzed\""));
        assert!(json.contains("\"camera_facing\":\"front\""));

        let parsed: PhotoRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    struct PanickingProvider;

    #[async_trait]
    impl LandmarkProvider for PanickingProvider {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn detect(&self, _image_uri: &str) -> Result<Vec<posture_core::Landmark>> {
            panic!("detector crashed")
        }
    }

    #[tokio::test]
    async fn test_panicking_provider_fails_photo() {
        let mut session = CaptureSession::new(CaptureConfig::default(), PanickingProvider).unwrap();

        let id = session.capture("file:///photos/crash.jpg", false).unwrap();
        let completed = tokio::time::timeout(Duration::from_secs(5), session.drain())
            .await
            .expect("drain finished")
            .unwrap();

        assert_eq!(completed.len(), 1);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.in_flight(), 0);
        match &session.photo(id).unwrap().status {
            PhotoStatus::Failed(message) => {
                assert!(message.contains("panicking provider"));
                assert!(message.contains("panicked"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(session.summary().failed, 1);
    }

    #[tokio::test]
    async fn test_rejected_auto_capture_keeps_capturing() {
        let config = CaptureConfig {
            max_auto_photos: 1,
            ..Default::default()
        };
        let mut session = CaptureSession::new(config, provider()).unwrap();

        session.capture(UPRIGHT, true).unwrap();
        session.begin_capture().unwrap();
        assert!(matches!(session.capture(UPRIGHT, true), Err(Error::Session(_))));
        assert_eq!(session.state(), SessionState::Capturing);

        session.cancel_capture();
        session.drain().await.unwrap();
    }

    #[tokio::test]
    async fn test_in_flight_limit() {
        let config = CaptureConfig {
            max_in_flight: 1,
            ..Default::default()
        };
        let provider = provider().with_delay(UPRIGHT, Duration::from_millis(50));
        let mut session = CaptureSession::new(config, provider).unwrap();

        session.capture(UPRIGHT, false).unwrap();
        assert!(matches!(session.capture(SLOUCHED, false), Err(Error::Session(_))));
        assert_eq!(session.photos().len(), 1);

        session.drain().await.unwrap();
        session.capture(SLOUCHED, false).unwrap();
        session.drain().await.unwrap();
        assert_eq!(session.summary().analyzed, 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CaptureConfig {
            max_in_flight: 0,
            ..Default::default()
        };
        assert!(matches!(
            CaptureSession::new(config, FixtureProvider::new()),
            Err(Error::Config(_))
        ));
    }
}
