//! Landmark providers.
//!
//! The pose detector lives outside this workspace. A provider turns an opaque
//! image URI into the ordered landmark sequence the scoring core consumes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use posture_core::{Error, Landmark, Result};

/// Source of pose landmarks for a captured image
#[async_trait]
pub trait LandmarkProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Detect landmarks in the image behind `image_uri`
    async fn detect(&self, image_uri: &str) -> Result<Vec<Landmark>>;
}

/// Deterministic provider serving fixed landmark sets per image URI
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    poses: HashMap<String, Vec<Landmark>>,
    delays: HashMap<String, Duration>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON object mapping image URI to a landmark array
    pub fn from_json(json: &str) -> Result<Self> {
        let poses: HashMap<String, Vec<Landmark>> = serde_json::from_str(json)?;
        Ok(Self {
            poses,
            delays: HashMap::new(),
        })
    }

    pub fn with_pose(mut self, image_uri: impl Into<String>, landmarks: Vec<Landmark>) -> Self {
        self.insert(image_uri, landmarks);
        self
    }

    /// Hold back detection for `image_uri` by `delay`
    pub fn with_delay(mut self, image_uri: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(image_uri.into(), delay);
        self
    }

    pub fn insert(&mut self, image_uri: impl Into<String>, landmarks: Vec<Landmark>) {
        self.poses.insert(image_uri.into(), landmarks);
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

#[async_trait]
impl LandmarkProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn detect(&self, image_uri: &str) -> Result<Vec<Landmark>> {
        if let Some(delay) = self.delays.get(image_uri) {
            tokio::time::sleep(*delay).await;
        }

        self.poses
            .get(image_uri)
            .cloned()
            .ok_or_else(|| Error::Provider(format!("no pose detected in {}", image_uri)))
    }
}
