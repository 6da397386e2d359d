//! Capture session configuration.

use posture_analysis::DEFAULT_ANALYSIS_METHOD;
use posture_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which camera a photo was taken with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    Front,
    Back,
}

impl CameraFacing {
    pub fn toggled(&self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

/// Complete capture session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Provenance label attached to every report
    pub analysis_method: String,

    /// Photos allowed in one auto-capture sequence
    pub max_auto_photos: u32,

    /// Analyses allowed in flight at once
    pub max_in_flight: usize,

    /// Camera used until the session switches
    pub default_camera_facing: CameraFacing,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            analysis_method: DEFAULT_ANALYSIS_METHOD.to_string(),
            max_auto_photos: 5,
            max_in_flight: 64,
            default_camera_facing: CameraFacing::Front,
        }
    }
}

impl CaptureConfig {
    /// Load configuration from file, overridden by `POSTURE_*` variables
    pub fn from_file(path: &str) -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("POSTURE"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables
    pub fn from_env() -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("POSTURE"))
            .build()?;

        settings.try_deserialize()
    }

    /// Parse a TOML document
    pub fn from_toml(toml: &str) -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_auto_photos == 0 {
            return Err(Error::Config("max_auto_photos must be at least 1".to_string()));
        }
        if self.max_in_flight == 0 {
            return Err(Error::Config("max_in_flight must be at least 1".to_string()));
        }
        if self.analysis_method.trim().is_empty() {
            return Err(Error::Config("analysis_method must not be empty".to_string()));
        }
        Ok(())
    }
}
