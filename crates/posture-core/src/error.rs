//! Error types for the posture scoring workspace.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Insufficient landmarks detected: need {required}, have {available}")]
    InsufficientLandmarks { required: usize, available: usize },

    #[error("Landmark provider error: {0}")]
    Provider(String),

    #[error("Unknown photo: {0}")]
    UnknownPhoto(String),

    #[error("Capture session error: {0}")]
    Session(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
