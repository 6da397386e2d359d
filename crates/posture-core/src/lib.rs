//! # Posture-Core
//!
//! Core types and utilities for rule-based posture scoring: pose landmarks
//! as delivered by a MediaPipe-style detector, 2D geometry over them, and the
//! shared error type.

pub mod error;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
pub mod geometry;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use types::*;
