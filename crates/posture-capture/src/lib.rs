//! # Posture-Capture
//!
//! Interactive shell around the posture scoring core.
//!
//! A [`CaptureSession`] registers photos, hands each one to a
//! [`LandmarkProvider`] and the pure `analyze` function on its own task, and
//! joins the results back through a `JoinSet`. Each analysis is independent, so
//! completions may arrive in any order; records are matched by photo id.
//!
//! ## Session States
//!
//! - **Idle** - nothing in flight
//! - **Capturing** - a capture has begun and no photo has been registered yet
//! - **Analyzing** - at least one analysis is in flight

pub mod config;
pub mod provider;
pub mod session;

pub use config::*;
pub use provider::*;
pub use session::*;
