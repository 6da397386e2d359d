//! # Posture-Analysis
//!
//! Rule-based posture scoring over a 33-point pose landmark set.
//!
//! ## Pipeline
//!
//! 1. **Validation** - the landmark sequence must hold at least 33 points
//! 2. **Confidence** - mean visibility of nine key landmarks, clamped to [0.5, 1.0]
//! 3. **Features** - six measurements derived from eye, ear, shoulder and hip midpoints
//! 4. **Issues** - fixed threshold ladders classify each measurement as mild,
//!    moderate or severe
//! 5. **Scoring** - severity weights discounted by confidence give a 0-100 score
//!    and a qualitative assessment
//!
//! Every step is a pure function of its input, so [`analyze`] can run
//! concurrently for as many photos as needed.

pub mod analyzer;
pub mod confidence;
pub mod features;
pub mod issues;
pub mod scoring;

pub use analyzer::*;
pub use confidence::*;
pub use features::*;
pub use issues::*;
pub use scoring::*;
