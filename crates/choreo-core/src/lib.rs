//! # choreo-core
//!
//! Foundational types shared across the choreo crates: unit-tagged
//! quantities, the per-movie frame rate, vector and rotator math, direction
//! resolution, diagnostics, configuration and error types.

pub mod config;
pub mod diagnostic;
pub mod direction;
pub mod error;
pub mod hash;
pub mod math;
pub mod time;
pub mod units;

pub use config::*;

pub use diagnostic::{Diagnostic, DiagnosticSeverity};
pub use direction::Direction;
pub use error::{ChoreoError, ChoreoResult};
pub use hash::ContentHash;
pub use math::{Rotator, Transform, Vec3};
pub use time::FrameRate;
pub use units::{Acceleration, Distance, DistanceUnit, Speed, SpeedUnit, TimeSpan, TimeUnit};
