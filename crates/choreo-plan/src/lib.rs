//! # choreo-plan
//!
//! The choreography compiler. Resolves motion declarations into velocity
//! profiles, applies corridor and spline constraints, samples one keyframe
//! per frame for every actor, and frames cameras against the result.

pub mod cache;
pub mod context;
pub mod corridor;
pub mod framing;
pub mod kinematics;
pub mod planner;
pub mod spline;

pub use cache::{CacheKey, CompileCache};
pub use context::{CompileContext, PlanOptions};
pub use kinematics::{resolve, MotionError, ResolvedMotion, VelocityProfile};
pub use planner::{compile, Planner};
pub use spline::{SplinePath, SplineSample};
