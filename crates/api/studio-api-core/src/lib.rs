//! studio-api-core: shared math & transform layer for the studio animation
//! core (engine-agnostic). All numeric types use f32.

pub mod error;
pub mod math;
pub mod transform;

pub use error::CoreError;
pub use math::{Quat, Vec3};
pub use transform::{BoneTransform, Mat3x4, Placement};
