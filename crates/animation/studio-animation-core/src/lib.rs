//! Studio Animation Core (renderer-agnostic)
//!
//! Skeletal-animation evaluation: cyclic time accumulation, priority-ordered
//! layer compositing, pose-parameter intra-sequence blending, hierarchical
//! bone transforms, root-motion extraction, and head/spine aim adjustment.
//! Rendering, model-file parsing, and windowing live in collaborators; this
//! crate turns "time + layer state + skeleton" into "bone transforms +
//! motion deltas".

pub mod aim;
pub mod config;
pub mod cycle;
pub mod evaluate;
pub mod instance;
pub mod layer;
pub mod movement;
pub mod outputs;
pub mod pose;
pub mod sequence;
pub mod skeleton;
pub mod stored_model;

// Re-exports for consumers (viewers/renderers)
pub use aim::{AimState, LookTarget};
pub use config::Config;
pub use evaluate::{accumulate_hierarchy, BoneEvaluator, BonePostProcessor, EvalContext};
pub use instance::{ModelData, StudioInstance};
pub use layer::{AnimationLayer, BlendEntry, BlendMode, LayerHandle, LayerStack};
pub use movement::{
    extract_movement, smoothed_ground_speed, MotionHistoryRing, MovementDelta, HISTORY_SLOTS,
};
pub use outputs::{extract_bbox, BoundingBox, FrameOutputs};
pub use pose::{AxisBlend, PoseParamDecl, PoseParamSet};
pub use sequence::{
    BoneChannel, MotionSample, MotionTrack, PoseAxis, Sequence, SequenceCatalog, SequenceVariant,
};
pub use skeleton::{Bone, Skeleton};
pub use stored_model::parse_stored_model_json;
pub use studio_api_core::{BoneTransform, CoreError, Mat3x4, Placement, Quat, Vec3};
