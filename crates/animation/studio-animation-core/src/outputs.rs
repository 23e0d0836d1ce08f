//! Per-tick outputs of an instance update: the bone-to-world array consumed
//! by a renderer, the frame's movement delta, and the derived bounding box.
//! Valid until the next update.

use serde::{Deserialize, Serialize};

use studio_api_core::math::Vec3;
use studio_api_core::transform::{matrix_origin, Mat3x4};

use crate::movement::MovementDelta;

/// Axis-aligned bounds of the evaluated bone origins.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub mins: Vec3,
    pub maxs: Vec3,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FrameOutputs {
    /// World transform per bone, indexed by the skeleton's bone index space.
    /// Empty when no skeleton was ready at evaluation time.
    pub bone_to_world: Vec<Mat3x4>,
    pub movement: MovementDelta,
    pub bbox: Option<BoundingBox>,
}

impl FrameOutputs {
    #[inline]
    pub fn clear(&mut self) {
        self.bone_to_world.clear();
        self.movement = MovementDelta::default();
        self.bbox = None;
    }

    /// "Not ready" is detected by length, not by error.
    #[inline]
    pub fn is_ready(&self) -> bool {
        !self.bone_to_world.is_empty()
    }

    /// Recompute the bounding box from the current transform array.
    pub fn update_bbox(&mut self) {
        self.bbox = extract_bbox(&self.bone_to_world);
    }
}

/// Min/max over the bone origins; None for an empty array.
pub fn extract_bbox(bone_to_world: &[Mat3x4]) -> Option<BoundingBox> {
    let mut iter = bone_to_world.iter().map(matrix_origin);
    let first = iter.next()?;
    let mut bbox = BoundingBox {
        mins: first,
        maxs: first,
    };
    for o in iter {
        for k in 0..3 {
            bbox.mins[k] = bbox.mins[k].min(o[k]);
            bbox.maxs[k] = bbox.maxs[k].max(o[k]);
        }
    }
    Some(bbox)
}
