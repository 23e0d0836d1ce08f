//! Head/spine aim adjustment: post-processes a designated bone chain to turn
//! toward a world-space look target, bounded by a per-second turn rate, then
//! re-derives world transforms for the affected subtree only.
//!
//! Yaw-only by design: the chain is assumed authored in a Z-up rig where a
//! local pre-rotation about +Z turns the bone in the ground plane.

use serde::{Deserialize, Serialize};

use studio_api_core::math::{
    angle_diff_deg, approach_angle_deg, mul_quat, normalize_quat, quat_from_yaw_deg, Vec3,
};
use studio_api_core::transform::{concat_transforms, matrix_origin, Mat3x4};
use studio_api_core::{BoneTransform, Placement};

use crate::skeleton::Skeleton;

/// A world-space look target with its turn-rate bound in degrees/second.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LookTarget {
    pub target: Vec3,
    pub max_turn_rate_deg: f32,
}

/// Per-instance aim state: the yaw offset currently applied to the chain,
/// persisted across frames so the turn is rate-limited, not instantaneous.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AimState {
    yaw_offset_deg: f32,
}

impl AimState {
    pub fn reset(&mut self) {
        self.yaw_offset_deg = 0.0;
    }

    pub fn yaw_offset_deg(&self) -> f32 {
        self.yaw_offset_deg
    }
}

/// Rotate the `chain` bones toward `look.target`, clamping this frame's
/// change to `max_turn_rate_deg * dt`, and recompute world transforms for
/// the subtree under the first chain bone. No-op when the chain is empty or
/// the evaluated output is missing.
#[allow(clippy::too_many_arguments)]
pub fn apply_look_target(
    skeleton: &Skeleton,
    locals: &mut [BoneTransform],
    bone_to_world: &mut [Mat3x4],
    placement: &Placement,
    chain: &[usize],
    state: &mut AimState,
    look: &LookTarget,
    dt: f32,
) {
    let Some(&chain_root) = chain.first() else {
        return;
    };
    if bone_to_world.len() != skeleton.len() || locals.len() != skeleton.len() {
        return;
    }
    let Some(&head) = chain.last() else { return };
    if head >= skeleton.len() || chain_root >= skeleton.len() {
        return;
    }

    let head_pos = matrix_origin(&bone_to_world[head]);
    let dx = look.target[0] - head_pos[0];
    let dy = look.target[1] - head_pos[1];
    // Target directly above/below the head: yaw is undefined, hold current.
    if dx * dx + dy * dy > 1e-8 {
        let desired_world_yaw = dy.atan2(dx).to_degrees();
        let desired_offset = angle_diff_deg(desired_world_yaw, placement.yaw_deg);
        let max_step = (look.max_turn_rate_deg * dt).max(0.0);
        state.yaw_offset_deg = approach_angle_deg(desired_offset, state.yaw_offset_deg, max_step);
    }

    // Distribute the turn evenly along the chain.
    let share = state.yaw_offset_deg / chain.len() as f32;
    let pre = quat_from_yaw_deg(share);
    for &bone in chain {
        locals[bone].rot = normalize_quat(mul_quat(pre, locals[bone].rot));
    }

    // Re-derive only the affected subtree, parents before children.
    let world = placement.to_matrix();
    for i in skeleton.subtree(chain_root) {
        let parent = match skeleton.bones()[i].parent {
            Some(p) => bone_to_world[p],
            None => world,
        };
        bone_to_world[i] = concat_transforms(&parent, &locals[i].to_matrix());
    }
}
