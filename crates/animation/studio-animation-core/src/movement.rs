//! Root-motion extraction: the net translation/yaw delta between two cycle
//! positions of a sequence's linear-motion track, and the 5-slot history
//! ring used to smooth the reported ground speed.
//!
//! The loop-boundary case is the delicate part: when the interval wraps
//! (curr < prev on a looping sequence) the delta is the remainder of the
//! loop plus the start of the next one, never a naive subtraction.

use serde::{Deserialize, Serialize};

use studio_api_core::math::{add_vec3, length_vec3, sub_vec3, Vec3};
#[cfg(test)]
use studio_api_core::math::VEC3_ZERO;
use studio_api_core::transform::rotate_vec3_yaw_deg;

use crate::sequence::Sequence;

/// Net displacement for an interval, expressed in the starting frame's local
/// space so repeated deltas compose into an absolute position externally.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementDelta {
    pub position: Vec3,
    pub yaw_deg: f32,
}

/// Extract the movement delta between `prev_cycle` and `curr_cycle`.
///
/// A sequence without a motion track yields a zero delta (never an error);
/// a wrapped interval on a looping sequence is split at the loop boundary.
pub fn extract_movement(seq: &Sequence, prev_cycle: f32, curr_cycle: f32) -> MovementDelta {
    let Some(motion) = &seq.motion else {
        log::debug!("sequence '{}' has no motion track", seq.name);
        return MovementDelta::default();
    };

    let prev = motion.sample(prev_cycle);
    let curr = motion.sample(curr_cycle);

    let (world_pos, world_yaw) = if seq.looping && curr_cycle < prev_cycle {
        // Crossed the loop boundary: (end - prev) + (curr - start).
        let end = motion.sample(1.0);
        let start = motion.sample(0.0);
        (
            add_vec3(sub_vec3(end.pos, prev.pos), sub_vec3(curr.pos, start.pos)),
            (end.yaw_deg - prev.yaw_deg) + (curr.yaw_deg - start.yaw_deg),
        )
    } else {
        (sub_vec3(curr.pos, prev.pos), curr.yaw_deg - prev.yaw_deg)
    };

    MovementDelta {
        // Rotate into the starting frame's local space.
        position: rotate_vec3_yaw_deg(world_pos, -prev.yaw_deg),
        yaw_deg: world_yaw,
    }
}

/// Number of recent frames the history ring retains.
pub const HISTORY_SLOTS: usize = 5;

/// Fixed-length rolling buffer of recent (cycle, dt) pairs for one tracked
/// axis. Overwritten every frame; lets the movement extractor query "N
/// frames ago" without re-deriving from wall-clock time.
#[derive(Copy, Clone, Debug)]
pub struct MotionHistoryRing {
    cycles: [f32; HISTORY_SLOTS],
    dts: [f32; HISTORY_SLOTS],
    head: usize,
    len: usize,
}

impl Default for MotionHistoryRing {
    fn default() -> Self {
        Self {
            cycles: [0.0; HISTORY_SLOTS],
            dts: [0.0; HISTORY_SLOTS],
            head: 0,
            len: 0,
        }
    }
}

impl MotionHistoryRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this frame's cycle and the dt that produced it.
    pub fn push(&mut self, cycle: f32, dt: f32) {
        self.cycles[self.head] = cycle;
        self.dts[self.head] = dt;
        self.head = (self.head + 1) % HISTORY_SLOTS;
        self.len = (self.len + 1).min(HISTORY_SLOTS);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cycle recorded `frames_back` frames ago (0 = most recent). Clamped to
    /// the oldest retained entry.
    pub fn cycle_back(&self, frames_back: usize) -> Option<f32> {
        if self.len == 0 {
            return None;
        }
        let back = frames_back.min(self.len - 1);
        let idx = (self.head + HISTORY_SLOTS - 1 - back) % HISTORY_SLOTS;
        Some(self.cycles[idx])
    }

    /// Wall-clock span covered by the most recent `frames_back` intervals.
    pub fn span_seconds(&self, frames_back: usize) -> f32 {
        let back = frames_back.min(self.len.saturating_sub(1));
        let mut total = 0.0;
        for i in 0..back {
            let idx = (self.head + HISTORY_SLOTS - 1 - i) % HISTORY_SLOTS;
            total += self.dts[idx];
        }
        total
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Ground speed smoothed over the ring: movement between the oldest retained
/// cycle and the newest, divided by the elapsed span. Falls back to zero
/// while the ring is too short or time has not advanced.
pub fn smoothed_ground_speed(seq: &Sequence, ring: &MotionHistoryRing) -> f32 {
    if ring.len() < 2 {
        return 0.0;
    }
    let frames_back = ring.len() - 1;
    let (Some(newest), Some(oldest)) = (ring.cycle_back(0), ring.cycle_back(frames_back)) else {
        return 0.0;
    };
    let span = ring.span_seconds(frames_back);
    if span <= 0.0 {
        return 0.0;
    }
    let delta = extract_movement(seq, oldest, newest);
    length_vec3(delta.position) / span
}
