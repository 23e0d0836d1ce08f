//! Cycle arithmetic: pure functions over the normalized playback position.
//!
//! `cycle` is the normalized position within a sequence: [0,1) for looping
//! sequences (wrapping, negative dt wraps toward positive), [0,1] clamped
//! for non-looping ones (the sequence holds on its last frame). All the
//! wraparound-sensitive math lives here, isolated from the evaluator.

use studio_api_core::math::fmod_positive;

/// Wrap a cycle into [0, 1). Negative inputs wrap toward positive.
#[inline]
pub fn wrap_cycle(cycle: f32) -> f32 {
    fmod_positive(cycle, 1.0)
}

/// Advance a cycle by `dt` seconds.
///
/// `cycles_per_second` comes from the sequence (1 / duration); playback rate
/// multiplies it. Looping sequences wrap; non-looping ones clamp to [0,1]
/// so further advancement is a no-op.
#[inline]
pub fn advance_cycle(
    cycle: f32,
    dt: f32,
    cycles_per_second: f32,
    playback_rate: f32,
    looping: bool,
) -> f32 {
    let next = cycle + dt * playback_rate * cycles_per_second;
    if looping {
        wrap_cycle(next)
    } else {
        next.clamp(0.0, 1.0)
    }
}

/// Convert a cycle to a fractional frame index for an N-frame sequence.
#[inline]
pub fn cycle_to_frame(cycle: f32, frame_count: u32) -> f32 {
    cycle * frame_count.saturating_sub(1) as f32
}

/// Convert a frame index back to a cycle, clamped to [0,1].
#[inline]
pub fn frame_to_cycle(frame: f32, frame_count: u32) -> f32 {
    let span = frame_count.saturating_sub(1) as f32;
    if span <= 0.0 {
        0.0
    } else {
        (frame / span).clamp(0.0, 1.0)
    }
}
