//! Sequence catalog: per-sequence frame rate, duration, loop flag, per-bone
//! animation channels, optional linear-motion track, and pose-parameter
//! blend axes. Immutable once built (load-then-freeze); shared read-only
//! across every instance of the same model asset.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use studio_api_core::math::{lerp_f32, length_vec3, sub_vec3, Vec3};
use studio_api_core::{BoneTransform, CoreError};

use crate::pose::AxisBlend;

/// Per-bone animation channel: one local-pose sample per animation frame.
/// Sampling at a cycle interpolates between the two bracketing frames
/// (translation linearly, rotation via shortest-arc NLERP).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneChannel {
    pub bone: usize,
    pub frames: Vec<BoneTransform>,
}

impl BoneChannel {
    pub fn sample(&self, cycle: f32) -> Option<BoneTransform> {
        match self.frames.len() {
            0 => None,
            1 => Some(self.frames[0]),
            n => {
                let t = cycle.clamp(0.0, 1.0) * (n - 1) as f32;
                let i0 = (t as usize).min(n - 2);
                let frac = t - i0 as f32;
                Some(BoneTransform::lerp(
                    &self.frames[i0],
                    &self.frames[i0 + 1],
                    frac,
                ))
            }
        }
    }
}

/// One sample of the embedded root-motion track: accumulated displacement
/// and facing yaw at that point of the cycle, in sequence-local space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub pos: Vec3,
    pub yaw_deg: f32,
}

/// Linear-motion track: uniformly spaced samples over the cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionTrack {
    pub keys: Vec<MotionSample>,
}

impl MotionTrack {
    pub fn sample(&self, cycle: f32) -> MotionSample {
        match self.keys.len() {
            0 => MotionSample::default(),
            1 => self.keys[0],
            n => {
                let t = cycle.clamp(0.0, 1.0) * (n - 1) as f32;
                let i0 = (t as usize).min(n - 2);
                let frac = t - i0 as f32;
                let a = self.keys[i0];
                let b = self.keys[i0 + 1];
                MotionSample {
                    pos: [
                        lerp_f32(a.pos[0], b.pos[0], frac),
                        lerp_f32(a.pos[1], b.pos[1], frac),
                        lerp_f32(a.pos[2], b.pos[2], frac),
                    ],
                    // Motion yaw is authored continuous (it accumulates over
                    // the loop), so plain lerp is correct here.
                    yaw_deg: lerp_f32(a.yaw_deg, b.yaw_deg, frac),
                }
            }
        }
    }
}

/// A pose-parameter blend axis: the sequence holds one variant per anchor,
/// blended by where the parameter value sits between the two nearest anchors.
/// Anchors are declared ascending in parameter units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseAxis {
    /// Index into the model's pose-parameter declarations.
    pub param: usize,
    pub anchors: Vec<f32>,
}

/// One animation variant of a sequence (a full channel set).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceVariant {
    pub channels: Vec<BoneChannel>,
}

impl SequenceVariant {
    fn channel_for(&self, bone: usize) -> Option<&BoneChannel> {
        self.channels.iter().find(|c| c.bone == bone)
    }
}

/// An immutable animation sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub fps: f32,
    pub frame_count: u32,
    pub looping: bool,
    /// Present when the sequence blends across a pose parameter; `variants`
    /// then holds one entry per axis anchor.
    pub axis: Option<PoseAxis>,
    pub variants: Vec<SequenceVariant>,
    pub motion: Option<MotionTrack>,
}

impl Sequence {
    /// Playback duration in seconds: the span between first and last frame.
    pub fn duration(&self) -> f32 {
        if self.fps <= 0.0 {
            return 0.0;
        }
        (self.frame_count.saturating_sub(1)).max(1) as f32 / self.fps
    }

    /// Cycle advance per second of playback at rate 1.0.
    pub fn cycles_per_second(&self) -> f32 {
        let d = self.duration();
        if d > 0.0 {
            1.0 / d
        } else {
            0.0
        }
    }

    /// Sample this sequence's local transform for `bone` at `cycle`, blending
    /// across the pose axis per `blend`. None when no channel drives the bone
    /// (caller falls back to the bind pose).
    pub fn sample_bone(&self, bone: usize, cycle: f32, blend: &AxisBlend) -> Option<BoneTransform> {
        let lo = self.variants.get(blend.lo.min(self.variants.len().saturating_sub(1)))?;
        let a = lo.channel_for(bone).and_then(|c| c.sample(cycle));
        if blend.lo == blend.hi || blend.frac <= 0.0 {
            return a;
        }
        let hi = self.variants.get(blend.hi.min(self.variants.len() - 1))?;
        let b = hi.channel_for(bone).and_then(|c| c.sample(cycle));
        match (a, b) {
            (Some(a), Some(b)) => Some(BoneTransform::lerp(&a, &b, blend.frac)),
            (a, b) => a.or(b),
        }
    }

    /// Motion track access for callers that treat its absence as an error.
    /// Per-frame movement extraction falls back to a zero delta instead.
    pub fn motion_track(&self) -> Result<&MotionTrack, CoreError> {
        self.motion
            .as_ref()
            .ok_or_else(|| CoreError::MissingMotionTrack(self.name.clone()))
    }

    /// Net ground distance covered over one full cycle divided by duration.
    /// Zero when no motion track is embedded.
    pub fn ground_speed(&self) -> f32 {
        let Some(motion) = &self.motion else {
            return 0.0;
        };
        let d = self.duration();
        if d <= 0.0 {
            return 0.0;
        }
        let start = motion.sample(0.0);
        let end = motion.sample(1.0);
        length_vec3(sub_vec3(end.pos, start.pos)) / d
    }
}

/// Read-only collection of sequences with name lookup.
#[derive(Clone, Debug, Default)]
pub struct SequenceCatalog {
    sequences: Vec<Sequence>,
    by_name: HashMap<String, usize>,
}

impl SequenceCatalog {
    pub fn new(sequences: Vec<Sequence>) -> Self {
        let mut by_name = HashMap::with_capacity(sequences.len());
        for (i, seq) in sequences.iter().enumerate() {
            by_name.insert(seq.name.clone(), i);
        }
        Self { sequences, by_name }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Strict indexed access for tooling paths that must not clamp.
    pub fn try_get(&self, index: usize) -> Result<&Sequence, CoreError> {
        self.sequences.get(index).ok_or(CoreError::InvalidSequenceIndex {
            index,
            count: self.sequences.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk() -> Sequence {
        Sequence {
            name: "walk".into(),
            fps: 30.0,
            frame_count: 31,
            looping: true,
            axis: None,
            variants: vec![],
            motion: Some(MotionTrack {
                keys: vec![
                    MotionSample {
                        pos: [0.0, 0.0, 0.0],
                        yaw_deg: 0.0,
                    },
                    MotionSample {
                        pos: [10.0, 0.0, 0.0],
                        yaw_deg: 0.0,
                    },
                ],
            }),
        }
    }

    #[test]
    fn duration_spans_first_to_last_frame() {
        let seq = walk();
        assert!((seq.duration() - 1.0).abs() < 1e-6);
        assert!((seq.cycles_per_second() - 1.0).abs() < 1e-6);
        assert!((seq.ground_speed() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn channel_sampling_brackets_the_cycle() {
        let channel = BoneChannel {
            bone: 0,
            frames: vec![
                BoneTransform::new([0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]),
                BoneTransform::new([4.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]),
                BoneTransform::new([4.0, 8.0, 0.0], [0.0, 0.0, 0.0, 1.0]),
            ],
        };
        let mid = channel.sample(0.25).unwrap();
        assert!((mid.pos[0] - 2.0).abs() < 1e-6);
        // Past the end clamps to the last frame.
        let end = channel.sample(1.5).unwrap();
        assert_eq!(end.pos, [4.0, 8.0, 0.0]);
    }

    #[test]
    fn strict_accessors_report_what_is_missing() {
        let catalog = SequenceCatalog::new(vec![walk()]);
        assert!(catalog.try_get(0).is_ok());
        assert_eq!(
            catalog.try_get(3).unwrap_err(),
            CoreError::InvalidSequenceIndex { index: 3, count: 1 }
        );

        let mut idle = walk();
        idle.motion = None;
        assert!(matches!(
            idle.motion_track().unwrap_err(),
            CoreError::MissingMotionTrack(name) if name == "walk"
        ));
        assert!(walk().motion_track().is_ok());
    }
}
