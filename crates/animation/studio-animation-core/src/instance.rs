//! Model instance: aggregates a shared read-only model asset (skeleton +
//! sequence catalog + pose-parameter declarations) with all per-instance
//! mutable state, and drives the per-frame pipeline:
//!
//! advance cycles -> resolve blend set -> evaluate bones -> extract movement
//! -> aim adjust -> publish outputs.
//!
//! Single-threaded by design: the instance is exclusively owned by the
//! thread ticking it; the shared asset is never mutated after load.

use std::sync::Arc;

use crate::aim::{apply_look_target, AimState, LookTarget};
use crate::config::Config;
use crate::cycle::{advance_cycle, cycle_to_frame, frame_to_cycle};
use crate::evaluate::{BoneEvaluator, BonePostProcessor, EvalContext};
use crate::layer::{AnimationLayer, BlendEntry, LayerHandle, LayerStack};
use crate::movement::{extract_movement, smoothed_ground_speed, MotionHistoryRing, MovementDelta};
use crate::outputs::{BoundingBox, FrameOutputs};
use crate::pose::{PoseParamDecl, PoseParamSet};
use crate::sequence::SequenceCatalog;
use crate::skeleton::Skeleton;
use studio_api_core::math::Vec3;
use studio_api_core::transform::Mat3x4;
use studio_api_core::{CoreError, Placement};

/// Immutable model asset, shared read-only across instances.
#[derive(Clone, Debug)]
pub struct ModelData {
    pub name: String,
    pub skeleton: Skeleton,
    pub sequences: SequenceCatalog,
    pub pose_params: Vec<PoseParamDecl>,
}

/// One animated instance of a model asset.
pub struct StudioInstance {
    model: Arc<ModelData>,

    placement: Placement,

    // Base sequence playback.
    sequence: Option<usize>,
    cycle: f32,
    playback_rate: f32,

    // Previous-sequence transition ramp.
    prev_sequence: Option<usize>,
    prev_cycle: f32,
    sequence_time: f32,
    blend_time: f32,

    layers: LayerStack,
    pose: PoseParamSet,

    look: Option<LookTarget>,
    look_chain: Vec<usize>,
    aim: AimState,

    history: MotionHistoryRing,

    post: Option<Box<dyn BonePostProcessor>>,
    evaluator: BoneEvaluator,
    outputs: FrameOutputs,
    dt: f32,
}

impl StudioInstance {
    pub fn new(model: Arc<ModelData>, cfg: Config) -> Self {
        let sequence = if model.sequences.is_empty() {
            None
        } else {
            Some(0)
        };
        let pose = PoseParamSet::new(&model.pose_params);
        Self {
            model,
            placement: Placement::default(),
            sequence,
            cycle: 0.0,
            playback_rate: 1.0,
            prev_sequence: None,
            prev_cycle: 0.0,
            sequence_time: 0.0,
            blend_time: cfg.blend_time,
            layers: LayerStack::new(cfg.max_layers),
            pose,
            look: None,
            look_chain: Vec::new(),
            aim: AimState::default(),
            history: MotionHistoryRing::new(),
            post: None,
            evaluator: BoneEvaluator::new(),
            outputs: FrameOutputs::default(),
            dt: 0.0,
        }
    }

    /// Install an injected per-model bone hook (custom bone setup/masking).
    pub fn set_post_processor(&mut self, post: Option<Box<dyn BonePostProcessor>>) {
        self.post = post;
    }

    #[inline]
    pub fn model(&self) -> &ModelData {
        &self.model
    }

    #[inline]
    pub fn skeleton(&self) -> &Skeleton {
        &self.model.skeleton
    }

    pub fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }

    #[inline]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    // ----- base sequence -----

    /// Select the base sequence, clamping out-of-range indices into the
    /// catalog, and start the transition ramp from the previous pose.
    /// Returns the index actually applied.
    pub fn set_sequence(&mut self, index: usize) -> usize {
        let catalog = &self.model.sequences;
        if catalog.is_empty() {
            self.sequence = None;
            return 0;
        }
        let clamped = if index >= catalog.len() {
            log::warn!(
                "sequence index {index} out of range, clamping to {}",
                catalog.len() - 1
            );
            catalog.len() - 1
        } else {
            index
        };
        if self.sequence != Some(clamped) {
            self.prev_sequence = self.sequence;
            self.prev_cycle = self.cycle;
            self.sequence_time = 0.0;
            self.cycle = 0.0;
        }
        self.sequence = Some(clamped);
        clamped
    }

    pub fn set_sequence_by_name(&mut self, name: &str) -> Option<usize> {
        let index = self.model.sequences.lookup(name)?;
        Some(self.set_sequence(index))
    }

    #[inline]
    pub fn sequence(&self) -> Option<usize> {
        self.sequence
    }

    pub fn lookup_sequence(&self, name: &str) -> Option<usize> {
        self.model.sequences.lookup(name)
    }

    pub fn set_playback_rate(&mut self, rate: f32) {
        self.playback_rate = rate;
    }

    pub fn set_blend_time(&mut self, blend_time: f32) {
        self.blend_time = blend_time.max(0.0);
    }

    /// Progress of the base-sequence transition ramp in [0,1]; 1.0 when no
    /// transition is active.
    pub fn transition_amount(&self) -> f32 {
        if self.prev_sequence.is_none() {
            return 1.0;
        }
        if self.blend_time <= 0.0 {
            return 1.0;
        }
        (self.sequence_time / self.blend_time).clamp(0.0, 1.0)
    }

    // ----- sequence info -----

    pub fn fps(&self, index: usize) -> f32 {
        self.model.sequences.get(index).map_or(0.0, |s| s.fps)
    }

    pub fn duration(&self, index: usize) -> f32 {
        self.model
            .sequences
            .get(index)
            .map_or(0.0, |s| s.duration())
    }

    pub fn num_frames(&self, index: usize) -> u32 {
        self.model
            .sequences
            .get(index)
            .map_or(0, |s| s.frame_count)
    }

    pub fn sequence_loops(&self, index: usize) -> bool {
        self.model.sequences.get(index).is_some_and(|s| s.looping)
    }

    pub fn ground_speed(&self, index: usize) -> f32 {
        self.model
            .sequences
            .get(index)
            .map_or(0.0, |s| s.ground_speed())
    }

    // ----- frame/timeline accessors -----

    #[inline]
    pub fn cycle(&self) -> f32 {
        self.cycle
    }

    pub fn frame(&self) -> f32 {
        let frames = self.sequence.map_or(0, |i| self.num_frames(i));
        cycle_to_frame(self.cycle, frames)
    }

    pub fn max_frame(&self) -> u32 {
        self.sequence
            .map_or(0, |i| self.num_frames(i).saturating_sub(1))
    }

    /// Position the base sequence on a frame; returns the applied frame.
    pub fn set_frame(&mut self, frame: f32) -> f32 {
        let frames = self.sequence.map_or(0, |i| self.num_frames(i));
        self.cycle = frame_to_cycle(frame, frames);
        cycle_to_frame(self.cycle, frames)
    }

    pub fn layer_cycle(&self, handle: LayerHandle) -> f32 {
        self.layers.layer(handle).map_or(0.0, |l| l.cycle)
    }

    pub fn layer_frame(&self, handle: LayerHandle) -> f32 {
        let Some(layer) = self.layers.layer(handle) else {
            return 0.0;
        };
        let frames = layer.sequence.map_or(0, |i| self.num_frames(i));
        cycle_to_frame(layer.cycle, frames)
    }

    pub fn layer_max_frame(&self, handle: LayerHandle) -> u32 {
        self.layers
            .layer(handle)
            .and_then(|l| l.sequence)
            .map_or(0, |i| self.num_frames(i).saturating_sub(1))
    }

    // ----- pose parameters -----

    pub fn lookup_pose_parameter(&self, name: &str) -> Option<usize> {
        self.pose.lookup(name)
    }

    /// Set a pose parameter; the value is clamped to the declared range and
    /// the clamped value is returned.
    pub fn set_pose_parameter(&mut self, index: usize, value: f32) -> f32 {
        self.pose.set(index, value)
    }

    pub fn set_pose_parameter_by_name(&mut self, name: &str, value: f32) -> Option<f32> {
        let index = self.pose.lookup(name)?;
        Some(self.pose.set(index, value))
    }

    pub fn pose_parameter(&self, index: usize) -> f32 {
        self.pose.get(index)
    }

    pub fn pose_parameter_range(&self, index: usize) -> Option<(f32, f32)> {
        self.pose.range(index)
    }

    // ----- animation layers -----

    /// Allocate an overlay layer; fails with `LayerPoolExhausted` when every
    /// slot is in use (existing layers are unaffected).
    pub fn add_layer(&mut self, priority: i32) -> Result<LayerHandle, CoreError> {
        self.layers.add_layer(priority)
    }

    pub fn set_overlay_sequence(&mut self, handle: LayerHandle, sequence: usize, weight: f32) {
        self.layers
            .set_sequence(handle, sequence, weight, &self.model.sequences);
    }

    /// Reposition an overlay and change its playback rate.
    pub fn set_overlay_rate(&mut self, handle: LayerHandle, cycle: f32, playback_rate: f32) {
        if let Some(layer) = self.layers.layer_mut(handle) {
            layer.cycle = cycle.clamp(0.0, 1.0);
            layer.playback_rate = playback_rate;
        }
    }

    pub fn overlay_sequence(&self, handle: LayerHandle) -> Option<usize> {
        self.layers.layer(handle).and_then(|l| l.sequence)
    }

    pub fn overlay_weight(&self, handle: LayerHandle) -> f32 {
        self.layers.layer(handle).map_or(0.0, |l| l.weight)
    }

    pub fn layer(&self, handle: LayerHandle) -> Option<&AnimationLayer> {
        self.layers.layer(handle)
    }

    pub fn layer_mut(&mut self, handle: LayerHandle) -> Option<&mut AnimationLayer> {
        self.layers.layer_mut(handle)
    }

    pub fn clear_layer(&mut self, handle: LayerHandle) {
        self.layers.clear(handle);
    }

    pub fn clear_layers(&mut self) {
        self.layers.clear_all();
    }

    pub fn active_layer_count(&self) -> usize {
        self.layers.active_count()
    }

    // ----- look target -----

    /// Designate the head/spine chain adjusted by the aim pass, ordered
    /// parent to tip. Unknown bone names are dropped.
    pub fn set_look_chain_by_names(&mut self, names: &[&str]) {
        self.look_chain = names
            .iter()
            .filter_map(|n| self.model.skeleton.find_bone(n))
            .collect();
    }

    pub fn set_look_target(&mut self, target: Vec3, max_turn_rate_deg: f32) {
        self.look = Some(LookTarget {
            target,
            max_turn_rate_deg,
        });
    }

    /// Remove the look target; the aim pass becomes a pass-through and the
    /// accumulated turn is dropped.
    pub fn clear_look_target(&mut self) {
        self.look = None;
        self.aim.reset();
    }

    pub fn has_look_target(&self) -> bool {
        self.look.is_some()
    }

    // ----- per-frame pipeline -----

    /// Advance every active cycle by `dt` seconds. Layers transiently
    /// pointing at no/invalid sequences hold their last cycle (never an
    /// error). Callers are expected to clamp debugger-scale dt spikes.
    pub fn advance_frame(&mut self, dt: f32) {
        self.dt = dt;
        let catalog = &self.model.sequences;

        if let Some(seq) = self.sequence.and_then(|i| catalog.get(i)) {
            self.cycle = advance_cycle(
                self.cycle,
                dt,
                seq.cycles_per_second(),
                self.playback_rate,
                seq.looping,
            );
        }

        if self.prev_sequence.is_some() {
            self.sequence_time += dt;
            if self.transition_amount() >= 1.0 {
                self.prev_sequence = None;
            }
        }

        for layer in self.layers.iter_mut() {
            let Some(seq) = layer.sequence.and_then(|i| catalog.get(i)) else {
                continue;
            };
            layer.cycle = advance_cycle(
                layer.cycle,
                dt,
                seq.cycles_per_second(),
                layer.playback_rate,
                seq.looping,
            );
        }
        self.layers.retire_faded();
    }

    /// The effective (sequence, cycle, weight) set blended this frame:
    /// held previous pose (while transitioning), base sequence, then the
    /// overlay layers in ascending priority order.
    pub fn build_blend_set(&self) -> Vec<BlendEntry> {
        let catalog = &self.model.sequences;
        let mut set = Vec::with_capacity(2 + self.layers.active_count());

        let amount = self.transition_amount();
        if amount < 1.0 {
            if let Some(prev) = self.prev_sequence.filter(|&i| catalog.get(i).is_some()) {
                set.push(BlendEntry {
                    sequence: prev,
                    cycle: self.prev_cycle,
                    weight: 1.0,
                    blend_mode: Default::default(),
                });
            }
        }
        if let Some(seq) = self.sequence.filter(|&i| catalog.get(i).is_some()) {
            set.push(BlendEntry {
                sequence: seq,
                cycle: self.cycle,
                weight: amount,
                blend_mode: Default::default(),
            });
        }
        set.extend(self.layers.resolve_blend_set(catalog));
        set
    }

    /// Tick the instance: advance time, evaluate bones, extract this frame's
    /// movement delta, apply the aim pass, and publish outputs. With no
    /// skeleton loaded the output transform array stays empty ("not ready")
    /// rather than failing.
    pub fn update(&mut self, dt: f32) -> &FrameOutputs {
        let prev_cycle = self.cycle;
        self.advance_frame(dt);

        let blend_set = self.build_blend_set();
        let ctx = EvalContext {
            skeleton: &self.model.skeleton,
            catalog: &self.model.sequences,
            pose: &self.pose,
            placement: self.placement,
        };
        if let Err(err) =
            self.evaluator
                .evaluate(&ctx, &blend_set, self.post.as_deref_mut(), &mut self.outputs.bone_to_world)
        {
            log::warn!("bone evaluation skipped: {err}");
            self.outputs.movement = MovementDelta::default();
            self.outputs.bbox = None;
            return &self.outputs;
        }

        self.outputs.movement = match self.sequence.and_then(|i| self.model.sequences.get(i)) {
            Some(seq) => extract_movement(seq, prev_cycle, self.cycle),
            None => MovementDelta::default(),
        };

        if let Some(look) = self.look {
            apply_look_target(
                &self.model.skeleton,
                self.evaluator.locals_mut(),
                &mut self.outputs.bone_to_world,
                &self.placement,
                &self.look_chain,
                &mut self.aim,
                &look,
                dt,
            );
        }

        self.outputs.update_bbox();
        self.history.push(self.cycle, dt);
        &self.outputs
    }

    // ----- outputs -----

    /// World transform per bone from the last update; valid until the next.
    pub fn bone_to_world(&self) -> &[Mat3x4] {
        &self.outputs.bone_to_world
    }

    pub fn last_movement(&self) -> MovementDelta {
        self.outputs.movement
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        self.outputs.bbox
    }

    pub fn outputs(&self) -> &FrameOutputs {
        &self.outputs
    }

    /// Ground speed smoothed over the motion-history ring, in units/second.
    pub fn current_velocity(&self) -> f32 {
        match self.sequence.and_then(|i| self.model.sequences.get(i)) {
            Some(seq) => smoothed_ground_speed(seq, &self.history),
            None => 0.0,
        }
    }

    #[inline]
    pub fn time_delta(&self) -> f32 {
        self.dt
    }
}
