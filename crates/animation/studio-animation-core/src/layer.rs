//! Animation layer stack: a fixed pool of independently timed, weighted
//! animation sources composited over the base sequence.
//!
//! Layers are allocated from the pool (`add_layer`), retired when cleared or
//! when their weight decays to zero, and composited in ascending priority
//! order: each layer lerps over the accumulated pose (override style), so
//! later layers progressively replace earlier ones rather than summing.

use serde::{Deserialize, Serialize};

use studio_api_core::CoreError;

use crate::sequence::SequenceCatalog;

/// Handle to a slot in the fixed layer pool.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LayerHandle(pub u32);

/// How a layer combines with the pose accumulated below it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum BlendMode {
    /// `lerp(accumulated, layer, weight)`: the layer replaces what is below
    /// it in proportion to its weight.
    #[default]
    Override,
    /// The layer's sample is treated as a delta added on top at `weight`.
    Additive,
}

/// Mutable per-layer playback state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnimationLayer {
    /// Normalized playback position, wraps in [0,1) for looping sequences.
    pub cycle: f32,
    /// None while the layer transiently has no sequence (e.g. mid-transition).
    pub sequence: Option<usize>,
    pub weight: f32,
    pub playback_rate: f32,
    /// Lower priorities are blended first; higher priorities land on top.
    pub priority: i32,
    pub blend_mode: BlendMode,
}

impl AnimationLayer {
    fn new(priority: i32) -> Self {
        Self {
            cycle: 0.0,
            sequence: None,
            weight: 0.0,
            playback_rate: 1.0,
            priority,
            blend_mode: BlendMode::Override,
        }
    }
}

/// One resolved entry of the per-frame blend set.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlendEntry {
    pub sequence: usize,
    pub cycle: f32,
    pub weight: f32,
    pub blend_mode: BlendMode,
}

/// Fixed pool of concurrent layers.
#[derive(Clone, Debug)]
pub struct LayerStack {
    slots: Vec<Option<AnimationLayer>>,
}

impl LayerStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Allocate a layer from the pool. Existing layers are unaffected when
    /// the pool is exhausted; the caller decides whether to evict.
    pub fn add_layer(&mut self, priority: i32) -> Result<LayerHandle, CoreError> {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(AnimationLayer::new(priority));
                return Ok(LayerHandle(i as u32));
            }
        }
        Err(CoreError::LayerPoolExhausted {
            capacity: self.slots.len(),
        })
    }

    pub fn layer(&self, handle: LayerHandle) -> Option<&AnimationLayer> {
        self.slots.get(handle.0 as usize)?.as_ref()
    }

    pub fn layer_mut(&mut self, handle: LayerHandle) -> Option<&mut AnimationLayer> {
        self.slots.get_mut(handle.0 as usize)?.as_mut()
    }

    /// Point a layer at a sequence with the given weight. Out-of-range
    /// sequence indices are clamped into the catalog (never fatal here).
    pub fn set_sequence(
        &mut self,
        handle: LayerHandle,
        sequence: usize,
        weight: f32,
        catalog: &SequenceCatalog,
    ) {
        let clamped = if sequence >= catalog.len() && !catalog.is_empty() {
            log::warn!(
                "layer sequence index {sequence} out of range, clamping to {}",
                catalog.len() - 1
            );
            catalog.len() - 1
        } else {
            sequence
        };
        if let Some(layer) = self.layer_mut(handle) {
            layer.sequence = if catalog.is_empty() {
                None
            } else {
                Some(clamped)
            };
            layer.weight = weight.clamp(0.0, 1.0);
            layer.cycle = 0.0;
        }
    }

    pub fn clear(&mut self, handle: LayerHandle) {
        if let Some(slot) = self.slots.get_mut(handle.0 as usize) {
            *slot = None;
        }
    }

    pub fn clear_all(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Retire layers whose weight has decayed to zero. Freshly allocated
    /// layers that were never pointed at a sequence are left alone.
    pub fn retire_faded(&mut self) {
        for slot in &mut self.slots {
            if matches!(slot, Some(l) if l.sequence.is_some() && l.weight <= 0.0) {
                *slot = None;
            }
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AnimationLayer> {
        self.slots.iter_mut().filter_map(|s| s.as_mut())
    }

    /// Resolve the effective blend set for this frame: every active layer
    /// with a sequence and non-zero weight, sorted ascending by priority.
    /// The sort is stable, so equal priorities keep slot order and repeated
    /// calls without intervening mutation return identical results.
    pub fn resolve_blend_set(&self, catalog: &SequenceCatalog) -> Vec<BlendEntry> {
        let mut indexed: Vec<(i32, usize, BlendEntry)> = Vec::new();
        for (slot, layer) in self.slots.iter().enumerate() {
            let Some(layer) = layer else { continue };
            // Zero weight contributes nothing; skipping it must not disturb
            // the ordering of the remaining layers.
            if layer.weight <= 0.0 {
                continue;
            }
            let Some(seq) = layer.sequence else { continue };
            if catalog.get(seq).is_none() {
                log::warn!("layer in slot {slot} references missing sequence {seq}, skipping");
                continue;
            }
            indexed.push((
                layer.priority,
                slot,
                BlendEntry {
                    sequence: seq,
                    cycle: layer.cycle,
                    weight: layer.weight,
                    blend_mode: layer.blend_mode,
                },
            ));
        }
        indexed.sort_by_key(|&(priority, slot, _)| (priority, slot));
        indexed.into_iter().map(|(_, _, e)| e).collect()
    }
}
