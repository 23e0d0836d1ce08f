//! Bone transform evaluation: blend the per-layer local poses, then walk the
//! hierarchy parent-before-child to produce bone-to-world matrices.
//!
//! Rotation and translation are interpolated separately (NLERP / lerp);
//! matrices are only ever built from the final blended pose, never averaged.

use studio_api_core::transform::{concat_transforms, Mat3x4};
use studio_api_core::{BoneTransform, CoreError, Placement};

use crate::layer::{BlendEntry, BlendMode};
use crate::pose::PoseParamSet;
use crate::sequence::SequenceCatalog;
use crate::skeleton::Skeleton;

/// Everything the evaluator reads for one frame. Shared data (skeleton,
/// catalog) is read-only; there is no process-wide state.
pub struct EvalContext<'a> {
    pub skeleton: &'a Skeleton,
    pub catalog: &'a SequenceCatalog,
    pub pose: &'a PoseParamSet,
    pub placement: Placement,
}

/// Injected per-model hook, run on the blended local pose before the
/// hierarchy walk. Replaces subclass overrides for custom bone setup.
pub trait BonePostProcessor {
    fn process(&mut self, skeleton: &Skeleton, locals: &mut [BoneTransform]);
}

/// Reusable evaluator holding the per-frame local-pose scratch buffer, so
/// the hot path does not allocate once warmed up.
#[derive(Debug, Default)]
pub struct BoneEvaluator {
    locals: Vec<BoneTransform>,
}

impl BoneEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blended local poses from the last `evaluate` call, indexed by bone.
    pub fn locals(&self) -> &[BoneTransform] {
        &self.locals
    }

    /// Mutable access for post-evaluation passes (aim adjustment) that
    /// rewrite a subset of local rotations and re-derive their subtree.
    pub fn locals_mut(&mut self) -> &mut [BoneTransform] {
        &mut self.locals
    }

    /// Blend the set into local poses and accumulate the hierarchy into
    /// `out`, indexed by the skeleton's bone index space. On success `out`
    /// is fully populated; on `UninitializedSkeleton` it is left empty so
    /// callers can detect "not ready" by length.
    pub fn evaluate(
        &mut self,
        ctx: &EvalContext<'_>,
        blend_set: &[BlendEntry],
        mut post: Option<&mut (dyn BonePostProcessor + 'static)>,
        out: &mut Vec<Mat3x4>,
    ) -> Result<(), CoreError> {
        let n = ctx.skeleton.len();
        if n == 0 {
            out.clear();
            return Err(CoreError::UninitializedSkeleton);
        }

        // Start every bone at its bind pose; a bone no entry drives keeps it.
        self.locals.clear();
        self.locals
            .extend(ctx.skeleton.bones().iter().map(|b| b.bind));

        for entry in blend_set {
            let Some(seq) = ctx.catalog.get(entry.sequence) else {
                continue;
            };
            let axis_blend = ctx.pose.resolve_blend(seq.axis.as_ref());
            for (bone, local) in self.locals.iter_mut().enumerate() {
                let Some(sample) = seq.sample_bone(bone, entry.cycle, &axis_blend) else {
                    continue;
                };
                *local = match entry.blend_mode {
                    BlendMode::Override => BoneTransform::lerp(local, &sample, entry.weight),
                    BlendMode::Additive => local.add_weighted(&sample, entry.weight),
                };
            }
        }

        if let Some(post) = post.as_deref_mut() {
            post.process(ctx.skeleton, &mut self.locals);
        }

        accumulate_hierarchy(ctx.skeleton, &self.locals, &ctx.placement, out);
        Ok(())
    }
}

/// Step 3 of the evaluation: compose each bone's blended local transform
/// onto its parent's world transform, roots onto the instance placement.
/// Also reusable standalone for re-deriving a subtree after IK adjustment.
pub fn accumulate_hierarchy(
    skeleton: &Skeleton,
    locals: &[BoneTransform],
    placement: &Placement,
    out: &mut Vec<Mat3x4>,
) {
    let world = placement.to_matrix();
    out.clear();
    out.resize(skeleton.len(), world);
    for &i in skeleton.traversal_order() {
        let local = locals
            .get(i)
            .copied()
            .unwrap_or(BoneTransform::IDENTITY)
            .to_matrix();
        let parent = match skeleton.bones()[i].parent {
            Some(p) => out[p],
            None => world,
        };
        out[i] = concat_transforms(&parent, &local);
    }
}
