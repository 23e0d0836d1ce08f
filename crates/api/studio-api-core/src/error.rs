//! Error taxonomy for the studio animation core.
//!
//! Only precondition violations and resource exhaustion surface as errors;
//! per-frame numeric edge cases (cycle wraparound, out-of-range parameters,
//! missing motion tracks) recover locally with a defined fallback so a bad
//! frame degrades instead of halting.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Every slot of the fixed animation-layer pool is in use. The caller
    /// decides whether to recycle the lowest-priority layer.
    #[error("no free animation layer slot (pool size {capacity})")]
    LayerPoolExhausted { capacity: usize },

    /// Requested sequence index is outside the catalog. Per-frame paths clamp
    /// or treat this as "no sequence" instead of returning it.
    #[error("sequence index {index} out of range (catalog holds {count})")]
    InvalidSequenceIndex { index: usize, count: usize },

    /// Sequence has no embedded linear-motion track; movement extraction
    /// reports a zero delta rather than this error.
    #[error("sequence '{0}' has no linear motion track")]
    MissingMotionTrack(String),

    /// Evaluate was called before a skeleton was loaded; the output transform
    /// array is left empty so callers can detect "not ready" by length.
    #[error("evaluate called before a skeleton was loaded")]
    UninitializedSkeleton,

    /// Bone parent links form a cycle; rejected at skeleton load.
    #[error("bone '{bone}' participates in a parent cycle")]
    CyclicSkeleton { bone: String },

    /// Bone parent index points outside the skeleton; rejected at load.
    #[error("bone '{bone}' has parent index {parent} out of range")]
    InvalidParentIndex { bone: String, parent: usize },
}
