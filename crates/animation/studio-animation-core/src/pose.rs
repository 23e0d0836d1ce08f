//! Pose parameters: named continuous control values that drive
//! intra-sequence blending. Values are silently clamped to their declared
//! range on set (the common case is a UI slider driving past range).

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::sequence::PoseAxis;

/// Declaration of a pose parameter, owned by the model asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseParamDecl {
    pub name: String,
    pub min: f32,
    pub max: f32,
    #[serde(default)]
    pub default: f32,
}

/// Blend coefficients for one pose axis: the two variant indices to mix and
/// the normalized fraction between them. `lo == hi` means a single variant
/// contributes fully.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisBlend {
    pub lo: usize,
    pub hi: usize,
    pub frac: f32,
}

impl AxisBlend {
    /// Single-variant blend: coefficient 1.0, no mixing.
    pub const WHOLE: AxisBlend = AxisBlend {
        lo: 0,
        hi: 0,
        frac: 0.0,
    };
}

/// Per-instance pose parameter values, built from the model's declarations.
#[derive(Clone, Debug, Default)]
pub struct PoseParamSet {
    decls: Vec<PoseParamDecl>,
    values: Vec<f32>,
    by_name: HashMap<String, usize>,
}

impl PoseParamSet {
    pub fn new(decls: &[PoseParamDecl]) -> Self {
        let values = decls
            .iter()
            .map(|d| d.default.clamp(d.min, d.max))
            .collect();
        let mut by_name = HashMap::with_capacity(decls.len());
        for (i, d) in decls.iter().enumerate() {
            by_name.insert(d.name.clone(), i);
        }
        Self {
            decls: decls.to_vec(),
            values,
            by_name,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Set a parameter, clamping into its declared range, and return the
    /// clamped value. Unknown indices are a no-op returning `value`.
    pub fn set(&mut self, index: usize, value: f32) -> f32 {
        let Some(decl) = self.decls.get(index) else {
            log::debug!("set on unknown pose parameter index {index}");
            return value;
        };
        let clamped = value.clamp(decl.min, decl.max);
        self.values[index] = clamped;
        clamped
    }

    /// Current value, already clamped. Zero for unknown indices.
    pub fn get(&self, index: usize) -> f32 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn range(&self, index: usize) -> Option<(f32, f32)> {
        self.decls.get(index).map(|d| (d.min, d.max))
    }

    /// Resolve the blend coefficients for a sequence's pose axis: find the
    /// two nearest declared anchors around the current parameter value and
    /// the normalized position between them. A single anchor (or a missing
    /// axis) contributes wholly.
    pub fn resolve_blend(&self, axis: Option<&PoseAxis>) -> AxisBlend {
        let Some(axis) = axis else {
            return AxisBlend::WHOLE;
        };
        let anchors = &axis.anchors;
        if anchors.len() <= 1 {
            return AxisBlend::WHOLE;
        }
        let value = self.get(axis.param);
        if value <= anchors[0] {
            return AxisBlend {
                lo: 0,
                hi: 0,
                frac: 0.0,
            };
        }
        let last = anchors.len() - 1;
        if value >= anchors[last] {
            return AxisBlend {
                lo: last,
                hi: last,
                frac: 0.0,
            };
        }
        for i in 0..last {
            let (a, b) = (anchors[i], anchors[i + 1]);
            if value >= a && value <= b {
                let denom = (b - a).max(f32::EPSILON);
                return AxisBlend {
                    lo: i,
                    hi: i + 1,
                    frac: ((value - a) / denom).clamp(0.0, 1.0),
                };
            }
        }
        AxisBlend::WHOLE
    }
}
