//! Bone hierarchy: immutable once built, shared read-only across instances.
//!
//! Parent indices are not required to precede their children in storage
//! order; a parent-before-child traversal order is computed once at build
//! time and cached, so per-frame evaluation never re-derives it.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use studio_api_core::{BoneTransform, CoreError};

/// A single bone: name, optional parent, bind-pose local transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    /// None for root bones.
    #[serde(default)]
    pub parent: Option<usize>,
    /// Local transform relative to the parent when no sequence drives the bone.
    #[serde(default)]
    pub bind: BoneTransform,
}

/// Validated bone hierarchy with a cached parent-before-child order.
#[derive(Clone, Debug)]
pub struct Skeleton {
    bones: Vec<Bone>,
    /// Bone indices ordered so every bone appears after its parent.
    order: Vec<usize>,
    by_name: HashMap<String, usize>,
}

impl Skeleton {
    /// Build a skeleton, validating parent links and computing traversal
    /// order. Cyclic or out-of-range parent links are rejected here so the
    /// per-frame path can assume a well-formed hierarchy.
    pub fn new(bones: Vec<Bone>) -> Result<Self, CoreError> {
        let n = bones.len();
        for bone in &bones {
            if let Some(p) = bone.parent {
                if p >= n {
                    return Err(CoreError::InvalidParentIndex {
                        bone: bone.name.clone(),
                        parent: p,
                    });
                }
            }
        }

        // Depth of each bone along its parent chain; a chain longer than the
        // bone count means a cycle.
        let mut depth = vec![0usize; n];
        for (i, bone) in bones.iter().enumerate() {
            let mut steps = 0usize;
            let mut cur = bone.parent;
            while let Some(p) = cur {
                steps += 1;
                if steps > n {
                    return Err(CoreError::CyclicSkeleton {
                        bone: bone.name.clone(),
                    });
                }
                cur = bones[p].parent;
            }
            depth[i] = steps;
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| depth[i]);

        let mut by_name = HashMap::with_capacity(n);
        for (i, bone) in bones.iter().enumerate() {
            by_name.insert(bone.name.clone(), i);
        }

        Ok(Self {
            bones,
            order,
            by_name,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    #[inline]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    #[inline]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Bone indices in parent-before-child order.
    #[inline]
    pub fn traversal_order(&self) -> &[usize] {
        &self.order
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Indices of `root` and every bone below it, in traversal order.
    pub fn subtree(&self, root: usize) -> Vec<usize> {
        let mut in_subtree = vec![false; self.bones.len()];
        if root < self.bones.len() {
            in_subtree[root] = true;
        }
        let mut out = Vec::new();
        for &i in &self.order {
            if in_subtree[i] {
                out.push(i);
            } else if let Some(p) = self.bones[i].parent {
                if in_subtree[p] {
                    in_subtree[i] = true;
                    out.push(i);
                }
            }
        }
        out
    }
}
