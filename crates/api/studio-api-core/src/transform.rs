//! Rigid transforms used by the bone evaluator.
//!
//! A bone's local pose is a translation plus a unit quaternion; world poses
//! are 3x4 row-major matrices (rotation columns + translation column), the
//! layout renderers consume directly. Matrices are only ever produced by
//! composing rigid transforms, never by averaging, so they stay orthonormal.

use serde::{Deserialize, Serialize};

use crate::math::{
    add_vec3, lerp_vec3, mul_quat, nlerp_quat, normalize_quat, scale_vec3, Quat, Vec3,
    QUAT_IDENTITY, VEC3_ZERO,
};

/// 3x4 bone-to-world matrix, row-major. Rows are the world basis vectors,
/// the fourth column is the world-space origin.
pub type Mat3x4 = [[f32; 4]; 3];

pub const MAT3X4_IDENTITY: Mat3x4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
];

/// Local bone pose: translation + rotation. No scale; studio skeletons are
/// rigid.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneTransform {
    pub pos: Vec3,
    pub rot: Quat,
}

impl BoneTransform {
    pub const IDENTITY: BoneTransform = BoneTransform {
        pos: VEC3_ZERO,
        rot: QUAT_IDENTITY,
    };

    #[inline]
    pub fn new(pos: Vec3, rot: Quat) -> Self {
        Self { pos, rot }
    }

    /// Interpolate translation linearly and rotation spherically (NLERP,
    /// shortest arc). This is the only blend the evaluator uses; raw matrix
    /// averaging would skew the result.
    #[inline]
    pub fn lerp(a: &BoneTransform, b: &BoneTransform, t: f32) -> BoneTransform {
        BoneTransform {
            pos: lerp_vec3(a.pos, b.pos, t),
            rot: nlerp_quat(a.rot, b.rot, t),
        }
    }

    /// Apply `delta` on top of `self` at the given weight (additive layers).
    /// The delta rotation is scaled toward identity before being composed.
    #[inline]
    pub fn add_weighted(&self, delta: &BoneTransform, weight: f32) -> BoneTransform {
        let scaled_rot = nlerp_quat(QUAT_IDENTITY, delta.rot, weight);
        BoneTransform {
            pos: add_vec3(self.pos, scale_vec3(delta.pos, weight)),
            rot: normalize_quat(mul_quat(scaled_rot, self.rot)),
        }
    }

    /// Expand to a 3x4 matrix.
    pub fn to_matrix(&self) -> Mat3x4 {
        let [x, y, z, w] = self.rot;
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);
        [
            [1.0 - (yy + zz), xy - wz, xz + wy, self.pos[0]],
            [xy + wz, 1.0 - (xx + zz), yz - wx, self.pos[1]],
            [xz - wy, yz + wx, 1.0 - (xx + yy), self.pos[2]],
        ]
    }
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// World placement of a model instance: origin plus yaw about +Z, in degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub origin: Vec3,
    pub yaw_deg: f32,
}

impl Placement {
    pub fn to_matrix(&self) -> Mat3x4 {
        let bt = BoneTransform::new(self.origin, crate::math::quat_from_yaw_deg(self.yaw_deg));
        bt.to_matrix()
    }
}

/// Concatenate rigid transforms: `out = a * b` (apply `b` in `a`'s space).
pub fn concat_transforms(a: &Mat3x4, b: &Mat3x4) -> Mat3x4 {
    let mut out = MAT3X4_IDENTITY;
    for (i, row) in out.iter_mut().enumerate() {
        for j in 0..3 {
            row[j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
        row[3] = a[i][0] * b[0][3] + a[i][1] * b[1][3] + a[i][2] * b[2][3] + a[i][3];
    }
    out
}

/// Transform a point from bone space to the matrix's parent space.
#[inline]
pub fn transform_point(m: &Mat3x4, p: Vec3) -> Vec3 {
    [
        m[0][0] * p[0] + m[0][1] * p[1] + m[0][2] * p[2] + m[0][3],
        m[1][0] * p[0] + m[1][1] * p[1] + m[1][2] * p[2] + m[1][3],
        m[2][0] * p[0] + m[2][1] * p[1] + m[2][2] * p[2] + m[2][3],
    ]
}

/// Origin column of a bone-to-world matrix.
#[inline]
pub fn matrix_origin(m: &Mat3x4) -> Vec3 {
    [m[0][3], m[1][3], m[2][3]]
}

/// Rotate a vector by `yaw_deg` about +Z. Used to move a world-space motion
/// delta into the starting frame's local space (negative yaw) and back.
#[inline]
pub fn rotate_vec3_yaw_deg(v: Vec3, yaw_deg: f32) -> Vec3 {
    let r = yaw_deg.to_radians();
    let (s, c) = r.sin_cos();
    [c * v[0] - s * v[1], s * v[0] + c * v[1], v[2]]
}
