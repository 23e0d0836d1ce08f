//! Math helpers:
//! - component-wise lerp for vec3
//! - quaternion NLERP with shortest-arc normalization
//! - quaternion multiply / axis-angle construction
//! - non-negative fmod and degree-angle normalization

/// 3D vector (x, y, z).
pub type Vec3 = [f32; 3];

/// Quaternion (x, y, z, w).
pub type Quat = [f32; 4];

pub const VEC3_ZERO: Vec3 = [0.0, 0.0, 0.0];
pub const QUAT_IDENTITY: Quat = [0.0, 0.0, 0.0, 1.0];

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
    ]
}

#[inline]
pub fn add_vec3(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub_vec3(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale_vec3(a: Vec3, s: f32) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn length_vec3(a: Vec3) -> f32 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}

#[inline]
fn dot4(a: Quat, b: Quat) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
pub fn normalize_quat(mut q: Quat) -> Quat {
    let len2 = dot4(q, q);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        q[0] *= inv_len;
        q[1] *= inv_len;
        q[2] *= inv_len;
        q[3] *= inv_len;
        q
    } else {
        QUAT_IDENTITY
    }
}

/// Quaternion NLERP with shortest-arc correction.
/// If dot < 0, negate the second quaternion to ensure the shortest path.
/// Returns a normalized quaternion (x,y,z,w).
#[inline]
pub fn nlerp_quat(a: Quat, mut b: Quat, t: f32) -> Quat {
    let d = dot4(a, b);
    if d < 0.0 {
        b[0] = -b[0];
        b[1] = -b[1];
        b[2] = -b[2];
        b[3] = -b[3];
    }
    normalize_quat([
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ])
}

/// Hamilton product a * b (apply b first, then a).
#[inline]
pub fn mul_quat(a: Quat, b: Quat) -> Quat {
    [
        a[3] * b[0] + a[0] * b[3] + a[1] * b[2] - a[2] * b[1],
        a[3] * b[1] - a[0] * b[2] + a[1] * b[3] + a[2] * b[0],
        a[3] * b[2] + a[0] * b[1] - a[1] * b[0] + a[2] * b[3],
        a[3] * b[3] - a[0] * b[0] - a[1] * b[1] - a[2] * b[2],
    ]
}

/// Rotation of `angle_deg` degrees about the +Z (yaw) axis.
#[inline]
pub fn quat_from_yaw_deg(angle_deg: f32) -> Quat {
    let half = angle_deg.to_radians() * 0.5;
    [0.0, 0.0, half.sin(), half.cos()]
}

/// Non-negative floating-point remainder: result is in [0, b) for b > 0.
/// `a % b` in Rust keeps the sign of `a`, so negative inputs are re-based.
#[inline]
pub fn fmod_positive(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

/// Normalize an angle in degrees into (-180, 180].
#[inline]
pub fn normalize_angle_deg(angle: f32) -> f32 {
    let a = fmod_positive(angle, 360.0);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Shortest signed difference `target - value` in degrees, in (-180, 180].
#[inline]
pub fn angle_diff_deg(target: f32, value: f32) -> f32 {
    normalize_angle_deg(target - value)
}

/// Move `value` toward `target` by at most `max_step` degrees along the
/// shortest arc. `max_step` must be non-negative.
#[inline]
pub fn approach_angle_deg(target: f32, value: f32, max_step: f32) -> f32 {
    let delta = angle_diff_deg(target, value);
    if delta.abs() <= max_step {
        normalize_angle_deg(target)
    } else if delta > 0.0 {
        normalize_angle_deg(value + max_step)
    } else {
        normalize_angle_deg(value - max_step)
    }
}
