//! Interpolation helpers:
//! - lerp_f32 / lerp_vec3 (component-wise)
//! - nlerp_quat (quaternion NLERP with shortest-arc correction)

use nalgebra::{UnitQuaternion, Vector3};

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec3(a: &Vector3<f32>, b: &Vector3<f32>, t: f32) -> Vector3<f32> {
    Vector3::new(
        lerp_f32(a.x, b.x, t),
        lerp_f32(a.y, b.y, t),
        lerp_f32(a.z, b.z, t),
    )
}

/// Quaternion NLERP with shortest-arc correction.
/// If dot < 0, negate the second quaternion to ensure the shortest path.
#[inline]
pub fn nlerp_quat(a: &UnitQuaternion<f32>, b: &UnitQuaternion<f32>, t: f32) -> UnitQuaternion<f32> {
    let qa = a.quaternion();
    let mut qb = *b.quaternion();
    if qa.dot(&qb) < 0.0 {
        qb = -qb;
    }
    let q = qa.lerp(&qb, t);
    UnitQuaternion::try_new(q, f32::EPSILON).unwrap_or_else(UnitQuaternion::identity)
}
