//! Pose interpolation used to fabricate in-between transition frames.
//!
//! Each bone matrix is split into translation / rotation / scale channels,
//! translation and scale are lerped, rotation is NLERPed, and the result is
//! recomposed. Curves are linear; there is no easing.
//!
//! Interpolation happens in armature space, on the matrices a [`PoseSource`]
//! returns. Each bone moves along its own straight chord; a child bone does not
//! follow the arc its parent's rotation would sweep in bone-local space.
//!
//! [`PoseSource`]: crate::host::PoseSource

pub mod functions;

use nalgebra::{Matrix3, Matrix4, Rotation3, UnitQuaternion, Vector3};

use crate::host::{Pose, SampledPose};
use functions::{lerp_vec3, nlerp_quat};

/// Fabricates a pose between two poses with the same bone order.
pub trait PoseInterpolator {
    /// `t = 0` is `a`, `t = 1` is `b`.
    fn interpolate(&self, a: &Pose, b: &Pose, t: f32) -> Pose;

    /// Armature world matrix between two samples. Identical inputs stay identical.
    fn interpolate_world(&self, a: &Matrix4<f32>, b: &Matrix4<f32>, t: f32) -> Matrix4<f32> {
        if a == b {
            return *a;
        }
        Trs::from_matrix(a).lerp(&Trs::from_matrix(b), t).to_matrix()
    }

    fn interpolate_sampled(&self, a: &SampledPose, b: &SampledPose, t: f32) -> SampledPose {
        SampledPose {
            world: self.interpolate_world(&a.world, &b.world, t),
            pose: self.interpolate(&a.pose, &b.pose, t),
        }
    }
}

/// Translation / rotation / scale decomposition of an affine matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trs {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Trs {
    /// Decompose `T · R · S`. A negative determinant is folded into the X scale.
    pub fn from_matrix(m: &Matrix4<f32>) -> Self {
        let translation = Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
        let basis: Matrix3<f32> = m.fixed_view::<3, 3>(0, 0).into_owned();

        let mut scale = Vector3::new(
            basis.column(0).norm(),
            basis.column(1).norm(),
            basis.column(2).norm(),
        );
        if basis.determinant() < 0.0 {
            scale.x = -scale.x;
        }

        let mut rot = basis;
        for axis in 0..3 {
            if scale[axis].abs() > f32::EPSILON {
                let mut col = rot.column_mut(axis);
                col /= scale[axis];
            } else {
                // degenerate axis: fall back to the unit axis
                let mut col = rot.column_mut(axis);
                col.fill(0.0);
                col[axis] = 1.0;
            }
        }
        let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rot));

        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.translation)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    pub fn lerp(&self, other: &Trs, t: f32) -> Trs {
        Trs {
            translation: lerp_vec3(&self.translation, &other.translation, t),
            rotation: nlerp_quat(&self.rotation, &other.rotation, t),
            scale: lerp_vec3(&self.scale, &other.scale, t),
        }
    }
}

/// Per-channel linear interpolation (TRS lerp, quaternion NLERP).
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearPoseInterpolator;

impl PoseInterpolator for LinearPoseInterpolator {
    fn interpolate(&self, a: &Pose, b: &Pose, t: f32) -> Pose {
        let bones = a
            .bones
            .iter()
            .zip(b.bones.iter())
            .map(|(ma, mb)| {
                if ma == mb {
                    *ma
                } else {
                    Trs::from_matrix(ma).lerp(&Trs::from_matrix(mb), t).to_matrix()
                }
            })
            .collect();
        Pose { bones }
    }
}
