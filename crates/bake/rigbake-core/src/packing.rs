//! Flat matrix buffer: frames -> bones -> 16 floats.
//!
//! Element order inside one bone is `for col in 0..4 { for row in 0..4 { m[(row, col)] } }`,
//! i.e. column-major. Consumers index the buffer with exactly this layout.

use nalgebra::Matrix4;

use crate::coords::CoordinateTransform;
use crate::error::{ExportError, Result};
use crate::host::SampledPose;

pub const FLOATS_PER_BONE: usize = 16;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatrixBuffer {
    bone_count: usize,
    data: Vec<f32>,
}

impl MatrixBuffer {
    pub fn new(bone_count: usize) -> Self {
        Self {
            bone_count,
            data: Vec::new(),
        }
    }

    pub fn with_frame_capacity(bone_count: usize, frames: usize) -> Self {
        Self {
            bone_count,
            data: Vec::with_capacity(frames * bone_count * FLOATS_PER_BONE),
        }
    }

    #[inline]
    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    #[inline]
    pub fn floats_per_frame(&self) -> usize {
        self.bone_count * FLOATS_PER_BONE
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn frame_count(&self) -> usize {
        match self.floats_per_frame() {
            0 => 0,
            n => self.data.len() / n,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Floats of frame `index`, `None` past the end.
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let n = self.floats_per_frame();
        let start = index.checked_mul(n)?;
        self.data.get(start..start + n)
    }

    /// Pack one evaluated pose as the next frame.
    pub fn push_pose(&mut self, sampled: &SampledPose, transform: &CoordinateTransform) -> Result<()> {
        let actual = sampled.pose.bone_count();
        if actual != self.bone_count {
            return Err(ExportError::BoneCountMismatch {
                expected: self.bone_count,
                actual,
            });
        }
        self.data.reserve(self.floats_per_frame());
        for bone in &sampled.pose.bones {
            let m = transform.apply(&sampled.world, bone);
            push_matrix(&mut self.data, &m);
        }
        Ok(())
    }

    /// Concatenate `other` after this buffer's frames.
    pub fn append(&mut self, other: &MatrixBuffer) -> Result<()> {
        if other.bone_count != self.bone_count {
            return Err(ExportError::BoneCountMismatch {
                expected: self.bone_count,
                actual: other.bone_count,
            });
        }
        self.data.extend_from_slice(&other.data);
        Ok(())
    }
}

#[inline]
fn push_matrix(out: &mut Vec<f32>, m: &Matrix4<f32>) {
    for col in 0..4 {
        for row in 0..4 {
            out.push(m[(row, col)]);
        }
    }
}

/// Pack a sequence of poses into a fresh buffer.
pub fn pack_poses<'a, I>(
    bone_count: usize,
    poses: I,
    transform: &CoordinateTransform,
) -> Result<MatrixBuffer>
where
    I: IntoIterator<Item = &'a SampledPose>,
{
    let mut buffer = MatrixBuffer::new(bone_count);
    for pose in poses {
        buffer.push_pose(pose, transform)?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Pose;

    fn counting_matrix(base: f32) -> Matrix4<f32> {
        // m[(row, col)] = base + row * 4 + col
        Matrix4::from_fn(|row, col| base + (row * 4 + col) as f32)
    }

    #[test]
    fn element_order_is_column_major() {
        let sampled = SampledPose::new(Matrix4::identity(), Pose::new(vec![counting_matrix(0.0)]));
        let buf = pack_poses(1, [&sampled], &CoordinateTransform::identity()).unwrap();
        assert_eq!(
            buf.as_slice(),
            &[
                0.0, 4.0, 8.0, 12.0, // column 0
                1.0, 5.0, 9.0, 13.0, // column 1
                2.0, 6.0, 10.0, 14.0, // column 2
                3.0, 7.0, 11.0, 15.0, // column 3
            ]
        );
    }

    #[test]
    fn frames_then_bones() {
        let a = SampledPose::new(
            Matrix4::identity(),
            Pose::new(vec![counting_matrix(0.0), counting_matrix(100.0)]),
        );
        let b = SampledPose::new(
            Matrix4::identity(),
            Pose::new(vec![counting_matrix(200.0), counting_matrix(300.0)]),
        );
        let buf = pack_poses(2, [&a, &b], &CoordinateTransform::identity()).unwrap();
        assert_eq!(buf.len(), 2 * 2 * FLOATS_PER_BONE);
        assert_eq!(buf.frame_count(), 2);
        let f1 = buf.frame(1).unwrap();
        assert_eq!(f1[0], 200.0);
        assert_eq!(f1[FLOATS_PER_BONE], 300.0);
        assert!(buf.frame(2).is_none());
    }

    #[test]
    fn world_and_transform_are_applied() {
        let world = Matrix4::new_scaling(2.0);
        let sampled = SampledPose::new(world, Pose::new(vec![Matrix4::identity()]));
        let buf = pack_poses(1, [&sampled], &CoordinateTransform::z_up_to_y_up()).unwrap();
        let s = buf.as_slice();
        // column 1 of R·2I is (0, 0, -2, 0); column 2 is (0, 2, 0, 0)
        assert_eq!(&s[4..8], &[0.0, 0.0, -2.0, 0.0]);
        assert_eq!(&s[8..12], &[0.0, 2.0, 0.0, 0.0]);
        assert_eq!(s[15], 1.0);
    }

    #[test]
    fn bone_count_must_stay_fixed() {
        let sampled = SampledPose::new(Matrix4::identity(), Pose::new(vec![Matrix4::identity()]));
        let mut buf = MatrixBuffer::new(2);
        let err = buf
            .push_pose(&sampled, &CoordinateTransform::identity())
            .unwrap_err();
        assert_eq!(
            err,
            ExportError::BoneCountMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert!(buf.is_empty());
    }
}
