//! Coordinate-space conversion applied to every sampled bone matrix.

use nalgebra::Matrix4;

/// Fixed transform premultiplied onto `world · bone` before packing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateTransform {
    matrix: Matrix4<f32>,
}

impl CoordinateTransform {
    /// Rotation of -90° about X: authoring Z-up to engine Y-up.
    ///
    /// Written out as the exact axis swap (`y' = z`, `z' = -y`) so no
    /// `cos(π/2)` residue leaks into the baked data.
    pub fn z_up_to_y_up() -> Self {
        #[rustfmt::skip]
        let matrix = Matrix4::new(
            1.0, 0.0,  0.0, 0.0,
            0.0, 0.0,  1.0, 0.0,
            0.0, -1.0, 0.0, 0.0,
            0.0, 0.0,  0.0, 1.0,
        );
        Self { matrix }
    }

    /// For hosts that already evaluate in engine space.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn from_matrix(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.matrix
    }

    /// `transform · world · bone`
    #[inline]
    pub fn apply(&self, world: &Matrix4<f32>, bone: &Matrix4<f32>) -> Matrix4<f32> {
        self.matrix * world * bone
    }
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::z_up_to_y_up()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Vector3, Vector4};

    #[test]
    fn z_up_maps_to_y_up() {
        let t = CoordinateTransform::z_up_to_y_up();
        let up = t.matrix() * Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert_eq!(up, Vector4::new(0.0, 1.0, 0.0, 0.0));
        let forward = t.matrix() * Vector4::new(0.0, 1.0, 0.0, 0.0);
        assert_eq!(forward, Vector4::new(0.0, 0.0, -1.0, 0.0));
    }

    #[test]
    fn apply_composes_in_order() {
        let t = CoordinateTransform::z_up_to_y_up();
        let world = Matrix4::new_translation(&Vector3::new(0.0, 0.0, 2.0));
        let bone = Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0));
        let m = t.apply(&world, &bone);
        // translation (1, 0, 2) in Z-up becomes (1, 2, 0) in Y-up
        assert_eq!(m[(0, 3)], 1.0);
        assert_eq!(m[(1, 3)], 2.0);
        assert_eq!(m[(2, 3)], 0.0);
    }
}
