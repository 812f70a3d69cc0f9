//! Affine transform between voxel-grid space and mesh space.

use glam::{Mat3, Mat4, Vec3};

/// Maps voxel-grid coordinates into the source mesh's space.
///
/// In grid space the voxel with sparse index `i` occupies the unit cube
/// `[i, i + 1]`. The transform is a uniform scale by the pitch followed by a
/// translation to the grid origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTransform {
    matrix: Mat4,
}

impl GridTransform {
    /// Build the transform for a grid of cubic cells of side `pitch` whose
    /// index `[0, 0, 0]` has its minimum corner at `origin`.
    pub fn from_pitch_origin(pitch: f32, origin: Vec3) -> Self {
        Self {
            matrix: Mat4::from_translation(origin) * Mat4::from_scale(Vec3::splat(pitch)),
        }
    }

    /// Wrap an arbitrary affine matrix.
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// The identity transform (grid space equals mesh space).
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }

    /// The underlying 4x4 matrix.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Transform a point from grid space into mesh space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix.transform_point3(point)
    }

    /// Transform a normal, keeping it unit length.
    pub fn transform_normal(&self, normal: Vec3) -> Vec3 {
        let normal_matrix = Mat3::from_mat4(self.matrix).inverse().transpose();
        (normal_matrix * normal).normalize_or_zero()
    }
}

impl Default for GridTransform {
    fn default() -> Self {
        Self::identity()
    }
}
