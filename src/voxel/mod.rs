//! Voxel grids produced from source meshes.

mod overlap;

use crate::error::{Result, VoxelizerError};
use crate::source::SourceMesh;
use crate::types::{Direction, GridTransform};
use glam::Vec3;
use rayon::prelude::*;
use std::collections::HashSet;

/// A sparse set of occupied voxel cells.
///
/// Cell `i` occupies `[i, i + 1]` in grid space; [`VoxelGrid::transform`] maps
/// grid space into the space of the mesh the grid was built from. Indices are
/// unique and sorted lexicographically, and `points[k]` is the mesh-space
/// center of `sparse_indices[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    sparse_indices: Vec<[i32; 3]>,
    points: Vec<Vec3>,
    transform: GridTransform,
}

impl VoxelGrid {
    /// Build a grid from cell indices. Duplicates are removed.
    pub fn from_sparse_indices(mut indices: Vec<[i32; 3]>, transform: GridTransform) -> Self {
        indices.sort_unstable();
        indices.dedup();
        let points = indices
            .iter()
            .map(|&[x, y, z]| {
                transform.transform_point(Vec3::new(x as f32, y as f32, z as f32) + Vec3::splat(0.5))
            })
            .collect();
        Self {
            sparse_indices: indices,
            points,
            transform,
        }
    }

    /// Voxelize the surface of a mesh with cubic cells of side `pitch`.
    ///
    /// The grid is anchored at the minimum corner of the mesh bounds. A cell is
    /// occupied when any triangle touches it, which yields a shell one or two
    /// cells thick.
    pub fn voxelize_surface(mesh: &SourceMesh, pitch: f32) -> Result<Self> {
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(VoxelizerError::InvalidPitch(pitch));
        }
        mesh.validate()?;

        let Some(bounds) = mesh.bounds() else {
            return Ok(Self::from_sparse_indices(Vec::new(), GridTransform::identity()));
        };
        let origin = Vec3::from_array(bounds.min);
        let transform = GridTransform::from_pitch_origin(pitch, origin);

        let extent = bounds.dimensions();
        let dims = extent.map(|e| ((e / pitch).ceil() as i32).max(1));

        let mut cells: Vec<[i32; 3]> = (0..mesh.faces.len())
            .into_par_iter()
            .flat_map_iter(|face| {
                let triangle = mesh.triangle(face).map(|p| (p - origin) / pitch);
                overlap::cells_touching_triangle(triangle, dims)
            })
            .collect();
        cells.par_sort_unstable();
        cells.dedup();

        log::debug!(
            "Voxelized {} faces at pitch {} into {} cells (grid {:?})",
            mesh.faces.len(),
            pitch,
            cells.len(),
            dims
        );

        Ok(Self::from_sparse_indices(cells, transform))
    }

    /// Remove every cell whose six face neighbours are all occupied.
    pub fn hollow(&self) -> Self {
        let occupied: HashSet<[i32; 3]> = self.sparse_indices.iter().copied().collect();
        let is_interior = |cell: &[i32; 3]| {
            Direction::ALL.iter().all(|dir| {
                let [dx, dy, dz] = dir.offset();
                occupied.contains(&[cell[0] + dx, cell[1] + dy, cell[2] + dz])
            })
        };

        let mut sparse_indices = Vec::with_capacity(self.sparse_indices.len());
        let mut points = Vec::with_capacity(self.points.len());
        for (cell, point) in self.sparse_indices.iter().zip(&self.points) {
            if !is_interior(cell) {
                sparse_indices.push(*cell);
                points.push(*point);
            }
        }

        Self {
            sparse_indices,
            points,
            transform: self.transform,
        }
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.sparse_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparse_indices.is_empty()
    }

    /// Integer grid coordinates of the occupied cells.
    pub fn sparse_indices(&self) -> &[[i32; 3]] {
        &self.sparse_indices
    }

    /// Mesh-space centers of the occupied cells, aligned with `sparse_indices`.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Grid space to mesh space.
    pub fn transform(&self) -> &GridTransform {
        &self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> SourceMesh {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            [0, 2, 1], [0, 3, 2],
            [4, 5, 6], [4, 6, 7],
            [0, 1, 5], [0, 5, 4],
            [3, 6, 2], [3, 7, 6],
            [0, 4, 7], [0, 7, 3],
            [1, 2, 6], [1, 6, 5],
        ];
        SourceMesh::new(positions, faces)
    }

    #[test]
    fn test_invalid_pitch() {
        let mesh = unit_cube();
        assert!(matches!(
            VoxelGrid::voxelize_surface(&mesh, 0.0),
            Err(VoxelizerError::InvalidPitch(_))
        ));
        assert!(VoxelGrid::voxelize_surface(&mesh, f32::NAN).is_err());
    }

    #[test]
    fn test_cube_shell() {
        let grid = VoxelGrid::voxelize_surface(&unit_cube(), 0.25).unwrap();
        // 4x4x4 grid, every cell except the 2x2x2 core touches the surface.
        assert_eq!(grid.len(), 64 - 8);
        assert!(grid.sparse_indices().iter().all(|c| c.iter().all(|&v| (0..4).contains(&v))));
        assert_eq!(grid.points().len(), grid.len());
    }

    #[test]
    fn test_points_are_cell_centers() {
        let grid = VoxelGrid::voxelize_surface(&unit_cube(), 0.5).unwrap();
        assert_eq!(grid.len(), 8);
        assert_eq!(grid.sparse_indices()[0], [0, 0, 0]);
        assert!((grid.points()[0] - Vec3::splat(0.25)).length() < 1e-6);
        assert_eq!(grid.sparse_indices()[7], [1, 1, 1]);
        assert!((grid.points()[7] - Vec3::splat(0.75)).length() < 1e-6);
    }

    #[test]
    fn test_hollow_removes_enclosed_cells() {
        let mut cells = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                for z in 0..3 {
                    cells.push([x, y, z]);
                }
            }
        }
        let solid = VoxelGrid::from_sparse_indices(cells, GridTransform::identity());
        let hollow = solid.hollow();
        assert_eq!(hollow.len(), 26);
        assert!(!hollow.sparse_indices().contains(&[1, 1, 1]));
    }

    #[test]
    fn test_empty_mesh_gives_empty_grid() {
        let grid = VoxelGrid::voxelize_surface(&SourceMesh::default(), 1.0).unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn test_indices_sorted_and_unique() {
        let grid = VoxelGrid::from_sparse_indices(
            vec![[1, 0, 0], [0, 0, 0], [1, 0, 0]],
            GridTransform::identity(),
        );
        assert_eq!(grid.sparse_indices(), &[[0, 0, 0], [1, 0, 0]]);
    }
}
