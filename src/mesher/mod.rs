//! Textured cube meshes from sampled voxel grids.
//!
//! Every voxel becomes a unit cube of 24 vertices and 12 triangles whose
//! faces all show the voxel's block tile in the sample's atlas.

pub mod cube;
pub mod geometry;

pub use geometry::{Mesh, Vertex};

use crate::atlas::BlockAtlas;
use crate::error::{Result, VoxelizerError};
use crate::sampler::VoxelColorSample;
use crate::types::BoundingBox;
use crate::voxel::VoxelGrid;
use glam::Vec3;
use std::sync::Arc;

/// Vertices emitted per voxel.
pub const VERTICES_PER_VOXEL: usize = 24;
/// Triangles emitted per voxel.
pub const TRIANGLES_PER_VOXEL: usize = 12;

/// A voxel grid rendered as textured cubes.
#[derive(Debug, Clone)]
pub struct TexturedVoxelMesh {
    /// Cube geometry in the source mesh's space.
    pub mesh: Mesh,
    /// Atlas the UVs address, shared with the sample.
    pub atlas: Arc<BlockAtlas>,
    /// Bounds of the mesh, `None` when there are no voxels.
    pub bounds: Option<BoundingBox>,
}

impl TexturedVoxelMesh {
    /// Emit one cube per voxel of `grid`, mapped onto the atlas slot chosen
    /// for it in `sample`.
    ///
    /// Slot `s` of `M` covers V in `[(M - 1 - s) / M, (M - s) / M]`: the atlas
    /// is stacked top to bottom but V runs bottom to top.
    pub fn build(grid: &VoxelGrid, sample: &VoxelColorSample) -> Result<Self> {
        if grid.len() != sample.len() {
            return Err(VoxelizerError::Mismatch(format!(
                "grid has {} voxels but the sample has {}",
                grid.len(),
                sample.len()
            )));
        }

        let atlas = Arc::clone(sample.atlas());
        let tile_count = atlas.tile_count();
        let tile_height = atlas.tile_height();
        let transform = grid.transform();
        let normals = cube::FACE_DIRECTIONS
            .map(|dir| transform.transform_normal(Vec3::from_array(dir.normal())).to_array());

        let mut mesh = Mesh::with_capacity(
            grid.len() * VERTICES_PER_VOXEL,
            grid.len() * TRIANGLES_PER_VOXEL,
        );

        for (cell, &slot) in grid
            .sparse_indices()
            .iter()
            .zip(sample.transposed_block_indexes())
        {
            let origin = Vec3::new(cell[0] as f32, cell[1] as f32, cell[2] as f32);
            let v_offset = tile_count.saturating_sub(slot + 1) as f32 * tile_height;
            let base = mesh.vertex_count() as u32;

            for (k, corner) in cube::VERTICES.iter().enumerate() {
                let position = transform.transform_point(origin + Vec3::from_array(*corner));
                mesh.add_vertex(Vertex::new(
                    position.to_array(),
                    normals[k / 4],
                    [cube::U[k], cube::V_TILES[k] * tile_height + v_offset],
                ));
            }
            for [a, b, c] in cube::TRIANGLES {
                mesh.add_triangle(base + a, base + b, base + c);
            }
        }

        if mesh.is_empty() {
            log::warn!("No voxels to mesh; output is empty");
        } else {
            log::debug!(
                "Built {} cubes: {} vertices, {} triangles",
                grid.len(),
                mesh.vertex_count(),
                mesh.triangle_count()
            );
        }

        let bounds = mesh.bounds();
        Ok(Self {
            mesh,
            atlas,
            bounds,
        })
    }

    /// Number of cubes in the mesh.
    pub fn voxel_count(&self) -> usize {
        self.mesh.vertex_count() / VERTICES_PER_VOXEL
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }
}
