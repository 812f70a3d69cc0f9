//! # Block Voxelizer
//!
//! A Rust library for turning 3D meshes into voxel structures textured with
//! Minecraft blocks.
//!
//! ## Overview
//!
//! The mesh is voxelized at a given pitch. For every voxel the nearest point
//! on the mesh surface is found and its color sampled (from the base color
//! texture, vertex colors or the flat material color). Each color is matched
//! to the closest block of a texture pack in L*a*b* space, the used block
//! textures are packed into an atlas, and every voxel becomes a cube textured
//! with its block.
//!
//! ## Quick Start
//!
//! ```ignore
//! use block_voxelizer::{load_meshes, load_texture_pack, voxelize_mesh, export_glb, SampleConfig};
//!
//! // Load a texture pack once
//! let pack = load_texture_pack("path/to/pack.zip")?;
//!
//! for mesh in load_meshes("model.glb")? {
//!     let output = voxelize_mesh(&mesh, &pack, 0.05, true, SampleConfig::default())?;
//!     let glb_bytes = export_glb(&output)?;
//! }
//! ```
//!
//! ## Stages
//!
//! The convenience function above chains the individual stages, which can
//! also be driven separately:
//!
//! ```ignore
//! use block_voxelizer::{TexturedVoxelMesh, VoxelColorSample, VoxelGrid};
//!
//! let grid = VoxelGrid::voxelize_surface(&mesh, 0.05)?.hollow();
//! let sample = VoxelColorSample::new(&mesh, &grid, &pack, config)?;
//! let output = TexturedVoxelMesh::build(&grid, &sample)?;
//!
//! // Try another dither without touching geometry
//! let dithered = sample.rematch(&pack, config.with_dither(4.0))?;
//! ```

pub mod error;
pub mod types;
pub mod texture_pack;
pub mod source;
pub mod voxel;
pub mod proximity;
pub mod sampler;
pub mod atlas;
pub mod mesher;
pub mod export;

// Re-export main types for convenience
pub use error::{Result, VoxelizerError};
pub use types::{BoundingBox, Direction, GridTransform, Lab, Rgb};
pub use texture_pack::{BlockModel, TexturePack};
pub use source::{ColorType, SourceMaterial, SourceMesh};
pub use voxel::VoxelGrid;
pub use proximity::{ClosestPointQuery, SurfaceHits, SurfaceQuery};
pub use sampler::{SampleConfig, VoxelColorSample};
pub use atlas::{AtlasFilter, BlockAtlas};
pub use mesher::{Mesh, TexturedVoxelMesh, Vertex};
pub use export::gltf::export_glb;
pub use export::obj::{export_obj, ObjExport};

/// Load a texture pack from a file path (ZIP or directory).
pub fn load_texture_pack<P: AsRef<std::path::Path>>(path: P) -> Result<TexturePack> {
    texture_pack::loader::load_from_path(path)
}

/// Load a texture pack from the bytes of a ZIP archive.
pub fn load_texture_pack_from_bytes(data: &[u8]) -> Result<TexturePack> {
    texture_pack::loader::load_from_bytes(data)
}

/// Load every triangle primitive of a glTF or GLB file as a source mesh.
pub fn load_meshes<P: AsRef<std::path::Path>>(path: P) -> Result<Vec<SourceMesh>> {
    source::gltf::load_meshes(path)
}

/// Run the whole pipeline for one mesh: voxelize at `pitch`, optionally
/// hollow, sample and match colors, and build the textured cube mesh.
pub fn voxelize_mesh(
    mesh: &SourceMesh,
    pack: &TexturePack,
    pitch: f32,
    hollow: bool,
    config: SampleConfig,
) -> Result<TexturedVoxelMesh> {
    let mut grid = VoxelGrid::voxelize_surface(mesh, pitch)?;
    if hollow {
        grid = grid.hollow();
    }
    let sample = VoxelColorSample::new(mesh, &grid, pack, config)?;
    TexturedVoxelMesh::build(&grid, &sample)
}
