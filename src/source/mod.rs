//! Source meshes: the triangle meshes that get voxelized and recolored.

pub mod gltf;

use crate::error::{Result, VoxelizerError};
use crate::types::BoundingBox;
use glam::{Vec2, Vec3};
use image::RgbImage;

/// How the surface color of a mesh is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    /// Colors come from the material's base color texture via UVs.
    Texture,
    /// Colors are stored per vertex.
    Vertex,
    /// The whole mesh has the material's single base color.
    Flat,
}

/// Surface appearance of a source mesh.
#[derive(Debug, Clone)]
pub struct SourceMaterial {
    /// Base color factor, RGBA in [0, 1]. Sampled like an sRGB texel.
    pub base_color: [f32; 4],
    /// Base color texture, if any.
    pub base_color_texture: Option<RgbImage>,
}

impl Default for SourceMaterial {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
        }
    }
}

impl SourceMaterial {
    /// A material with one flat color, given as 8-bit sRGB.
    pub fn flat(rgb: [u8; 3]) -> Self {
        Self {
            base_color: [
                rgb[0] as f32 / 255.0,
                rgb[1] as f32 / 255.0,
                rgb[2] as f32 / 255.0,
                1.0,
            ],
            base_color_texture: None,
        }
    }

    /// The base color as sRGB with channels in [0, 255].
    pub fn base_color_rgb(&self) -> [f32; 3] {
        [
            self.base_color[0] * 255.0,
            self.base_color[1] * 255.0,
            self.base_color[2] * 255.0,
        ]
    }
}

/// An indexed triangle mesh with optional UVs and vertex colors.
///
/// UVs use a bottom-left origin: `v = 0` is the bottom row of the texture.
#[derive(Debug, Clone, Default)]
pub struct SourceMesh {
    /// Name of the mesh, for logging and output naming.
    pub name: String,
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Triangles as vertex indices.
    pub faces: Vec<[u32; 3]>,
    /// Per-vertex texture coordinates (empty if absent).
    pub uvs: Vec<Vec2>,
    /// Per-vertex sRGB colors in [0, 255] (empty if absent).
    pub vertex_colors: Vec<[f32; 3]>,
    /// Material of the whole mesh.
    pub material: SourceMaterial,
}

impl SourceMesh {
    /// Create an untextured mesh from positions and faces.
    pub fn new(positions: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            faces,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn with_vertex_colors(mut self, colors: Vec<[f32; 3]>) -> Self {
        self.vertex_colors = colors;
        self
    }

    pub fn with_material(mut self, material: SourceMaterial) -> Self {
        self.material = material;
        self
    }

    /// Decide once how this mesh is colored.
    ///
    /// A base color texture wins over vertex colors, which win over the flat
    /// material color. A texture without UVs cannot be sampled and falls
    /// through to the next strategy.
    pub fn color_type(&self) -> ColorType {
        if self.material.base_color_texture.is_some() && !self.uvs.is_empty() {
            ColorType::Texture
        } else if !self.vertex_colors.is_empty() {
            ColorType::Vertex
        } else {
            ColorType::Flat
        }
    }

    /// The three corner positions of a face.
    pub fn triangle(&self, face: usize) -> [Vec3; 3] {
        let [a, b, c] = self.faces[face];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// Axis-aligned bounds of all vertices.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.positions.iter().map(|p| p.to_array()))
    }

    /// Check that faces reference existing vertices and per-vertex arrays
    /// match the vertex count.
    pub fn validate(&self) -> Result<()> {
        let count = self.positions.len();
        if let Some(face) = self
            .faces
            .iter()
            .find(|f| f.iter().any(|&i| i as usize >= count))
        {
            return Err(VoxelizerError::InvalidMesh(format!(
                "face {:?} references a vertex beyond {}",
                face, count
            )));
        }
        if !self.uvs.is_empty() && self.uvs.len() != count {
            return Err(VoxelizerError::InvalidMesh(format!(
                "{} UVs for {} vertices",
                self.uvs.len(),
                count
            )));
        }
        if !self.vertex_colors.is_empty() && self.vertex_colors.len() != count {
            return Err(VoxelizerError::InvalidMesh(format!(
                "{} vertex colors for {} vertices",
                self.vertex_colors.len(),
                count
            )));
        }
        Ok(())
    }
}
