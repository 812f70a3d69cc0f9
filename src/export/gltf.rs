//! GLB export.

use crate::error::{Result, VoxelizerError};
use crate::mesher::TexturedVoxelMesh;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;

const CHUNK_JSON: u32 = 0x4E4F534A;
const CHUNK_BIN: u32 = 0x004E4942;

/// Export a voxel mesh to GLB (binary glTF) with the atlas embedded as PNG.
///
/// The mesh is written as one primitive. The sampler repeats horizontally
/// because cube U coordinates run past 1, and uses nearest filtering so block
/// pixels stay sharp. V is flipped to glTF's top-left origin.
pub fn export_glb(output: &TexturedVoxelMesh) -> Result<Vec<u8>> {
    let mesh = &output.mesh;
    let Some(bounds) = output.bounds else {
        return Err(VoxelizerError::Export("Cannot export empty mesh".to_string()));
    };

    let texture_png = output.atlas.to_png()?;

    // Binary buffer: positions, normals, uvs, indices, then the PNG.
    let mut buffer_data: Vec<u8> = Vec::new();
    let pos_offset = buffer_data.len();
    extend_f32(&mut buffer_data, &mesh.positions_flat());
    let norm_offset = buffer_data.len();
    extend_f32(&mut buffer_data, &mesh.normals_flat());
    let uv_offset = buffer_data.len();
    extend_f32(&mut buffer_data, &mesh.uvs_top_left_flat());
    let idx_offset = buffer_data.len();
    for index in &mesh.indices {
        buffer_data.extend_from_slice(&index.to_le_bytes());
    }
    let idx_end = buffer_data.len();

    let texture_padding = (4 - (buffer_data.len() % 4)) % 4;
    buffer_data.extend(std::iter::repeat(0u8).take(texture_padding));
    let texture_offset = buffer_data.len();
    buffer_data.extend_from_slice(&texture_png);

    let vertex_count = mesh.vertex_count();
    let buffer_views = vec![
        create_buffer_view(pos_offset, norm_offset - pos_offset, Some(json::buffer::Target::ArrayBuffer)),
        create_buffer_view(norm_offset, uv_offset - norm_offset, Some(json::buffer::Target::ArrayBuffer)),
        create_buffer_view(uv_offset, idx_offset - uv_offset, Some(json::buffer::Target::ArrayBuffer)),
        create_buffer_view(idx_offset, idx_end - idx_offset, Some(json::buffer::Target::ElementArrayBuffer)),
        create_buffer_view(texture_offset, texture_png.len(), None),
    ];
    let accessors = vec![
        create_accessor(0, vertex_count, json::accessor::Type::Vec3, json::accessor::ComponentType::F32, Some(bounds.min), Some(bounds.max)),
        create_accessor(1, vertex_count, json::accessor::Type::Vec3, json::accessor::ComponentType::F32, None, None),
        create_accessor(2, vertex_count, json::accessor::Type::Vec2, json::accessor::ComponentType::F32, None, None),
        create_accessor(3, mesh.indices.len(), json::accessor::Type::Scalar, json::accessor::ComponentType::U32, None, None),
    ];

    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            name: None,
            byte_length: USize64(buffer_data.len() as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        images: vec![json::Image {
            name: None,
            buffer_view: Some(json::Index::new(4)),
            mime_type: Some(json::image::MimeType("image/png".to_string())),
            uri: None,
            extensions: Default::default(),
            extras: Default::default(),
        }],
        samplers: vec![json::texture::Sampler {
            name: None,
            mag_filter: Some(Valid(json::texture::MagFilter::Nearest)),
            min_filter: Some(Valid(json::texture::MinFilter::Nearest)),
            wrap_s: Valid(json::texture::WrappingMode::Repeat),
            wrap_t: Valid(json::texture::WrappingMode::Repeat),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        textures: vec![json::Texture {
            name: None,
            sampler: Some(json::Index::new(0)),
            source: json::Index::new(0),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        materials: vec![create_atlas_material()],
        meshes: vec![json::Mesh {
            name: None,
            extensions: Default::default(),
            extras: Default::default(),
            primitives: vec![create_primitive()],
            weights: None,
        }],
        nodes: vec![json::Node {
            name: None,
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(0)),
            rotation: None,
            scale: None,
            translation: None,
            skin: None,
            weights: None,
        }],
        scenes: vec![json::Scene {
            name: None,
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| VoxelizerError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;

    log::debug!(
        "GLB: {} vertices, {} bytes of binary data",
        vertex_count,
        buffer_data.len()
    );

    Ok(write_glb(json_string.as_bytes(), &buffer_data))
}

/// Assemble the GLB container from a JSON chunk and a BIN chunk.
fn write_glb(json_bytes: &[u8], buffer_data: &[u8]) -> Vec<u8> {
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + 8 + padded_json_len + 8 + padded_buffer_len;
    let mut glb = Vec::with_capacity(total_size);

    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat(0x20u8).take(json_padding));

    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat(0u8).take(buffer_padding));

    glb
}

fn extend_f32(buffer: &mut Vec<u8>, values: &[f32]) {
    buffer.reserve(values.len() * 4);
    for value in values {
        buffer.extend_from_slice(&value.to_le_bytes());
    }
}

fn create_buffer_view(
    offset: usize,
    size: usize,
    target: Option<json::buffer::Target>,
) -> json::buffer::View {
    json::buffer::View {
        name: None,
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: target.map(Valid),
    }
}

fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min: Option<[f32; 3]>,
    max: Option<[f32; 3]>,
) -> json::Accessor {
    json::Accessor {
        name: None,
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(|m| json::Value::from(m.to_vec())),
        max: max.map(|m| json::Value::from(m.to_vec())),
        normalized: false,
        sparse: None,
    }
}

/// Accessors 0-2 are position, normal and UV; accessor 3 holds indices.
fn create_primitive() -> json::mesh::Primitive {
    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(Valid(json::mesh::Semantic::Positions), json::Index::new(0));
    attributes.insert(Valid(json::mesh::Semantic::Normals), json::Index::new(1));
    attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), json::Index::new(2));

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(3)),
        material: Some(json::Index::new(0)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

fn create_atlas_material() -> json::Material {
    json::Material {
        name: None,
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: Some(json::texture::Info {
                index: json::Index::new(0),
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(json::material::AlphaMode::Opaque),
        alpha_cutoff: None,
        double_sided: false,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{AtlasFilter, BlockAtlas};
    use crate::mesher::{Mesh, Vertex};
    use crate::source::gltf::load_meshes_from_slice;
    use crate::source::ColorType;
    use crate::texture_pack::texture::solid_texture;
    use crate::texture_pack::TexturePack;
    use std::sync::Arc;

    fn triangle_output() -> TexturedVoxelMesh {
        let mut mesh = Mesh::new();
        let v0 = mesh.add_vertex(Vertex::new([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.25]));
        let v1 = mesh.add_vertex(Vertex::new([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [3.0, 0.25]));
        let v2 = mesh.add_vertex(Vertex::new([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]));
        mesh.add_triangle(v0, v1, v2);

        let pack = TexturePack::from_textures(vec![(
            "lime".to_string(),
            solid_texture(2, [0, 255, 0]),
        )])
        .unwrap();
        let atlas = BlockAtlas::assemble(&pack, &[0], 4, AtlasFilter::Nearest).unwrap();
        let bounds = mesh.bounds();
        TexturedVoxelMesh {
            mesh,
            atlas: Arc::new(atlas),
            bounds,
        }
    }

    #[test]
    fn test_glb_header() {
        let glb = export_glb(&triangle_output()).unwrap();
        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([glb[4], glb[5], glb[6], glb[7]]), 2);
        assert_eq!(
            u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize,
            glb.len()
        );
        assert_eq!(glb.len() % 4, 0);
    }

    #[test]
    fn test_export_reads_back() {
        let glb = export_glb(&triangle_output()).unwrap();
        let meshes = load_meshes_from_slice(&glb).unwrap();
        assert_eq!(meshes.len(), 1);

        let mesh = &meshes[0];
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert_eq!(mesh.color_type(), ColorType::Texture);
        // Loading flips V back to a bottom-left origin.
        assert!((mesh.uvs[1].x - 3.0).abs() < 1e-6);
        assert!((mesh.uvs[1].y - 0.25).abs() < 1e-6);

        let texture = mesh.material.base_color_texture.as_ref().unwrap();
        assert_eq!(texture.dimensions(), (4, 4));
        assert_eq!(texture.get_pixel(0, 0).0, [0, 255, 0]);
    }

    #[test]
    fn test_export_empty_mesh_fails() {
        let output = TexturedVoxelMesh {
            mesh: Mesh::new(),
            atlas: Arc::new(BlockAtlas::placeholder()),
            bounds: None,
        };
        assert!(matches!(export_glb(&output), Err(VoxelizerError::Export(_))));
    }
}
