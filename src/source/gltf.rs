//! glTF/GLB import.
//!
//! Reads every triangle primitive of every mesh in a glTF document into a
//! [`SourceMesh`]. Node transforms are not applied: each primitive is returned
//! in its own local space, which is also the space the voxel grid is built in.

use super::{SourceMaterial, SourceMesh};
use crate::error::{Result, VoxelizerError};
use glam::{Vec2, Vec3};
use gltf::image::Format;
use image::RgbImage;
use std::path::Path;

/// Load all triangle primitives from a `.glb` or `.gltf` file.
///
/// External buffers and images of a `.gltf` are resolved relative to the file.
pub fn load_meshes<P: AsRef<Path>>(path: P) -> Result<Vec<SourceMesh>> {
    let (document, buffers, images) = gltf::import(path)?;
    read_document(&document, &buffers, &images)
}

/// Load all triangle primitives from self-contained GLB or glTF bytes.
pub fn load_meshes_from_slice(data: &[u8]) -> Result<Vec<SourceMesh>> {
    let (document, buffers, images) = gltf::import_slice(data)?;
    read_document(&document, &buffers, &images)
}

fn read_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<Vec<SourceMesh>> {
    let mut meshes = Vec::new();
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping {:?} primitive {} of mesh {}",
                    primitive.mode(),
                    primitive.index(),
                    mesh.index()
                );
                continue;
            }
            let name = format!("mesh{}_primitive{}", mesh.index(), primitive.index());
            let source = read_primitive(&primitive, buffers, images)?.with_name(name);
            source.validate()?;
            log::debug!(
                "Loaded {}: {} vertices, {} faces, {:?} coloring",
                source.name,
                source.positions.len(),
                source.faces.len(),
                source.color_type()
            );
            meshes.push(source);
        }
    }
    Ok(meshes)
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<SourceMesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .ok_or_else(|| VoxelizerError::InvalidMesh("primitive without POSITION".to_string()))?
        .map(Vec3::from_array)
        .collect();

    let faces = match reader.read_indices() {
        Some(indices) => triangles(indices.into_u32()),
        None => triangles(0..positions.len() as u32),
    };

    let material = primitive.material();
    let pbr = material.pbr_metallic_roughness();
    let texture_info = pbr.base_color_texture();
    let tex_coord_set = texture_info.as_ref().map(|info| info.tex_coord()).unwrap_or(0);

    // Flip V to a bottom-left origin.
    let uvs = reader
        .read_tex_coords(tex_coord_set)
        .map(|uvs| uvs.into_f32().map(|[u, v]| Vec2::new(u, 1.0 - v)).collect())
        .unwrap_or_default();

    let vertex_colors = reader
        .read_colors(0)
        .map(|colors| colors.into_rgb_f32().map(|rgb| rgb.map(|c| c * 255.0)).collect())
        .unwrap_or_default();

    let base_color_texture = match texture_info {
        Some(info) => {
            let index = info.texture().source().index();
            let data = images.get(index).ok_or_else(|| {
                VoxelizerError::InvalidMesh(format!("image {} was not loaded", index))
            })?;
            Some(to_rgb_image(data)?)
        }
        None => None,
    };

    Ok(SourceMesh {
        name: String::new(),
        positions,
        faces,
        uvs,
        vertex_colors,
        material: SourceMaterial {
            base_color: pbr.base_color_factor(),
            base_color_texture,
        },
    })
}

/// Group a flat index list into triangles. A trailing partial triangle is dropped.
fn triangles(indices: impl IntoIterator<Item = u32>) -> Vec<[u32; 3]> {
    let indices: Vec<u32> = indices.into_iter().collect();
    indices
        .chunks_exact(3)
        .map(|f| [f[0], f[1], f[2]])
        .collect()
}

/// Convert decoded glTF image pixels to 8-bit RGB. Alpha is dropped and
/// one- or two-channel images are read as grey.
fn to_rgb_image(data: &gltf::image::Data) -> Result<RgbImage> {
    let (channels, size, read): (usize, usize, fn(&[u8]) -> u8) = match data.format {
        Format::R8 => (1, 1, read_u8),
        Format::R8G8 => (2, 1, read_u8),
        Format::R8G8B8 => (3, 1, read_u8),
        Format::R8G8B8A8 => (4, 1, read_u8),
        Format::R16 => (1, 2, read_u16),
        Format::R16G16 => (2, 2, read_u16),
        Format::R16G16B16 => (3, 2, read_u16),
        Format::R16G16B16A16 => (4, 2, read_u16),
        Format::R32G32B32FLOAT => (3, 4, read_f32),
        Format::R32G32B32A32FLOAT => (4, 4, read_f32),
    };

    let pixel_size = channels * size;
    let expected = data.width as usize * data.height as usize * pixel_size;
    if data.pixels.len() < expected {
        return Err(VoxelizerError::InvalidMesh(format!(
            "image holds {} bytes, {}x{} {:?} needs {}",
            data.pixels.len(),
            data.width,
            data.height,
            data.format,
            expected
        )));
    }

    let width = data.width as usize;
    Ok(RgbImage::from_fn(data.width, data.height, |x, y| {
        let start = (y as usize * width + x as usize) * pixel_size;
        let pixel = &data.pixels[start..start + pixel_size];
        let channel = |i: usize| read(&pixel[i * size..]);
        if channels < 3 {
            image::Rgb([channel(0); 3])
        } else {
            image::Rgb([channel(0), channel(1), channel(2)])
        }
    }))
}

fn read_u8(bytes: &[u8]) -> u8 {
    bytes[0]
}

fn read_u16(bytes: &[u8]) -> u8 {
    (u16::from_ne_bytes([bytes[0], bytes[1]]) >> 8) as u8
}

fn read_f32(bytes: &[u8]) -> u8 {
    let value = f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ColorType;

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_triangles_keep_large_indices() {
        let faces = triangles([0, 16_777_217, u32::MAX, 7]);
        assert_eq!(faces, vec![[0, 16_777_217, u32::MAX]]);
    }

    #[test]
    fn test_sparse_positions_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut bin = f32_bytes(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        bin.extend_from_slice(&2u16.to_le_bytes());
        bin.extend_from_slice(&[0, 0]);
        bin.extend(f32_bytes(&[0.0, 0.0, 5.0]));
        std::fs::write(dir.path().join("tri.bin"), &bin).unwrap();

        let json = r#"{
            "asset": {"version": "2.0"},
            "buffers": [{"uri": "tri.bin", "byteLength": 52}],
            "bufferViews": [
                {"buffer": 0, "byteOffset": 0, "byteLength": 36},
                {"buffer": 0, "byteOffset": 36, "byteLength": 2},
                {"buffer": 0, "byteOffset": 40, "byteLength": 12}
            ],
            "accessors": [{
                "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                "min": [0, 0, 0], "max": [1, 1, 5],
                "sparse": {
                    "count": 1,
                    "indices": {"bufferView": 1, "componentType": 5123},
                    "values": {"bufferView": 2}
                }
            }],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}]
        }"#;
        let path = dir.path().join("tri.gltf");
        std::fs::write(&path, json).unwrap();

        let meshes = load_meshes(&path).unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(
            meshes[0].positions,
            vec![Vec3::ZERO, Vec3::X, Vec3::new(0.0, 0.0, 5.0)]
        );
        // Non-indexed: one triangle over the three vertices.
        assert_eq!(meshes[0].faces, vec![[0, 1, 2]]);
        assert_eq!(meshes[0].color_type(), ColorType::Flat);
    }

    #[test]
    fn test_external_texture_and_flipped_uvs() {
        let dir = tempfile::tempdir().unwrap();
        let mut bin = f32_bytes(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        bin.extend(f32_bytes(&[0.0, 0.0, 1.0, 0.0, 0.0, 0.25]));
        for index in [0u16, 1, 2] {
            bin.extend_from_slice(&index.to_le_bytes());
        }
        std::fs::write(dir.path().join("tri.bin"), &bin).unwrap();
        RgbImage::from_pixel(2, 2, image::Rgb([200, 30, 20]))
            .save(dir.path().join("red.png"))
            .unwrap();

        let json = r#"{
            "asset": {"version": "2.0"},
            "buffers": [{"uri": "tri.bin", "byteLength": 66}],
            "bufferViews": [
                {"buffer": 0, "byteOffset": 0, "byteLength": 36},
                {"buffer": 0, "byteOffset": 36, "byteLength": 24},
                {"buffer": 0, "byteOffset": 60, "byteLength": 6}
            ],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                 "min": [0, 0, 0], "max": [1, 1, 0]},
                {"bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2"},
                {"bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR"}
            ],
            "images": [{"uri": "red.png"}],
            "textures": [{"source": 0}],
            "materials": [{"pbrMetallicRoughness": {
                "baseColorTexture": {"index": 0},
                "baseColorFactor": [1, 0.5, 1, 1]
            }}],
            "meshes": [{"primitives": [{
                "attributes": {"POSITION": 0, "TEXCOORD_0": 1},
                "indices": 2,
                "material": 0
            }]}]
        }"#;
        let path = dir.path().join("tri.gltf");
        std::fs::write(&path, json).unwrap();

        let meshes = load_meshes(&path).unwrap();
        let mesh = &meshes[0];
        assert_eq!(mesh.name, "mesh0_primitive0");
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert_eq!(mesh.color_type(), ColorType::Texture);
        assert_eq!(mesh.uvs, vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 0.75)]);
        assert_eq!(mesh.material.base_color, [1.0, 0.5, 1.0, 1.0]);

        let texture = mesh.material.base_color_texture.as_ref().unwrap();
        assert_eq!(texture.dimensions(), (2, 2));
        assert_eq!(texture.get_pixel(1, 1).0, [200, 30, 20]);
    }

    #[test]
    fn test_non_triangle_primitives_are_skipped() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "buffers": [{"uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAA", "byteLength": 24}],
            "bufferViews": [{"buffer": 0, "byteLength": 24}],
            "accessors": [{"bufferView": 0, "componentType": 5126, "count": 2, "type": "VEC3",
                           "min": [0, 0, 0], "max": [1, 0, 0]}],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "mode": 1}]}]
        }"#;
        let meshes = load_meshes_from_slice(json.as_bytes()).unwrap();
        assert!(meshes.is_empty());
    }

    #[test]
    fn test_sixteen_bit_and_grey_images() {
        let rgb16 = gltf::image::Data {
            format: Format::R16G16B16,
            width: 1,
            height: 1,
            pixels: [0xFFFFu16, 0x8000, 0x0000]
                .iter()
                .flat_map(|c| c.to_ne_bytes())
                .collect(),
        };
        assert_eq!(to_rgb_image(&rgb16).unwrap().get_pixel(0, 0).0, [255, 128, 0]);

        let grey = gltf::image::Data {
            format: Format::R8,
            width: 2,
            height: 1,
            pixels: vec![10, 90],
        };
        assert_eq!(to_rgb_image(&grey).unwrap().get_pixel(1, 0).0, [90, 90, 90]);

        let short = gltf::image::Data {
            format: Format::R8G8B8A8,
            width: 2,
            height: 2,
            pixels: vec![0; 4],
        };
        assert!(matches!(to_rgb_image(&short), Err(VoxelizerError::InvalidMesh(_))));
    }
}
