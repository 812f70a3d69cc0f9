//! Per-voxel surface color extraction, one function per [`ColorType`].
//!
//! All three strategies take the source mesh and the nearest-surface hits of
//! the voxel points and return one L*a*b* color per hit.

use crate::proximity::SurfaceHits;
use crate::source::{ColorType, SourceMesh};
use crate::types::{rgb_to_lab, Lab, Rgb};
use glam::{Vec2, Vec3};
use image::RgbImage;

/// Cross products shorter than this make a face degenerate.
const DEGENERATE_AREA: f32 = 1e-12;

/// Extract colors with the strategy selected by `color_type`.
pub fn sample_colors(color_type: ColorType, mesh: &SourceMesh, hits: &SurfaceHits) -> Vec<Lab> {
    match color_type {
        ColorType::Texture => sample_texture(mesh, hits),
        ColorType::Vertex => sample_vertex(mesh, hits),
        ColorType::Flat => sample_flat(mesh, hits),
    }
}

/// Barycentric weights of `point` in `triangle`.
///
/// Uses the ratio of cross-product norms, so weights are non-negative and
/// exact for points inside the triangle. Returns `None` for a zero-area face.
pub fn barycentric(triangle: [Vec3; 3], point: Vec3) -> Option<[f32; 3]> {
    let [p0, p1, p2] = triangle;
    let u = p1 - p0;
    let v = p2 - p0;
    let w = point - p0;

    let area = u.cross(v).length();
    if area <= DEGENERATE_AREA {
        return None;
    }
    let b1 = v.cross(w).length() / area;
    let b2 = u.cross(w).length() / area;
    Some([1.0 - b1 - b2, b1, b2])
}

/// Barycentric weights for every hit, degenerate faces snapping to their
/// first vertex.
fn hit_weights(mesh: &SourceMesh, hits: &SurfaceHits) -> Vec<[f32; 3]> {
    let mut degenerate = 0usize;
    let weights = hits
        .closest_points
        .iter()
        .zip(&hits.face_indexes)
        .map(|(&point, &face)| {
            barycentric(mesh.triangle(face), point).unwrap_or_else(|| {
                degenerate += 1;
                [1.0, 0.0, 0.0]
            })
        })
        .collect();
    if degenerate > 0 {
        log::warn!(
            "{}: {} samples landed on zero-area faces and use the first vertex",
            mesh.name,
            degenerate
        );
    }
    weights
}

/// Sample the base color texture at the barycentric-interpolated UV of each hit.
pub fn sample_texture(mesh: &SourceMesh, hits: &SurfaceHits) -> Vec<Lab> {
    let Some(texture) = mesh.material.base_color_texture.as_ref() else {
        return sample_flat(mesh, hits);
    };
    if mesh.uvs.is_empty() {
        return sample_flat(mesh, hits);
    }

    hit_weights(mesh, hits)
        .into_iter()
        .zip(&hits.face_indexes)
        .map(|(weights, &face)| {
            let [a, b, c] = mesh.faces[face];
            let uv = mesh.uvs[a as usize] * weights[0]
                + mesh.uvs[b as usize] * weights[1]
                + mesh.uvs[c as usize] * weights[2];
            rgb_to_lab(bilinear(texture, uv))
        })
        .collect()
}

/// Interpolate per-vertex colors at each hit.
///
/// Meshes without vertex colors fall back to the flat material color.
pub fn sample_vertex(mesh: &SourceMesh, hits: &SurfaceHits) -> Vec<Lab> {
    if mesh.vertex_colors.is_empty() {
        return sample_flat(mesh, hits);
    }

    hit_weights(mesh, hits)
        .into_iter()
        .zip(&hits.face_indexes)
        .map(|(weights, &face)| {
            let mut rgb = [0.0f32; 3];
            for (corner, &vertex) in mesh.faces[face].iter().enumerate() {
                let color = mesh.vertex_colors[vertex as usize];
                for channel in 0..3 {
                    rgb[channel] += color[channel] * weights[corner];
                }
            }
            rgb_to_lab(rgb)
        })
        .collect()
}

/// The material's base color for every hit.
pub fn sample_flat(mesh: &SourceMesh, hits: &SurfaceHits) -> Vec<Lab> {
    vec![rgb_to_lab(mesh.material.base_color_rgb()); hits.len()]
}

/// Bilinear lookup with wrap-around; UV origin is the bottom-left corner.
fn bilinear(texture: &RgbImage, uv: Vec2) -> Rgb {
    let (width, height) = texture.dimensions();
    if width == 0 || height == 0 {
        return [0.0; 3];
    }
    let x = uv.x * (width - 1) as f32;
    let y = (1.0 - uv.y) * (height - 1) as f32;
    if !(x.is_finite() && y.is_finite()) {
        return [0.0; 3];
    }

    let dx = x - x.floor();
    let dy = y - y.floor();
    let x0 = (x.floor() as i64).rem_euclid(width as i64) as u32;
    let y0 = (y.floor() as i64).rem_euclid(height as i64) as u32;
    let x1 = (x.ceil() as i64).rem_euclid(width as i64) as u32;
    let y1 = (y.ceil() as i64).rem_euclid(height as i64) as u32;

    let texel = |px: u32, py: u32| texture.get_pixel(px, py).0;
    let corners = [
        (texel(x0, y0), (1.0 - dx) * (1.0 - dy)),
        (texel(x1, y0), dx * (1.0 - dy)),
        (texel(x0, y1), (1.0 - dx) * dy),
        (texel(x1, y1), dx * dy),
    ];

    let mut rgb = [0.0f32; 3];
    for (pixel, weight) in corners {
        for channel in 0..3 {
            rgb[channel] += pixel[channel] as f32 * weight;
        }
    }
    rgb
}
