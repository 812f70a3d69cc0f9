//! Nearest-surface-point queries against a source mesh.

mod bvh;

pub use bvh::ClosestPointQuery;

use crate::error::Result;
use glam::Vec3;

/// Result of a batch nearest-surface query, index-aligned with the query points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceHits {
    /// Closest point on the mesh surface for each query point.
    pub closest_points: Vec<Vec3>,
    /// Distance from each query point to its closest point.
    pub distances: Vec<f32>,
    /// Face containing each closest point.
    pub face_indexes: Vec<usize>,
}

impl SurfaceHits {
    pub fn len(&self) -> usize {
        self.closest_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closest_points.is_empty()
    }
}

/// Finds, for each query point, the nearest point on a mesh surface.
pub trait SurfaceQuery {
    /// Query every point. The output is aligned with `points`.
    fn on_surface(&self, points: &[Vec3]) -> Result<SurfaceHits>;
}

/// Closest point to `p` on triangle `abc`.
///
/// Walks the Voronoi regions of the vertices and edges before falling back to
/// the face interior (Ericson, "Real-Time Collision Detection", 5.1.5).
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let sum = va + vb + vc;
    if sum == 0.0 {
        // Degenerate triangle that slipped past the edge regions.
        return a;
    }
    let v = vb / sum;
    let w = vc / sum;
    a + ab * v + ac * w
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_closest_point_regions() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        let c = Vec3::Y;

        // Interior: projects straight down.
        assert!(close(
            closest_point_on_triangle(Vec3::new(0.25, 0.25, 3.0), a, b, c),
            Vec3::new(0.25, 0.25, 0.0)
        ));
        // Vertex regions.
        assert!(close(closest_point_on_triangle(Vec3::new(-1.0, -1.0, 0.0), a, b, c), a));
        assert!(close(closest_point_on_triangle(Vec3::new(2.0, -0.5, 0.0), a, b, c), b));
        assert!(close(closest_point_on_triangle(Vec3::new(-0.5, 2.0, 1.0), a, b, c), c));
        // Edge regions.
        assert!(close(
            closest_point_on_triangle(Vec3::new(0.5, -1.0, 0.0), a, b, c),
            Vec3::new(0.5, 0.0, 0.0)
        ));
        assert!(close(
            closest_point_on_triangle(Vec3::new(1.0, 1.0, 0.0), a, b, c),
            Vec3::new(0.5, 0.5, 0.0)
        ));
    }

    #[test]
    fn test_degenerate_triangle_is_finite() {
        let p = closest_point_on_triangle(Vec3::new(0.3, 1.0, 0.0), Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert!(p.is_finite());
        assert!(close(p, Vec3::new(0.3, 0.0, 0.0)));
    }
}
