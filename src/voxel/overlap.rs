//! Triangle/cell overlap in grid space.
//!
//! Separating axis test after Akenine-Möller, "Fast 3D Triangle-Box Overlap
//! Testing". Touching counts as overlapping.

use glam::Vec3;

/// All cells of a `dims`-sized grid that a triangle (in grid units) touches.
pub(super) fn cells_touching_triangle(triangle: [Vec3; 3], dims: [i32; 3]) -> Vec<[i32; 3]> {
    let lo = triangle[0].min(triangle[1]).min(triangle[2]);
    let hi = triangle[0].max(triangle[1]).max(triangle[2]);
    if !(lo.is_finite() && hi.is_finite()) {
        return Vec::new();
    }

    let range = |axis: usize| {
        let min = (lo[axis].floor() as i32).clamp(0, dims[axis] - 1);
        let max = (hi[axis].floor() as i32).clamp(0, dims[axis] - 1);
        min..=max
    };

    let mut cells = Vec::new();
    for x in range(0) {
        for y in range(1) {
            for z in range(2) {
                let center = Vec3::new(x as f32, y as f32, z as f32) + Vec3::splat(0.5);
                if triangle_overlaps_box(triangle, center, Vec3::splat(0.5)) {
                    cells.push([x, y, z]);
                }
            }
        }
    }
    cells
}

fn triangle_overlaps_box(triangle: [Vec3; 3], center: Vec3, half: Vec3) -> bool {
    let v = triangle.map(|p| p - center);
    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

    // Cross products of the box axes with the triangle edges.
    for edge in edges {
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            let a = axis.cross(edge);
            if separated_on(a, &v, half) {
                return false;
            }
        }
    }

    // Box face normals.
    for axis in 0..3 {
        let min = v[0][axis].min(v[1][axis]).min(v[2][axis]);
        let max = v[0][axis].max(v[1][axis]).max(v[2][axis]);
        if min > half[axis] || max < -half[axis] {
            return false;
        }
    }

    // Triangle plane.
    let normal = edges[0].cross(edges[1]);
    let radius = half.dot(normal.abs());
    normal.dot(v[0]).abs() <= radius
}

fn separated_on(axis: Vec3, v: &[Vec3; 3], half: Vec3) -> bool {
    if axis.length_squared() == 0.0 {
        return false;
    }
    let p = [axis.dot(v[0]), axis.dot(v[1]), axis.dot(v[2])];
    let min = p[0].min(p[1]).min(p[2]);
    let max = p[0].max(p[1]).max(p[2]);
    let radius = half.dot(axis.abs());
    min > radius || max < -radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_inside_cell() {
        let tri = [
            Vec3::new(0.2, 0.2, 0.5),
            Vec3::new(0.8, 0.2, 0.5),
            Vec3::new(0.2, 0.8, 0.5),
        ];
        assert_eq!(cells_touching_triangle(tri, [3, 3, 3]), vec![[0, 0, 0]]);
    }

    #[test]
    fn test_diagonal_triangle_skips_far_corner() {
        // Plane x + y = 1 (at z in [0, 1]) crosses cells (0,0) and touches (1,0), (0,1)
        // only along edges; cell (1,1) lies entirely beyond it.
        let tri = [
            Vec3::new(1.0, 0.0, 0.5),
            Vec3::new(0.0, 1.0, 0.5),
            Vec3::new(0.5, 0.5, 0.6),
        ];
        let cells = cells_touching_triangle(tri, [2, 2, 1]);
        assert!(cells.contains(&[0, 0, 0]));
        assert!(!cells.contains(&[1, 1, 0]));
    }

    #[test]
    fn test_cells_clamped_to_grid() {
        let tri = [
            Vec3::new(-5.0, 0.5, 0.5),
            Vec3::new(5.0, 0.5, 0.5),
            Vec3::new(0.0, 0.6, 0.5),
        ];
        let cells = cells_touching_triangle(tri, [2, 1, 1]);
        assert_eq!(cells, vec![[0, 0, 0], [1, 0, 0]]);
    }

    #[test]
    fn test_separated_plane() {
        let tri = [
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::new(0.0, 1.0, 2.0),
        ];
        assert!(!triangle_overlaps_box(tri, Vec3::splat(0.5), Vec3::splat(0.5)));
    }
}
