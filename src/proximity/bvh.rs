//! Bounding volume hierarchy over mesh triangles.

use super::{closest_point_on_triangle, SurfaceHits, SurfaceQuery};
use crate::error::{Result, VoxelizerError};
use crate::source::SourceMesh;
use crate::types::BoundingBox;
use glam::Vec3;
use rayon::prelude::*;

const MAX_LEAF_SIZE: usize = 4;

#[derive(Debug, Clone)]
enum NodeKind {
    /// Range into `ClosestPointQuery::order`.
    Leaf { start: usize, end: usize },
    Branch { left: usize, right: usize },
}

#[derive(Debug, Clone)]
struct Node {
    bounds: BoundingBox,
    kind: NodeKind,
}

/// Exact closest-point queries backed by an AABB tree.
///
/// The tree owns a copy of the triangles, so it outlives the mesh it was built
/// from.
#[derive(Debug, Clone)]
pub struct ClosestPointQuery {
    triangles: Vec<[Vec3; 3]>,
    order: Vec<usize>,
    nodes: Vec<Node>,
}

impl ClosestPointQuery {
    pub fn new(mesh: &SourceMesh) -> Result<Self> {
        mesh.validate()?;
        let triangles: Vec<[Vec3; 3]> = (0..mesh.faces.len()).map(|f| mesh.triangle(f)).collect();
        let mut query = Self {
            order: (0..triangles.len()).collect(),
            triangles,
            nodes: Vec::new(),
        };
        if !query.triangles.is_empty() {
            let count = query.triangles.len();
            query.build(0, count);
        }
        log::debug!(
            "Built closest-point tree: {} triangles, {} nodes",
            query.triangles.len(),
            query.nodes.len()
        );
        Ok(query)
    }

    /// Number of triangles in the tree.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    fn triangle_bounds(triangle: &[Vec3; 3]) -> BoundingBox {
        let min = triangle[0].min(triangle[1]).min(triangle[2]);
        let max = triangle[0].max(triangle[1]).max(triangle[2]);
        BoundingBox::new(min.to_array(), max.to_array())
    }

    fn centroid(triangle: &[Vec3; 3]) -> Vec3 {
        (triangle[0] + triangle[1] + triangle[2]) / 3.0
    }

    /// Build the subtree over `order[start..end]` and return its node index.
    fn build(&mut self, start: usize, end: usize) -> usize {
        let bounds = self.order[start..end]
            .iter()
            .map(|&t| Self::triangle_bounds(&self.triangles[t]))
            .reduce(|a, b| a.union(&b))
            .unwrap_or(BoundingBox::new([0.0; 3], [0.0; 3]));

        let index = self.nodes.len();
        self.nodes.push(Node {
            bounds,
            kind: NodeKind::Leaf { start, end },
        });
        if end - start <= MAX_LEAF_SIZE {
            return index;
        }

        // Median split along the longest axis of the box.
        let dims = bounds.dimensions();
        let axis = if dims[0] >= dims[1] && dims[0] >= dims[2] {
            0
        } else if dims[1] >= dims[2] {
            1
        } else {
            2
        };
        let mid = start + (end - start) / 2;
        let triangles = &self.triangles;
        self.order[start..end].select_nth_unstable_by(mid - start, |&a, &b| {
            Self::centroid(&triangles[a])[axis].total_cmp(&Self::centroid(&triangles[b])[axis])
        });

        let left = self.build(start, mid);
        let right = self.build(mid, end);
        self.nodes[index].kind = NodeKind::Branch { left, right };
        index
    }

    /// Closest surface point to `point`: (point, squared distance, face).
    ///
    /// Ties go to the lowest face index.
    fn nearest(&self, point: Vec3) -> (Vec3, f32, usize) {
        let target = point.to_array();
        let mut best = (point, f32::INFINITY, usize::MAX);
        let mut stack = vec![0usize];

        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index];
            if node.bounds.distance_squared(target) > best.1 {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, end } => {
                    for &face in &self.order[start..end] {
                        let [a, b, c] = self.triangles[face];
                        let closest = closest_point_on_triangle(point, a, b, c);
                        let d2 = closest.distance_squared(point);
                        if d2 < best.1 || (d2 == best.1 && face < best.2) {
                            best = (closest, d2, face);
                        }
                    }
                }
                NodeKind::Branch { left, right } => {
                    let dl = self.nodes[left].bounds.distance_squared(target);
                    let dr = self.nodes[right].bounds.distance_squared(target);
                    // Visit the nearer child first.
                    if dl <= dr {
                        stack.push(right);
                        stack.push(left);
                    } else {
                        stack.push(left);
                        stack.push(right);
                    }
                }
            }
        }
        best
    }
}

impl SurfaceQuery for ClosestPointQuery {
    fn on_surface(&self, points: &[Vec3]) -> Result<SurfaceHits> {
        if points.is_empty() {
            return Ok(SurfaceHits::default());
        }
        if self.triangles.is_empty() {
            return Err(VoxelizerError::InvalidMesh(
                "cannot query the surface of a mesh without faces".to_string(),
            ));
        }

        let results: Vec<(Vec3, f32, usize)> =
            points.par_iter().map(|&p| self.nearest(p)).collect();

        let mut hits = SurfaceHits {
            closest_points: Vec::with_capacity(results.len()),
            distances: Vec::with_capacity(results.len()),
            face_indexes: Vec::with_capacity(results.len()),
        };
        for (closest, d2, face) in results {
            hits.closest_points.push(closest);
            hits.distances.push(d2.sqrt());
            hits.face_indexes.push(face);
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A flat strip of `n` unit squares along +x at z = 0.
    fn strip(n: u32) -> SourceMesh {
        let mut positions = Vec::new();
        let mut faces = Vec::new();
        for i in 0..=n {
            positions.push(Vec3::new(i as f32, 0.0, 0.0));
            positions.push(Vec3::new(i as f32, 1.0, 0.0));
        }
        for i in 0..n {
            let base = i * 2;
            faces.push([base, base + 2, base + 1]);
            faces.push([base + 1, base + 2, base + 3]);
        }
        SourceMesh::new(positions, faces)
    }

    fn brute_force(mesh: &SourceMesh, p: Vec3) -> f32 {
        (0..mesh.faces.len())
            .map(|f| {
                let [a, b, c] = mesh.triangle(f);
                closest_point_on_triangle(p, a, b, c).distance(p)
            })
            .fold(f32::INFINITY, f32::min)
    }

    #[test]
    fn test_points_above_strip() {
        let mesh = strip(10);
        let query = ClosestPointQuery::new(&mesh).unwrap();
        let points = vec![Vec3::new(3.25, 0.5, 2.0), Vec3::new(-1.0, 0.5, 0.0)];
        let hits = query.on_surface(&points).unwrap();

        assert_eq!(hits.len(), 2);
        assert!((hits.closest_points[0] - Vec3::new(3.25, 0.5, 0.0)).length() < 1e-5);
        assert!((hits.distances[0] - 2.0).abs() < 1e-5);
        assert!(hits.face_indexes[0] == 6 || hits.face_indexes[0] == 7);

        assert!((hits.closest_points[1] - Vec3::new(0.0, 0.5, 0.0)).length() < 1e-5);
        assert!((hits.distances[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_matches_brute_force() {
        let mesh = strip(37);
        let query = ClosestPointQuery::new(&mesh).unwrap();
        let points: Vec<Vec3> = (0..50)
            .map(|i| {
                let t = i as f32;
                Vec3::new(t * 0.83 - 3.0, (t * 0.37).sin() * 2.0, (t * 0.11).cos())
            })
            .collect();
        let hits = query.on_surface(&points).unwrap();
        for (i, p) in points.iter().enumerate() {
            assert!((hits.distances[i] - brute_force(&mesh, *p)).abs() < 1e-4);
            let [a, b, c] = mesh.triangle(hits.face_indexes[i]);
            let on_face = closest_point_on_triangle(*p, a, b, c);
            assert!((on_face - hits.closest_points[i]).length() < 1e-4);
        }
    }

    #[test]
    fn test_shared_edge_tie_goes_to_lower_face() {
        let mesh = strip(1);
        let query = ClosestPointQuery::new(&mesh).unwrap();
        // On the diagonal shared by faces 0 and 1.
        let hits = query.on_surface(&[Vec3::new(0.5, 0.5, 1.0)]).unwrap();
        assert_eq!(hits.face_indexes, vec![0]);
    }

    #[test]
    fn test_empty_inputs() {
        let query = ClosestPointQuery::new(&SourceMesh::default()).unwrap();
        assert!(query.is_empty());
        assert!(query.on_surface(&[]).unwrap().is_empty());
        assert!(matches!(
            query.on_surface(&[Vec3::ZERO]),
            Err(VoxelizerError::InvalidMesh(_))
        ));
    }
}
