//! Shared types used throughout the library.

mod color;
mod direction;
mod transform;

pub use color::{lab_distance_squared, rgb8_to_lab, rgb_to_lab, Lab, Rgb};
pub use direction::Direction;
pub use transform::GridTransform;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl Iterator<Item = [f32; 3]>) -> Option<Self> {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut has_points = false;

        for p in points {
            has_points = true;
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub fn dimensions(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    /// Grow this box to also cover `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        for i in 0..3 {
            out.min[i] = out.min[i].min(other.min[i]);
            out.max[i] = out.max[i].max(other.max[i]);
        }
        out
    }

    /// Squared distance from a point to the closest point of the box (0 inside).
    pub fn distance_squared(&self, point: [f32; 3]) -> f32 {
        let mut d = 0.0;
        for i in 0..3 {
            let excess = if point[i] < self.min[i] {
                self.min[i] - point[i]
            } else if point[i] > self.max[i] {
                point[i] - self.max[i]
            } else {
                0.0
            };
            d += excess * excess;
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bb = BoundingBox::from_points(
            [[1.0, -2.0, 3.0], [-1.0, 4.0, 0.5]].into_iter(),
        )
        .unwrap();
        assert_eq!(bb.min, [-1.0, -2.0, 0.5]);
        assert_eq!(bb.max, [1.0, 4.0, 3.0]);
        assert_eq!(bb.dimensions(), [2.0, 6.0, 2.5]);
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_distance_squared() {
        let bb = BoundingBox::new([0.0; 3], [1.0; 3]);
        assert_eq!(bb.distance_squared([0.5, 0.5, 0.5]), 0.0);
        assert_eq!(bb.distance_squared([2.0, 0.5, 0.5]), 1.0);
        assert_eq!(bb.distance_squared([-1.0, 2.0, 0.5]), 2.0);
    }
}
