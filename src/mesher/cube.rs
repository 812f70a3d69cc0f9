//! Unit cube template with six independently mapped quads.
//!
//! Vertex `k` belongs to face group `k / 4`. U values are whole numbers and
//! rely on the atlas sampler repeating horizontally; V values are multiples of
//! the tile height before the per-slot offset is added.

use crate::types::Direction;

/// Corner offsets within the unit cell.
pub const VERTICES: [[f32; 3]; 24] = [
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
];

/// Triangles, wound counter-clockwise seen from outside.
pub const TRIANGLES: [[u32; 3]; 12] = [
    [0, 1, 2],
    [3, 2, 1],
    [4, 5, 6],
    [7, 6, 5],
    [8, 9, 10],
    [11, 10, 9],
    [12, 13, 14],
    [15, 14, 13],
    [16, 17, 18],
    [19, 18, 17],
    [20, 21, 22],
    [23, 22, 21],
];

/// Horizontal texture coordinate of each vertex.
pub const U: [f32; 24] = [
    6.0, 5.0, 6.0, 5.0, 4.0, 5.0, 4.0, 5.0, 2.0, 1.0, 2.0, 1.0, 3.0, 4.0, 3.0, 4.0, 3.0, 2.0, 3.0,
    2.0, 0.0, 0.0, 1.0, 1.0,
];

/// Vertical texture coordinate of each vertex, in tile heights.
pub const V_TILES: [f32; 24] = [
    1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0,
    0.0, 1.0, 0.0, 1.0, 0.0,
];

/// Outward direction of each group of four vertices.
pub const FACE_DIRECTIONS: [Direction; 6] = [
    Direction::South,
    Direction::East,
    Direction::Up,
    Direction::Down,
    Direction::West,
    Direction::North,
];
