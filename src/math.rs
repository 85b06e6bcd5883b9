use glam::{Affine2, Mat2, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding rectangle in skeleton space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !self.width.is_finite() || !self.height.is_finite()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        Rect {
            x,
            y,
            width: max_x - x,
            height: max_y - y,
        }
    }
}

/// Maps a point from object local space into world space.
pub fn to_world(transform: &Affine2, point: Vec2) -> Vec2 {
    transform.transform_point2(point)
}

/// Maps a world space point back into object local space. Degenerate
/// transforms are not guarded, the inverse is whatever glam produces.
pub fn to_local(transform: &Affine2, point: Vec2) -> Vec2 {
    transform.inverse().transform_point2(point)
}

/// Converts a skeleton-space point into the local space of a bone whose
/// world matrix rows are [a b; c d] with translation (world_x, world_y).
pub fn world_matrix_to_local(
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    world_x: f32,
    world_y: f32,
    point: Vec2,
) -> Vec2 {
    let matrix = Mat2::from_cols(Vec2::new(a, c), Vec2::new(b, d));
    matrix.inverse() * (point - Vec2::new(world_x, world_y))
}
