//! Heading math and grid stepping.

use serde::{Deserialize, Serialize};

/// Continuous 2D position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn dist_to(&self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Nearest grid cell
    #[inline]
    pub fn round(&self) -> Vec2i {
        Vec2i::new(self.x.round() as i32, self.y.round() as i32)
    }

    #[inline]
    pub fn add(&self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    #[inline]
    pub fn neg(&self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Discrete grid coordinate (may lie outside the world)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_f32(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Normalize an angle in degrees into `[0, 360)`.
///
/// Only one wrap is corrected in each direction, so the input must lie in
/// `[-360, 720)`. Headings only ever move by one increment per step, which
/// keeps every caller inside that range.
#[inline]
pub fn angle_mod(angle: i32) -> i32 {
    if angle < 0 {
        angle + 360
    } else if angle >= 360 {
        angle - 360
    } else {
        angle
    }
}

/// Step vector for a heading in degrees (0 = +x, 90 = +y).
///
/// The largest component is scaled to exactly 1, so each step advances one
/// full row or column and a ray never skips a cell along its major axis.
pub fn heading_vector(angle_deg: i32) -> Vec2 {
    let rad = (angle_deg as f32).to_radians();
    let mut x = rad.cos();
    let mut y = rad.sin();
    // snap float noise at the axes
    if x.abs() < 1.0e-6 {
        x = 0.0;
    }
    if y.abs() < 1.0e-6 {
        y = 0.0;
    }
    let max = x.abs().max(y.abs());
    Vec2::new(x / max, y / max)
}

/// Advance `cur` by `step`, returning the new float point and its grid cell
#[inline]
pub fn next_grid_point(cur: Vec2, step: Vec2) -> (Vec2, Vec2i) {
    let next = cur.add(step);
    (next, next.round())
}
