//! Pixel rectangles in the host window's coordinate space.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, in pixels, relative to the window's content origin.
///
/// Values are immutable once constructed. Overlays never mutate a stored
/// rectangle; a new registration or reposition replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive), saturating at `i32::MAX`
    pub fn right(&self) -> i32 {
        clamp_i32(self.x as i64 + self.width as i64)
    }

    /// Bottom edge (exclusive), saturating at `i32::MAX`
    pub fn bottom(&self) -> i32 {
        clamp_i32(self.y as i64 + self.height as i64)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Center point, used to anchor tooltips on a target
    pub fn center(&self) -> (i32, i32) {
        (
            clamp_i32(self.x as i64 + (self.width / 2) as i64),
            clamp_i32(self.y as i64 + (self.height / 2) as i64),
        )
    }
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) {}x{}", self.x, self.y, self.width, self.height)
    }
}
