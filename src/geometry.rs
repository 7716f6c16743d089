// src/geometry.rs

//! Integer pixel geometry shared by the skin description, the raster bridge and
//! the compositor.
//!
//! Coordinates are signed because skin descriptions are hand-written and nothing
//! stops an author from placing a region partly off the faceplate.

use serde::{Deserialize, Serialize};

/// A point in skin pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Both coordinates multiplied by `factor`, or `None` on overflow.
    pub fn checked_magnify(&self, factor: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_mul(factor)?, self.y.checked_mul(factor)?))
    }
}

/// An axis-aligned rectangle; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let rx = i64::from(x) - i64::from(self.x);
        let ry = i64::from(y) - i64::from(self.y);
        rx >= 0 && rx < i64::from(self.width) && ry >= 0 && ry < i64::from(self.height)
    }

    /// Position and size multiplied by `factor`, or `None` on overflow.
    pub fn checked_magnify(&self, factor: i32) -> Option<Self> {
        Some(Self::new(
            self.x.checked_mul(factor)?,
            self.y.checked_mul(factor)?,
            self.width.checked_mul(factor)?,
            self.height.checked_mul(factor)?,
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}
