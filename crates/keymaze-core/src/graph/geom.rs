//! Grid geometry for room coordinates and layout bounds

use serde::{Deserialize, Serialize};

/// Integer grid coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with inclusive extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// A 1x1 rectangle covering a single point.
    pub const fn from_point(point: Vec2) -> Self {
        Self {
            x: point.x,
            y: point.y,
            width: 1,
            height: 1,
        }
    }

    /// Rightmost covered column.
    pub const fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    /// Bottommost covered row.
    pub const fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    /// Check if a point lies inside the rectangle
    pub const fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// The smallest rectangle covering both `self` and `point`.
    #[must_use]
    pub fn expanded_to(&self, point: Vec2) -> Self {
        let x = self.x.min(point.x);
        let y = self.y.min(point.y);
        let right = self.right().max(point.x);
        let bottom = self.bottom().max(point.y);
        Self {
            x,
            y,
            width: right - x + 1,
            height: bottom - y + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_point_covers_exactly_that_point() {
        let r = Rect::from_point(Vec2::new(3, -2));
        assert!(r.contains(Vec2::new(3, -2)));
        assert!(!r.contains(Vec2::new(4, -2)));
        assert_eq!((r.width, r.height), (1, 1));
    }

    #[test]
    fn test_expanded_to_only_grows() {
        let r = Rect::from_point(Vec2::new(0, 0));
        let grown = r.expanded_to(Vec2::new(4, -3));
        assert!(grown.contains(Vec2::new(0, 0)));
        assert!(grown.contains(Vec2::new(4, -3)));
        assert_eq!((grown.x, grown.y), (0, -3));
        assert_eq!((grown.width, grown.height), (5, 4));

        // Expanding to an interior point changes nothing.
        assert_eq!(grown.expanded_to(Vec2::new(1, -1)), grown);
    }
}
