//! Geometric primitives like points, sizes, and rectangles.

use num_traits::Num;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

// --- Generic Point<T> ---

/// A 2D point with generic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Num + Copy",
    deserialize = "T: Deserialize<'de> + Num + Copy"
))]
pub struct Point<T: Num + Copy> {
    /// The x-coordinate of the point.
    pub x: T,
    /// The y-coordinate of the point.
    pub y: T,
}

impl<T: Num + Copy + Eq> Eq for Point<T> {}

impl<T: Num + Copy> Point<T> {
    /// Creates a new point with the given coordinates.
    pub const fn new(x: T, y: T) -> Self {
        Point { x, y }
    }
}

impl<T: Num + Copy + Add<Output = T>> Add for Point<T> {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl<T: Num + Copy + Sub<Output = T>> Sub for Point<T> {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

// --- Generic Size<T> ---

/// A 2D size (width and height) with generic dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Num + Copy",
    deserialize = "T: Deserialize<'de> + Num + Copy"
))]
pub struct Size<T: Num + Copy> {
    /// The width.
    pub width: T,
    /// The height.
    pub height: T,
}

impl<T: Num + Copy + Eq> Eq for Size<T> {}

impl<T: Num + Copy> Size<T> {
    /// Creates a new size with the given dimensions.
    pub const fn new(width: T, height: T) -> Self {
        Size { width, height }
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool
    where
        T: PartialEq,
    {
        self.width == T::zero() || self.height == T::zero()
    }
}

// --- Generic Rect<T> ---

/// An axis-aligned rectangle described by origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Num + Copy",
    deserialize = "T: Deserialize<'de> + Num + Copy"
))]
pub struct Rect<T: Num + Copy> {
    /// The top-left corner of the rectangle.
    pub origin: Point<T>,
    /// The width and height of the rectangle.
    pub size: Size<T>,
}

impl<T: Num + Copy> Rect<T> {
    /// Creates a new rectangle from origin and size.
    pub const fn new(origin: Point<T>, size: Size<T>) -> Self {
        Rect { origin, size }
    }

    /// Creates a new rectangle from individual values.
    pub const fn from_coords(x: T, y: T, width: T, height: T) -> Self {
        Rect {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }
}

/// Convenience alias for integer points.
pub type PointInt = Point<i32>;
/// Convenience alias for integer sizes.
pub type SizeInt = Size<i32>;

// --- RectInt ---

/// The integer rectangle used throughout the window-management layers.
///
/// Coordinates are in display-group pixels. Width and height are carried
/// as `i32` for arithmetic convenience; a well-formed rectangle never has
/// negative dimensions, and all constructors and operations here uphold
/// that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RectInt {
    /// The x-coordinate of the left edge.
    pub x: i32,
    /// The y-coordinate of the top edge.
    pub y: i32,
    /// The width, never negative.
    pub w: i32,
    /// The height, never negative.
    pub h: i32,
}

impl RectInt {
    /// Creates a new rectangle, clamping negative dimensions to zero.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        RectInt {
            x,
            y,
            w: w.max(0),
            h: h.max(0),
        }
    }

    /// The empty rectangle at the origin.
    pub const ZERO: RectInt = RectInt {
        x: 0,
        y: 0,
        w: 0,
        h: 0,
    };

    /// Returns true if the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// The x-coordinate one past the right edge.
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// The y-coordinate one past the bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Returns true if the point lies inside the rectangle (right and
    /// bottom edges exclusive).
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Returns true if the two rectangles share any area.
    pub fn intersects(&self, other: &RectInt) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The overlapping region of two rectangles, if any.
    pub fn intersection(&self, other: &RectInt) -> Option<RectInt> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(RectInt::new(x, y, right - x, bottom - y))
    }

    /// The overlapping region of two rectangles re-expressed relative to
    /// the given origin. Returns the empty rectangle when there is no
    /// overlap.
    pub fn overlap_relative_to(&self, other: &RectInt, origin_x: i32, origin_y: i32) -> RectInt {
        match self.intersection(other) {
            Some(overlap) => RectInt::new(
                overlap.x - origin_x,
                overlap.y - origin_y,
                overlap.w,
                overlap.h,
            ),
            None => RectInt::ZERO,
        }
    }

    /// Shrinks the rectangle by the given margin on every side, clamping
    /// dimensions at zero.
    pub fn inset(&self, margin: i32) -> RectInt {
        RectInt::new(
            self.x + margin,
            self.y + margin,
            self.w - 2 * margin,
            self.h - 2 * margin,
        )
    }

    /// Grows the rectangle by the given margin on every side.
    pub fn outset(&self, margin: i32) -> RectInt {
        self.inset(-margin)
    }
}

impl fmt::Display for RectInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x, self.y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rect_int_clamps_negative_dimensions() {
        let rect = RectInt::new(10, 10, -5, 20);
        assert_eq!(rect.w, 0);
        assert!(rect.is_empty());
    }

    #[test]
    fn rect_int_intersection() {
        let a = RectInt::new(0, 0, 100, 100);
        let b = RectInt::new(50, 50, 100, 100);
        let overlap = a.intersection(&b).unwrap();
        assert_eq!(overlap, RectInt::new(50, 50, 50, 50));
    }

    #[test]
    fn rect_int_disjoint_intersection_is_none() {
        let a = RectInt::new(0, 0, 10, 10);
        let b = RectInt::new(20, 20, 10, 10);
        assert!(a.intersection(&b).is_none());
        assert_eq!(a.overlap_relative_to(&b, 0, 0), RectInt::ZERO);
    }

    #[test]
    fn rect_int_overlap_relative() {
        let window = RectInt::new(100, 100, 400, 400);
        let bar = RectInt::new(0, 0, 1000, 150);
        let relative = window.overlap_relative_to(&bar, window.x, window.y);
        assert_eq!(relative, RectInt::new(0, 0, 400, 50));
    }

    #[test]
    fn rect_int_inset_clamps() {
        let rect = RectInt::new(0, 0, 10, 10);
        assert!(rect.inset(6).is_empty());
        assert_eq!(rect.inset(2), RectInt::new(2, 2, 6, 6));
    }

    #[test]
    fn contains_point_edges_exclusive() {
        let rect = RectInt::new(0, 0, 10, 10);
        assert!(rect.contains_point(0, 0));
        assert!(!rect.contains_point(10, 5));
        assert!(!rect.contains_point(5, 10));
    }

    #[test]
    fn generic_point_arithmetic() {
        let a = Point::new(3, 4);
        let b = Point::new(1, 2);
        assert_eq!(a - b, Point::new(2, 2));
        assert_eq!(a + b, Point::new(4, 6));
    }

    #[test]
    fn generic_size_empty() {
        assert!(Size::new(0u32, 5u32).is_empty());
        assert!(!Size::new(2u32, 5u32).is_empty());
    }
}
