//! Points, sizes, rectangles and edge insets.

use serde::{Deserialize, Serialize};

use super::GEOMETRY_EPSILON;

/// A point in either view or image space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width and height exchanged, as seen after a quarter turn.
    pub fn swapped(self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    /// Width divided by height, or `None` for a degenerate size.
    pub fn aspect(self) -> Option<f64> {
        if self.width > GEOMETRY_EPSILON && self.height > GEOMETRY_EPSILON {
            Some(self.width / self.height)
        } else {
            None
        }
    }

    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }

    pub fn is_empty(self) -> bool {
        self.width < GEOMETRY_EPSILON || self.height < GEOMETRY_EPSILON
    }

    /// Largest uniform scale that makes `self` fit inside `bounds`.
    pub fn fit_scale(self, bounds: Size) -> f64 {
        if self.is_empty() {
            return 1.0;
        }
        (bounds.width / self.width).min(bounds.height / self.height)
    }
}

/// Distances to inset from each edge of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Negative insets are treated as zero.
    pub fn non_negative(self) -> Self {
        Self::new(
            self.top.max(0.0),
            self.left.max(0.0),
            self.bottom.max(0.0),
            self.right.max(0.0),
        )
    }
}

/// An axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// A rectangle of `size` whose centre is `center`.
    pub fn centered_at(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width * 0.5,
            center.y - size.height * 0.5,
            size.width,
            size.height,
        )
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width * 0.5
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height * 0.5
    }

    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Shrink (positive) or grow (negative) the rectangle on every side.
    pub fn inset(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.x + dx,
            self.y + dy,
            self.width - dx * 2.0,
            self.height - dy * 2.0,
        )
    }

    pub fn inset_by(&self, insets: EdgeInsets) -> Self {
        Self::new(
            self.x + insets.left,
            self.y + insets.top,
            self.width - insets.left - insets.right,
            self.height - insets.top - insets.bottom,
        )
    }

    /// Half-open containment test, `[min, max)` on both axes.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x < self.max_x()
            && point.y >= self.min_y()
            && point.y < self.max_y()
    }

    /// Whether `other` lies inside `self`, allowing for floating point drift.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.min_x() >= self.min_x() - GEOMETRY_EPSILON
            && other.min_y() >= self.min_y() - GEOMETRY_EPSILON
            && other.max_x() <= self.max_x() + GEOMETRY_EPSILON
            && other.max_y() <= self.max_y() + GEOMETRY_EPSILON
    }

    /// Clamp `self` into `bounds`: the size is capped at the bounds' size and
    /// the origin shifted so no edge sticks out.
    pub fn clamped_within(&self, bounds: &Rect) -> Rect {
        let width = self.width.clamp(0.0, bounds.width.max(0.0));
        let height = self.height.clamp(0.0, bounds.height.max(0.0));
        let x = self
            .x
            .clamp(bounds.min_x(), (bounds.max_x() - width).max(bounds.min_x()));
        let y = self
            .y
            .clamp(bounds.min_y(), (bounds.max_y() - height).max(bounds.min_y()));
        Rect::new(x, y, width, height)
    }

    /// The overlapping area of two rectangles, `None` if they don't overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.min_x().max(other.min_x());
        let y = self.min_y().max(other.min_y());
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        if max_x <= x || max_y <= y {
            return None;
        }
        Some(Rect::new(x, y, max_x - x, max_y - y))
    }

    pub fn approx_eq(&self, other: &Rect, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}
