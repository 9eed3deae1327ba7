//! Geometric types and hit testing on the drawing surface
//!
//! All coordinates are surface coordinates (backing-resolution pixels)
//! unless a doc comment says otherwise.

use serde::{Deserialize, Serialize};

/// A point in surface coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Translate the point by the given offset
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Vector from `self` to `other`
    pub fn delta_to(self, other: Point) -> (f32, f32) {
        (other.x - self.x, other.y - self.y)
    }

    /// Angle in radians of the vector from `self` to `other`
    pub fn angle_to(self, other: Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Rotate the point by `angle` radians about `center`
    pub fn rotate_about(self, center: Point, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Self::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        )
    }
}

/// Width and height of an element
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle given by its top-left corner and size
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `center`
    pub fn from_center(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grow the rectangle by `pad` on every side
    pub fn outset(&self, pad: f32) -> Self {
        Self::new(
            self.x - pad,
            self.y - pad,
            self.width + pad * 2.0,
            self.height + pad * 2.0,
        )
    }

    /// Check if this rectangle contains a point (edges inclusive)
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Corners in clockwise order starting at the top-left
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }
}

/// Rectangle rotated about its own center
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotatedRect {
    /// Unrotated bounds
    pub rect: Rect,
    /// Rotation in radians, clockwise in surface space (y points down)
    pub rotation: f32,
}

impl RotatedRect {
    pub fn new(rect: Rect, rotation: f32) -> Self {
        Self { rect, rotation }
    }

    /// Corners after rotation, same order as [`Rect::corners`]
    pub fn corners(&self) -> [Point; 4] {
        let center = self.rect.center();
        self.rect
            .corners()
            .map(|corner| corner.rotate_about(center, self.rotation))
    }

    /// Smallest axis-aligned rectangle containing the rotated corners
    pub fn bounding_box(&self) -> Rect {
        let corners = self.corners();
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for c in corners {
            min_x = min_x.min(c.x);
            min_y = min_y.min(c.y);
            max_x = max_x.max(c.x);
            max_y = max_y.max(c.y);
        }
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Hit test against a rotated rectangle
///
/// The point is rotated by `-rotation` about the rectangle center and then
/// tested against the unrotated bounds.
pub fn point_in_rotated_rect(point: Point, rect: &RotatedRect) -> bool {
    let center = rect.rect.center();
    let local = point.rotate_about(center, -rect.rotation);
    rect.rect.contains_point(local)
}

/// Clamp a candidate position so the element stays inside `zone`
///
/// With a size, `point` is a top-left corner and the whole box is kept inside
/// the zone. Without a size, `point` is an anchor and is clamped to the zone
/// bounds directly. An element larger than the zone pins to the zone's
/// top-left edge.
pub fn clamp_to_zone(point: Point, zone: &Rect, size: Option<Size>) -> Point {
    let (max_x, max_y) = match size {
        Some(size) => (zone.right() - size.width, zone.bottom() - size.height),
        None => (zone.right(), zone.bottom()),
    };
    Point::new(
        clamp_axis(point.x, zone.x, max_x),
        clamp_axis(point.y, zone.y, max_y),
    )
}

#[inline]
fn clamp_axis(value: f32, min: f32, max: f32) -> f32 {
    // not f32::clamp: it panics when max < min
    value.min(max).max(min)
}
