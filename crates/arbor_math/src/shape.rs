//! Collision geometry
//!
//! Lightweight, value-like 2D primitives used for containment, overlap and
//! ray queries. Shapes carry no shared state: cloning yields an independent
//! value and only `offset`/`set_position` mutate in place.
//!
//! Overlap tests are intentionally asymmetric at the boundary:
//! circle-circle uses a strict comparison (touching circles do not
//! intersect), while every path involving a rectangle is inclusive
//! (touching counts as intersecting).

use serde::{Serialize, Deserialize};
use crate::Vec2;

/// Directions shorter than this are treated as zero
const DIRECTION_EPSILON: f32 = 1e-6;

/// Result of a successful ray intersection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// World-space point where the ray first meets the shape
    pub point: Vec2,
    /// Distance along the ray from its origin to `point`
    pub distance: f32,
}

/// A circle defined by center and radius
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    /// Create a new circle; negative radii are clamped to zero
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// A zero-radius circle never contains or intersects anything
    pub fn is_degenerate(&self) -> bool {
        self.radius <= 0.0
    }

    /// Check if a point is inside or on the circle
    pub fn contains(&self, point: Vec2) -> bool {
        !self.is_degenerate()
            && self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Circle vs circle overlap (strict: touching is not intersecting)
    pub fn intersects_circle(&self, other: &Circle) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        let radii = self.radius + other.radius;
        self.center.distance_squared(other.center) < radii * radii
    }

    /// Circle vs rectangle overlap (inclusive)
    ///
    /// Clamps the center into the rectangle and compares the squared
    /// distance to the squared radius.
    pub fn intersects_rectangle(&self, rect: &Rectangle) -> bool {
        if self.is_degenerate() || rect.is_empty() {
            return false;
        }
        let closest = rect.closest_point(self.center);
        self.center.distance_squared(closest) <= self.radius * self.radius
    }

    /// Closest-approach ray test
    ///
    /// Takes the near root when it is non-negative, otherwise the far root
    /// (origin inside the circle). The chosen root must lie in `[0, max_length]`.
    pub fn ray_intersect(&self, origin: Vec2, direction: Vec2, max_length: f32) -> Option<RayHit> {
        if self.is_degenerate() {
            return None;
        }
        let to_center = self.center - origin;
        let along = to_center.dot(direction);
        let perp_sq = to_center.length_squared() - along * along;
        let radius_sq = self.radius * self.radius;
        if perp_sq > radius_sq {
            return None;
        }

        let half_chord = (radius_sq - perp_sq).max(0.0).sqrt();
        let near = along - half_chord;
        let far = along + half_chord;
        let t = if near >= 0.0 { near } else { far };
        if t < 0.0 || t > max_length {
            return None;
        }

        Some(RayHit {
            point: origin + direction * t,
            distance: t,
        })
    }
}

/// An axis-aligned rectangle defined by its top-left origin and size
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Top-left corner (minimum x and y)
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    /// Create a new rectangle; negative sizes are clamped to zero
    pub fn new(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            position,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Create a rectangle centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self::new(center - half_extents, half_extents.x * 2.0, half_extents.y * 2.0)
    }

    /// Zero-area rectangles are "empty" markers and never collide
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Minimum corner
    pub fn min(&self) -> Vec2 {
        self.position
    }

    /// Maximum corner
    pub fn max(&self) -> Vec2 {
        self.position + Vec2::new(self.width, self.height)
    }

    /// Center of the rectangle
    pub fn center(&self) -> Vec2 {
        self.position + Vec2::new(self.width, self.height) * 0.5
    }

    /// Check if a point is inside or on the rectangle
    pub fn contains(&self, point: Vec2) -> bool {
        if self.is_empty() {
            return false;
        }
        let max = self.max();
        point.x >= self.position.x
            && point.x <= max.x
            && point.y >= self.position.y
            && point.y <= max.y
    }

    /// Get the closest point inside or on the rectangle to a given point
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp_components(self.min(), self.max())
    }

    /// Rectangle vs rectangle overlap (inclusive)
    pub fn intersects_rectangle(&self, other: &Rectangle) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
    }

    /// Slab ray test clipped to `[0, max_length]`
    ///
    /// A ray starting inside the rectangle hits at distance zero.
    pub fn ray_intersect(&self, origin: Vec2, direction: Vec2, max_length: f32) -> Option<RayHit> {
        if self.is_empty() {
            return None;
        }
        let (min, max) = (self.min(), self.max());
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        let slabs = [
            (origin.x, direction.x, min.x, max.x),
            (origin.y, direction.y, min.y, max.y),
        ];
        for (start, dir, lo, hi) in slabs {
            if dir.abs() < DIRECTION_EPSILON {
                // Parallel to this slab: must already be between its planes
                if start < lo || start > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t1 = (lo - start) * inv;
            let mut t2 = (hi - start) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        let t = t_min.max(0.0);
        if t > max_length {
            return None;
        }

        Some(RayHit {
            point: origin + direction * t,
            distance: t,
        })
    }
}

/// Polymorphic 2D collision shape
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
}

impl Shape {
    /// Create a circle shape
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Shape::Circle(Circle::new(center, radius))
    }

    /// Create a rectangle shape from its top-left corner and size
    pub fn rectangle(position: Vec2, width: f32, height: f32) -> Self {
        Shape::Rectangle(Rectangle::new(position, width, height))
    }

    /// Anchor point: circle center or rectangle top-left corner
    pub fn position(&self) -> Vec2 {
        match self {
            Shape::Circle(c) => c.center,
            Shape::Rectangle(r) => r.position,
        }
    }

    /// Move the anchor point to `position`
    pub fn set_position(&mut self, position: Vec2) {
        match self {
            Shape::Circle(c) => c.center = position,
            Shape::Rectangle(r) => r.position = position,
        }
    }

    /// Translate the shape in place
    pub fn offset(&mut self, delta: Vec2) {
        let position = self.position();
        self.set_position(position + delta);
    }

    /// Return a translated copy of this shape
    pub fn translated(&self, delta: Vec2) -> Self {
        let mut shape = *self;
        shape.offset(delta);
        shape
    }

    /// Axis-aligned bounds of the shape
    pub fn bounds(&self) -> Rectangle {
        match self {
            Shape::Circle(c) => Rectangle::from_center_half_extents(c.center, Vec2::splat(c.radius)),
            Shape::Rectangle(r) => *r,
        }
    }

    /// True iff the point lies within or on the boundary
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Shape::Circle(c) => c.contains(point),
            Shape::Rectangle(r) => r.contains(point),
        }
    }

    /// Symmetric overlap test
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Circle(a), Shape::Circle(b)) => a.intersects_circle(b),
            (Shape::Circle(c), Shape::Rectangle(r)) | (Shape::Rectangle(r), Shape::Circle(c)) => {
                c.intersects_rectangle(r)
            }
            (Shape::Rectangle(a), Shape::Rectangle(b)) => a.intersects_rectangle(b),
        }
    }

    /// Intersect a ray with this shape
    ///
    /// `direction` must be unit length. Zero directions and non-positive
    /// lengths never hit.
    pub fn ray_intersect(&self, origin: Vec2, direction: Vec2, max_length: f32) -> Option<RayHit> {
        if max_length <= 0.0 || direction.length_squared() < DIRECTION_EPSILON {
            return None;
        }
        match self {
            Shape::Circle(c) => c.ray_intersect(origin, direction, max_length),
            Shape::Rectangle(r) => r.ray_intersect(origin, direction, max_length),
        }
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}

impl From<Rectangle> for Shape {
    fn from(rect: Rectangle) -> Self {
        Shape::Rectangle(rect)
    }
}
