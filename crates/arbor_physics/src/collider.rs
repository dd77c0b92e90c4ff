//! Collision shapes
//!
//! A [`CollisionShape`] wraps a [`Shape`] with the flags the kinematic kernel
//! and gameplay code care about. A disabled shape answers "no" to every query.

use arbor_math::{RayHit, Shape, Vec2};
use serde::{Serialize, Deserialize};

/// A shape that takes part in collision queries
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionShape {
    /// The geometry (local or world space depending on context)
    pub shape: Shape,
    /// When true, all containment/intersection/ray queries return false
    #[serde(default)]
    pub disabled: bool,
    /// Marker for one-way platforms
    ///
    /// Not enforced by the kernel; gameplay code decides how to react.
    #[serde(default)]
    pub one_way: bool,
}

impl CollisionShape {
    /// Create an enabled, two-way collision shape
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            disabled: false,
            one_way: false,
        }
    }

    /// Mark this shape as a one-way platform
    pub fn with_one_way(mut self, one_way: bool) -> Self {
        self.one_way = one_way;
        self
    }

    /// Set whether this shape is disabled
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Whether this shape currently takes part in queries
    #[inline]
    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Copy of this collision shape translated to `position`
    pub fn placed_at(&self, position: Vec2) -> Self {
        Self {
            shape: self.shape.translated(position),
            ..*self
        }
    }

    /// Check if a point lies within or on the shape
    pub fn contains(&self, point: Vec2) -> bool {
        self.is_enabled() && self.shape.contains(point)
    }

    /// Check overlap with a raw shape
    pub fn intersects(&self, other: &Shape) -> bool {
        self.is_enabled() && self.shape.intersects(other)
    }

    /// Check overlap with another collision shape (both must be enabled)
    pub fn intersects_shape(&self, other: &CollisionShape) -> bool {
        other.is_enabled() && self.intersects(&other.shape)
    }

    /// Intersect a ray with this shape
    pub fn ray_intersect(&self, origin: Vec2, direction: Vec2, max_length: f32) -> Option<RayHit> {
        if self.disabled {
            return None;
        }
        self.shape.ray_intersect(origin, direction, max_length)
    }
}

impl From<Shape> for CollisionShape {
    fn from(shape: Shape) -> Self {
        Self::new(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> CollisionShape {
        CollisionShape::new(Shape::rectangle(Vec2::ZERO, 10.0, 10.0))
    }

    #[test]
    fn test_new_defaults() {
        let c = unit_box();
        assert!(c.is_enabled());
        assert!(!c.one_way);
    }

    #[test]
    fn test_disabled_shape_answers_no() {
        let c = unit_box().with_disabled(true);
        let probe = Shape::rectangle(Vec2::new(5.0, 5.0), 1.0, 1.0);

        assert!(!c.contains(Vec2::new(5.0, 5.0)));
        assert!(!c.intersects(&probe));
        assert!(c.ray_intersect(Vec2::new(-5.0, 5.0), Vec2::X, 100.0).is_none());
    }

    #[test]
    fn test_enabled_shape_queries() {
        let c = unit_box();
        let probe = Shape::rectangle(Vec2::new(5.0, 5.0), 1.0, 1.0);

        assert!(c.contains(Vec2::new(5.0, 5.0)));
        assert!(c.intersects(&probe));
        let hit = c.ray_intersect(Vec2::new(-5.0, 5.0), Vec2::X, 100.0).unwrap();
        assert_eq!(hit.distance, 5.0);
    }

    #[test]
    fn test_intersects_shape_respects_both_flags() {
        let a = unit_box();
        let b = unit_box().with_disabled(true);
        assert!(!a.intersects_shape(&b));
        assert!(!b.intersects_shape(&a));
        assert!(a.intersects_shape(&unit_box()));
    }

    #[test]
    fn test_placed_at_keeps_flags() {
        let c = unit_box().with_one_way(true).placed_at(Vec2::new(3.0, 4.0));
        assert!(c.one_way);
        assert_eq!(c.shape.position(), Vec2::new(3.0, 4.0));
    }
}
