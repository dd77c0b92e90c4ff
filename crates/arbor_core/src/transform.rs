//! 2D Transform (position, rotation, scale)
//!
//! A Transform2D represents the position, rotation, and scale of a node,
//! either relative to its parent (local) or in world space (global).

use arbor_math::Vec2;
use serde::{Serialize, Deserialize};

/// A 2D transform with position, rotation, and per-axis scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// Position in 2D space
    pub position: Vec2,
    /// Rotation in radians
    #[serde(default)]
    pub rotation: f32,
    /// Per-axis scale factor
    #[serde(default = "unit_scale")]
    pub scale: Vec2,
}

fn unit_scale() -> Vec2 {
    Vec2::ONE
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    /// Create an identity transform (no translation, rotation, or scale change)
    pub const fn identity() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec2, rotation: f32) -> Self {
        Self {
            position,
            rotation,
            scale: Vec2::ONE,
        }
    }

    /// Set the scale (builder style)
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Transform a point from local space to parent/world space
    ///
    /// Applies scale, then rotation, then translation.
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        self.transform_direction(p) + self.position
    }

    /// Transform a direction from local space to parent/world space
    ///
    /// Applies scale and rotation, but not translation.
    pub fn transform_direction(&self, d: Vec2) -> Vec2 {
        d.component_mul(self.scale).rotated(self.rotation)
    }

    /// Map a point from parent/world space back into local space
    ///
    /// Zero scale components are treated as unit scale.
    pub fn inverse_transform_point(&self, p: Vec2) -> Vec2 {
        let unrotated = (p - self.position).rotated(-self.rotation);
        let safe = |s: f32| if s.abs() > 1e-10 { s } else { 1.0 };
        Vec2::new(unrotated.x / safe(self.scale.x), unrotated.y / safe(self.scale.y))
    }

    /// Place `child` (expressed relative to `parent`) into parent space
    ///
    /// The child's position is scaled, rotated, then translated by the parent;
    /// rotations add and scales multiply.
    ///
    /// Chains combine associatively only while every non-uniform scale sits
    /// below all rotations. A rotated child under a non-uniformly scaled
    /// parent would need shear, which this representation cannot hold, so the
    /// result depends on grouping.
    pub fn combine(parent: &Self, child: &Self) -> Self {
        Self {
            position: parent.transform_point(child.position),
            rotation: parent.rotation + child.rotation,
            scale: parent.scale.component_mul(child.scale),
        }
    }

    /// Translate the transform by an offset
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    fn transform_approx_eq(a: &Transform2D, b: &Transform2D) -> bool {
        vec_approx_eq(a.position, b.position)
            && approx_eq(a.rotation, b.rotation)
            && vec_approx_eq(a.scale, b.scale)
    }

    #[test]
    fn test_identity_transform() {
        let t = Transform2D::identity();
        let p = Vec2::new(1.0, 2.0);
        assert!(vec_approx_eq(t.transform_point(p), p));
    }

    #[test]
    fn test_translation() {
        let t = Transform2D::from_position(Vec2::new(1.0, 2.0));
        assert!(vec_approx_eq(t.transform_point(Vec2::ZERO), Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn test_scale() {
        let t = Transform2D::identity().with_scale(Vec2::new(2.0, 3.0));
        let transformed = t.transform_point(Vec2::ONE);
        assert!(vec_approx_eq(transformed, Vec2::new(2.0, 3.0)));
    }

    #[test]
    fn test_transform_order() {
        // Transform applies: scale, then rotate, then translate
        let t = Transform2D::from_position_rotation(Vec2::new(10.0, 0.0), FRAC_PI_2)
            .with_scale(Vec2::splat(2.0));

        // X * 2 = (2, 0), rotated 90 degrees = (0, 2), + (10, 0) = (10, 2)
        let transformed = t.transform_point(Vec2::X);
        assert!(vec_approx_eq(transformed, Vec2::new(10.0, 2.0)),
            "Expected (10, 2), got {:?}", transformed);
    }

    #[test]
    fn test_inverse_transform_point() {
        let t = Transform2D::from_position_rotation(Vec2::new(1.0, 2.0), 0.5)
            .with_scale(Vec2::new(2.0, 0.5));

        let p = Vec2::new(3.0, -4.0);
        let back = t.inverse_transform_point(t.transform_point(p));
        assert!(vec_approx_eq(p, back), "Expected {:?}, got {:?}", p, back);
    }

    #[test]
    fn test_transform_direction() {
        let t = Transform2D::from_position(Vec2::new(100.0, 100.0));
        // Direction should not be affected by position
        assert!(vec_approx_eq(t.transform_direction(Vec2::X), Vec2::X));
    }

    #[test]
    fn test_combine_translations() {
        let parent = Transform2D::from_position(Vec2::new(1.0, 0.0));
        let child = Transform2D::from_position(Vec2::new(0.0, 2.0));

        let combined = Transform2D::combine(&parent, &child);
        assert!(vec_approx_eq(combined.position, Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn test_combine_rotated_scaled_parent() {
        let parent = Transform2D::from_position_rotation(Vec2::new(5.0, 5.0), FRAC_PI_2)
            .with_scale(Vec2::splat(2.0));
        let child = Transform2D::from_position_rotation(Vec2::new(1.0, 0.0), 0.25)
            .with_scale(Vec2::splat(3.0));

        let combined = Transform2D::combine(&parent, &child);
        assert!(vec_approx_eq(combined.position, Vec2::new(5.0, 7.0)));
        assert!(approx_eq(combined.rotation, FRAC_PI_2 + 0.25));
        assert!(vec_approx_eq(combined.scale, Vec2::splat(6.0)));
    }

    #[test]
    fn test_combine_chain_matches_pairwise() {
        let a = Transform2D::from_position_rotation(Vec2::new(10.0, 0.0), 0.3)
            .with_scale(Vec2::splat(2.0));
        let b = Transform2D::from_position_rotation(Vec2::new(0.0, 4.0), -0.1);
        let c = Transform2D::from_position(Vec2::new(1.0, 1.0));

        let top_down = Transform2D::combine(&Transform2D::combine(&a, &b), &c);
        let bottom_up = Transform2D::combine(&a, &Transform2D::combine(&b, &c));
        assert!(transform_approx_eq(&top_down, &bottom_up));

        // The combined transform maps points the same way as applying each in turn
        let p = Vec2::new(2.0, -3.0);
        let stepwise = a.transform_point(b.transform_point(c.transform_point(p)));
        assert!(vec_approx_eq(top_down.transform_point(p), stepwise));
    }

    #[test]
    fn test_combine_nonuniform_scale_over_rotation_depends_on_grouping() {
        let a = Transform2D::identity().with_scale(Vec2::new(2.0, 1.0));
        let b = Transform2D::from_position_rotation(Vec2::ZERO, std::f32::consts::FRAC_PI_2);
        let c = Transform2D::from_position(Vec2::new(1.0, 0.0));

        let top_down = Transform2D::combine(&Transform2D::combine(&a, &b), &c);
        let bottom_up = Transform2D::combine(&a, &Transform2D::combine(&b, &c));
        assert!(vec_approx_eq(top_down.position, Vec2::new(0.0, 2.0)));
        assert!(vec_approx_eq(bottom_up.position, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn test_default() {
        let t = Transform2D::default();
        assert!(vec_approx_eq(t.position, Vec2::ZERO));
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.scale, Vec2::ONE);
    }
}
