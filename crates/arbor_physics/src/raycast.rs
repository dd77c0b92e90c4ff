//! Closest-hit ray casting
//!
//! Ray queries are shape-level: callers filter out disabled collision shapes
//! before handing candidates over.

use arbor_math::{RayHit, Shape, Vec2};

/// A reusable ray query that remembers its last result
#[derive(Clone, Debug)]
pub struct RayCast {
    /// Ray origin
    pub origin: Vec2,
    /// Unit direction (normalized by the caller)
    pub direction: Vec2,
    /// Maximum distance along the ray
    pub max_length: f32,
    hit: Option<RayHit>,
}

impl RayCast {
    /// Create a ray query
    pub fn new(origin: Vec2, direction: Vec2, max_length: f32) -> Self {
        Self {
            origin,
            direction,
            max_length,
            hit: None,
        }
    }

    /// Cast against `shapes`, keeping the nearest hit
    pub fn cast<'a, I>(&mut self, shapes: I) -> Option<RayHit>
    where
        I: IntoIterator<Item = &'a Shape>,
    {
        self.hit = closest_hit(
            self.origin,
            self.direction,
            self.max_length,
            shapes.into_iter().map(|s| ((), s)),
        )
        .map(|(_, hit)| hit);
        self.hit
    }

    /// Whether the last cast hit anything
    pub fn is_colliding(&self) -> bool {
        self.hit.is_some()
    }

    /// Closest hit point from the last cast
    pub fn collision_point(&self) -> Option<Vec2> {
        self.hit.map(|h| h.point)
    }

    /// Full result of the last cast
    pub fn hit(&self) -> Option<RayHit> {
        self.hit
    }
}

/// Minimum-distance hit across identified candidates
///
/// Ties keep the earliest candidate.
pub fn closest_hit<'a, K, I>(origin: Vec2, direction: Vec2, max_length: f32, candidates: I) -> Option<(K, RayHit)>
where
    I: IntoIterator<Item = (K, &'a Shape)>,
{
    let mut best: Option<(K, RayHit)> = None;
    for (id, shape) in candidates {
        let Some(hit) = shape.ray_intersect(origin, direction, max_length) else {
            continue;
        };
        let closer = best.as_ref().map_or(true, |(_, b)| hit.distance < b.distance);
        if closer {
            best = Some((id, hit));
        }
    }
    best
}
