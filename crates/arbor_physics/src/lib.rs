//! 2D kinematic physics for Arbor
//!
//! This crate provides the collision kernel used by the node graph:
//! - Collision shapes with enable/disable and one-way markers
//! - Axis-separated, unit-stepped kinematic movement with floor/wall/ceiling
//!   classification and sub-unit remainder accumulation
//! - Closest-hit ray casting against a set of shapes
//!
//! The kernel is generic over the identifier `K` that callers attach to each
//! obstacle, so it has no knowledge of how shapes are stored.

pub mod collider;
pub mod kinematic;
pub mod raycast;

// Re-export commonly used types
pub use collider::CollisionShape;
pub use kinematic::{ContactFlags, FloorContact, KinematicBody, KinematicConfig, Obstacle, DEFAULT_FLOOR_TOLERANCE};
pub use raycast::{closest_hit, RayCast};
