//! 2D Mathematics Library
//!
//! This crate provides the vector and shape types for the Arbor engine.
//!
//! ## Core Types
//!
//! - [`Vec2`] - 2D vector with x, y components (+Y points down)
//!
//! ## Shape Types
//!
//! - [`Shape`] - Polymorphic collision geometry (circle or rectangle)
//! - [`Circle`] - A circle defined by center and radius
//! - [`Rectangle`] - An axis-aligned rectangle defined by origin and size
//! - [`RayHit`] - Result of a successful ray intersection

mod vec2;
pub mod shape;

pub use vec2::Vec2;
pub use shape::{Circle, RayHit, Rectangle, Shape};
