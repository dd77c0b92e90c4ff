//! Core types for the Arbor scene graph
//!
//! This crate ties the geometry and physics crates into a node tree:
//!
//! - [`Transform2D`] - Position, rotation, and scale in 2D space
//! - [`Node`] / [`NodeConfig`] - A node and its serializable configuration
//! - [`NodeKind`] - Basic, spatial, collision shape, or kinematic body
//! - [`NodeBehavior`] - User logic hooks run during graph passes
//! - [`GraphManager`] - Owns the tree and applies deferred mutation
//! - [`NodeKey`] - Generational key to a node in the graph
//! - [`Sprite`] / [`DrawSink`] - Draw requests pushed to an external renderer
//! - [`GraphError`] - Structural errors (cycles, conflicting mutation)

mod transform;
mod node;
mod behavior;
mod draw;
mod error;
mod graph;

pub use transform::Transform2D;
pub use node::{Node, NodeConfig, NodeKey, NodeKind, NodeKindConfig, NodeKindTag, NodeState};
pub use behavior::{AsAny, DrawContext, NodeBehavior, NodeContext};
pub use draw::{DrawQueue, DrawRequest, DrawSink, Sprite};
pub use error::GraphError;
pub use graph::GraphManager;

// Re-export commonly used types from arbor_math for convenience
pub use arbor_math::{Circle, RayHit, Rectangle, Shape, Vec2};

// Re-export physics types for convenient access through arbor_core
pub use arbor_physics::{CollisionShape, ContactFlags, KinematicBody, KinematicConfig};
