//! Node behaviors
//!
//! A [`NodeBehavior`] is user code attached to a node. The graph calls its
//! hooks during passes with a [`NodeContext`] bound to that node. While a
//! hook runs the behavior is detached from its node, so the context can hand
//! out mutable access to the rest of the graph.
//!
//! Structural changes made through the context (spawning, removal) are
//! queued and take effect at the next `apply_pending`.

use std::any::Any;

use arbor_math::{RayHit, Vec2};
use arbor_physics::KinematicBody;

use crate::graph::GraphManager;
use crate::node::{Node, NodeKey, NodeKindTag};
use crate::draw::DrawSink;
use crate::{GraphError, Transform2D};

/// Upcast helper so behaviors can be downcast to their concrete type
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// User logic attached to a node
///
/// Every hook defaults to doing nothing.
pub trait NodeBehavior: AsAny + 'static {
    /// Called once when the node becomes live
    fn on_load(&mut self, _ctx: &mut NodeContext<'_>) {}

    /// Called once before a live node is removed
    fn on_unload(&mut self, _ctx: &mut NodeContext<'_>) {}

    /// Variable-rate logic step
    fn update(&mut self, _ctx: &mut NodeContext<'_>, _dt: f32) {}

    /// Fixed-rate step, run before the node's own kinematic movement
    fn physics_update(&mut self, _ctx: &mut NodeContext<'_>, _dt: f32) {}

    /// Push extra draw requests
    fn draw(&self, _ctx: &DrawContext<'_>, _sink: &mut dyn DrawSink) {}
}

/// Mutable view of the graph from inside a hook
pub struct NodeContext<'a> {
    graph: &'a mut GraphManager,
    key: NodeKey,
}

impl<'a> NodeContext<'a> {
    pub(crate) fn new(graph: &'a mut GraphManager, key: NodeKey) -> Self {
        Self { graph, key }
    }

    /// Key of the node this hook belongs to
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Read-only access to the whole graph
    pub fn graph(&self) -> &GraphManager {
        &*self.graph
    }

    pub fn node(&self) -> Option<&Node> {
        self.graph.get(self.key)
    }

    pub fn name(&self) -> Option<&str> {
        self.node().and_then(|n| n.name())
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.graph.parent(self.key)
    }

    // --- Own transform ---

    /// Local position (zero for basic nodes)
    pub fn position(&self) -> Vec2 {
        self.graph
            .local_transform(self.key)
            .map(|t| t.position)
            .unwrap_or(Vec2::ZERO)
    }

    pub fn global_transform(&self) -> Transform2D {
        self.graph.global_transform(self.key).unwrap_or_default()
    }

    pub fn global_position(&self) -> Vec2 {
        self.global_transform().position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.graph.set_position(self.key, position);
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.graph.translate(self.key, offset);
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.graph.set_rotation(self.key, rotation);
    }

    // --- Kinematic state ---

    pub fn kinematic_body(&self) -> Option<&KinematicBody<NodeKey>> {
        self.graph.kinematic_body(self.key)
    }

    /// Velocity (zero for nodes that are not kinematic bodies)
    pub fn velocity(&self) -> Vec2 {
        self.graph.velocity(self.key).unwrap_or(Vec2::ZERO)
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.graph.set_velocity(self.key, velocity);
    }

    pub fn is_on_floor(&self) -> bool {
        self.kinematic_body().is_some_and(|b| b.is_on_floor())
    }

    pub fn is_on_wall(&self) -> bool {
        self.kinematic_body().is_some_and(|b| b.is_on_wall())
    }

    pub fn is_on_ceiling(&self) -> bool {
        self.kinematic_body().is_some_and(|b| b.is_on_ceiling())
    }

    // --- Structure (queued) ---

    /// Queue a new root node
    pub fn spawn(&mut self, node: Node) -> NodeKey {
        self.graph.queue_add(node)
    }

    /// Queue a new node as a child of this one
    pub fn spawn_child(&mut self, mut node: Node) -> NodeKey {
        node.parent = Some(self.key);
        self.graph.queue_add(node)
    }

    /// Queue this node (and its subtree) for removal
    pub fn queue_free(&mut self) {
        self.graph.queue_remove(self.key);
    }

    pub fn queue_remove(&mut self, key: NodeKey) {
        self.graph.queue_remove(key);
    }

    /// Reparent this node right away (cycle-checked)
    pub fn set_parent(&mut self, parent: Option<NodeKey>) -> Result<(), GraphError> {
        self.graph.set_parent(self.key, parent)
    }

    /// Reparent another node right away (cycle-checked)
    pub fn reparent(&mut self, node: NodeKey, parent: Option<NodeKey>) -> Result<(), GraphError> {
        self.graph.set_parent(node, parent)
    }

    pub fn set_collision_disabled(&mut self, key: NodeKey, disabled: bool) {
        self.graph.set_collision_disabled(key, disabled);
    }

    pub fn set_sprite_visible(&mut self, visible: bool) {
        self.graph.set_sprite_visible(self.key, visible);
    }

    // --- Queries ---

    pub fn nodes_by_name(&self, name: &str) -> &[NodeKey] {
        self.graph.nodes_by_name(name)
    }

    pub fn nodes_by_kind(&self, tag: NodeKindTag) -> impl Iterator<Item = NodeKey> + '_ {
        self.graph.nodes_by_kind(tag)
    }

    /// Ray cast that ignores this node's own subtree
    pub fn ray_cast(&self, origin: Vec2, direction: Vec2, max_length: f32) -> Option<(NodeKey, RayHit)> {
        self.graph.ray_cast(origin, direction, max_length, Some(self.key))
    }
}

/// Read-only view of the graph during the draw pass
pub struct DrawContext<'a> {
    graph: &'a GraphManager,
    key: NodeKey,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(graph: &'a GraphManager, key: NodeKey) -> Self {
        Self { graph, key }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn graph(&self) -> &GraphManager {
        self.graph
    }

    pub fn node(&self) -> Option<&Node> {
        self.graph.get(self.key)
    }

    /// Global transform of the drawing node (identity for basic nodes)
    pub fn global_transform(&self) -> Transform2D {
        self.graph.global_transform(self.key).unwrap_or_default()
    }
}
