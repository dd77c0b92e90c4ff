//! Node graph manager
//!
//! The [`GraphManager`] owns every node, the live list, the name index, and
//! the two pending queues. Nothing else mutates those collections.
//!
//! Additions and removals requested during a pass are queued and applied at
//! [`GraphManager::apply_pending`], which runs before and after every pass and
//! drains both queues to a fixed point: loading a node may queue more nodes,
//! unloading one may queue more removals.
//!
//! # Example
//! ```ignore
//! let mut graph = GraphManager::new();
//! let player = graph.queue_add(
//!     Node::new(NodeConfig::kinematic_body(Vec2::new(0.0, 0.0)).with_name("player"))
//!         .with_child(Node::new(NodeConfig::collision_shape(Shape::rectangle(Vec2::ZERO, 16.0, 16.0)))),
//! );
//! graph.apply_pending()?;
//!
//! // Frame loop
//! graph.physics_update(1.0 / 60.0)?;
//! graph.update(dt)?;
//! graph.submit_draw(&mut renderer);
//! ```

use std::collections::{HashMap, VecDeque};

use arbor_math::{RayHit, Shape, Vec2};
use arbor_physics::{closest_hit, CollisionShape, KinematicBody, KinematicConfig, Obstacle};
use log::{debug, trace, warn};
use slotmap::SlotMap;

use crate::behavior::{DrawContext, NodeBehavior, NodeContext};
use crate::draw::DrawSink;
use crate::node::{Node, NodeKey, NodeKindTag, NodeState};
use crate::{GraphError, Transform2D};

/// Owns the node tree and drives per-frame passes
pub struct GraphManager {
    /// All nodes, pending or live (generational keys)
    nodes: SlotMap<NodeKey, Node>,
    /// Live nodes in insertion order
    live: Vec<NodeKey>,
    /// Name -> live nodes sharing that name
    names: HashMap<String, Vec<NodeKey>>,
    pending_add: VecDeque<NodeKey>,
    pending_remove: VecDeque<NodeKey>,
    /// Settings for kinematic movement
    kinematic: KinematicConfig,
}

impl Default for GraphManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphManager {
    /// Create an empty graph with default kinematic settings
    pub fn new() -> Self {
        Self::with_config(KinematicConfig::default())
    }

    /// Create an empty graph with custom kinematic settings
    pub fn with_config(kinematic: KinematicConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            live: Vec::new(),
            names: HashMap::new(),
            pending_add: VecDeque::new(),
            pending_remove: VecDeque::new(),
            kinematic,
        }
    }

    pub fn kinematic_config(&self) -> &KinematicConfig {
        &self.kinematic
    }

    pub fn set_kinematic_config(&mut self, config: KinematicConfig) {
        self.kinematic = config;
    }

    // --- Deferred mutation ---

    /// Queue a node for addition and return its key
    ///
    /// The node is stored immediately (and linked under its configured
    /// parent) but stays invisible to passes and queries until the next
    /// [`apply_pending`](Self::apply_pending).
    pub fn queue_add(&mut self, mut node: Node) -> NodeKey {
        let parent = node.parent.take();
        node.state = NodeState::Pending;
        let key = self.nodes.insert(node);

        if let Some(parent) = parent {
            if self.nodes.contains_key(parent) {
                self.link(key, parent);
            } else {
                warn!("Node {:?} queued under unknown parent {:?}; adding it as a root", key, parent);
            }
        }
        self.refresh_global(key);

        self.pending_add.push_back(key);
        trace!("Queued node {:?} for addition", key);
        key
    }

    /// Queue a node (and, when applied, its whole subtree) for removal
    ///
    /// Queueing the same node twice is harmless.
    pub fn queue_remove(&mut self, key: NodeKey) {
        if !self.nodes.contains_key(key) {
            debug!("Ignoring removal of unknown node {:?}", key);
            return;
        }
        if !self.pending_remove.contains(&key) {
            self.pending_remove.push_back(key);
            trace!("Queued node {:?} for removal", key);
        }
    }

    /// Remove a node and its subtree right away
    ///
    /// Also cancels a pending addition of that node. Returns false if the key
    /// is unknown. Only reachable from outside passes.
    pub fn remove_immediate(&mut self, key: NodeKey) -> bool {
        if !self.nodes.contains_key(key) {
            return false;
        }
        self.remove_subtree(key);
        true
    }

    /// Apply queued additions and removals until both queues are empty
    ///
    /// Additions drain before removals. A node queued under an ancestor that
    /// is pending removal is never loaded and goes away with that ancestor.
    /// Fails without applying anything further if a node is pending both
    /// addition and removal.
    pub fn apply_pending(&mut self) -> Result<(), GraphError> {
        loop {
            if let Some(key) = self.conflicting_mutation() {
                return Err(GraphError::ConcurrentMutation(key));
            }
            if let Some(key) = self.pending_add.pop_front() {
                self.apply_addition(key);
                continue;
            }
            if let Some(key) = self.pending_remove.pop_front() {
                self.remove_subtree(key);
                continue;
            }
            return Ok(());
        }
    }

    /// Number of nodes waiting to be added
    pub fn pending_additions(&self) -> usize {
        self.pending_add.len()
    }

    /// Number of nodes waiting to be removed
    pub fn pending_removals(&self) -> usize {
        self.pending_remove.len()
    }

    fn conflicting_mutation(&self) -> Option<NodeKey> {
        if self.pending_remove.is_empty() {
            return None;
        }
        self.pending_add
            .iter()
            .find(|key| self.pending_remove.contains(key))
            .copied()
    }

    fn apply_addition(&mut self, key: NodeKey) {
        // Freed, or about to be freed, with an ancestor
        if self.ancestors(key).any(|a| self.pending_remove.contains(&a)) {
            trace!("Skipped loading {:?}: ancestor pending removal", key);
            return;
        }
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        node.state = NodeState::Live;
        let declared = std::mem::take(&mut node.declared_children);
        let name = node.name.clone();

        self.live.push(key);
        if let Some(name) = name {
            self.names.entry(name).or_default().push(key);
        }

        for mut child in declared {
            child.parent = Some(key);
            self.queue_add(child);
        }

        self.refresh_global(key);
        trace!("Loaded node {:?}", key);
        self.run_hook(key, |behavior, ctx| behavior.on_load(ctx));
    }

    /// Unload the subtree parent-first, detach it, then free every node in it
    fn remove_subtree(&mut self, key: NodeKey) {
        // Already removed along with an ancestor
        if !self.nodes.contains_key(key) {
            return;
        }

        let mut stack = vec![key];
        let mut removed = Vec::new();
        while let Some(k) = stack.pop() {
            if self.nodes.get(k).is_some_and(|n| n.is_live()) {
                self.run_hook(k, |behavior, ctx| behavior.on_unload(ctx));
            }
            if k == key {
                self.unlink(k);
            }
            let Some(node) = self.nodes.get_mut(k) else {
                continue;
            };
            let children = std::mem::take(&mut node.children);
            for &child in &children {
                if let Some(node) = self.nodes.get_mut(child) {
                    node.parent = None;
                }
            }
            stack.extend(children.into_iter().rev());
            removed.push(k);
        }

        for k in removed {
            if let Some(node) = self.nodes.remove(k) {
                if let Some(name) = &node.name {
                    self.unindex_name(name, k);
                }
                trace!("Removed node {:?}", k);
            }
        }
        let nodes = &self.nodes;
        self.live.retain(|&k| nodes.contains_key(k));
        self.pending_add.retain(|&k| nodes.contains_key(k));
        self.pending_remove.retain(|&k| nodes.contains_key(k));
    }

    fn unindex_name(&mut self, name: &str, key: NodeKey) {
        if let Some(keys) = self.names.get_mut(name) {
            keys.retain(|&k| k != key);
            if keys.is_empty() {
                self.names.remove(name);
            }
        }
    }

    // --- Hierarchy ---

    /// Reparent `node` under `parent` (or make it a root with `None`)
    ///
    /// Self-parenting and cycles are rejected before anything changes.
    pub fn set_parent(&mut self, node: NodeKey, parent: Option<NodeKey>) -> Result<(), GraphError> {
        if !self.nodes.contains_key(node) {
            return Err(GraphError::UnknownNode(node));
        }
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) {
                return Err(GraphError::UnknownNode(parent));
            }
            if parent == node || self.is_ancestor_of(node, parent) {
                debug!("Rejected parenting {:?} under {:?}: cycle", node, parent);
                return Err(GraphError::InvalidHierarchy { node, parent });
            }
        }

        self.unlink(node);
        if let Some(parent) = parent {
            self.link(node, parent);
        }
        self.refresh_global(node);
        Ok(())
    }

    /// Attach `child` under `parent`
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), GraphError> {
        self.set_parent(child, Some(parent))
    }

    /// Detach `child` from `parent`, leaving it as a root
    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), GraphError> {
        let node = self.nodes.get(child).ok_or(GraphError::UnknownNode(child))?;
        if node.parent != Some(parent) {
            return Err(GraphError::NotAChild { parent, child });
        }
        self.set_parent(child, None)
    }

    /// True if `ancestor` appears in `node`'s parent chain
    pub fn is_ancestor_of(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        self.ancestors(node).any(|k| k == ancestor)
    }

    /// Parent chain of `key`, nearest first
    pub fn ancestors(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        std::iter::successors(self.parent(key), move |&k| self.parent(k))
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|n| n.parent)
    }

    /// Children of `key` in attachment order (empty for unknown keys)
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes.get(key).map(|n| n.children()).unwrap_or(&[])
    }

    /// First direct child of `parent` with the given name
    pub fn find_child(&self, parent: NodeKey, name: &str) -> Option<NodeKey> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.nodes.get(c).and_then(|n| n.name()) == Some(name))
    }

    fn link(&mut self, child: NodeKey, parent: NodeKey) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            if !node.children.contains(&child) {
                node.children.push(child);
            }
        }
    }

    fn unlink(&mut self, child: NodeKey) {
        let Some(parent) = self.nodes.get_mut(child).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|&k| k != child);
        }
    }

    /// Rename a node, keeping the name index in sync
    pub fn set_name(&mut self, key: NodeKey, name: Option<String>) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };
        let name = name.filter(|n| !n.is_empty());
        let old = std::mem::replace(&mut node.name, name.clone());
        if !node.is_live() {
            return;
        }
        if let Some(old) = old {
            self.unindex_name(&old, key);
        }
        if let Some(name) = name {
            self.names.entry(name).or_default().push(key);
        }
    }

    // --- Transforms ---

    /// Global transform of the nearest spatial ancestor, or identity
    fn parent_global(&self, key: NodeKey) -> Transform2D {
        self.ancestors(key)
            .find_map(|k| self.nodes.get(k).and_then(|n| n.global_transform()))
            .unwrap_or_default()
    }

    /// Recompute global transforms for `key` and every descendant
    fn refresh_global(&mut self, key: NodeKey) {
        let mut stack = vec![(key, self.parent_global(key))];
        while let Some((k, parent_global)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(k) else {
                continue;
            };
            let global = match node.spatial.as_mut() {
                Some(spatial) => {
                    spatial.global = Transform2D::combine(&parent_global, &spatial.local);
                    spatial.global
                }
                // Plain nodes pass their parent's transform through
                None => parent_global,
            };
            stack.extend(node.children.iter().rev().map(|&c| (c, global)));
        }
    }

    fn modify_local(&mut self, key: NodeKey, f: impl FnOnce(&mut Transform2D)) {
        let Some(spatial) = self.nodes.get_mut(key).and_then(|n| n.spatial.as_mut()) else {
            return;
        };
        f(&mut spatial.local);
        self.refresh_global(key);
    }

    pub fn local_transform(&self, key: NodeKey) -> Option<Transform2D> {
        self.nodes.get(key).and_then(|n| n.local_transform())
    }

    pub fn global_transform(&self, key: NodeKey) -> Option<Transform2D> {
        self.nodes.get(key).and_then(|n| n.global_transform())
    }

    pub fn global_position(&self, key: NodeKey) -> Option<Vec2> {
        self.global_transform(key).map(|t| t.position)
    }

    /// Replace the local transform (no-op for basic or unknown nodes)
    pub fn set_local_transform(&mut self, key: NodeKey, transform: Transform2D) {
        self.modify_local(key, |t| *t = transform);
    }

    pub fn set_position(&mut self, key: NodeKey, position: Vec2) {
        self.modify_local(key, |t| t.position = position);
    }

    /// Move a node by a local-space offset
    pub fn translate(&mut self, key: NodeKey, offset: Vec2) {
        self.modify_local(key, |t| t.translate(offset));
    }

    /// Move a node by a world-space offset
    pub fn translate_global(&mut self, key: NodeKey, offset: Vec2) {
        let parent = self.parent_global(key);
        let local = parent.inverse_transform_point(parent.position + offset);
        self.translate(key, local);
    }

    pub fn set_rotation(&mut self, key: NodeKey, rotation: f32) {
        self.modify_local(key, |t| t.rotation = rotation);
    }

    pub fn set_scale(&mut self, key: NodeKey, scale: Vec2) {
        self.modify_local(key, |t| t.scale = scale);
    }

    // --- Kind-specific state ---

    pub fn kinematic_body(&self, key: NodeKey) -> Option<&KinematicBody<NodeKey>> {
        self.nodes.get(key).and_then(|n| n.kinematic_body())
    }

    pub fn velocity(&self, key: NodeKey) -> Option<Vec2> {
        self.kinematic_body(key).map(|b| b.velocity)
    }

    /// Set a kinematic body's velocity (no-op for other kinds)
    pub fn set_velocity(&mut self, key: NodeKey, velocity: Vec2) {
        if let Some(body) = self.nodes.get_mut(key).and_then(|n| n.kinematic_body_mut()) {
            body.velocity = velocity;
        }
    }

    pub fn set_collision_disabled(&mut self, key: NodeKey, disabled: bool) {
        if let Some(crate::NodeKind::CollisionShape(c)) = self.nodes.get_mut(key).map(|n| &mut n.kind) {
            c.disabled = disabled;
        }
    }

    pub fn set_sprite_visible(&mut self, key: NodeKey, visible: bool) {
        let sprite = self
            .nodes
            .get_mut(key)
            .and_then(|n| n.spatial.as_mut())
            .and_then(|s| s.sprite.as_mut());
        if let Some(sprite) = sprite {
            sprite.visible = visible;
        }
    }

    // --- Queries ---

    /// Any node stored in the graph, pending or live
    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn is_live(&self, key: NodeKey) -> bool {
        self.nodes.get(key).is_some_and(|n| n.is_live())
    }

    /// All live nodes in live order
    pub fn live_nodes(&self) -> &[NodeKey] {
        &self.live
    }

    /// Iterate live nodes with their data
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &Node)> + '_ {
        self.live
            .iter()
            .filter_map(move |&k| self.nodes.get(k).map(|n| (k, n)))
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Live nodes with the given name (empty for unknown names)
    pub fn nodes_by_name(&self, name: &str) -> &[NodeKey] {
        self.names.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Live nodes of the given kind, in live order
    pub fn nodes_by_kind(&self, tag: NodeKindTag) -> impl Iterator<Item = NodeKey> + '_ {
        self.iter().filter(move |(_, n)| n.tag() == tag).map(|(k, _)| k)
    }

    /// Live nodes whose behavior is a `B`, in live order
    pub fn nodes_with_behavior<B: NodeBehavior>(&self) -> impl Iterator<Item = (NodeKey, &B)> + '_ {
        self.iter().filter_map(|(k, n)| n.behavior::<B>().map(|b| (k, b)))
    }

    /// Typed access to a node's behavior
    ///
    /// Returns None while that behavior's own hook is running.
    pub fn behavior<B: NodeBehavior>(&self, key: NodeKey) -> Option<&B> {
        self.nodes.get(key).and_then(|n| n.behavior::<B>())
    }

    pub fn behavior_mut<B: NodeBehavior>(&mut self, key: NodeKey) -> Option<&mut B> {
        self.nodes.get_mut(key).and_then(|n| n.behavior_mut::<B>())
    }

    /// World-space shape of a spatial node (collision geometry or attached shape)
    pub fn world_shape(&self, key: NodeKey) -> Option<Shape> {
        self.nodes.get(key).and_then(|n| n.world_shape())
    }

    /// A body's collision shape: its first enabled direct collision child
    pub fn collision_shape_of(&self, body: NodeKey) -> Option<NodeKey> {
        self.children(body).iter().copied().find(|&c| {
            self.nodes
                .get(c)
                .filter(|n| n.is_live())
                .and_then(|n| n.collision_shape())
                .is_some_and(|s| s.is_enabled())
        })
    }

    /// Live, enabled collision shapes in world space, skipping `exclude`'s subtree
    pub fn enabled_collision_shapes(&self, exclude: Option<NodeKey>) -> Vec<(NodeKey, CollisionShape)> {
        self.iter()
            .filter(|&(k, _)| match exclude {
                Some(ex) => k != ex && !self.is_ancestor_of(ex, k),
                None => true,
            })
            .filter_map(|(k, n)| n.world_collision_shape().map(|c| (k, c)))
            .filter(|(_, c)| c.is_enabled())
            .collect()
    }

    /// Enabled collision shapes containing `point`
    pub fn shapes_at_point(&self, point: Vec2) -> Vec<NodeKey> {
        self.enabled_collision_shapes(None)
            .into_iter()
            .filter(|(_, c)| c.contains(point))
            .map(|(k, _)| k)
            .collect()
    }

    /// Enabled collision shapes overlapping a world-space shape
    pub fn overlapping_shapes(&self, shape: &Shape, exclude: Option<NodeKey>) -> Vec<NodeKey> {
        self.enabled_collision_shapes(exclude)
            .into_iter()
            .filter(|(_, c)| c.intersects(shape))
            .map(|(k, _)| k)
            .collect()
    }

    /// Closest ray hit among enabled collision shapes
    ///
    /// `direction` must be unit length.
    pub fn ray_cast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_length: f32,
        exclude: Option<NodeKey>,
    ) -> Option<(NodeKey, RayHit)> {
        let candidates = self.enabled_collision_shapes(exclude);
        closest_hit(
            origin,
            direction,
            max_length,
            candidates.iter().map(|(k, c)| (*k, &c.shape)),
        )
    }

    // --- Passes ---

    /// Logic pass: run every live node's `update` hook
    pub fn update(&mut self, dt: f32) -> Result<(), GraphError> {
        self.apply_pending()?;
        // Hooks can only queue mutations, so the live list is stable here
        let mut i = 0;
        while i < self.live.len() {
            let key = self.live[i];
            self.run_hook(key, |behavior, ctx| behavior.update(ctx, dt));
            i += 1;
        }
        self.apply_pending()
    }

    /// Fixed-step physics pass: `physics_update` hooks, then kinematic movement
    pub fn physics_update(&mut self, fixed_dt: f32) -> Result<(), GraphError> {
        self.apply_pending()?;
        let mut i = 0;
        while i < self.live.len() {
            let key = self.live[i];
            self.run_hook(key, |behavior, ctx| behavior.physics_update(ctx, fixed_dt));
            if self.nodes.get(key).is_some_and(|n| n.tag() == NodeKindTag::KinematicBody) {
                self.step_body(key, fixed_dt);
            }
            i += 1;
        }
        self.apply_pending()
    }

    /// Draw pass: push sprite requests and run `draw` hooks
    pub fn submit_draw(&self, sink: &mut dyn DrawSink) {
        for &key in &self.live {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            if let Some(spatial) = &node.spatial {
                if let Some(sprite) = spatial.sprite.as_ref().filter(|s| s.visible) {
                    sink.submit(sprite.request(spatial.global));
                }
            }
            if let Some(behavior) = &node.behavior {
                behavior.draw(&DrawContext::new(self, key), sink);
            }
        }
    }

    /// Resolve one kinematic step for `key` and apply the displacement
    fn step_body(&mut self, key: NodeKey, dt: f32) {
        let obstacles: Vec<Obstacle<NodeKey>> = self
            .enabled_collision_shapes(Some(key))
            .into_iter()
            .map(|(k, collider)| {
                let position = self.global_position(k).unwrap_or(Vec2::ZERO);
                Obstacle::new(k, collider, position)
            })
            .collect();
        let collider = self
            .collision_shape_of(key)
            .and_then(|c| self.nodes.get(c))
            .and_then(|n| n.world_collision_shape())
            .map(|c| c.shape);
        let config = self.kinematic.clone();

        let Some(body) = self.nodes.get_mut(key).and_then(|n| n.kinematic_body_mut()) else {
            return;
        };
        let ride = body.platform_displacement(&obstacles);
        let collider = collider.map(|s| s.translated(ride));
        if collider.is_none() {
            debug!("Kinematic body {:?} has no collision shape; moving without collision", key);
        }
        let motion = body.step(dt, collider.as_ref(), &obstacles, &config);

        let total = ride + motion;
        if total != Vec2::ZERO {
            self.translate_global(key, total);
        }
    }

    /// Run a hook with the node's behavior detached for the duration
    fn run_hook(&mut self, key: NodeKey, hook: impl FnOnce(&mut dyn NodeBehavior, &mut NodeContext<'_>)) {
        let Some(mut behavior) = self.nodes.get_mut(key).and_then(|n| n.behavior.take()) else {
            return;
        };
        hook(behavior.as_mut(), &mut NodeContext::new(self, key));
        if let Some(node) = self.nodes.get_mut(key) {
            node.behavior = Some(behavior);
        }
    }
}
