//! Nodes and node configuration
//!
//! A [`Node`] is built from a [`NodeConfig`] (plain, serializable data that
//! external loaders fill in), optionally given a behavior and a list of
//! declared children, and then handed to the graph with
//! [`GraphManager::queue_add`](crate::GraphManager::queue_add).

use std::fmt;

use arbor_math::{Shape, Vec2};
use arbor_physics::{CollisionShape, KinematicBody};
use serde::{Serialize, Deserialize};
use slotmap::new_key_type;

use crate::behavior::NodeBehavior;
use crate::draw::Sprite;
use crate::Transform2D;

// Define generational key type for nodes
new_key_type! {
    /// Key to a node in the graph
    ///
    /// Uses generational indexing: once a node is removed its key stops
    /// resolving, even if the slot is reused by a later node.
    pub struct NodeKey;
}

/// Lifecycle state of a node stored in the graph
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    /// Queued for addition, not yet visible to passes or queries
    Pending,
    /// Loaded and visited by passes
    Live,
}

/// Kind discriminant used for type-filtered queries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKindTag {
    Basic,
    Spatial,
    CollisionShape,
    KinematicBody,
}

/// Kind-specific construction data
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum NodeKindConfig {
    /// A plain tree node without a transform
    #[default]
    Basic,
    /// A node with a transform
    Spatial,
    /// A collision shape, positioned by the node's transform
    CollisionShape(CollisionShape),
    /// A body moved by the kinematic kernel
    KinematicBody {
        #[serde(default)]
        velocity: Vec2,
    },
}

/// Serializable node configuration
///
/// This is the only place loaders put spatial and gameplay data. The parent
/// key is a runtime value and is never serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Display name (not unique; empty names are not indexed)
    #[serde(default)]
    pub name: Option<String>,
    /// Parent to attach to when queued
    #[serde(skip)]
    pub parent: Option<NodeKey>,
    #[serde(default)]
    pub kind: NodeKindConfig,
    /// Local transform (ignored for basic nodes)
    #[serde(default)]
    pub transform: Transform2D,
    /// Shape attached to a spatial node for spatial queries
    #[serde(default)]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub sprite: Option<Sprite>,
}

impl NodeConfig {
    /// A plain node
    pub fn basic() -> Self {
        Self::default()
    }

    /// A spatial node at `position`
    pub fn spatial(position: Vec2) -> Self {
        Self {
            kind: NodeKindConfig::Spatial,
            transform: Transform2D::from_position(position),
            ..Self::default()
        }
    }

    /// A collision shape; `shape` is relative to the node's position
    pub fn collision_shape(shape: Shape) -> Self {
        Self {
            kind: NodeKindConfig::CollisionShape(CollisionShape::new(shape)),
            ..Self::default()
        }
    }

    /// A kinematic body at `position`, initially at rest
    pub fn kinematic_body(position: Vec2) -> Self {
        Self {
            kind: NodeKindConfig::KinematicBody { velocity: Vec2::ZERO },
            transform: Transform2D::from_position(position),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent: NodeKey) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_transform(mut self, transform: Transform2D) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.transform.scale = scale;
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = Some(sprite);
        self
    }

    /// Initial velocity (kinematic bodies only)
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        if let NodeKindConfig::KinematicBody { velocity: v } = &mut self.kind {
            *v = velocity;
        }
        self
    }

    /// Mark a collision shape as a one-way platform
    pub fn one_way(mut self) -> Self {
        if let NodeKindConfig::CollisionShape(c) = &mut self.kind {
            c.one_way = true;
        }
        self
    }

    /// Start a collision shape disabled
    pub fn disabled(mut self) -> Self {
        if let NodeKindConfig::CollisionShape(c) = &mut self.kind {
            c.disabled = true;
        }
        self
    }
}

/// Runtime kind data
#[derive(Clone, Debug)]
pub enum NodeKind {
    Basic,
    Spatial,
    /// Collision shape in the node's local space
    CollisionShape(CollisionShape),
    KinematicBody(KinematicBody<NodeKey>),
}

impl NodeKind {
    pub fn tag(&self) -> NodeKindTag {
        match self {
            NodeKind::Basic => NodeKindTag::Basic,
            NodeKind::Spatial => NodeKindTag::Spatial,
            NodeKind::CollisionShape(_) => NodeKindTag::CollisionShape,
            NodeKind::KinematicBody(_) => NodeKindTag::KinematicBody,
        }
    }
}

impl From<NodeKindConfig> for NodeKind {
    fn from(config: NodeKindConfig) -> Self {
        match config {
            NodeKindConfig::Basic => NodeKind::Basic,
            NodeKindConfig::Spatial => NodeKind::Spatial,
            NodeKindConfig::CollisionShape(c) => NodeKind::CollisionShape(c),
            NodeKindConfig::KinematicBody { velocity } => {
                NodeKind::KinematicBody(KinematicBody::new(velocity))
            }
        }
    }
}

/// Transform data carried by every non-basic node
#[derive(Clone, Debug)]
pub(crate) struct Spatial {
    pub(crate) local: Transform2D,
    /// Derived from the ancestor chain; never set directly
    pub(crate) global: Transform2D,
    pub(crate) shape: Option<Shape>,
    pub(crate) sprite: Option<Sprite>,
}

/// A node in the graph
pub struct Node {
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) kind: NodeKind,
    pub(crate) spatial: Option<Spatial>,
    pub(crate) behavior: Option<Box<dyn NodeBehavior>>,
    /// Children attached when this node is applied
    pub(crate) declared_children: Vec<Node>,
    pub(crate) state: NodeState,
}

impl Node {
    /// Build a node from its configuration
    pub fn new(config: NodeConfig) -> Self {
        let kind = NodeKind::from(config.kind);
        let spatial = match kind {
            NodeKind::Basic => None,
            _ => Some(Spatial {
                local: config.transform,
                global: config.transform,
                shape: config.shape,
                sprite: config.sprite,
            }),
        };
        Self {
            name: config.name.filter(|n| !n.is_empty()),
            parent: config.parent,
            children: Vec::new(),
            kind,
            spatial,
            behavior: None,
            declared_children: Vec::new(),
            state: NodeState::Pending,
        }
    }

    /// Attach a behavior whose hooks run during graph passes
    pub fn with_behavior<B: NodeBehavior>(mut self, behavior: B) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Declare a child that is attached when this node is applied
    pub fn with_child(mut self, child: Node) -> Self {
        self.declared_children.push(child);
        self
    }

    /// Declare several children at once
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.declared_children.extend(children);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Children in attachment order
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn tag(&self) -> NodeKindTag {
        self.kind.tag()
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == NodeState::Live
    }

    pub fn is_spatial(&self) -> bool {
        self.spatial.is_some()
    }

    /// Local transform (None for basic nodes)
    pub fn local_transform(&self) -> Option<Transform2D> {
        self.spatial.as_ref().map(|s| s.local)
    }

    /// Global transform (None for basic nodes)
    pub fn global_transform(&self) -> Option<Transform2D> {
        self.spatial.as_ref().map(|s| s.global)
    }

    /// Local-space shape: the collision shape's geometry, or the attached shape
    pub fn shape(&self) -> Option<&Shape> {
        match &self.kind {
            NodeKind::CollisionShape(c) => Some(&c.shape),
            _ => self.spatial.as_ref().and_then(|s| s.shape.as_ref()),
        }
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.spatial.as_ref().and_then(|s| s.sprite.as_ref())
    }

    pub fn collision_shape(&self) -> Option<&CollisionShape> {
        match &self.kind {
            NodeKind::CollisionShape(c) => Some(c),
            _ => None,
        }
    }

    pub fn kinematic_body(&self) -> Option<&KinematicBody<NodeKey>> {
        match &self.kind {
            NodeKind::KinematicBody(body) => Some(body),
            _ => None,
        }
    }

    pub(crate) fn kinematic_body_mut(&mut self) -> Option<&mut KinematicBody<NodeKey>> {
        match &mut self.kind {
            NodeKind::KinematicBody(body) => Some(body),
            _ => None,
        }
    }

    /// Downcast this node's behavior
    pub fn behavior<B: NodeBehavior>(&self) -> Option<&B> {
        self.behavior.as_deref().and_then(|b| b.as_any().downcast_ref::<B>())
    }

    /// Mutably downcast this node's behavior
    pub fn behavior_mut<B: NodeBehavior>(&mut self) -> Option<&mut B> {
        self.behavior.as_deref_mut().and_then(|b| b.as_any_mut().downcast_mut::<B>())
    }

    /// World-space shape at the node's global position
    pub(crate) fn world_shape(&self) -> Option<Shape> {
        let position = self.global_transform()?.position;
        self.shape().map(|s| s.translated(position))
    }

    /// World-space collision shape (flags preserved)
    pub(crate) fn world_collision_shape(&self) -> Option<CollisionShape> {
        let position = self.global_transform()?.position;
        self.collision_shape().map(|c| c.placed_at(position))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("has_behavior", &self.behavior.is_some())
            .finish_non_exhaustive()
    }
}
