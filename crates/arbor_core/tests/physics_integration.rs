//! Integration tests for kinematic bodies in the graph
//!
//! These tests verify the graph-physics pipeline end to end:
//! 1. A body's collision shape is its first enabled collision child
//! 2. Obstacles come from every other live, enabled collision shape
//! 3. The resolved displacement moves the body and its subtree
//! 4. Contact state is visible to behaviors and queries

use arbor_core::{
    GraphManager, KinematicConfig, Node, NodeBehavior, NodeConfig, NodeContext, NodeKey, Shape,
    Vec2,
};

/// Exactly representable step so unit counts are predictable
const DT: f32 = 0.25;

/// A 10x10 box body whose top-left corner is at `position`
fn body(position: Vec2, velocity: Vec2) -> Node {
    Node::new(NodeConfig::kinematic_body(position).with_name("body").with_velocity(velocity))
        .with_child(Node::new(NodeConfig::collision_shape(Shape::rectangle(Vec2::ZERO, 10.0, 10.0))))
}

/// A static block made of a spatial node and one collision child
fn block(name: &str, position: Vec2, width: f32, height: f32) -> Node {
    Node::new(NodeConfig::spatial(position).with_name(name))
        .with_child(Node::new(NodeConfig::collision_shape(Shape::rectangle(Vec2::ZERO, width, height))))
}

/// A floor whose top surface is at y = 100
fn floor() -> Node {
    block("floor", Vec2::new(0.0, 100.0), 200.0, 10.0)
}

fn position(graph: &GraphManager, key: NodeKey) -> Vec2 {
    graph.global_position(key).expect("body should be spatial")
}

fn step_until(graph: &mut GraphManager, key: NodeKey, max_steps: usize, done: impl Fn(&GraphManager, NodeKey) -> bool) -> bool {
    for _ in 0..max_steps {
        graph.physics_update(DT).unwrap();
        if done(graph, key) {
            return true;
        }
    }
    false
}

// ==================== Movement Tests ====================

/// Fractional velocity accumulates into whole-unit moves
#[test]
fn test_sub_unit_velocity_accumulates() {
    let mut graph = GraphManager::new();
    // 1.2 * 0.25 = 0.3 units per step
    let key = graph.queue_add(body(Vec2::ZERO, Vec2::new(1.2, 0.0)));

    for _ in 0..10 {
        graph.physics_update(DT).unwrap();
    }

    assert_eq!(position(&graph, key), Vec2::new(3.0, 0.0));
}

/// A body without a collision shape still moves, unchecked
#[test]
fn test_body_without_collider_moves() {
    let mut graph = GraphManager::new();
    graph.queue_add(floor());
    let key = graph.queue_add(Node::new(
        NodeConfig::kinematic_body(Vec2::new(50.0, 95.0)).with_velocity(Vec2::new(0.0, 40.0)),
    ));

    for _ in 0..3 {
        graph.physics_update(DT).unwrap();
    }

    // Passes straight through the floor
    assert_eq!(position(&graph, key), Vec2::new(50.0, 125.0));
    assert!(!graph.kinematic_body(key).unwrap().is_on_floor());
}

/// The collision child moves with its body
#[test]
fn test_collider_follows_body() {
    let mut graph = GraphManager::new();
    let key = graph.queue_add(body(Vec2::new(10.0, 10.0), Vec2::new(8.0, 0.0)));
    graph.physics_update(DT).unwrap();

    let shape = graph.collision_shape_of(key).unwrap();
    assert_eq!(graph.global_position(shape), Some(Vec2::new(12.0, 10.0)));
    assert_eq!(graph.world_shape(shape), Some(Shape::rectangle(Vec2::new(12.0, 10.0), 10.0, 10.0)));
}

// ==================== Contact Tests ====================

/// A falling body lands one unit above the floor and reports the contact
#[test]
fn test_body_lands_on_floor() {
    let mut graph = GraphManager::new();
    let floor = graph.queue_add(floor());
    let key = graph.queue_add(body(Vec2::new(50.0, 60.0), Vec2::new(0.0, 40.0)));

    for _ in 0..20 {
        graph.physics_update(DT).unwrap();
    }

    assert_eq!(position(&graph, key), Vec2::new(50.0, 89.0));
    let state = graph.kinematic_body(key).unwrap();
    assert!(state.is_on_floor());
    assert_eq!(state.velocity, Vec2::ZERO);

    // The floor reference names the floor's collision shape node
    let floor_shape = graph.children(floor)[0];
    assert_eq!(state.floor().map(|f| f.id), Some(floor_shape));
}

/// A resting body stays on the floor thanks to the snap probe
#[test]
fn test_resting_body_stays_on_floor() {
    let mut graph = GraphManager::new();
    graph.queue_add(floor());
    let key = graph.queue_add(body(Vec2::new(50.0, 89.0), Vec2::ZERO));

    for _ in 0..5 {
        graph.physics_update(DT).unwrap();
        assert!(graph.kinematic_body(key).unwrap().is_on_floor());
    }
    assert_eq!(position(&graph, key), Vec2::new(50.0, 89.0));
}

/// Running into a wall zeroes X velocity and reports the wall normal
#[test]
fn test_wall_contact() {
    let mut graph = GraphManager::new();
    graph.queue_add(block("wall", Vec2::new(100.0, 0.0), 10.0, 200.0));
    // 2 units per step towards +X
    let key = graph.queue_add(body(Vec2::new(80.0, 50.0), Vec2::new(8.0, 0.0)));

    let hit = step_until(&mut graph, key, 20, |g, k| g.kinematic_body(k).unwrap().is_on_wall());
    assert!(hit, "body should reach the wall");

    let state = graph.kinematic_body(key).unwrap();
    assert_eq!(state.wall_normal(), Vec2::new(-1.0, 0.0));
    assert_eq!(state.velocity.x, 0.0);
    assert_eq!(position(&graph, key), Vec2::new(89.0, 50.0));
}

/// Rising fast into a block is a ceiling contact, not a floor
#[test]
fn test_ceiling_contact() {
    let mut graph = GraphManager::new();
    graph.queue_add(block("ceiling", Vec2::ZERO, 200.0, 10.0));
    // 10 units per step upwards
    let key = graph.queue_add(body(Vec2::new(50.0, 50.0), Vec2::new(0.0, -40.0)));

    let hit = step_until(&mut graph, key, 20, |g, k| g.kinematic_body(k).unwrap().is_on_ceiling());
    assert!(hit, "body should reach the ceiling");

    let state = graph.kinematic_body(key).unwrap();
    assert!(!state.is_on_floor());
    assert_eq!(state.velocity.y, 0.0);
    assert_eq!(position(&graph, key), Vec2::new(50.0, 11.0));
}

/// Disabled shapes are not obstacles
#[test]
fn test_disabled_floor_is_ignored() {
    let mut graph = GraphManager::new();
    let floor = graph.queue_add(floor());
    let key = graph.queue_add(body(Vec2::new(50.0, 89.0), Vec2::new(0.0, 40.0)));
    graph.apply_pending().unwrap();

    let floor_shape = graph.children(floor)[0];
    graph.set_collision_disabled(floor_shape, true);

    for _ in 0..5 {
        graph.physics_update(DT).unwrap();
    }
    assert_eq!(position(&graph, key), Vec2::new(50.0, 139.0));
    assert!(!graph.kinematic_body(key).unwrap().is_on_floor());
}

/// A body riding a platform is carried by the platform's movement
#[test]
fn test_body_rides_moving_platform() {
    let mut graph = GraphManager::new();
    let platform = graph.queue_add(block("platform", Vec2::new(0.0, 100.0), 50.0, 10.0));
    let key = graph.queue_add(body(Vec2::new(10.0, 89.0), Vec2::ZERO));

    graph.physics_update(DT).unwrap();
    assert!(graph.kinematic_body(key).unwrap().is_on_floor());

    graph.translate(platform, Vec2::new(5.0, 0.0));
    graph.physics_update(DT).unwrap();

    assert_eq!(position(&graph, key), Vec2::new(15.0, 89.0));
    assert!(graph.kinematic_body(key).unwrap().is_on_floor());
}

// ==================== Behavior Tests ====================

/// Applies gravity and records floor contact seen from the behavior
struct Gravity {
    acceleration: f32,
    landed: bool,
}

impl NodeBehavior for Gravity {
    fn physics_update(&mut self, ctx: &mut NodeContext<'_>, dt: f32) {
        // Contact flags here are from the previous step
        self.landed |= ctx.is_on_floor();
        let velocity = ctx.velocity() + Vec2::new(0.0, self.acceleration * dt);
        ctx.set_velocity(velocity);
    }
}

#[test]
fn test_behavior_driven_fall() {
    let mut graph = GraphManager::new();
    graph.queue_add(floor());
    let key = graph.queue_add(
        body(Vec2::new(50.0, 60.0), Vec2::ZERO).with_behavior(Gravity { acceleration: 16.0, landed: false }),
    );

    for _ in 0..30 {
        graph.physics_update(DT).unwrap();
    }

    assert_eq!(position(&graph, key), Vec2::new(50.0, 89.0));
    assert!(graph.behavior::<Gravity>(key).unwrap().landed);
}

/// Attaches a collision shape to its body on the first physics step
struct AttachCollider {
    attached: bool,
}

impl NodeBehavior for AttachCollider {
    fn physics_update(&mut self, ctx: &mut NodeContext<'_>, _dt: f32) {
        if !self.attached {
            ctx.spawn_child(Node::new(NodeConfig::collision_shape(Shape::rectangle(Vec2::ZERO, 10.0, 10.0))));
            self.attached = true;
        }
    }
}

/// A collider spawned mid-pass only collides once it is live
#[test]
fn test_collider_spawned_in_pass_waits_for_apply() {
    let mut graph = GraphManager::new();
    graph.queue_add(floor());
    let key = graph.queue_add(
        Node::new(NodeConfig::kinematic_body(Vec2::new(50.0, 89.0)).with_velocity(Vec2::new(0.0, 40.0)))
            .with_behavior(AttachCollider { attached: false }),
    );

    graph.physics_update(DT).unwrap();

    // Moved 10 units unchecked; the new shape was still pending
    assert_eq!(position(&graph, key), Vec2::new(50.0, 99.0));
    assert!(!graph.kinematic_body(key).unwrap().is_on_floor());
    assert!(graph.collision_shape_of(key).is_some());
}

#[test]
fn test_floor_tolerance_from_config() {
    let mut graph = GraphManager::with_config(KinematicConfig::new(0.0));
    graph.queue_add(floor());
    let key = graph.queue_add(body(Vec2::new(50.0, 89.0), Vec2::ZERO));

    // Without a probe distance a resting body never reports the floor
    graph.physics_update(DT).unwrap();
    assert!(!graph.kinematic_body(key).unwrap().is_on_floor());
}

// ==================== Query Tests ====================

#[test]
fn test_ray_cast_excludes_own_subtree() {
    let mut graph = GraphManager::new();
    let floor = graph.queue_add(floor());
    let key = graph.queue_add(body(Vec2::new(50.0, 50.0), Vec2::ZERO));
    graph.apply_pending().unwrap();

    let origin = Vec2::new(55.0, 55.0);
    let (hit_key, hit) = graph.ray_cast(origin, Vec2::Y, 100.0, Some(key)).unwrap();
    assert_eq!(hit_key, graph.children(floor)[0]);
    assert_eq!(hit.distance, 45.0);
    assert_eq!(hit.point, Vec2::new(55.0, 100.0));

    // Without the exclusion the body's own box is hit at the origin
    let (own, hit) = graph.ray_cast(origin, Vec2::Y, 100.0, None).unwrap();
    assert_eq!(Some(own), graph.collision_shape_of(key));
    assert_eq!(hit.distance, 0.0);

    assert!(graph.ray_cast(origin, Vec2::Y, 40.0, Some(key)).is_none());
}
