//! Demo platformer scene
//!
//! A floor, a wall, a patrolling one-way platform, a scripted player, and a
//! spawner that emits short-lived sparks before freeing itself. Everything is
//! driven by behaviors so the headless binary only has to run the frame loop.

use arbor_core::{
    GraphManager, Node, NodeBehavior, NodeConfig, NodeContext, NodeKey, NodeKindTag, Shape, Sprite,
    Vec2,
};

use crate::config::PhysicsConfig;

const FLOOR_POSITION: Vec2 = Vec2::new(0.0, 200.0);
const FLOOR_SIZE: Vec2 = Vec2::new(400.0, 20.0);
const WALL_POSITION: Vec2 = Vec2::new(300.0, 100.0);
const WALL_SIZE: Vec2 = Vec2::new(20.0, 100.0);
const PLATFORM_POSITION: Vec2 = Vec2::new(40.0, 165.0);
const PLATFORM_SIZE: Vec2 = Vec2::new(48.0, 8.0);
const PLATFORM_RANGE: f32 = 80.0;
const PLATFORM_SPEED: f32 = 30.0;
const PLAYER_START: Vec2 = Vec2::new(100.0, 150.0);
const PLAYER_SIZE: Vec2 = Vec2::new(12.0, 16.0);
const SPARK_TINT: [f32; 4] = [1.0, 0.8, 0.2, 1.0];
/// Seconds between scripted jumps
const JUMP_INTERVAL: f32 = 2.0;

/// Keys of the nodes the binary reports on
#[derive(Clone, Copy, Debug)]
pub struct DemoScene {
    pub root: NodeKey,
    pub player: NodeKey,
    pub platform: NodeKey,
}

/// Queue the demo scene into `graph`
///
/// Nodes become live at the graph's next `apply_pending`.
pub fn build_demo_scene(graph: &mut GraphManager, physics: &PhysicsConfig) -> DemoScene {
    let root = graph.queue_add(
        Node::new(NodeConfig::basic().with_name("level"))
            .with_child(block("floor", FLOOR_POSITION, FLOOR_SIZE, "tiles"))
            .with_child(block("wall", WALL_POSITION, WALL_SIZE, "tiles"))
            .with_child(
                Node::new(NodeConfig::basic().with_name("spawner"))
                    .with_behavior(Spawner::new(0.5, 3, Vec2::new(200.0, 120.0))),
            ),
    );

    let platform = graph.queue_add(
        Node::new(
            NodeConfig::kinematic_body(PLATFORM_POSITION)
                .with_name("platform")
                .with_parent(root)
                .with_sprite(Sprite::new("platform")),
        )
        .with_behavior(Patrol::new(PLATFORM_POSITION.x, PLATFORM_POSITION.x + PLATFORM_RANGE, PLATFORM_SPEED))
        .with_child(Node::new(
            NodeConfig::collision_shape(Shape::rectangle(Vec2::ZERO, PLATFORM_SIZE.x, PLATFORM_SIZE.y)).one_way(),
        )),
    );

    let player = graph.queue_add(
        Node::new(
            NodeConfig::kinematic_body(PLAYER_START)
                .with_name("player")
                .with_parent(root)
                .with_sprite(Sprite::new("player").with_depth(1.0)),
        )
        .with_behavior(PlayerController::new(physics, PLAYER_SIZE.y))
        .with_child(Node::new(NodeConfig::collision_shape(Shape::rectangle(
            Vec2::ZERO,
            PLAYER_SIZE.x,
            PLAYER_SIZE.y,
        )))),
    );

    DemoScene { root, player, platform }
}

/// A static block: spatial node, collision child, and sprite
fn block(name: &str, position: Vec2, size: Vec2, texture: &str) -> Node {
    Node::new(
        NodeConfig::spatial(position)
            .with_name(name)
            .with_sprite(Sprite::new(texture)),
    )
    .with_child(Node::new(NodeConfig::collision_shape(Shape::rectangle(Vec2::ZERO, size.x, size.y))))
}

/// Scripted platformer movement: walk, turn at walls, jump periodically
pub struct PlayerController {
    gravity: f32,
    walk_speed: f32,
    jump_velocity: f32,
    height: f32,
    direction: f32,
    jump_timer: f32,
    /// Jumps taken so far
    pub jumps: u32,
}

impl PlayerController {
    pub fn new(physics: &PhysicsConfig, height: f32) -> Self {
        Self {
            gravity: physics.gravity,
            walk_speed: physics.walk_speed,
            jump_velocity: physics.jump_velocity,
            height,
            direction: 1.0,
            jump_timer: 0.0,
            jumps: 0,
        }
    }

    /// One-way platforms let the player through while rising or from below
    fn update_one_way_platforms(&self, ctx: &mut NodeContext<'_>, rising: bool) {
        let feet = ctx.global_position().y + self.height;
        let graph = ctx.graph();
        let platforms: Vec<(NodeKey, f32)> = graph
            .nodes_by_kind(NodeKindTag::CollisionShape)
            .filter(|&k| graph.get(k).and_then(|n| n.collision_shape()).is_some_and(|c| c.one_way))
            .filter_map(|k| graph.world_shape(k).map(|s| (k, s.bounds().min().y)))
            .collect();

        for (key, top) in platforms {
            ctx.set_collision_disabled(key, rising || feet > top);
        }
    }
}

impl NodeBehavior for PlayerController {
    fn physics_update(&mut self, ctx: &mut NodeContext<'_>, dt: f32) {
        // Contact flags are from the previous step
        let mut velocity = ctx.velocity();
        if ctx.is_on_wall() {
            self.direction = -self.direction;
        }
        velocity.x = self.direction * self.walk_speed;

        self.jump_timer += dt;
        if ctx.is_on_floor() {
            if self.jump_timer >= JUMP_INTERVAL {
                velocity.y = -self.jump_velocity;
                self.jump_timer = 0.0;
                self.jumps += 1;
                log::debug!("Player jump #{}", self.jumps);
            } else {
                velocity.y = 0.0;
            }
        }
        velocity.y += self.gravity * dt;

        self.update_one_way_platforms(ctx, velocity.y < 0.0);
        ctx.set_velocity(velocity);
    }
}

/// Moves a body back and forth between two X positions
pub struct Patrol {
    min_x: f32,
    max_x: f32,
    speed: f32,
}

impl Patrol {
    pub fn new(min_x: f32, max_x: f32, speed: f32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            max_x: min_x.max(max_x),
            speed: speed.abs(),
        }
    }
}

impl NodeBehavior for Patrol {
    fn physics_update(&mut self, ctx: &mut NodeContext<'_>, _dt: f32) {
        let x = ctx.position().x;
        let mut velocity = ctx.velocity();
        if x <= self.min_x {
            velocity.x = self.speed;
        } else if x >= self.max_x {
            velocity.x = -self.speed;
        } else if velocity.x == 0.0 {
            // Stopped by an obstacle (or just loaded): head back towards the start
            velocity.x = -self.speed;
        }
        ctx.set_velocity(velocity);
    }
}

/// Emits sparks at a fixed interval, then frees itself
pub struct Spawner {
    interval: f32,
    remaining: u32,
    position: Vec2,
    timer: f32,
}

impl Spawner {
    pub fn new(interval: f32, count: u32, position: Vec2) -> Self {
        Self {
            interval,
            remaining: count,
            position,
            timer: 0.0,
        }
    }
}

impl NodeBehavior for Spawner {
    fn update(&mut self, ctx: &mut NodeContext<'_>, dt: f32) {
        if self.remaining == 0 {
            return;
        }
        self.timer += dt;
        if self.timer < self.interval {
            return;
        }
        self.timer -= self.interval;
        self.remaining -= 1;

        let spark = ctx.spawn(
            Node::new(
                NodeConfig::spatial(self.position)
                    .with_name("spark")
                    .with_sprite(Sprite::new("spark").with_depth(2.0).with_tint(SPARK_TINT)),
            )
            .with_behavior(Lifetime::new(0.5)),
        );
        log::debug!("Spawned spark {:?} ({} left)", spark, self.remaining);

        if self.remaining == 0 {
            log::debug!("Spawner finished");
            ctx.queue_free();
        }
    }
}

/// Frees its node after a number of seconds
pub struct Lifetime {
    remaining: f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }
}

impl NodeBehavior for Lifetime {
    fn update(&mut self, ctx: &mut NodeContext<'_>, dt: f32) {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            ctx.queue_free();
        }
    }
}
