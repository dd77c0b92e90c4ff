//! Kinematic movement for 2D bodies
//!
//! Bodies move in whole units, one axis at a time: X first, then Y. Each unit
//! step is tested against every obstacle in order and the first overlap stops
//! movement on that axis. Fractional movement is kept in per-axis remainders
//! so slow bodies still move eventually instead of being rounded away.
//!
//! Screen-space convention: +Y is down, so "falling" is positive Y.

use arbor_math::{Shape, Vec2};
use bitflags::bitflags;
use serde::{Serialize, Deserialize};

use crate::collider::CollisionShape;

/// Default distance used by the floor snap probe and the upward-floor check
pub const DEFAULT_FLOOR_TOLERANCE: f32 = 1.0;

bitflags! {
    /// Contact state produced by the most recent step
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ContactFlags: u8 {
        /// Resting on (or landed on) a floor
        const ON_FLOOR = 1 << 0;
        /// Blocked horizontally
        const ON_WALL = 1 << 1;
        /// Blocked while rising
        const ON_CEILING = 1 << 2;
    }
}

/// Configuration for kinematic movement
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KinematicConfig {
    /// How far below the body the floor probe looks, and how much upward
    /// movement still counts as standing on a floor
    pub floor_tolerance: f32,
}

impl Default for KinematicConfig {
    fn default() -> Self {
        Self {
            floor_tolerance: DEFAULT_FLOOR_TOLERANCE,
        }
    }
}

impl KinematicConfig {
    /// Create a config with the given floor tolerance
    pub fn new(floor_tolerance: f32) -> Self {
        Self {
            floor_tolerance: floor_tolerance.max(0.0),
        }
    }
}

/// A world-space collision shape handed to the kernel
#[derive(Clone, Copy, Debug)]
pub struct Obstacle<K> {
    /// Caller-defined identifier of the shape's owner
    pub id: K,
    /// World-space collision shape
    pub collider: CollisionShape,
    /// Current world position of the obstacle (used for platform riding)
    pub position: Vec2,
}

impl<K> Obstacle<K> {
    /// Create an obstacle from an identifier, world-space shape, and position
    pub fn new(id: K, collider: CollisionShape, position: Vec2) -> Self {
        Self { id, collider, position }
    }
}

/// The floor a body rested on, and where that floor was at the time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloorContact<K> {
    pub id: K,
    pub position: Vec2,
}

/// Kinematic body state
///
/// Contact flags, wall normal, and floor reference are recomputed every step.
/// Only the remainders and the floor reference survive into the next step.
#[derive(Clone, Debug)]
pub struct KinematicBody<K> {
    /// Velocity in units per second
    pub velocity: Vec2,
    remainder: Vec2,
    floor: Option<FloorContact<K>>,
    contacts: ContactFlags,
    wall_normal: Vec2,
}

impl<K> Default for KinematicBody<K> {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl<K> KinematicBody<K> {
    /// Create a body with an initial velocity
    pub fn new(velocity: Vec2) -> Self {
        Self {
            velocity,
            remainder: Vec2::ZERO,
            floor: None,
            contacts: ContactFlags::empty(),
            wall_normal: Vec2::ZERO,
        }
    }

    /// Sub-unit movement carried into the next step
    pub fn remainder(&self) -> Vec2 {
        self.remainder
    }

    /// Contact flags from the last step
    pub fn contacts(&self) -> ContactFlags {
        self.contacts
    }

    pub fn is_on_floor(&self) -> bool {
        self.contacts.contains(ContactFlags::ON_FLOOR)
    }

    pub fn is_on_wall(&self) -> bool {
        self.contacts.contains(ContactFlags::ON_WALL)
    }

    pub fn is_on_ceiling(&self) -> bool {
        self.contacts.contains(ContactFlags::ON_CEILING)
    }

    /// Normal of the last wall hit, pointing away from the travel direction
    pub fn wall_normal(&self) -> Vec2 {
        self.wall_normal
    }

    /// Floor the body rested on during the last step
    pub fn floor(&self) -> Option<&FloorContact<K>> {
        self.floor.as_ref()
    }

    /// Add `delta` into the remainders and extract the whole-unit part
    fn accumulate(&mut self, delta: Vec2) -> Vec2 {
        self.remainder += delta;
        let whole = self.remainder.round();
        self.remainder -= whole;
        whole
    }
}

impl<K: Copy + PartialEq> KinematicBody<K> {
    /// How far the floor from the last step has moved since it was recorded
    ///
    /// Zero when there was no floor, or the floor is no longer among the
    /// obstacles (removed or disabled).
    pub fn platform_displacement(&self, obstacles: &[Obstacle<K>]) -> Vec2 {
        let Some(floor) = self.floor else {
            return Vec2::ZERO;
        };
        obstacles
            .iter()
            .find(|o| o.id == floor.id)
            .map(|o| o.position - floor.position)
            .unwrap_or(Vec2::ZERO)
    }

    /// Run one fixed physics step and return the whole-unit displacement
    ///
    /// `collider` is the body's world-space shape at its current position.
    /// Without a collider the accumulated movement is returned unchecked.
    /// The caller applies the returned displacement to the body's transform.
    pub fn step(
        &mut self,
        dt: f32,
        collider: Option<&Shape>,
        obstacles: &[Obstacle<K>],
        config: &KinematicConfig,
    ) -> Vec2 {
        self.contacts = ContactFlags::empty();
        self.wall_normal = Vec2::ZERO;
        self.floor = None;

        let intended = self.velocity * dt;
        let motion = self.accumulate(intended);

        let Some(collider) = collider else {
            return motion;
        };

        let mut shape = *collider;
        let moved_x = self.move_x(&mut shape, motion.x, obstacles);
        let moved_y = self.move_y(&mut shape, motion.y, intended.y, obstacles, config);

        if !self.is_on_floor() {
            self.probe_floor(&shape, obstacles, config);
        }

        Vec2::new(moved_x, moved_y)
    }

    fn move_x(&mut self, shape: &mut Shape, amount: f32, obstacles: &[Obstacle<K>]) -> f32 {
        let dir = amount.signum();
        let mut moved = 0.0;
        for _ in 0..amount.abs() as u32 {
            let candidate = shape.translated(Vec2::new(dir, 0.0));
            if first_hit(&candidate, obstacles).is_some() {
                self.velocity.x = 0.0;
                self.remainder.x = 0.0;
                self.contacts |= ContactFlags::ON_WALL;
                self.wall_normal = Vec2::new(-dir, 0.0);
                break;
            }
            *shape = candidate;
            moved += dir;
        }
        moved
    }

    fn move_y(
        &mut self,
        shape: &mut Shape,
        amount: f32,
        intended: f32,
        obstacles: &[Obstacle<K>],
        config: &KinematicConfig,
    ) -> f32 {
        let dir = amount.signum();
        let mut moved = 0.0;
        for _ in 0..amount.abs() as u32 {
            let candidate = shape.translated(Vec2::new(0.0, dir));
            if let Some(hit) = first_hit(&candidate, obstacles) {
                let rising = dir < 0.0;
                if !rising || -intended <= config.floor_tolerance {
                    self.land_on(hit);
                } else {
                    self.contacts |= ContactFlags::ON_CEILING;
                }
                self.velocity.y = 0.0;
                self.remainder.y = 0.0;
                break;
            }
            *shape = candidate;
            moved += dir;
        }
        moved
    }

    /// Keep `on_floor` true while standing still across the tolerance gap
    fn probe_floor(&mut self, shape: &Shape, obstacles: &[Obstacle<K>], config: &KinematicConfig) {
        let probe = shape.translated(Vec2::new(0.0, config.floor_tolerance));
        if let Some(hit) = first_hit(&probe, obstacles) {
            self.land_on(hit);
        }
    }

    fn land_on(&mut self, obstacle: &Obstacle<K>) {
        self.contacts |= ContactFlags::ON_FLOOR;
        self.floor = Some(FloorContact {
            id: obstacle.id,
            position: obstacle.position,
        });
    }
}

/// First obstacle (in order) overlapping `shape`
fn first_hit<'a, K>(shape: &Shape, obstacles: &'a [Obstacle<K>]) -> Option<&'a Obstacle<K>> {
    obstacles.iter().find(|o| o.collider.intersects(shape))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn body_shape(position: Vec2) -> Shape {
        Shape::rectangle(position, 10.0, 10.0)
    }

    fn static_block(id: u32, position: Vec2, width: f32, height: f32) -> Obstacle<u32> {
        Obstacle::new(
            id,
            CollisionShape::new(Shape::rectangle(position, width, height)),
            position,
        )
    }

    /// Step a body and track its shape, returning the final shape
    fn run(body: &mut KinematicBody<u32>, mut shape: Shape, obstacles: &[Obstacle<u32>], steps: usize, dt: f32) -> Shape {
        let config = KinematicConfig::default();
        for _ in 0..steps {
            let delta = body.step(dt, Some(&shape), obstacles, &config);
            shape.offset(delta);
        }
        shape
    }

    #[test]
    fn test_config_default() {
        let config = KinematicConfig::default();
        assert_eq!(config.floor_tolerance, DEFAULT_FLOOR_TOLERANCE);
        assert_eq!(KinematicConfig::new(-2.0).floor_tolerance, 0.0);
    }

    #[test]
    fn test_sub_unit_velocity_accumulates() {
        let mut body = KinematicBody::<u32>::new(Vec2::new(0.3, 0.0));
        let start = body_shape(Vec2::ZERO);
        let end = run(&mut body, start, &[], 10, 1.0);
        assert_eq!(end.position().x, 3.0);
        assert_eq!(end.position().y, 0.0);
    }

    #[test]
    fn test_reversal_consumes_leftover_remainder() {
        let mut body = KinematicBody::<u32>::new(Vec2::new(0.4, 0.0));
        let config = KinematicConfig::default();
        let shape = body_shape(Vec2::ZERO);

        assert_eq!(body.step(1.0, Some(&shape), &[], &config).x, 0.0);
        assert!((body.remainder().x - 0.4).abs() < 1e-6);

        body.velocity.x = -0.4;
        assert_eq!(body.step(1.0, Some(&shape), &[], &config).x, 0.0);
        assert!(body.remainder().x.abs() < 1e-6);
    }

    #[test]
    fn test_moves_without_collider() {
        let mut body = KinematicBody::<u32>::new(Vec2::new(120.0, -60.0));
        let floor = static_block(1, Vec2::new(-100.0, 0.0), 1000.0, 10.0);
        let delta = body.step(DT, None, &[floor], &KinematicConfig::default());

        assert_eq!(delta, Vec2::new(2.0, -1.0));
        assert!(body.contacts().is_empty());
    }

    #[test]
    fn test_lands_on_floor() {
        // Body bottom at y=10, floor top at y=20
        let floor = static_block(7, Vec2::new(-50.0, 20.0), 200.0, 10.0);
        let mut body = KinematicBody::new(Vec2::new(0.0, 600.0));
        let shape = run(&mut body, body_shape(Vec2::ZERO), &[floor], 1, DT);

        assert!(body.is_on_floor());
        assert!(!body.is_on_ceiling());
        assert_eq!(body.velocity.y, 0.0);
        // Touching counts as overlap, so the body stops one unit short
        assert_eq!(shape.position().y, 9.0);
        assert_eq!(body.floor().map(|f| f.id), Some(7));
    }

    #[test]
    fn test_stays_on_floor_while_standing() {
        let floor = static_block(1, Vec2::new(-50.0, 20.0), 200.0, 10.0);
        let mut body = KinematicBody::new(Vec2::new(0.0, 600.0));
        let shape = run(&mut body, body_shape(Vec2::ZERO), &[floor], 1, DT);
        assert!(body.is_on_floor());

        let shape = run(&mut body, shape, &[floor], 5, DT);
        assert!(body.is_on_floor(), "snap probe should keep the body grounded");
        assert_eq!(shape.position().y, 9.0);
    }

    #[test]
    fn test_airborne_without_floor() {
        let mut body = KinematicBody::<u32>::new(Vec2::new(0.0, 60.0));
        run(&mut body, body_shape(Vec2::ZERO), &[], 3, DT);
        assert!(!body.is_on_floor());
        assert!(body.floor().is_none());
    }

    #[test]
    fn test_hits_wall_moving_right() {
        let wall = static_block(3, Vec2::new(15.0, -50.0), 10.0, 200.0);
        let mut body = KinematicBody::new(Vec2::new(600.0, 0.0));
        let shape = run(&mut body, body_shape(Vec2::ZERO), &[wall], 1, DT);

        assert!(body.is_on_wall());
        assert_eq!(body.wall_normal(), Vec2::new(-1.0, 0.0));
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(shape.position().x, 4.0);
    }

    #[test]
    fn test_hits_wall_moving_left() {
        let wall = static_block(3, Vec2::new(-30.0, -50.0), 10.0, 200.0);
        let mut body = KinematicBody::new(Vec2::new(-1200.0, 0.0));
        run(&mut body, body_shape(Vec2::ZERO), &[wall], 1, DT);

        assert!(body.is_on_wall());
        assert_eq!(body.wall_normal(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_hits_ceiling_when_rising_fast() {
        let ceiling = static_block(2, Vec2::new(-50.0, -20.0), 200.0, 10.0);
        let mut body = KinematicBody::new(Vec2::new(0.0, -600.0));
        let shape = run(&mut body, body_shape(Vec2::ZERO), &[ceiling], 1, DT);

        assert!(body.is_on_ceiling());
        assert!(!body.is_on_floor());
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(shape.position().y, -9.0);
    }

    #[test]
    fn test_slow_rise_into_surface_counts_as_floor() {
        // Rising by exactly one unit (within tolerance) into a surface touching above
        let surface = static_block(4, Vec2::new(-50.0, -11.0), 200.0, 10.0);
        let mut body = KinematicBody::new(Vec2::new(0.0, -1.0));
        run(&mut body, body_shape(Vec2::ZERO), &[surface], 1, 1.0);

        assert!(body.is_on_floor());
        assert!(!body.is_on_ceiling());
    }

    #[test]
    fn test_disabled_obstacle_ignored() {
        let mut floor = static_block(1, Vec2::new(-50.0, 20.0), 200.0, 10.0);
        floor.collider.disabled = true;
        let mut body = KinematicBody::new(Vec2::new(0.0, 1200.0));
        let shape = run(&mut body, body_shape(Vec2::ZERO), &[floor], 1, DT);

        assert!(!body.is_on_floor());
        assert_eq!(shape.position().y, 20.0);
    }

    #[test]
    fn test_first_candidate_wins() {
        let a = static_block(10, Vec2::new(-50.0, 20.0), 200.0, 10.0);
        let b = static_block(11, Vec2::new(-50.0, 20.0), 200.0, 10.0);
        let mut body = KinematicBody::new(Vec2::new(0.0, 600.0));
        run(&mut body, body_shape(Vec2::ZERO), &[a, b], 1, DT);
        assert_eq!(body.floor().map(|f| f.id), Some(10));

        let mut body = KinematicBody::new(Vec2::new(0.0, 600.0));
        run(&mut body, body_shape(Vec2::ZERO), &[b, a], 1, DT);
        assert_eq!(body.floor().map(|f| f.id), Some(11));
    }

    #[test]
    fn test_platform_displacement() {
        let platform = static_block(5, Vec2::new(0.0, 20.0), 50.0, 5.0);
        let mut body = KinematicBody::new(Vec2::new(0.0, 600.0));
        run(&mut body, body_shape(Vec2::ZERO), &[platform], 1, DT);
        assert!(body.is_on_floor());

        let moved = static_block(5, Vec2::new(3.0, 18.0), 50.0, 5.0);
        assert_eq!(body.platform_displacement(&[moved]), Vec2::new(3.0, -2.0));
        assert_eq!(body.platform_displacement(&[]), Vec2::ZERO);
    }
}
