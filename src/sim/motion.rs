//! Positional state shared by every moving entity
//!
//! Clamping happens inside the setters, so a `Motion` can never be observed
//! outside its bounds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::bounded;
use crate::consts::HOMING_DIVISOR;

/// Facing used by the renderer to mirror images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

/// Rectangle an entity is confined to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            top: f32::MIN,
            right: f32::MAX,
            bottom: f32::MAX,
            left: f32::MIN,
        }
    }
}

/// Partial bounds, merged field by field over existing bounds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundsPatch {
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,
}

impl From<Bounds> for BoundsPatch {
    fn from(b: Bounds) -> Self {
        Self {
            top: Some(b.top),
            right: Some(b.right),
            bottom: Some(b.bottom),
            left: Some(b.left),
        }
    }
}

/// Homing target; each axis is independent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

/// Motion component: position, velocity, size and bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Motion {
    pos: Vec2,
    prev: Vec2,
    center: Vec2,
    vel: Vec2,
    width: f32,
    height: f32,
    radius: f32,
    pub speed: f32,
    pub direction: Direction,
    target: Target,
    bounds: Bounds,
    pub active: bool,
}

impl Motion {
    /// Create a motion at `pos`, clamped into `bounds`. A zero speed falls back to 1.
    pub fn new(pos: Vec2, width: f32, height: f32, speed: f32, bounds: Bounds) -> Self {
        let mut motion = Self {
            pos,
            prev: pos,
            center: pos + Vec2::new(width / 2.0, height / 2.0),
            vel: Vec2::ZERO,
            width,
            height,
            radius: (width + height) / 4.0,
            speed: if speed == 0.0 { 1.0 } else { speed },
            direction: Direction::Right,
            target: Target::default(),
            bounds,
            active: true,
        };
        // Initial placement obeys the same clamp as every later mutation
        motion.set_position(pos.x, pos.y);
        motion.prev = motion.pos;
        motion.vel = Vec2::ZERO;
        motion
    }

    pub fn x(&self) -> f32 {
        self.pos.x
    }

    pub fn y(&self) -> f32 {
        self.pos.y
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn prev(&self) -> Vec2 {
        self.prev
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn vel(&self) -> Vec2 {
        self.vel
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Step by `(dx, dy)` scaled by speed and `time_scale`, plus any homing pull.
    ///
    /// A positive `dx` faces the entity Left and a negative one Right; the
    /// renderer's mirroring depends on this orientation.
    pub fn move_by(&mut self, dx: f32, dy: f32, time_scale: f32) {
        let mut nx = if dx == 0.0 {
            self.pos.x
        } else {
            self.pos.x + dx * self.speed * time_scale
        };
        let mut ny = if dy == 0.0 {
            self.pos.y
        } else {
            self.pos.y + dy * self.speed * time_scale
        };

        if let Some(tx) = self.target.x {
            if tx != self.pos.x {
                nx += (tx - self.pos.x) / HOMING_DIVISOR * self.speed;
            }
        }
        if let Some(ty) = self.target.y {
            if ty != self.pos.y {
                ny += (ty - self.pos.y) / HOMING_DIVISOR * self.speed;
            }
        }

        self.set_x(nx);
        self.set_y(ny);

        if dx < 0.0 {
            self.direction = Direction::Right;
        }
        if dx > 0.0 {
            self.direction = Direction::Left;
        }
    }

    /// Merge a partial homing target over the current one
    pub fn set_target(&mut self, x: Option<f32>, y: Option<f32>) {
        if x.is_some() {
            self.target.x = x;
        }
        if y.is_some() {
            self.target.y = y;
        }
    }

    pub fn clear_target(&mut self) {
        self.target = Target::default();
    }

    pub fn set_x(&mut self, nx: f32) {
        let x = bounded(nx, self.bounds.left, self.bounds.right - self.width);
        self.prev.x = self.pos.x;
        self.pos.x = x;
        self.center.x = x + self.width / 2.0;
        self.vel.x = self.pos.x - self.prev.x;
    }

    pub fn set_y(&mut self, ny: f32) {
        let y = bounded(ny, self.bounds.top, self.bounds.bottom - self.height);
        self.prev.y = self.pos.y;
        self.pos.y = y;
        self.center.y = y + self.height / 2.0;
        self.vel.y = self.pos.y - self.prev.y;
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.set_x(x);
        self.set_y(y);
    }

    /// Resize, keeping the position clamped against the new extent
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.radius = (width + height) / 4.0;
        let (x, y) = (self.pos.x, self.pos.y);
        self.set_position(x, y);
    }

    /// Merge a partial rectangle over the current bounds
    pub fn set_bounds(&mut self, patch: impl Into<BoundsPatch>) {
        let patch = patch.into();
        self.bounds = Bounds {
            top: patch.top.unwrap_or(self.bounds.top),
            right: patch.right.unwrap_or(self.bounds.right),
            bottom: patch.bottom.unwrap_or(self.bounds.bottom),
            left: patch.left.unwrap_or(self.bounds.left),
        };
    }

    /// True when `point` falls strictly inside the entity rectangle
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.pos.x
            && point.x < self.pos.x + self.width
            && point.y > self.pos.y
            && point.y < self.pos.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arena() -> Bounds {
        Bounds {
            top: 0.0,
            right: 400.0,
            bottom: 800.0,
            left: 0.0,
        }
    }

    #[test]
    fn test_move_scales_by_speed_and_time() {
        let mut m = Motion::new(Vec2::new(100.0, 100.0), 20.0, 20.0, 5.0, arena());
        m.move_by(0.0, 1.0, 0.5);
        assert_eq!(m.y(), 102.5);
        assert_eq!(m.x(), 100.0);
        assert_eq!(m.vel(), Vec2::new(0.0, 2.5));
        assert_eq!(m.center(), Vec2::new(110.0, 112.5));
    }

    #[test]
    fn test_direction_convention() {
        let mut m = Motion::new(Vec2::new(100.0, 100.0), 20.0, 20.0, 1.0, arena());
        m.move_by(1.0, 0.0, 1.0);
        assert_eq!(m.direction, Direction::Left);
        m.move_by(-1.0, 0.0, 1.0);
        assert_eq!(m.direction, Direction::Right);
        // Vertical movement keeps the facing
        m.move_by(0.0, 1.0, 1.0);
        assert_eq!(m.direction, Direction::Right);
    }

    #[test]
    fn test_homing_pull_is_gradual() {
        let mut m = Motion::new(Vec2::new(0.0, 0.0), 10.0, 10.0, 10.0, arena());
        m.set_target(Some(200.0), None);
        m.move_by(0.0, 0.0, 1.0);
        // (200 - 0) / 1000 * 10
        assert!((m.x() - 2.0).abs() < 1e-5);
        assert_eq!(m.y(), 0.0);
    }

    #[test]
    fn test_set_target_merges() {
        let mut m = Motion::new(Vec2::ZERO, 10.0, 10.0, 1.0, arena());
        m.set_target(Some(5.0), None);
        m.set_target(None, Some(7.0));
        assert_eq!(m.target(), Target { x: Some(5.0), y: Some(7.0) });
    }

    #[test]
    fn test_setters_clamp_into_bounds() {
        let mut m = Motion::new(Vec2::new(10.0, 10.0), 50.0, 40.0, 1.0, arena());
        m.set_x(1000.0);
        assert_eq!(m.x(), 350.0);
        m.set_y(-30.0);
        assert_eq!(m.y(), 0.0);
        assert_eq!(m.vel().y, -10.0);
    }

    #[test]
    fn test_constructor_clamps() {
        let m = Motion::new(Vec2::new(-50.0, 900.0), 50.0, 40.0, 1.0, arena());
        assert_eq!(m.pos(), Vec2::new(0.0, 760.0));
        assert_eq!(m.vel(), Vec2::ZERO);
    }

    #[test]
    fn test_set_bounds_merges_partial() {
        let mut m = Motion::new(Vec2::ZERO, 10.0, 10.0, 1.0, arena());
        m.set_bounds(BoundsPatch {
            bottom: Some(500.0),
            ..Default::default()
        });
        let b = m.bounds();
        assert_eq!(b.bottom, 500.0);
        assert_eq!(b.right, 400.0);
        assert_eq!(b.top, 0.0);
    }

    #[test]
    fn test_radius_derived_from_size() {
        let mut m = Motion::new(Vec2::ZERO, 30.0, 10.0, 1.0, arena());
        assert_eq!(m.radius(), 10.0);
        m.set_size(50.0, 50.0);
        assert_eq!(m.radius(), 25.0);
    }

    proptest! {
        #[test]
        fn prop_moves_never_leave_bounds(
            start_x in -500.0f32..900.0,
            start_y in -500.0f32..1300.0,
            steps in proptest::collection::vec((-5.0f32..5.0, -5.0f32..5.0, 0.0f32..3.0), 1..40),
            target_x in proptest::option::of(-1000.0f32..1000.0),
        ) {
            let bounds = arena();
            let mut m = Motion::new(Vec2::new(start_x, start_y), 40.0, 30.0, 7.0, bounds);
            m.set_target(target_x, None);
            for (dx, dy, scale) in steps {
                m.move_by(dx, dy, scale);
                prop_assert!(m.x() >= bounds.left && m.x() <= bounds.right - m.width());
                prop_assert!(m.y() >= bounds.top && m.y() <= bounds.bottom - m.height());
            }
        }
    }
}
