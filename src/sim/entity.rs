//! Gameplay entities built from the Motion and Sprite components

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::motion::{Bounds, Direction, Motion};
use crate::consts::{PRESS_SHRINK, RECOVERY_RATE};
use crate::renderer::Surface;

/// Renderable component: an image drawn over a motion rectangle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    pub image_key: String,
}

impl Sprite {
    pub fn new(image_key: impl Into<String>) -> Self {
        Self {
            image_key: image_key.into(),
        }
    }

    /// Draw at the motion's rectangle, mirrored when facing left. Inactive motions are skipped.
    pub fn draw(&self, motion: &Motion, surface: &mut dyn Surface) {
        if !motion.active {
            return;
        }
        surface.draw_image(
            &self.image_key,
            Vec2::new(motion.x().trunc(), motion.y().trunc()),
            motion.width(),
            motion.height(),
            motion.direction == Direction::Left,
        );
    }
}

/// Request to reuse a suspended button; every field is required
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecycleRequest {
    pub image_key: Option<String>,
    pub lane: Option<usize>,
    pub x: Option<f32>,
    pub y: Option<f32>,
}

/// A falling button
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Button {
    pub id: u32,
    pub motion: Motion,
    pub sprite: Sprite,
    pub lane: usize,
    pub keycode: Option<String>,
}

impl Button {
    pub fn is_active(&self) -> bool {
        self.motion.active
    }

    pub fn suspend(&mut self) {
        self.motion.active = false;
    }

    /// Reassign image, lane and position and reactivate.
    ///
    /// Returns false (leaving the button untouched) if a field is missing or
    /// the image key matches the current one.
    pub fn recycle(&mut self, request: RecycleRequest) -> bool {
        let RecycleRequest {
            image_key: Some(image_key),
            lane: Some(lane),
            x: Some(x),
            y: Some(y),
        } = request
        else {
            return false;
        };
        if image_key == self.sprite.image_key {
            return false;
        }

        self.sprite.image_key = image_key;
        self.motion.set_position(x, y);
        self.lane = lane;
        self.motion.active = true;
        true
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        self.sprite.draw(&self.motion, surface);
    }
}

/// Rest rectangle a pressed goal springs back to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A stationary per-lane target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: u32,
    pub motion: Motion,
    pub sprite: Sprite,
    pub lane: usize,
    pub keycode: Option<String>,
    rest: Rest,
}

impl Goal {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        lane: usize,
        keycode: Option<String>,
        image_key: impl Into<String>,
        pos: Vec2,
        width: f32,
        height: f32,
        bounds: Bounds,
    ) -> Self {
        let motion = Motion::new(pos, width, height, 1.0, bounds);
        let rest = Rest {
            x: motion.x(),
            y: motion.y(),
            width,
            height,
        };
        Self {
            id,
            motion,
            sprite: Sprite::new(image_key),
            lane,
            keycode,
            rest,
        }
    }

    pub fn rest(&self) -> Rest {
        self.rest
    }

    /// Squash by 1/8 and nudge the rectangle to keep it roughly centered
    pub fn press(&mut self) {
        let width = self.motion.width() - self.motion.width() / PRESS_SHRINK;
        let height = self.motion.height() - self.motion.height() / PRESS_SHRINK;
        self.motion.set_size(width, height);

        let x = self.motion.x() + width / 16.0;
        let y = self.motion.y() + height / 16.0;
        self.motion.set_position(x, y);
    }

    /// Close 10% of the gap to the rest rectangle
    pub fn recover(&mut self) {
        let rest = self.rest;
        let mut width = self.motion.width();
        let mut height = self.motion.height();
        if width < rest.width {
            width += (rest.width - width) / RECOVERY_RATE;
        }
        if height < rest.height {
            height += (rest.height - height) / RECOVERY_RATE;
        }
        self.motion.set_size(width, height);

        let mut x = self.motion.x();
        let mut y = self.motion.y();
        if x > rest.x {
            x -= (x - rest.x) / RECOVERY_RATE;
        }
        if y > rest.y {
            y -= (y - rest.y) / RECOVERY_RATE;
        }
        self.motion.set_position(x, y);
    }

    /// Recover one step, then draw
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        self.recover();
        self.sprite.draw(&self.motion, surface);
    }
}
