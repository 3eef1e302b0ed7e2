//! Lane Rush - A lane-based arcade engine
//!
//! Core modules:
//! - `sim`: Simulation (motion, entity pool, goals, particle effects, state reducer)
//! - `frame`: Display-refresh frame scheduler
//! - `game`: State machine tying the simulation to its collaborators
//! - `renderer`: Drawing surface abstraction
//! - `platform`: Overlay, preference storage, input and time
//! - `assets`: Asset loading with placeholders
//! - `settings` / `tuning`: Data-driven configuration and game balance

pub mod assets;
pub mod audio;
pub mod frame;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::{Collaborators, Game};
pub use highscores::SessionScores;
pub use settings::GameConfig;
pub use tuning::Tuning;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Screen scale factor applied to the mean of canvas width and height
    pub const SCREEN_SCALE_FACTOR: f32 = 0.003;
    /// Converts a millisecond frame delta into a movement multiplier
    pub const FRAME_SCALE_FACTOR: f32 = 0.01;

    /// Falling buttons are sized to this fraction of a lane
    pub const BUTTON_LANE_RATIO: f32 = 0.75;
    /// Goals sit this many of their own heights above the screen bottom
    pub const GOAL_BOTTOM_OFFSET: f32 = 1.25;

    /// Homing correction divisor (exponential pull toward a target)
    pub const HOMING_DIVISOR: f32 = 1000.0;
    /// Pressed goals shrink by 1/PRESS_SHRINK of their size
    pub const PRESS_SHRINK: f32 = 8.0;
    /// Pressed goals recover 1/RECOVERY_RATE of the gap per draw
    pub const RECOVERY_RATE: f32 = 10.0;

    /// Extra room around the screen that falling buttons may occupy
    pub const ENTITY_MARGIN: f32 = 200.0;

    /// Upper bound for the power meter
    pub const POWER_MAX: f32 = 100.0;
}

/// Clamp `value` into `[min, max]`, favouring `min` when the range is empty
#[inline]
pub fn bounded(value: f32, min: f32, max: f32) -> f32 {
    value.min(max).max(min)
}

/// Straight-line distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Scale an image to `width`, preserving its aspect ratio
pub fn fit_width(image_width: f32, image_height: f32, width: f32) -> (f32, f32) {
    if image_width <= 0.0 {
        return (width, width);
    }
    (width, image_height * (width / image_width))
}

/// The drawable play area, derived from the canvas size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
    pub center: Vec2,
    /// Framerate normalization factor (see `frame::FrameScheduler`)
    pub scale: f32,
}

impl Screen {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            top: 0.0,
            right: width,
            bottom: height,
            left: 0.0,
            width,
            height,
            center: Vec2::new(width / 2.0, height / 2.0),
            scale: ((width + height) / 2.0) * consts::SCREEN_SCALE_FACTOR,
        }
    }

    /// Canvas width is capped at `max_width`; the top bar (if any) is taken off the height
    pub fn from_window(window_width: f32, window_height: f32, max_width: f32, top_bar: f32) -> Self {
        let width = if max_width > 0.0 {
            window_width.min(max_width)
        } else {
            window_width
        };
        Self::new(width, (window_height - top_bar).max(1.0))
    }

    pub fn bounds(&self) -> sim::Bounds {
        sim::Bounds {
            top: self.top,
            right: self.right,
            bottom: self.bottom,
            left: self.left,
        }
    }

    /// Screen bounds grown by `margin` on every side
    pub fn padded_bounds(&self, margin: f32) -> sim::Bounds {
        sim::Bounds {
            top: self.top - margin,
            right: self.right + margin,
            bottom: self.bottom + margin,
            left: self.left - margin,
        }
    }
}
