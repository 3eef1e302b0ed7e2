//! Input events delivered to the game between frames

use glam::Vec2;

/// Overlay controls that accept clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Mute,
    Pause,
    /// The start button shown on the ready screen
    Start,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Key pressed, identified by its physical code (`KeyA`, `Digit1`, ...)
    KeyDown(String),
    KeyUp(String),
    /// Touch or click on the canvas, in canvas pixels
    Tap { x: f32, y: f32 },
    Click(Control),
}

/// On-page rectangle of the canvas element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Convert client coordinates into canvas pixels
///
/// `canvas_size` is the backing-store size, which may differ from the
/// element's CSS size.
pub fn canvas_input_position(client: Vec2, rect: CanvasRect, canvas_size: Vec2) -> Vec2 {
    let sx = if rect.width > 0.0 { canvas_size.x / rect.width } else { 1.0 };
    let sy = if rect.height > 0.0 { canvas_size.y / rect.height } else { 1.0 };
    Vec2::new((client.x - rect.left) * sx, (client.y - rect.top) * sy)
}
