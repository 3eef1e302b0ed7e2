//! Drawing surface handle shared by sprites and effects

use glam::Vec2;

use super::color::Hsla;

/// Immediate-mode 2D drawing target (a canvas, a GPU batch, or a recorder)
pub trait Surface {
    /// Fill the whole surface with a CSS color
    fn clear(&mut self, color: &str);

    /// Draw the image registered under `key`; `flip_x` mirrors it in place
    fn draw_image(&mut self, key: &str, pos: Vec2, width: f32, height: f32, flip_x: bool);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Hsla);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, line_width: f32, color: Hsla);

    /// Translucent sheet: a rectangle whose top edge is a convex curve
    fn fill_sheet(&mut self, origin: Vec2, width: f32, height: f32, color: Hsla);
}

/// A single recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(String),
    Image {
        key: String,
        pos: Vec2,
        width: f32,
        height: f32,
        flip_x: bool,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Hsla,
    },
    Ring {
        center: Vec2,
        radius: f32,
        line_width: f32,
        color: Hsla,
    },
    Sheet {
        origin: Vec2,
        width: f32,
        height: f32,
        color: Hsla,
    },
}

/// Surface that records the current frame's commands
///
/// `clear` starts a new frame, so `commands` always holds the latest one.
#[derive(Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
    frames: u64,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames started so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn images(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { .. }))
    }
}

impl Surface for DrawList {
    fn clear(&mut self, color: &str) {
        self.commands.clear();
        self.frames += 1;
        self.commands.push(DrawCommand::Clear(color.to_string()));
    }

    fn draw_image(&mut self, key: &str, pos: Vec2, width: f32, height: f32, flip_x: bool) {
        self.commands.push(DrawCommand::Image {
            key: key.to_string(),
            pos,
            width,
            height,
            flip_x,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Hsla) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, line_width: f32, color: Hsla) {
        self.commands.push(DrawCommand::Ring {
            center,
            radius,
            line_width,
            color,
        });
    }

    fn fill_sheet(&mut self, origin: Vec2, width: f32, height: f32, color: Hsla) {
        self.commands.push(DrawCommand::Sheet {
            origin,
            width,
            height,
            color,
        });
    }
}

/// Drops everything; for headless runs that only care about simulation
#[derive(Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn clear(&mut self, _color: &str) {}
    fn draw_image(&mut self, _key: &str, _pos: Vec2, _width: f32, _height: f32, _flip_x: bool) {}
    fn fill_circle(&mut self, _center: Vec2, _radius: f32, _color: Hsla) {}
    fn stroke_circle(&mut self, _center: Vec2, _radius: f32, _line_width: f32, _color: Hsla) {}
    fn fill_sheet(&mut self, _origin: Vec2, _width: f32, _height: f32, _color: Hsla) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_starts_new_frame() {
        let mut list = DrawList::new();
        list.clear("#000");
        list.fill_circle(Vec2::ZERO, 2.0, Hsla::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(list.commands.len(), 2);
        list.clear("#000");
        assert_eq!(list.commands.len(), 1);
        assert_eq!(list.frames(), 2);
    }
}
