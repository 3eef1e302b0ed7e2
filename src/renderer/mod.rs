//! Rendering abstraction
//!
//! The simulation draws through the `Surface` trait; backends are supplied by
//! the host. `DrawList` records commands for headless runs and tests.

pub mod color;
pub mod surface;

pub use color::Hsla;
pub use surface::{DrawCommand, DrawList, NullSurface, Surface};
