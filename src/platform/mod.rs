//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (`Date.now()` vs a monotonic instant)
//! - Input events
//! - Overlay presentation
//! - Storage (LocalStorage on web)

pub mod input;
pub mod overlay;
pub mod storage;
pub mod time;

pub use input::{CanvasRect, Control, InputEvent, canvas_input_position};
pub use overlay::{Instructions, KeyHint, LogOverlay, Overlay, OverlayCall, RecordingOverlay, Section, Stats};
pub use storage::{MemoryStore, PreferenceStore, hash_code};
pub use time::{Clock, ManualClock, SystemClock};
