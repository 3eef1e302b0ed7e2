//! Display-refresh frame scheduler
//!
//! Holds at most one pending callback. Requesting a frame stamps the frame
//! record with the elapsed time since the previous request, and derives the
//! movement scale from it so motion stays framerate independent.

use crate::consts::FRAME_SCALE_FACTOR;
use crate::platform::Clock;

/// Timing record of the most recently requested frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub count: u64,
    /// Clock reading at request time (ms)
    pub time: f64,
    /// Milliseconds since the previous request; 0 right after a resume
    pub rate: f64,
    /// `screen_scale * rate * 0.01`
    pub scale: f32,
}

pub type FrameCallback<T> = Box<dyn FnOnce(&mut T)>;

pub struct FrameScheduler<T> {
    frame: Frame,
    screen_scale: f32,
    pending: Option<FrameCallback<T>>,
    clock: Box<dyn Clock>,
}

impl<T> FrameScheduler<T> {
    pub fn new(clock: Box<dyn Clock>, screen_scale: f32) -> Self {
        let time = clock.now_ms();
        Self {
            frame: Frame {
                time,
                ..Default::default()
            },
            screen_scale,
            pending: None,
            clock,
        }
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn set_screen_scale(&mut self, screen_scale: f32) {
        self.screen_scale = screen_scale;
    }

    /// Schedule `callback` for the next refresh, replacing any pending one.
    ///
    /// `resumed` zeroes the elapsed time so a pause doesn't turn into a jump.
    pub fn request_frame(&mut self, callback: impl FnOnce(&mut T) + 'static, resumed: bool) {
        let now = self.clock.now_ms();
        let rate = if resumed { 0.0 } else { now - self.frame.time };
        self.frame = Frame {
            count: self.frame.count + 1,
            time: now,
            rate,
            scale: self.screen_scale * rate as f32 * FRAME_SCALE_FACTOR,
        };
        self.pending = Some(Box::new(callback));
    }

    /// Drop the pending callback, if any
    pub fn cancel_frame(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand the pending callback to the caller, who runs it on the owner
    pub fn take_pending(&mut self) -> Option<FrameCallback<T>> {
        self.pending.take()
    }
}

impl<T> std::fmt::Debug for FrameScheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("frame", &self.frame)
            .field("screen_scale", &self.screen_scale)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}
