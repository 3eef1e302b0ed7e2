//! Presentation overlay
//!
//! Banners, buttons, stats and toggles drawn over the canvas. The game only
//! writes to the overlay; it never reads anything back.

use std::cell::RefCell;
use std::rc::Rc;

/// Overlay sections that can be shown or hidden as a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Loading,
    Banner,
    Button,
    Instructions,
    Stats,
    Mute,
    Pause,
}

/// One entry of the key map shown with the desktop instructions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHint {
    pub image_key: String,
    /// Key label with any `Key`/`Digit` prefix removed
    pub label: String,
}

impl KeyHint {
    pub fn new(image_key: impl Into<String>, keycode: &str) -> Self {
        Self {
            image_key: image_key.into(),
            label: key_label(keycode).to_string(),
        }
    }
}

/// `KeyA` -> `A`, `Digit1` -> `1`, anything else unchanged
pub fn key_label(keycode: &str) -> &str {
    keycode
        .strip_prefix("Digit")
        .or_else(|| keycode.strip_prefix("Key"))
        .unwrap_or(keycode)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructions {
    pub desktop: String,
    pub mobile: String,
    pub key_map: Vec<KeyHint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub score: u32,
    pub power: f32,
    /// Best score this session
    pub best: u32,
}

pub trait Overlay {
    fn set_banner(&mut self, text: &str);
    fn set_button(&mut self, text: &str);
    fn set_instructions(&mut self, instructions: &Instructions);
    fn set_stats(&mut self, stats: Stats);
    fn set_mute(&mut self, muted: bool);
    fn set_pause(&mut self, paused: bool);
    fn show(&mut self, sections: &[Section]);
    fn hide(&mut self, sections: &[Section]);
    /// Loading progress, e.g. `"40%"`
    fn set_progress(&mut self, text: &str);
}

/// Overlay that only logs; stats are logged at debug level since they change every frame
#[derive(Debug, Default)]
pub struct LogOverlay;

impl Overlay for LogOverlay {
    fn set_banner(&mut self, text: &str) {
        log::info!("[banner] {}", text);
    }

    fn set_button(&mut self, text: &str) {
        log::info!("[button] {}", text);
    }

    fn set_instructions(&mut self, instructions: &Instructions) {
        let keys: Vec<&str> = instructions.key_map.iter().map(|k| k.label.as_str()).collect();
        log::info!("[instructions] {} (keys: {})", instructions.desktop, keys.join(" "));
    }

    fn set_stats(&mut self, stats: Stats) {
        log::debug!("[stats] score {} power {:.1} best {}", stats.score, stats.power, stats.best);
    }

    fn set_mute(&mut self, muted: bool) {
        log::info!("[mute] {}", muted);
    }

    fn set_pause(&mut self, paused: bool) {
        log::info!("[pause] {}", paused);
    }

    fn show(&mut self, sections: &[Section]) {
        log::debug!("[show] {:?}", sections);
    }

    fn hide(&mut self, sections: &[Section]) {
        log::debug!("[hide] {:?}", sections);
    }

    fn set_progress(&mut self, text: &str) {
        log::info!("[loading] {}", text);
    }
}

/// A single recorded overlay call
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayCall {
    Banner(String),
    Button(String),
    Instructions(Instructions),
    Stats(Stats),
    Mute(bool),
    Pause(bool),
    Show(Vec<Section>),
    Hide(Vec<Section>),
    Progress(String),
}

/// Overlay that records every call; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingOverlay {
    calls: Rc<RefCell<Vec<OverlayCall>>>,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<OverlayCall> {
        self.calls.borrow().clone()
    }

    pub fn banners(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                OverlayCall::Banner(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_stats(&self) -> Option<Stats> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            OverlayCall::Stats(stats) => Some(*stats),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: OverlayCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Overlay for RecordingOverlay {
    fn set_banner(&mut self, text: &str) {
        self.record(OverlayCall::Banner(text.to_string()));
    }

    fn set_button(&mut self, text: &str) {
        self.record(OverlayCall::Button(text.to_string()));
    }

    fn set_instructions(&mut self, instructions: &Instructions) {
        self.record(OverlayCall::Instructions(instructions.clone()));
    }

    fn set_stats(&mut self, stats: Stats) {
        self.record(OverlayCall::Stats(stats));
    }

    fn set_mute(&mut self, muted: bool) {
        self.record(OverlayCall::Mute(muted));
    }

    fn set_pause(&mut self, paused: bool) {
        self.record(OverlayCall::Pause(paused));
    }

    fn show(&mut self, sections: &[Section]) {
        self.record(OverlayCall::Show(sections.to_vec()));
    }

    fn hide(&mut self, sections: &[Section]) {
        self.record(OverlayCall::Hide(sections.to_vec()));
    }

    fn set_progress(&mut self, text: &str) {
        self.record(OverlayCall::Progress(text.to_string()));
    }
}
