//! Game state record and its reducer
//!
//! State is never replaced wholesale: every change is a `StatePatch` merged
//! over the current record by [`reduce`], which also remembers the phase the
//! record was in before the patch.

use serde::{Deserialize, Serialize};

use crate::consts::POWER_MAX;

/// Phase of the session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Assets are still loading
    Loading,
    /// Waiting for the first input
    Ready,
    Play,
    /// Power ran out; effects are draining
    Over,
    /// Torn down, nothing runs
    Stop,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Ready => "ready",
            Phase::Play => "play",
            Phase::Over => "over",
            Phase::Stop => "stop",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single accumulating session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub current: Phase,
    /// Phase before the most recent patch
    pub prev: Option<Phase>,
    pub score: u32,
    pub power: f32,
    pub combo: u32,
    pub game_speed: f32,
    pub paused: bool,
    pub muted: bool,
    pub lanes: usize,
    pub lane_size: f32,
    pub max_buttons: usize,
    /// Whether the background music loop has been started
    pub background_music: bool,
}

impl GameState {
    pub fn new(game_speed: f32, muted: bool) -> Self {
        Self {
            current: Phase::Loading,
            prev: None,
            score: 0,
            power: POWER_MAX,
            combo: 0,
            game_speed,
            paused: false,
            muted,
            lanes: 0,
            lane_size: 0.0,
            max_buttons: 0,
            background_music: false,
        }
    }

    /// Merge `patch` in place
    pub fn apply(&mut self, patch: StatePatch) {
        *self = reduce(self, patch);
    }

    /// True when the record just moved into `current` from one of `from`
    pub fn entered_from(&self, current: Phase, from: &[Phase]) -> bool {
        self.current == current && self.prev.is_some_and(|p| from.contains(&p))
    }
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatePatch {
    pub current: Option<Phase>,
    pub score: Option<u32>,
    pub power: Option<f32>,
    pub combo: Option<u32>,
    pub game_speed: Option<f32>,
    pub paused: Option<bool>,
    pub muted: Option<bool>,
    pub lanes: Option<usize>,
    pub lane_size: Option<f32>,
    pub max_buttons: Option<usize>,
    pub background_music: Option<bool>,
}

impl StatePatch {
    pub fn phase(current: Phase) -> Self {
        Self {
            current: Some(current),
            ..Default::default()
        }
    }
}

/// Shallow-merge `patch` over `state`; `prev` becomes the pre-patch phase
pub fn reduce(state: &GameState, patch: StatePatch) -> GameState {
    GameState {
        current: patch.current.unwrap_or(state.current),
        prev: Some(state.current),
        score: patch.score.unwrap_or(state.score),
        power: patch.power.unwrap_or(state.power),
        combo: patch.combo.unwrap_or(state.combo),
        game_speed: patch.game_speed.unwrap_or(state.game_speed),
        paused: patch.paused.unwrap_or(state.paused),
        muted: patch.muted.unwrap_or(state.muted),
        lanes: patch.lanes.unwrap_or(state.lanes),
        lane_size: patch.lane_size.unwrap_or(state.lane_size),
        max_buttons: patch.max_buttons.unwrap_or(state.max_buttons),
        background_music: patch.background_music.unwrap_or(state.background_music),
    }
}
