//! Game state machine
//!
//! `Game` owns the simulation and its collaborators. Each display refresh
//! runs [`Game::play`] once through the frame scheduler; input handlers run
//! strictly between frames.
//!
//! Phases: loading -> ready -> play -> over -> ready (reload) ..., with stop
//! reachable from anywhere through [`Game::destroy`]. Setup that belongs to a
//! transition runs once, when the record shows it just arrived from the
//! expected phase, and then re-applies the same phase so it won't match again.

use glam::Vec2;

use crate::assets::{AssetSource, Assets, Placeholder, load_list};
use crate::audio::{AudioOut, Playlist};
use crate::consts::ENTITY_MARGIN;
use crate::frame::{Frame, FrameScheduler};
use crate::highscores::SessionScores;
use crate::platform::overlay::{Instructions, KeyHint, Overlay, Section, Stats};
use crate::platform::storage::{self, PreferenceStore};
use crate::platform::{Clock, Control, InputEvent};
use crate::renderer::Surface;
use crate::renderer::color::palette;
use crate::settings::GameConfig;
use crate::sim::{
    EffectEngine, EntityPool, GameState, GoalSet, LaneBinding, Phase, SheetEmitter, SpawnContext,
    SpawnPolicy, SparkEmitter, Spread, StatePatch, WaveEmitter,
};
use crate::tuning::Tuning;
use crate::Screen;

/// Hue range of splash and shimmer sheets
const SHEET_HUE: Spread = Spread::Range(300.0, 350.0);

/// Host-provided I/O
pub struct Collaborators {
    pub overlay: Box<dyn Overlay>,
    pub audio: Box<dyn AudioOut>,
    pub prefs: Box<dyn PreferenceStore>,
    pub surface: Box<dyn Surface>,
    pub clock: Box<dyn Clock>,
}

pub struct Game {
    config: GameConfig,
    screen: Screen,
    state: GameState,
    scheduler: FrameScheduler<Game>,

    overlay: Box<dyn Overlay>,
    audio: Box<dyn AudioOut>,
    prefs: Box<dyn PreferenceStore>,
    surface: Box<dyn Surface>,

    assets: Assets,
    bindings: Vec<LaneBinding>,
    pool: EntityPool,
    goals: GoalSet,
    effects: EffectEngine,
    spawn: SpawnPolicy,
    playlist: Playlist,
    scores: SessionScores,

    /// Clock reading at which the post game over reload fires
    reload_at: Option<f64>,
}

impl Game {
    pub fn new(config: GameConfig, screen: Screen, io: Collaborators, seed: u64) -> Self {
        let Collaborators {
            overlay,
            audio,
            prefs,
            surface,
            clock,
        } = io;

        let state = Self::fresh_state(&config, &screen, prefs.as_ref());
        log::info!(
            "{}: {} lanes of {}px, up to {} buttons",
            config.settings.name,
            state.lanes,
            state.lane_size,
            state.max_buttons
        );

        Self {
            scheduler: FrameScheduler::new(clock, screen.scale),
            pool: EntityPool::new(state.max_buttons),
            goals: GoalSet::default(),
            effects: EffectEngine::new(seed.wrapping_add(1)),
            spawn: SpawnPolicy::new(seed),
            playlist: Playlist::new(),
            scores: SessionScores::new(),
            assets: Assets::default(),
            bindings: Vec::new(),
            reload_at: None,
            config,
            screen,
            state,
            overlay,
            audio,
            prefs,
            surface,
        }
    }

    fn fresh_state(config: &GameConfig, screen: &Screen, prefs: &dyn PreferenceStore) -> GameState {
        let muted = storage::load_muted(prefs, &config.settings.name);
        let mut state = GameState::new(config.settings.game_speed, muted);
        let lanes = config.lanes().max(1);
        let lane_size = (screen.width / lanes as f32).floor().max(1.0);
        state.lanes = config.lanes();
        state.lane_size = lane_size;
        state.max_buttons = (screen.height / lane_size).floor() as usize;
        state
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn frame(&self) -> Frame {
        self.scheduler.frame()
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    pub fn goals(&self) -> &GoalSet {
        &self.goals
    }

    pub fn effects(&self) -> &EffectEngine {
        &self.effects
    }

    pub fn scores(&self) -> &SessionScores {
        &self.scores
    }

    pub fn tuning(&self) -> &Tuning {
        &self.config.tuning
    }

    pub fn is_frame_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Load every asset, then enter ready and run the first frame
    pub fn load(&mut self, source: &mut dyn AssetSource) {
        self.overlay.show(&[Section::Loading]);
        let requests = self.config.asset_requests();
        let overlay = &mut self.overlay;
        self.assets = load_list(&requests, source, |progress| {
            overlay.set_progress(&progress.label());
        });

        self.bindings = self
            .config
            .buttons
            .iter()
            .enumerate()
            .map(|(lane, button)| {
                let key = GameConfig::button_image_key(lane);
                let image_size = self
                    .assets
                    .images
                    .get(&key)
                    .map(|image| (image.width, image.height))
                    .unwrap_or(Placeholder::Default.size());
                LaneBinding {
                    lane,
                    keycode: button.keycode.clone(),
                    image_key: Some(key),
                    image_size,
                }
            })
            .collect();

        self.transition(Phase::Ready);
        self.play();
    }

    /// Run the pending frame callback, if any. Returns false when nothing was scheduled.
    pub fn step(&mut self) -> bool {
        match self.scheduler.take_pending() {
            Some(callback) => {
                callback(self);
                true
            }
            None => false,
        }
    }

    fn request_frame(&mut self, resumed: bool) {
        self.scheduler.request_frame(|game: &mut Game| game.play(), resumed);
    }

    fn patch(&mut self, patch: StatePatch) {
        self.state.apply(patch);
    }

    /// Move to `phase` and run its entry setup
    fn transition(&mut self, phase: Phase) {
        log::info!("{} -> {}", self.state.current, phase);
        self.patch(StatePatch::phase(phase));
        self.run_entry_setup();
    }

    /// Edge-triggered setup; a no-op unless the record just arrived in its phase
    fn run_entry_setup(&mut self) {
        let current = self.state.current;
        if self.state.entered_from(Phase::Ready, &[Phase::Loading, Phase::Over]) {
            self.enter_ready();
        } else if self.state.entered_from(Phase::Play, &[Phase::Ready]) {
            self.enter_play();
        } else if self.state.entered_from(Phase::Over, &[Phase::Play]) {
            self.enter_over();
        } else {
            return;
        }
        self.patch(StatePatch::phase(current));
    }

    fn enter_ready(&mut self) {
        self.overlay.hide(&[Section::Loading]);
        self.overlay.show(&[
            Section::Banner,
            Section::Button,
            Section::Instructions,
            Section::Stats,
            Section::Mute,
            Section::Pause,
        ]);

        let settings = &self.config.settings;
        self.overlay.set_banner(&settings.name);
        self.overlay.set_button(&settings.start_text);
        let key_map = self
            .bindings
            .iter()
            .filter_map(|b| {
                let keycode = b.keycode.as_deref()?;
                Some(KeyHint::new(b.image_key.clone().unwrap_or_default(), keycode))
            })
            .collect();
        self.overlay.set_instructions(&Instructions {
            desktop: settings.instructions_desktop.clone(),
            mobile: settings.instructions_mobile.clone(),
            key_map,
        });

        self.publish_stats();
        self.overlay.set_mute(self.state.muted);
        self.overlay.set_pause(self.state.paused);
    }

    fn enter_play(&mut self) {
        self.overlay
            .hide(&[Section::Banner, Section::Button, Section::Instructions]);
        self.goals = GoalSet::build(&self.bindings, self.state.lane_size, &self.screen);
        log::debug!("Built {} goals", self.goals.len());
    }

    fn enter_over(&mut self) {
        self.overlay.show(&[Section::Banner]);
        self.overlay.set_banner(&self.config.settings.gameover_text);
        self.explode(self.screen.center);
        self.scores
            .add_score(self.state.score, self.state.game_speed);
        self.publish_stats();
        log::info!(
            "Game over: score {}, speed {:.1}",
            self.state.score,
            self.state.game_speed
        );
    }

    fn publish_stats(&mut self) {
        self.overlay.set_stats(Stats {
            score: self.state.score,
            power: self.state.power,
            best: self.scores.top_score().unwrap_or(0),
        });
    }

    /// One frame: draw, advance the current phase, tick effects, reschedule
    pub fn play(&mut self) {
        if self.state.current == Phase::Stop {
            self.scheduler.cancel_frame();
            return;
        }
        self.run_entry_setup();

        let frame = self.scheduler.frame();
        self.surface.clear(&self.config.colors.background_color);
        if self.assets.images.contains_key(GameConfig::BACKGROUND_IMAGE) {
            self.surface.draw_image(
                GameConfig::BACKGROUND_IMAGE,
                Vec2::ZERO,
                self.screen.width,
                self.screen.height,
                false,
            );
        }

        match self.state.current {
            Phase::Play => self.play_tick(frame),
            Phase::Over => self.over_tick(),
            Phase::Loading | Phase::Ready | Phase::Stop => {}
        }

        self.effects.tick(frame.count, self.surface.as_mut());

        if self.state.current == Phase::Stop || self.state.paused {
            self.scheduler.cancel_frame();
        } else {
            self.request_frame(false);
        }
    }

    fn play_tick(&mut self, frame: Frame) {
        self.publish_stats();

        if !self.state.muted && !self.state.background_music {
            self.patch(StatePatch {
                background_music: Some(true),
                ..Default::default()
            });
            let music = self.assets.sounds.get(GameConfig::BACKGROUND_MUSIC);
            self.playlist.playback(
                self.audio.as_mut(),
                GameConfig::BACKGROUND_MUSIC,
                music,
                true,
                self.state.muted,
            );
        }

        let tuning = self.config.tuning;
        let lane_size = self.state.lane_size;
        let ctx = SpawnContext {
            lane_size,
            spawn_y: tuning.spawn_y,
            congestion_factor: tuning.congestion_factor,
            speed: self.state.game_speed,
            bounds: self.screen.padded_bounds(self.entity_margin()),
        };
        let outcome = self.pool.spawn_tick(&mut self.spawn, &self.bindings, &ctx);
        log::trace!("Spawn: {:?}", outcome);

        let escaped = self.pool.update(frame.scale, self.screen.bottom);
        if escaped > 0 {
            let mut power = self.state.power;
            for _ in 0..escaped {
                power = tuning.hit.penalize(power);
            }
            log::debug!("{} button(s) escaped, power {:.2}", escaped, power);
            self.patch(StatePatch {
                power: Some(power),
                ..Default::default()
            });
        }

        self.pool.draw(self.surface.as_mut());
        self.goals.draw(self.surface.as_mut());

        if self.state.power < tuning.game_over_power {
            self.transition(Phase::Over);
        }
    }

    /// Room around the screen for buttons: enough to spawn above the top and
    /// to fall fully past the bottom, whatever the button art's aspect ratio
    fn entity_margin(&self) -> f32 {
        let lane_size = self.state.lane_size;
        let tuning = &self.config.tuning;
        let tallest = self
            .bindings
            .iter()
            .map(|b| b.fitted_size(lane_size).1)
            .fold(0.0, f32::max);
        (tallest + ENTITY_MARGIN)
            .max(lane_size * tuning.congestion_factor)
            .max(-tuning.spawn_y)
    }

    fn over_tick(&mut self) {
        if !self.effects.is_empty() {
            return;
        }
        let now = self.scheduler.now_ms();
        let delay = self.config.tuning.reload_delay_ms;
        let deadline = *self.reload_at.get_or_insert(now + delay);
        if now >= deadline {
            self.reload();
        }
    }

    /// Reset everything and go back to ready
    pub fn reload(&mut self) {
        log::info!("Reloading");
        self.playlist.stop_playlist(self.audio.as_mut());
        self.pool = EntityPool::new(self.state.max_buttons);
        self.goals.clear();
        self.effects.clear();
        self.spawn.reset();
        self.reload_at = None;
        self.state = Self::fresh_state(&self.config, &self.screen, self.prefs.as_ref());
        self.transition(Phase::Ready);
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(code) => self.handle_key_down(&code),
            InputEvent::KeyUp(_) => {}
            InputEvent::Tap { x, y } => self.handle_tap(Vec2::new(x, y)),
            InputEvent::Click(control) => self.handle_click(control),
        }
    }

    fn handle_key_down(&mut self, code: &str) {
        match self.state.current {
            Phase::Play if !self.state.paused => {
                if let Some(index) = self.goals.find_by_key(code) {
                    self.attempt(index);
                }
            }
            Phase::Ready => self.transition(Phase::Play),
            Phase::Over if self.effects.is_empty() => self.reload(),
            _ => {}
        }
    }

    fn handle_tap(&mut self, point: Vec2) {
        if self.state.current != Phase::Play || self.state.paused {
            return;
        }
        if let Some(index) = self.goals.find_at(point) {
            self.attempt(index);
        }
    }

    fn handle_click(&mut self, control: Control) {
        if matches!(self.state.current, Phase::Loading | Phase::Stop) {
            return;
        }
        match control {
            Control::Mute => self.mute(),
            Control::Pause => self.pause(),
            Control::Start => {
                if self.state.current == Phase::Ready {
                    // Toggling twice warms up audio on mobile browsers
                    self.mute();
                    self.mute();
                    self.transition(Phase::Play);
                }
            }
        }
    }

    fn attempt(&mut self, index: usize) {
        let policy = self.config.tuning.hit;
        let Some(attempt) = self
            .goals
            .attempt(index, &mut self.pool, &self.state, &policy)
        else {
            return;
        };
        self.patch(attempt.patch);

        let Some(goal) = self.goals.goals().get(index) else {
            return;
        };
        let (pos, width, height, center) = (
            goal.motion.pos(),
            goal.motion.width(),
            goal.motion.height(),
            goal.motion.center(),
        );
        let lane_x = goal.lane as f32 * self.state.lane_size;

        if attempt.is_miss() {
            self.effects.splash(&SheetEmitter {
                x: lane_x,
                y: pos.y + height,
                width: Spread::Fixed(self.state.lane_size),
                height: Spread::Fixed(self.state.lane_size / 4.0),
                color: self.config.colors.splash(),
                hue: Some(SHEET_HUE),
                burn: Spread::Range(2.0, 5.0),
            });
            return;
        }

        let colors = &self.config.colors;
        let mut spark = SparkEmitter::at([pos.x, pos.x + width], [pos.y, pos.y + height], colors.spark());
        spark.count = 25;
        spark.vx = Spread::Range(-2.0, 2.0);
        spark.vy = Spread::Range(-4.0, -1.0);
        spark.burn = 0.01;
        let burn = WaveEmitter::at(center.x, center.y, colors.burn());
        let shimmer = SheetEmitter {
            x: pos.x,
            y: pos.y + height,
            width: Spread::Fixed(width),
            height: Spread::Fixed(height / 2.0),
            color: palette::SHIMMER,
            hue: Some(SHEET_HUE),
            burn: Spread::Fixed(100.0),
        };
        self.effects.spark(&spark);
        self.effects.burn(&burn);
        self.effects.shimmer(&shimmer);
    }

    /// Blast waves and bursts at `at`
    fn explode(&mut self, at: Vec2) {
        let burn = self.config.colors.burn();
        for (width, min, max) in [(300.0, 200.0, 300.0), (150.0, 100.0, 200.0), (20.0, 50.0, 100.0)] {
            self.effects.burn(&WaveEmitter {
                x: at.x,
                y: at.y,
                width: Spread::Fixed(width),
                color: burn,
                burn: Spread::Range(min, max),
            });
        }

        let spark = self.config.colors.spark();
        for (count, vx, vy, rate) in [(100, 50.0, 5.0, 0.05), (25, 6.0, 60.0, 0.025)] {
            let mut burst = SparkEmitter::at(at.x, at.y, spark);
            burst.count = count;
            burst.vx = Spread::Range(-vx, vx);
            burst.vy = Spread::Range(-vy, vy);
            burst.burn = rate;
            self.effects.spark(&burst);
        }
    }

    /// Toggle the persisted muted flag
    pub fn mute(&mut self) {
        let name = self.config.settings.name.clone();
        let muted = !storage::load_muted(self.prefs.as_ref(), &name);
        storage::save_muted(self.prefs.as_mut(), &name, muted);
        let muted = storage::load_muted(self.prefs.as_ref(), &name);
        self.patch(StatePatch {
            muted: Some(muted),
            ..Default::default()
        });

        self.overlay.set_mute(muted);
        if muted {
            self.audio.suspend();
        } else if !self.state.paused {
            self.audio.resume();
        }
    }

    /// Toggle pause; only meaningful during play
    pub fn pause(&mut self) {
        if self.state.current != Phase::Play {
            return;
        }
        let paused = !self.state.paused;
        self.patch(StatePatch {
            paused: Some(paused),
            ..Default::default()
        });
        self.overlay.set_pause(paused);

        if paused {
            self.scheduler.cancel_frame();
            self.audio.suspend();
            self.overlay.show(&[Section::Banner]);
            self.overlay.set_banner("Paused");
        } else {
            self.request_frame(true);
            if !self.state.muted {
                self.audio.resume();
            }
            self.overlay.hide(&[Section::Banner]);
        }
    }

    /// Stop the loop and all audio; terminal
    pub fn destroy(&mut self) {
        self.transition(Phase::Stop);
        self.scheduler.cancel_frame();
        self.playlist.stop_playlist(self.audio.as_mut());
    }
}
