//! Per-lane goals and hit detection
//!
//! A goal attempt scores every active button in the goal's lane that sits
//! inside the hit window. An attempt with no hits is a miss.

use glam::Vec2;

use super::entity::Goal;
use super::pool::{EntityPool, LaneBinding};
use super::state::{GameState, StatePatch};
use crate::consts::{GOAL_BOTTOM_OFFSET, POWER_MAX};
use crate::renderer::Surface;
use crate::tuning::HitPolicy;
use crate::Screen;

/// One scored button
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub button_id: u32,
    /// 1 at perfect alignment, 0 at the edge of the window
    pub proximity: f32,
}

/// Result of evaluating one goal attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    /// Index of the goal in its set
    pub goal: usize,
    pub hits: Vec<Hit>,
    /// State changes to merge
    pub patch: StatePatch,
}

impl Attempt {
    pub fn is_miss(&self) -> bool {
        self.hits.is_empty()
    }
}

/// The fixed set of goals, one per lane
#[derive(Debug, Clone, Default)]
pub struct GoalSet {
    goals: Vec<Goal>,
}

impl GoalSet {
    pub fn new(goals: Vec<Goal>) -> Self {
        Self { goals }
    }

    /// One goal per binding, sized like the lane's buttons and raised off the bottom edge
    pub fn build(bindings: &[LaneBinding], lane_size: f32, screen: &Screen) -> Self {
        let goals = bindings
            .iter()
            .enumerate()
            .map(|(i, binding)| {
                let (width, height) = binding.fitted_size(lane_size);
                let pos = Vec2::new(
                    binding.spawn_x(lane_size),
                    screen.bottom - height * GOAL_BOTTOM_OFFSET,
                );
                Goal::new(
                    i as u32 + 1,
                    binding.lane,
                    binding.keycode.clone(),
                    binding.image_key.clone().unwrap_or_default(),
                    pos,
                    width,
                    height,
                    screen.bounds(),
                )
            })
            .collect();
        Self { goals }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn clear(&mut self) {
        self.goals.clear();
    }

    /// Goal bound to `code`
    pub fn find_by_key(&self, code: &str) -> Option<usize> {
        self.goals
            .iter()
            .position(|g| g.keycode.as_deref() == Some(code))
    }

    /// Goal whose rectangle contains `point`
    pub fn find_at(&self, point: Vec2) -> Option<usize> {
        self.goals.iter().position(|g| g.motion.contains(point))
    }

    /// Score an attempt on goal `index` against the pool and press the goal.
    ///
    /// Hit buttons are suspended immediately; the returned patch carries the
    /// new score, power, combo and speed.
    pub fn attempt(
        &mut self,
        index: usize,
        pool: &mut EntityPool,
        state: &GameState,
        policy: &HitPolicy,
    ) -> Option<Attempt> {
        let goal = self.goals.get_mut(index)?;
        let threshold = goal.motion.height() * policy.threshold_ratio;
        let goal_y = goal.motion.y();

        let mut score = state.score;
        let mut power = state.power;
        let mut combo = state.combo;
        let mut game_speed = state.game_speed;
        let mut hits = Vec::new();

        for button in pool
            .buttons_mut()
            .iter_mut()
            .filter(|b| b.is_active() && b.lane == goal.lane)
        {
            let range = (goal_y - button.motion.y()).abs();
            if range >= threshold {
                continue;
            }
            button.suspend();
            let proximity = (range - threshold).abs() / threshold;
            score += (proximity * policy.score_scale).floor() as u32;
            power = (power + proximity * policy.power_scale).min(POWER_MAX);
            combo = 0;
            game_speed += policy.speed_ramp;
            hits.push(Hit {
                button_id: button.id,
                proximity,
            });
        }

        if hits.is_empty() {
            power = policy.penalize(power);
            log::debug!("Miss on lane {}, power {:.2}", goal.lane, power);
        } else {
            log::debug!("{} hit(s) on lane {}, score {}", hits.len(), goal.lane, score);
        }

        goal.press();

        Some(Attempt {
            goal: index,
            hits,
            patch: StatePatch {
                score: Some(score),
                power: Some(power),
                combo: Some(combo),
                game_speed: Some(game_speed),
                ..Default::default()
            },
        })
    }

    /// Recover pressed goals one step and draw them
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        for goal in self.goals.iter_mut() {
            goal.draw(surface);
        }
    }
}
