//! Spawning and in-place recycling of falling buttons
//!
//! Buttons are never destroyed: once the pool reaches capacity, suspended
//! buttons are reused for new spawns.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Button, RecycleRequest, Sprite};
use super::motion::{Bounds, Motion};
use crate::consts::BUTTON_LANE_RATIO;
use crate::renderer::Surface;
use crate::{distance, fit_width};

/// A lane's input binding and artwork
#[derive(Debug, Clone, PartialEq)]
pub struct LaneBinding {
    pub lane: usize,
    pub keycode: Option<String>,
    pub image_key: Option<String>,
    /// Natural image size, used to keep the aspect ratio when fitting to the lane
    pub image_size: (f32, f32),
}

impl LaneBinding {
    /// Button size for a lane of `lane_size` pixels
    pub fn fitted_size(&self, lane_size: f32) -> (f32, f32) {
        fit_width(
            self.image_size.0,
            self.image_size.1,
            lane_size * BUTTON_LANE_RATIO,
        )
    }

    /// Left edge of a button in this lane
    pub fn spawn_x(&self, lane_size: f32) -> f32 {
        let (width, _) = self.fitted_size(lane_size);
        self.lane as f32 * lane_size + width / 8.0
    }
}

/// Seeded uniform lane picker that refuses to pick the same lane twice in a row
#[derive(Debug, Clone)]
pub struct SpawnPolicy {
    rng: Pcg32,
    last_pick: Option<usize>,
}

impl SpawnPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            last_pick: None,
        }
    }

    /// Pick a lane for this tick. `None` when there are no lanes or the pick
    /// repeats the previous tick's; the pick is remembered either way.
    pub fn pick(&mut self, lanes: usize) -> Option<usize> {
        if lanes == 0 {
            return None;
        }
        let lane = self.rng.random_range(0..lanes);
        let duplicate = self.last_pick == Some(lane);
        self.last_pick = Some(lane);
        if duplicate { None } else { Some(lane) }
    }

    pub fn last_pick(&self) -> Option<usize> {
        self.last_pick
    }

    pub fn reset(&mut self) {
        self.last_pick = None;
    }
}

/// What a spawn attempt did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// Pool is already at its active limit
    Full,
    /// Lane pick repeated the previous tick
    Duplicate,
    /// Candidate too close to an active button
    Congested,
    Added(u32),
    Recycled(u32),
    /// Recycle request was rejected or nothing was suspended
    Skipped,
}

/// Per-tick spawn parameters
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext {
    pub lane_size: f32,
    pub spawn_y: f32,
    pub congestion_factor: f32,
    pub speed: f32,
    pub bounds: Bounds,
}

/// Ordered, capacity-bounded collection of falling buttons
#[derive(Debug, Clone)]
pub struct EntityPool {
    buttons: Vec<Button>,
    capacity: usize,
    next_id: u32,
}

impl EntityPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            buttons: Vec::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn buttons_mut(&mut self) -> &mut [Button] {
        &mut self.buttons
    }

    pub fn active_count(&self) -> usize {
        self.buttons.iter().filter(|b| b.is_active()).count()
    }

    pub fn active_in_lane(&self, lane: usize) -> impl Iterator<Item = &Button> {
        self.buttons
            .iter()
            .filter(move |b| b.is_active() && b.lane == lane)
    }

    pub fn clear(&mut self) {
        self.buttons.clear();
    }

    /// Insert a prebuilt button; refused once the pool is at capacity
    pub fn push(&mut self, button: Button) -> bool {
        if self.buttons.len() >= self.capacity {
            return false;
        }
        self.next_id = self.next_id.max(button.id + 1);
        self.buttons.push(button);
        true
    }

    /// True when no active button is within `min_distance` of `location`
    pub fn valid_location(&self, location: Vec2, min_distance: f32) -> bool {
        !self
            .buttons
            .iter()
            .filter(|b| b.is_active())
            .any(|b| distance(b.motion.pos(), location) < min_distance)
    }

    /// Run one tick of the spawn policy
    pub fn spawn_tick(
        &mut self,
        policy: &mut SpawnPolicy,
        bindings: &[LaneBinding],
        ctx: &SpawnContext,
    ) -> SpawnOutcome {
        if self.active_count() >= self.capacity {
            return SpawnOutcome::Full;
        }

        let Some(lane) = policy.pick(bindings.len()) else {
            return SpawnOutcome::Duplicate;
        };
        let binding = &bindings[lane];

        let candidate = Vec2::new(ctx.lane_size * binding.lane as f32, ctx.spawn_y);
        if !self.valid_location(candidate, ctx.lane_size * ctx.congestion_factor) {
            return SpawnOutcome::Congested;
        }

        if self.buttons.len() < self.capacity {
            match self.add(binding, ctx) {
                Some(id) => SpawnOutcome::Added(id),
                None => SpawnOutcome::Skipped,
            }
        } else {
            match self.recycle(binding, ctx) {
                Some(id) => SpawnOutcome::Recycled(id),
                None => SpawnOutcome::Skipped,
            }
        }
    }

    fn add(&mut self, binding: &LaneBinding, ctx: &SpawnContext) -> Option<u32> {
        let image_key = binding.image_key.clone()?;
        let (width, height) = binding.fitted_size(ctx.lane_size);
        let id = self.next_id;
        self.next_id += 1;

        let motion = Motion::new(
            Vec2::new(binding.spawn_x(ctx.lane_size), ctx.spawn_y),
            width,
            height,
            ctx.speed,
            ctx.bounds,
        );
        self.buttons.push(Button {
            id,
            motion,
            sprite: Sprite::new(image_key),
            lane: binding.lane,
            keycode: binding.keycode.clone(),
        });
        log::debug!("Spawned button {} in lane {}", id, binding.lane);
        Some(id)
    }

    fn recycle(&mut self, binding: &LaneBinding, ctx: &SpawnContext) -> Option<u32> {
        let button = self.buttons.iter_mut().find(|b| !b.is_active())?;
        let request = RecycleRequest {
            image_key: binding.image_key.clone(),
            lane: Some(binding.lane),
            x: Some(binding.spawn_x(ctx.lane_size)),
            y: Some(ctx.spawn_y),
        };
        if !button.recycle(request) {
            return None;
        }
        // Recycled buttons pick up the current difficulty
        button.motion.speed = ctx.speed;
        button.keycode = binding.keycode.clone();
        log::debug!("Recycled button {} into lane {}", button.id, binding.lane);
        Some(button.id)
    }

    /// Advance every active button by one tick of downward drift.
    ///
    /// Buttons that pass `bottom` are suspended; the count of those is returned.
    /// A button whose bounds stop it short of `bottom` escapes on reaching that floor.
    pub fn update(&mut self, time_scale: f32, bottom: f32) -> usize {
        let mut escaped = 0;
        for button in self.buttons.iter_mut().filter(|b| b.is_active()) {
            button.motion.move_by(0.0, 1.0, time_scale);
            let y = button.motion.y();
            let floor = button.motion.bounds().bottom - button.motion.height();
            if y > bottom || (floor <= bottom && y >= floor) {
                button.suspend();
                escaped += 1;
            }
        }
        escaped
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        for button in &self.buttons {
            button.draw(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bindings(lanes: usize) -> Vec<LaneBinding> {
        (0..lanes)
            .map(|lane| LaneBinding {
                lane,
                keycode: Some(format!("Digit{}", lane + 1)),
                image_key: Some(format!("button{}Image", lane + 1)),
                image_size: (100.0, 100.0),
            })
            .collect()
    }

    fn ctx() -> SpawnContext {
        SpawnContext {
            lane_size: 100.0,
            spawn_y: -200.0,
            congestion_factor: 2.0,
            speed: 10.0,
            bounds: Bounds {
                top: -200.0,
                right: 600.0,
                bottom: 1200.0,
                left: -200.0,
            },
        }
    }

    #[test]
    fn test_spawn_x_offsets_into_lane() {
        let b = &bindings(4)[0];
        assert_eq!(b.fitted_size(100.0), (75.0, 75.0));
        assert_eq!(b.spawn_x(100.0), 9.375);
        assert_eq!(bindings(4)[2].spawn_x(100.0), 209.375);
    }

    #[test]
    fn test_policy_skips_repeated_pick() {
        let mut policy = SpawnPolicy::new(7);
        let mut previous = None;
        for _ in 0..200 {
            let pick = policy.pick(2);
            let last = policy.last_pick();
            if let Some(lane) = pick {
                assert_ne!(Some(lane), previous);
            } else {
                assert_eq!(last, previous);
            }
            previous = last;
        }
    }

    #[test]
    fn test_policy_is_deterministic() {
        let mut a = SpawnPolicy::new(42);
        let mut b = SpawnPolicy::new(42);
        for _ in 0..50 {
            assert_eq!(a.pick(4), b.pick(4));
        }
    }

    #[test]
    fn test_policy_single_lane_alternates() {
        let mut policy = SpawnPolicy::new(1);
        assert_eq!(policy.pick(1), Some(0));
        assert_eq!(policy.pick(1), None);
        assert_eq!(policy.pick(0), None);
    }

    #[test]
    fn test_spawn_adds_first_button() {
        let mut pool = EntityPool::new(8);
        let mut policy = SpawnPolicy::new(3);
        let outcome = pool.spawn_tick(&mut policy, &bindings(4), &ctx());
        assert!(matches!(outcome, SpawnOutcome::Added(1)));
        let button = &pool.buttons()[0];
        assert!(button.is_active());
        assert_eq!(button.motion.y(), -200.0);
        assert_eq!(button.motion.x(), button.lane as f32 * 100.0 + 9.375);
    }

    #[test]
    fn test_congested_candidate_rejected() {
        let mut pool = EntityPool::new(8);
        let b = bindings(2);
        let mut policy = SpawnPolicy::new(3);
        assert!(matches!(pool.spawn_tick(&mut policy, &b, &ctx()), SpawnOutcome::Added(_)));
        // Neighbouring lane candidates sit within two lane widths of the new button
        let outcome = loop {
            match pool.spawn_tick(&mut policy, &b, &ctx()) {
                SpawnOutcome::Duplicate => continue,
                other => break other,
            }
        };
        assert_eq!(outcome, SpawnOutcome::Congested);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_full_pool_refuses_spawn() {
        let mut pool = EntityPool::new(1);
        let mut policy = SpawnPolicy::new(3);
        assert!(matches!(
            pool.spawn_tick(&mut policy, &bindings(1), &ctx()),
            SpawnOutcome::Added(_)
        ));
        assert_eq!(pool.spawn_tick(&mut policy, &bindings(1), &ctx()), SpawnOutcome::Full);
    }

    #[test]
    fn test_recycles_when_at_capacity() {
        let mut pool = EntityPool::new(1);
        let b = bindings(2);
        let mut policy = SpawnPolicy::new(11);
        let first = loop {
            if let SpawnOutcome::Added(id) = pool.spawn_tick(&mut policy, &b, &ctx()) {
                break id;
            }
        };
        pool.buttons_mut()[0].suspend();
        let old_lane = pool.buttons()[0].lane;

        let mut recycled = None;
        for _ in 0..50 {
            if let SpawnOutcome::Recycled(id) = pool.spawn_tick(&mut policy, &b, &ctx()) {
                recycled = Some(id);
                break;
            }
        }
        assert_eq!(recycled, Some(first));
        assert_eq!(pool.len(), 1);
        let button = &pool.buttons()[0];
        assert!(button.is_active());
        // Same image would be a duplicate, so the lane must have changed
        assert_ne!(button.lane, old_lane);
    }

    #[test]
    fn test_missing_image_skips_spawn() {
        let mut pool = EntityPool::new(4);
        let mut b = bindings(1);
        b[0].image_key = None;
        let mut policy = SpawnPolicy::new(3);
        assert_eq!(pool.spawn_tick(&mut policy, &b, &ctx()), SpawnOutcome::Skipped);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_update_suspends_escaped_buttons() {
        let mut pool = EntityPool::new(4);
        let mut policy = SpawnPolicy::new(3);
        pool.spawn_tick(&mut policy, &bindings(1), &ctx());
        let mut escaped = 0;
        for _ in 0..200 {
            escaped += pool.update(1.0, 800.0);
        }
        assert_eq!(escaped, 1);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_tall_button_escapes_at_bounds_floor() {
        let mut pool = EntityPool::new(4);
        let mut policy = SpawnPolicy::new(3);
        let mut b = bindings(1);
        b[0].image_size = (100.0, 300.0);
        let mut c = ctx();
        // 75x225 button; its lowest y is 675, short of the 800 bottom
        c.bounds.bottom = 900.0;
        pool.spawn_tick(&mut policy, &b, &c);
        let mut escaped = 0;
        for _ in 0..200 {
            escaped += pool.update(1.0, 800.0);
        }
        assert_eq!(escaped, 1);
        assert_eq!(pool.active_count(), 0);
    }

    proptest! {
        #[test]
        fn prop_active_never_exceeds_capacity(
            seed in any::<u64>(),
            capacity in 1usize..12,
            lanes in 1usize..6,
            ticks in 1usize..300,
        ) {
            let mut pool = EntityPool::new(capacity);
            let mut policy = SpawnPolicy::new(seed);
            let b = bindings(lanes);
            let c = ctx();
            for _ in 0..ticks {
                let before = pool.active_count();
                let len_before = pool.len();
                let outcome = pool.spawn_tick(&mut policy, &b, &c);
                if let SpawnOutcome::Recycled(_) = outcome {
                    prop_assert!(pool.active_count() <= before + 1);
                    prop_assert_eq!(pool.len(), len_before);
                }
                pool.update(3.0, 800.0);
                prop_assert!(pool.len() <= capacity);
                prop_assert!(pool.active_count() <= capacity);
            }
        }
    }
}
