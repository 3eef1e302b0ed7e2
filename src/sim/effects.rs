//! Particle effects
//!
//! Each effect owns a list of particles that decay every tick. Emitters
//! resolve their fixed-or-range fields once, when the effect is built. An
//! effect stays active until a tick finds its particle list empty; the
//! engine then drops it with a retain pass.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::renderer::{Hsla, Surface};

/// A scalar that is either fixed or sampled uniformly from `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Spread {
    Fixed(f32),
    Range(f32, f32),
}

impl Spread {
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match *self {
            Spread::Fixed(v) => v,
            Spread::Range(a, b) => {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                if lo == hi { lo } else { rng.random_range(lo..=hi) }
            }
        }
    }
}

impl From<f32> for Spread {
    fn from(v: f32) -> Self {
        Spread::Fixed(v)
    }
}

impl From<[f32; 2]> for Spread {
    fn from([min, max]: [f32; 2]) -> Self {
        Spread::Range(min, max)
    }
}

/// Point burst emitter
#[derive(Debug, Clone, PartialEq)]
pub struct SparkEmitter {
    pub count: usize,
    pub x: Spread,
    pub y: Spread,
    pub vx: Spread,
    pub vy: Spread,
    pub radius: Spread,
    pub color: Hsla,
    /// Per-tick radius decay
    pub burn: f32,
}

impl SparkEmitter {
    pub fn at(x: impl Into<Spread>, y: impl Into<Spread>, color: Hsla) -> Self {
        Self {
            count: 10,
            x: x.into(),
            y: y.into(),
            vx: Spread::Range(-10.0, 10.0),
            vy: Spread::Range(-10.0, 10.0),
            radius: Spread::Range(1.0, 3.0),
            color,
            burn: 0.01,
        }
    }
}

/// Expanding ring emitter
#[derive(Debug, Clone, PartialEq)]
pub struct WaveEmitter {
    pub x: f32,
    pub y: f32,
    pub width: Spread,
    pub color: Hsla,
    /// Percent; divided by 100 to get the per-tick rate
    pub burn: Spread,
}

impl WaveEmitter {
    pub fn at(x: f32, y: f32, color: Hsla) -> Self {
        Self {
            x,
            y,
            width: Spread::Fixed(25.0),
            color,
            burn: Spread::Fixed(100.0),
        }
    }
}

/// Curved translucent sheet emitter (splash and shimmer)
#[derive(Debug, Clone, PartialEq)]
pub struct SheetEmitter {
    pub x: f32,
    pub y: f32,
    pub width: Spread,
    pub height: Spread,
    pub color: Hsla,
    /// Hue override in degrees; `None` keeps the hue of `color`
    pub hue: Option<Spread>,
    /// Percent; divided by 100 to get the per-tick rate
    pub burn: Spread,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shard {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Hsla,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    pub center: Vec2,
    pub radius: f32,
    pub width: f32,
    pub color: Hsla,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
    pub color: Hsla,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Spark,
    Burn,
    Splash,
    Shimmer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Particles {
    Shards(Vec<Shard>),
    Waves(Vec<Wave>),
    Sheets(Vec<Sheet>),
}

impl Particles {
    pub fn len(&self) -> usize {
        match self {
            Particles::Shards(v) => v.len(),
            Particles::Waves(v) => v.len(),
            Particles::Sheets(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decaying batch of particles
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    kind: EffectKind,
    burn: f32,
    active: bool,
    particles: Particles,
}

impl Effect {
    pub fn spark<R: Rng + ?Sized>(emitter: &SparkEmitter, rng: &mut R) -> Self {
        let shards = (0..emitter.count)
            .map(|_| Shard {
                pos: Vec2::new(emitter.x.resolve(rng), emitter.y.resolve(rng)),
                vel: Vec2::new(emitter.vx.resolve(rng), emitter.vy.resolve(rng)),
                radius: emitter.radius.resolve(rng),
                color: emitter.color,
            })
            .collect();
        Self {
            kind: EffectKind::Spark,
            burn: emitter.burn,
            active: true,
            particles: Particles::Shards(shards),
        }
    }

    pub fn burn<R: Rng + ?Sized>(emitter: &WaveEmitter, rng: &mut R) -> Self {
        let wave = Wave {
            center: Vec2::new(emitter.x, emitter.y),
            radius: 25.0,
            width: emitter.width.resolve(rng),
            color: emitter.color,
        };
        Self {
            kind: EffectKind::Burn,
            burn: emitter.burn.resolve(rng) / 100.0,
            active: true,
            particles: Particles::Waves(vec![wave]),
        }
    }

    pub fn splash<R: Rng + ?Sized>(emitter: &SheetEmitter, rng: &mut R) -> Self {
        Self::sheet(EffectKind::Splash, emitter, rng)
    }

    pub fn shimmer<R: Rng + ?Sized>(emitter: &SheetEmitter, rng: &mut R) -> Self {
        Self::sheet(EffectKind::Shimmer, emitter, rng)
    }

    fn sheet<R: Rng + ?Sized>(kind: EffectKind, emitter: &SheetEmitter, rng: &mut R) -> Self {
        let mut color = emitter.color.with_alpha(1.0);
        if let Some(hue) = emitter.hue {
            color.h = hue.resolve(rng);
        }
        let sheet = Sheet {
            origin: Vec2::new(emitter.x, emitter.y),
            width: emitter.width.resolve(rng),
            height: emitter.height.resolve(rng),
            color,
        };
        Self {
            kind,
            burn: emitter.burn.resolve(rng) / 100.0,
            active: true,
            particles: Particles::Sheets(vec![sheet]),
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    /// Advance one tick, drop extinct particles and draw the survivors
    pub fn tick(&mut self, frame: u64, surface: &mut dyn Surface) {
        if !self.active {
            return;
        }
        if self.particles.is_empty() {
            self.active = false;
            return;
        }

        let burn = self.burn;
        let frame = frame as f32;
        match &mut self.particles {
            Particles::Shards(shards) => {
                shards.retain_mut(|s| {
                    s.pos.x += s.vel.x * (frame * s.vel.x / 120.0).cos();
                    s.pos.y += s.vel.y;
                    s.radius = (s.radius - burn).abs();
                    s.color.h -= burn * 5.0;
                    s.radius >= 1.0
                });
                for s in shards.iter() {
                    surface.fill_circle(s.pos.trunc(), s.radius.trunc(), s.color);
                }
            }
            Particles::Waves(waves) => {
                waves.retain_mut(|w| {
                    w.radius = (w.radius + burn * 5.0).max(0.0);
                    w.color.h -= burn / 2.0;
                    w.width -= burn / 2.0;
                    w.color.a -= burn * 0.1;
                    w.color.a >= 0.0
                });
                for w in waves.iter() {
                    surface.stroke_circle(w.center.trunc(), w.radius.trunc(), w.width, w.color);
                }
            }
            Particles::Sheets(sheets) => {
                let kind = self.kind;
                sheets.retain_mut(|s| match kind {
                    EffectKind::Shimmer => {
                        s.color.a = (frame / 60.0).cos().abs() / 4.0 + 0.15;
                        s.width -= burn;
                        s.width >= 1.0
                    }
                    _ => {
                        s.color.a -= burn;
                        s.color.a >= 0.0
                    }
                });
                for s in sheets.iter() {
                    surface.fill_sheet(s.origin, s.width, s.height, s.color);
                }
            }
        }
    }
}

/// Owns the live effects and the generator their emitters sample from
#[derive(Debug, Clone)]
pub struct EffectEngine {
    rng: Pcg32,
    effects: Vec<Effect>,
}

impl EffectEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            effects: Vec::new(),
        }
    }

    pub fn spark(&mut self, emitter: &SparkEmitter) {
        let effect = Effect::spark(emitter, &mut self.rng);
        self.push(effect);
    }

    pub fn burn(&mut self, emitter: &WaveEmitter) {
        let effect = Effect::burn(emitter, &mut self.rng);
        self.push(effect);
    }

    pub fn splash(&mut self, emitter: &SheetEmitter) {
        let effect = Effect::splash(emitter, &mut self.rng);
        self.push(effect);
    }

    pub fn shimmer(&mut self, emitter: &SheetEmitter) {
        let effect = Effect::shimmer(emitter, &mut self.rng);
        self.push(effect);
    }

    pub fn push(&mut self, effect: Effect) {
        log::debug!("Effect {:?} started", effect.kind);
        self.effects.push(effect);
    }

    /// Tick every effect, then keep only the ones still active
    pub fn tick(&mut self, frame: u64, surface: &mut dyn Surface) {
        for effect in self.effects.iter_mut() {
            effect.tick(frame, surface);
        }
        self.effects.retain(Effect::is_active);
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, DrawList, NullSurface};
    use crate::renderer::color::palette;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(9)
    }

    #[test]
    fn test_spread_resolves_within_range() {
        let mut rng = rng();
        for _ in 0..100 {
            let v = Spread::Range(-2.0, 2.0).resolve(&mut rng);
            assert!((-2.0..=2.0).contains(&v));
        }
        assert_eq!(Spread::Range(3.0, 3.0).resolve(&mut rng), 3.0);
        assert_eq!(Spread::Fixed(7.0).resolve(&mut rng), 7.0);
    }

    #[test]
    fn test_spread_deserializes_scalar_or_pair() {
        let fixed: Spread = serde_json::from_str("5").unwrap();
        let range: Spread = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(fixed, Spread::Fixed(5.0));
        assert_eq!(range, Spread::Range(1.0, 2.0));
    }

    #[test]
    fn test_spark_deactivates_on_tick_after_last_shard() {
        let mut emitter = SparkEmitter::at(10.0, 10.0, palette::SPARK);
        emitter.count = 1;
        emitter.radius = Spread::Fixed(1.5);
        emitter.burn = 1.0;
        let mut effect = Effect::spark(&emitter, &mut rng());
        let mut surface = NullSurface;

        effect.tick(0, &mut surface);
        assert!(effect.particles().is_empty());
        assert!(effect.is_active());

        effect.tick(1, &mut surface);
        assert!(!effect.is_active());

        let snapshot = effect.clone();
        effect.tick(2, &mut surface);
        assert_eq!(effect, snapshot);
    }

    #[test]
    fn test_spark_shard_motion() {
        let mut emitter = SparkEmitter::at(10.0, 20.0, palette::SPARK);
        emitter.count = 1;
        emitter.vx = Spread::Fixed(2.0);
        emitter.vy = Spread::Fixed(-3.0);
        emitter.radius = Spread::Fixed(3.0);
        emitter.burn = 0.5;
        let mut effect = Effect::spark(&emitter, &mut rng());
        let mut surface = DrawList::new();
        effect.tick(0, &mut surface);

        let Particles::Shards(shards) = effect.particles() else {
            panic!("expected shards");
        };
        // cos(0) = 1
        assert_eq!(shards[0].pos, Vec2::new(12.0, 17.0));
        assert_eq!(shards[0].radius, 2.5);
        assert_eq!(shards[0].color.h, palette::SPARK.h - 2.5);
        assert!(matches!(
            surface.commands.last(),
            Some(DrawCommand::Circle { radius, .. }) if *radius == 2.0
        ));
    }

    #[test]
    fn test_burn_wave_fades_out() {
        let emitter = WaveEmitter::at(50.0, 50.0, palette::BURN);
        let mut effect = Effect::burn(&emitter, &mut rng());
        let mut surface = NullSurface;

        for frame in 0..9 {
            effect.tick(frame, &mut surface);
        }
        let Particles::Waves(waves) = effect.particles() else {
            panic!("expected waves");
        };
        assert_eq!(waves.len(), 1);
        assert_eq!(waves[0].radius, 25.0 + 9.0 * 5.0);
        assert_eq!(waves[0].width, 25.0 - 9.0 * 0.5);

        for frame in 9..12 {
            effect.tick(frame, &mut surface);
        }
        assert!(effect.particles().is_empty());
        effect.tick(12, &mut surface);
        assert!(!effect.is_active());
    }

    #[test]
    fn test_splash_alpha_decay() {
        let emitter = SheetEmitter {
            x: 0.0,
            y: 100.0,
            width: Spread::Fixed(80.0),
            height: Spread::Fixed(20.0),
            color: palette::SPLASH,
            hue: None,
            burn: Spread::Fixed(40.0),
        };
        let mut effect = Effect::splash(&emitter, &mut rng());
        let mut surface = NullSurface;
        // 1.0 -> 0.6 -> 0.2 -> -0.2
        effect.tick(0, &mut surface);
        effect.tick(1, &mut surface);
        assert_eq!(effect.particles().len(), 1);
        effect.tick(2, &mut surface);
        assert!(effect.particles().is_empty());
        assert!(effect.is_active());
        effect.tick(3, &mut surface);
        assert!(!effect.is_active());
    }

    #[test]
    fn test_sheet_hue_resolved_once_per_effect() {
        let emitter = SheetEmitter {
            x: 0.0,
            y: 100.0,
            width: Spread::Fixed(80.0),
            height: Spread::Fixed(20.0),
            color: palette::SPLASH,
            hue: Some(Spread::Range(300.0, 350.0)),
            burn: Spread::Fixed(10.0),
        };
        let mut rng = rng();
        for _ in 0..20 {
            let effect = Effect::splash(&emitter, &mut rng);
            match effect.particles() {
                Particles::Sheets(sheets) => {
                    let color = sheets[0].color;
                    assert!((300.0..=350.0).contains(&color.h));
                    assert_eq!((color.s, color.l), (palette::SPLASH.s, palette::SPLASH.l));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_shimmer_oscillates_and_shrinks() {
        let emitter = SheetEmitter {
            x: 0.0,
            y: 100.0,
            width: Spread::Fixed(3.0),
            height: Spread::Fixed(20.0),
            color: palette::SHIMMER,
            hue: None,
            burn: Spread::Fixed(100.0),
        };
        let mut effect = Effect::shimmer(&emitter, &mut rng());
        let mut surface = DrawList::new();
        effect.tick(0, &mut surface);
        match surface.commands.last() {
            Some(DrawCommand::Sheet { width, color, .. }) => {
                assert_eq!(*width, 2.0);
                assert!((color.a - 0.4).abs() < 1e-6);
            }
            other => panic!("unexpected {other:?}"),
        }
        effect.tick(1, &mut surface);
        effect.tick(2, &mut surface);
        assert!(effect.particles().is_empty());
        effect.tick(3, &mut surface);
        assert!(!effect.is_active());
    }

    #[test]
    fn test_engine_retains_only_active_effects() {
        let mut engine = EffectEngine::new(1);
        let mut quick = SparkEmitter::at(0.0, 0.0, palette::SPARK);
        quick.count = 2;
        quick.radius = Spread::Fixed(1.0);
        quick.burn = 0.5;
        engine.spark(&quick);
        engine.burn(&WaveEmitter::at(0.0, 0.0, palette::BURN));
        assert_eq!(engine.len(), 2);

        let mut surface = NullSurface;
        engine.tick(0, &mut surface);
        assert_eq!(engine.len(), 2);
        // Empty spark list is observed on the second tick and removed the same tick
        engine.tick(1, &mut surface);
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.effects()[0].kind(), EffectKind::Burn);

        for frame in 2..20 {
            engine.tick(frame, &mut surface);
        }
        assert!(engine.is_empty());
    }
}
