//! Simulation module
//!
//! Everything that moves, scores or decays lives here. This module has no
//! platform dependencies:
//! - Time enters only as a frame scale and frame counter
//! - Seeded RNG only (spawn policy, effect emitters)
//! - Drawing goes through `renderer::Surface`

pub mod effects;
pub mod entity;
pub mod goals;
pub mod motion;
pub mod pool;
pub mod state;

pub use effects::{Effect, EffectEngine, EffectKind, SheetEmitter, SparkEmitter, Spread, WaveEmitter};
pub use entity::{Button, Goal, RecycleRequest, Rest, Sprite};
pub use goals::{Attempt, GoalSet, Hit};
pub use motion::{Bounds, BoundsPatch, Direction, Motion, Target};
pub use pool::{EntityPool, LaneBinding, SpawnContext, SpawnOutcome, SpawnPolicy};
pub use state::{GameState, Phase, StatePatch, reduce};
