//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by seat)
//! - No rendering or platform dependencies

pub mod collision;
pub mod control;
pub mod economy;
pub mod outcome;
pub mod projectile;
pub mod rng;
pub mod state;
pub mod tick;

pub use collision::{ContactReport, elastic_normal_velocities, resolve_boundary, resolve_player_contacts};
pub use control::{ButtonState, ControlSample, steer};
pub use outcome::{GamePhase, MatchStatus};
pub use projectile::{FanVolley, advance_bullets, spawn_fan, spawn_ring};
pub use rng::MatchRng;
pub use state::{
    Arena, Bullet, BulletPool, DecorRing, GameEvent, GameState, Player, PlayerTuning, RingPool,
    SpawnPattern,
};
pub use tick::tick;
