//! Orb Brawl - A local multiplayer arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinetics, collisions, projectiles, match state)
//! - `driver`: Fixed-step accumulator feeding the simulation from variable frame times
//! - `params`: Match parameters and loading
//! - `replay`: Recorded input sequences for headless runs and determinism checks

pub mod driver;
pub mod params;
pub mod replay;
pub mod sim;

pub use driver::FixedStepDriver;
pub use params::{MatchParams, ParamsError};
pub use replay::{Replay, ReplayError, ReplayFrame};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (100 Hz)
    pub const SIM_DT: f32 = 1.0 / 100.0;
    /// Largest frame time accepted by the driver in one call (seconds)
    pub const MAX_FRAME_TIME: f32 = 0.25;

    /// Default arena dimensions (16:10)
    pub const ARENA_WIDTH: f32 = 1440.0;
    pub const ARENA_HEIGHT: f32 = 900.0;

    /// Bullets this far outside the arena are removed
    pub const PLAYZONE_MARGIN: f32 = 100.0;

    /// Player-player resolution passes per tick
    pub const COLLISION_PASSES: u32 = 8;
    /// Total overlap correction below which resolution stops early
    pub const COLLISION_EPSILON: f32 = 0.01;
    /// Centers closer than this use a fixed separation axis
    pub const MIN_SEPARATION: f32 = 1.0e-4;

    /// Velocity kept (and flipped) on a wall bounce
    pub const WALL_RESTITUTION: f32 = 0.6;

    /// Aim smoothing rate (applied to the shortest angular difference)
    pub const AIM_TURN_RATE: f32 = 3.0;
    /// Angular velocity gain from the per-tick aim change
    pub const ANGULAR_VELOCITY_GAIN: f32 = 10.0;
    /// Weight of the previous angular velocity in the blend
    pub const ANGULAR_VELOCITY_RETAIN: f32 = 0.5;
    /// Friction fraction while steering / while idle
    pub const STEER_FRICTION_FRACTION: f32 = 0.1;
    pub const IDLE_FRICTION_FRACTION: f32 = 1.0;

    /// Share of the player's angular velocity given to bullets as spin
    pub const BULLET_SPIN_SHARE: f32 = 0.3;
    /// Share of the shooter's velocity inherited by fan bullets
    pub const FAN_VELOCITY_INHERIT: f32 = 0.25;
    /// Share of the player's speed added to ring bullet speed
    pub const RING_VELOCITY_SHARE: f32 = 0.5;
    /// Minimum size of the burst released when a player dies
    pub const DEATH_BURST_MIN_BULLETS: usize = 32;

    /// Decorative ring pool capacity
    pub const MAX_ACTIVE_RINGS: usize = 128;
    /// Seconds for a decorative ring to expand from 0 to 1
    pub const RING_DURATION: f32 = 0.6;
    /// Undrained notifications kept by the driver; older ones are dropped
    pub const MAX_PENDING_EVENTS: usize = 1024;
    /// Cosmetic timers (seconds)
    pub const HIT_FLASH_DURATION: f32 = 0.15;
    pub const DEATH_ANIMATION_DURATION: f32 = 1.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Signed shortest rotation taking `from` onto `to`, in [-π, π)
#[inline]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Unit vector pointing along `theta`
#[inline]
pub fn direction(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Rotate a vector by `theta` radians
#[inline]
pub fn rotate(v: Vec2, theta: f32) -> Vec2 {
    Vec2::from_angle(theta).rotate(v)
}

/// Linear blend that returns `a` and `b` exactly at `t = 0` and `t = 1`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}
