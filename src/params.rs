//! Match parameters
//!
//! Tuning for one match. Immutable once a match starts; a new set only takes
//! effect through a full reset.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{IDLE_FRICTION_FRACTION, SIM_DT};

/// Allowed player counts
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Render colors handed to players in seat order (RGB)
pub const PLAYER_PALETTE: [[u8; 3]; MAX_PLAYERS] = [
    [240, 120, 0],
    [0, 120, 240],
    [40, 180, 70],
    [200, 40, 160],
];

/// Errors from loading or validating match parameters
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("player count {0} outside 2..=4")]
    PlayerCount(usize),
    #[error("{0} must be at least 1")]
    Zero(&'static str),
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("bullet fade-in plus fade-out exceeds lifetime")]
    FadeWindow,
    #[error("friction {0} damps more than the whole velocity in one tick")]
    UnstableFriction(f32),
    #[error("failed to read parameters: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse parameters: {0}")]
    Json(#[from] serde_json::Error),
}

/// Match configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    pub player_count: usize,
    pub starting_health: u32,
    /// Radius of a player with zero energy
    pub minimum_radius: f32,
    /// Movement force (units/s²)
    pub acceleration: f32,
    /// Friction coefficient opposing velocity
    pub friction: f32,
    /// Catch-up multiplier at zero health
    pub comeback_strength: f32,

    // === Weapon ===
    /// Charge gained per second while the action button is held
    pub charge_rate: f32,
    /// Seconds between volleys
    pub shoot_cooldown: f32,
    /// Energy per fan bullet
    pub fan_cost: f32,
    /// Energy per ring bullet
    pub ring_cost: f32,
    pub fan_speed_uncharged: f32,
    pub fan_speed_charged: f32,
    /// Total angular spread of a volley (radians)
    pub fan_spread_uncharged: f32,
    pub fan_spread_charged: f32,
    pub fan_count_uncharged: u32,
    pub fan_count_charged: u32,
    /// Fraction of volley speed pushed back onto the shooter (scaled by alignment)
    pub recoil: f32,

    // === Bullets ===
    pub bullet_radius: f32,
    pub bullet_fade_in: f32,
    pub bullet_fade_out: f32,
    /// Lifetime at which a bullet has fully faded and is removed
    pub bullet_lifetime: f32,
    /// Per-player bullet pool size
    pub bullet_pool_capacity: usize,
    /// Base speed of ring bullets before the player's own speed is added
    pub ring_base_speed: f32,
    /// Knockback on the struck player, as a fraction of bullet speed
    pub knockback: f32,

    /// Post-impact speed that counts as a hard hit and releases a ring
    pub hard_hit_speed: f32,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            player_count: 2,
            starting_health: 30,
            minimum_radius: 30.0,
            acceleration: 800.0,
            friction: 10.0,
            comeback_strength: 1.0,

            charge_rate: 1.5,
            shoot_cooldown: 0.35,
            fan_cost: 1.5,
            ring_cost: 3.0,
            fan_speed_uncharged: 350.0,
            fan_speed_charged: 900.0,
            fan_spread_uncharged: 1.2,
            fan_spread_charged: 0.15,
            fan_count_uncharged: 7,
            fan_count_charged: 3,
            recoil: 0.25,

            bullet_radius: 18.0,
            bullet_fade_in: 0.1,
            bullet_fade_out: 0.4,
            bullet_lifetime: 3.0,
            bullet_pool_capacity: 2048,
            ring_base_speed: 400.0,
            knockback: 0.15,

            hard_hit_speed: 300.0,
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ParamsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParamsError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ParamsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ParamsError::Negative { field, value })
    }
}

impl MatchParams {
    /// Parameters for `player_count` players, everything else default
    pub fn for_players(player_count: usize) -> Self {
        Self {
            player_count,
            ..Self::default()
        }
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            return Err(ParamsError::PlayerCount(self.player_count));
        }
        if self.starting_health == 0 {
            return Err(ParamsError::Zero("starting_health"));
        }
        if self.bullet_pool_capacity == 0 {
            return Err(ParamsError::Zero("bullet_pool_capacity"));
        }
        if self.fan_count_uncharged == 0 {
            return Err(ParamsError::Zero("fan_count_uncharged"));
        }
        if self.fan_count_charged == 0 {
            return Err(ParamsError::Zero("fan_count_charged"));
        }

        positive("minimum_radius", self.minimum_radius)?;
        positive("charge_rate", self.charge_rate)?;
        positive("fan_cost", self.fan_cost)?;
        positive("ring_cost", self.ring_cost)?;
        positive("fan_speed_uncharged", self.fan_speed_uncharged)?;
        positive("fan_speed_charged", self.fan_speed_charged)?;
        positive("bullet_radius", self.bullet_radius)?;
        positive("bullet_lifetime", self.bullet_lifetime)?;
        positive("hard_hit_speed", self.hard_hit_speed)?;

        non_negative("acceleration", self.acceleration)?;
        non_negative("friction", self.friction)?;
        non_negative("comeback_strength", self.comeback_strength)?;
        non_negative("shoot_cooldown", self.shoot_cooldown)?;
        non_negative("fan_spread_uncharged", self.fan_spread_uncharged)?;
        non_negative("fan_spread_charged", self.fan_spread_charged)?;
        non_negative("recoil", self.recoil)?;
        non_negative("bullet_fade_in", self.bullet_fade_in)?;
        non_negative("bullet_fade_out", self.bullet_fade_out)?;
        non_negative("ring_base_speed", self.ring_base_speed)?;
        non_negative("knockback", self.knockback)?;

        if self.bullet_fade_in + self.bullet_fade_out > self.bullet_lifetime {
            return Err(ParamsError::FadeWindow);
        }

        // Explicit Euler damping overshoots (and diverges) past a full stop per tick
        if self.friction * IDLE_FRICTION_FRACTION * SIM_DT >= 1.0 {
            return Err(ParamsError::UnstableFriction(self.friction));
        }

        Ok(())
    }

    /// Parse from JSON (missing fields fall back to defaults) and validate
    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let json = std::fs::read_to_string(path)?;
        let params = Self::from_json(&json)?;
        log::info!("Loaded match parameters for {} players", params.player_count);
        Ok(params)
    }

    pub fn to_json(&self) -> Result<String, ParamsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
