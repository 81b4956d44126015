//! Game state and core simulation types
//!
//! Everything the renderer and audio layers read after a tick lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::economy;
use super::outcome::MatchStatus;
use super::rng::MatchRng;
use crate::consts::*;
use crate::params::{MatchParams, PLAYER_PALETTE, ParamsError};

/// Rectangular play area, origin top-left, y down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Whether a circle lies fully inside the arena (with a small tolerance)
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        const TOLERANCE: f32 = 1.0e-3;
        center.x - radius >= -TOLERANCE
            && center.x + radius <= self.width + TOLERANCE
            && center.y - radius >= -TOLERANCE
            && center.y + radius <= self.height + TOLERANCE
    }

    /// Largest radius a circle can have and still fit
    pub fn max_radius(&self) -> f32 {
        self.width.min(self.height) * 0.5
    }

    /// Nearest center that keeps a circle inside the arena
    ///
    /// An axis too short for the circle centers it on that axis.
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
            if 2.0 * radius >= extent {
                extent * 0.5
            } else {
                value.clamp(radius, extent - radius)
            }
        }
        Vec2::new(
            clamp_axis(center.x, radius, self.width),
            clamp_axis(center.y, radius, self.height),
        )
    }

    /// Whether a point has left the arena by more than `margin`
    pub fn outside_playzone(&self, point: Vec2, margin: f32) -> bool {
        point.x < -margin
            || point.x >= self.width + margin
            || point.y < -margin
            || point.y >= self.height + margin
    }
}

/// A projectile, owned by the player that fired it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Seconds since spawn
    pub lifetime: f32,
    /// Rotation applied to the velocity vector (radians/s)
    pub spin: f32,
}

impl Bullet {
    pub fn new(position: Vec2, velocity: Vec2, spin: f32) -> Self {
        Self {
            position,
            velocity,
            lifetime: 0.0,
            spin,
        }
    }

    /// Move by velocity, then curve the velocity by spin
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        if self.spin != 0.0 {
            self.velocity = crate::rotate(self.velocity, self.spin * dt);
        }
    }

    /// Render opacity from the fade-in/fade-out window
    pub fn opacity(&self, params: &MatchParams) -> f32 {
        let fade_in = if params.bullet_fade_in > 0.0 {
            (self.lifetime / params.bullet_fade_in).min(1.0)
        } else {
            1.0
        };
        let remaining = params.bullet_lifetime - self.lifetime;
        let fade_out = if params.bullet_fade_out > 0.0 {
            (remaining / params.bullet_fade_out).clamp(0.0, 1.0)
        } else if remaining > 0.0 {
            1.0
        } else {
            0.0
        };
        fade_in.min(fade_out)
    }
}

/// Fixed-capacity bullet storage
///
/// Removal swaps the last live bullet into the freed slot, so iteration order
/// is not stable across removals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulletPool {
    capacity: usize,
    bullets: Vec<Bullet>,
}

impl BulletPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            bullets: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots left
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.bullets.len())
    }

    /// Add a bullet; returns false (and drops it) when the pool is full
    pub fn push(&mut self, bullet: Bullet) -> bool {
        if self.bullets.len() >= self.capacity {
            return false;
        }
        self.bullets.push(bullet);
        true
    }

    /// Remove the bullet at `index`, moving the last one into its slot
    pub fn swap_remove(&mut self, index: usize) -> Bullet {
        self.bullets.swap_remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&Bullet> {
        self.bullets.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Bullet> {
        self.bullets.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bullet> {
        self.bullets.iter()
    }

    pub fn clear(&mut self) {
        self.bullets.clear();
    }
}

/// Expanding ring drawn at an impact (not gameplay-affecting)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecorRing {
    pub position: Vec2,
    pub owner: usize,
    pub angle: f32,
    /// 0 at spawn, removed once past 1
    pub progress: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingPool {
    rings: Vec<DecorRing>,
}

impl Default for RingPool {
    fn default() -> Self {
        Self {
            rings: Vec::with_capacity(MAX_ACTIVE_RINGS),
        }
    }
}

impl RingPool {
    /// Add a ring unless the pool is full
    pub fn spawn(&mut self, position: Vec2, owner: usize, angle: f32) -> bool {
        if self.rings.len() >= MAX_ACTIVE_RINGS {
            return false;
        }
        self.rings.push(DecorRing {
            position,
            owner,
            angle,
            progress: 0.0,
        });
        true
    }

    /// Expand every ring and drop the finished ones
    pub fn advance(&mut self, dt: f32) {
        for ring in &mut self.rings {
            ring.progress += dt / RING_DURATION;
        }
        self.rings.retain(|r| r.progress <= 1.0);
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecorRing> {
        self.rings.iter()
    }
}

/// Per-player movement tuning and render color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTuning {
    pub acceleration: f32,
    pub friction: f32,
    pub color: [u8; 3],
}

impl PlayerTuning {
    pub fn from_params(params: &MatchParams, id: usize) -> Self {
        Self {
            acceleration: params.acceleration,
            friction: params.friction,
            color: PLAYER_PALETTE[id % PLAYER_PALETTE.len()],
        }
    }
}

/// One of the circular combatants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Feeds bullet spin
    pub angular_velocity: f32,
    /// Smoothed weapon heading (radians)
    pub aim_angle: f32,
    pub health: u32,
    pub energy: f32,
    /// 0..=1, built up while the action button is held
    pub shoot_charge: f32,
    /// Simulation time before which the weapon cannot charge or fire
    pub shoot_cooldown_until: f32,
    pub hit_flash_timer: f32,
    pub death_animation_timer: f32,
    pub bullets: BulletPool,
    pub tuning: PlayerTuning,
}

impl Player {
    pub fn new(id: usize, position: Vec2, aim_angle: f32, params: &MatchParams) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            aim_angle,
            health: params.starting_health,
            energy: 0.0,
            shoot_charge: 0.0,
            shoot_cooldown_until: 0.0,
            hit_flash_timer: 0.0,
            death_animation_timer: 0.0,
            bullets: BulletPool::with_capacity(params.bullet_pool_capacity),
            tuning: PlayerTuning::from_params(params, id),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Energy-derived radius, also used as collision mass
    #[inline]
    pub fn radius(&self, params: &MatchParams) -> f32 {
        economy::effective_radius(params.minimum_radius, self.energy)
    }

    #[inline]
    pub fn comeback(&self, params: &MatchParams) -> f32 {
        economy::comeback_factor(self.health, params.starting_health, params.comeback_strength)
    }

    /// Position the renderer should draw, `fraction` of a tick ahead
    pub fn render_position(&self, fraction: f32, dt: f32) -> Vec2 {
        if self.is_alive() {
            self.position + self.velocity * (fraction * dt)
        } else {
            self.position
        }
    }

    /// Count down cosmetic timers
    pub fn tick_timers(&mut self, dt: f32) {
        self.hit_flash_timer = (self.hit_flash_timer - dt).max(0.0);
        self.death_animation_timer = (self.death_animation_timer - dt).max(0.0);
    }
}

/// Which spawn mechanism produced a burst of bullets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnPattern {
    /// Omnidirectional burst after a hard impact
    Ring,
    /// Aimed, charge-scaled volley
    Fan,
    /// Ring released by a player as it dies
    DeathBurst,
}

/// Fire-and-forget notifications for the audio/visual layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BurstFired {
        player: usize,
        pattern: SpawnPattern,
        count: usize,
    },
    RingSpawned {
        owner: usize,
        position: Vec2,
    },
    PlayerHit {
        player: usize,
        by: usize,
    },
    PlayerDied {
        player: usize,
    },
    Victory {
        player: usize,
    },
    MenuRequested {
        player: usize,
    },
}

/// Complete match state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub params: MatchParams,
    pub arena: Arena,
    pub rng: MatchRng,
    /// Elapsed simulation time (seconds)
    pub time: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Players in seat order
    pub players: Vec<Player>,
    /// Decorative rings (not gameplay-affecting)
    pub rings: RingPool,
    pub status: MatchStatus,
    /// Notifications since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Two-player match with default parameters and arena
    pub fn new(seed: u64) -> Self {
        Self::build(MatchParams::default(), Arena::default(), seed)
    }

    /// Match with custom parameters; fails if they do not validate
    pub fn with_params(params: MatchParams, arena: Arena, seed: u64) -> Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self::build(params, arena, seed))
    }

    fn build(params: MatchParams, arena: Arena, seed: u64) -> Self {
        let mut state = Self {
            params,
            arena,
            rng: MatchRng::new(seed),
            time: 0.0,
            time_ticks: 0,
            players: Vec::new(),
            rings: RingPool::default(),
            status: MatchStatus::new(),
            events: Vec::new(),
        };
        state.reset(seed);
        state
    }

    /// Reinitialize the whole match
    ///
    /// Players are spread evenly across the arena width on the center line,
    /// aiming at the center.
    pub fn reset(&mut self, seed: u64) {
        let count = self.params.player_count;
        let center = self.arena.center();

        self.players = (0..count)
            .map(|id| {
                let x = self.arena.width * (id + 1) as f32 / (count + 1) as f32;
                let position = Vec2::new(x, center.y);
                let to_center = center - position;
                let aim = crate::normalize_angle(to_center.y.atan2(to_center.x));
                Player::new(id, position, aim, &self.params)
            })
            .collect();

        self.rng = MatchRng::new(seed);
        self.time = 0.0;
        self.time_ticks = 0;
        self.rings = RingPool::default();
        self.status = MatchStatus::new();
        self.events.clear();

        log::info!("Match reset: {} players, seed {}", count, seed);
    }

    /// Replace the parameters and reset
    pub fn restart_with(&mut self, params: MatchParams, seed: u64) -> Result<(), ParamsError> {
        params.validate()?;
        self.params = params;
        self.reset(seed);
        Ok(())
    }

    /// Update the arena extent; out-of-bounds players are left for the caller
    pub fn set_arena(&mut self, width: f32, height: f32) {
        self.arena = Arena::new(width, height);
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn triumphant_player(&self) -> Option<usize> {
        self.status.triumphant_player
    }

    /// Take all notifications raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop the oldest notifications beyond `limit`; returns how many went
    pub fn trim_events(&mut self, limit: usize) -> usize {
        let excess = self.events.len().saturating_sub(limit);
        if excess > 0 {
            self.events.drain(..excess);
        }
        excess
    }

    pub fn active_bullets(&self) -> usize {
        self.players.iter().map(|p| p.bullets.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_layout() {
        let params = MatchParams::for_players(3);
        let state = GameState::with_params(params, Arena::default(), 1).expect("valid");
        assert_eq!(state.players.len(), 3);

        let xs: Vec<f32> = state.players.iter().map(|p| p.position.x).collect();
        assert!((xs[0] - 360.0).abs() < 1e-3);
        assert!((xs[1] - 720.0).abs() < 1e-3);
        assert!((xs[2] - 1080.0).abs() < 1e-3);

        for p in &state.players {
            assert_eq!(p.position.y, 450.0);
            assert_eq!(p.velocity, Vec2::ZERO);
            assert_eq!(p.energy, 0.0);
            assert_eq!(p.health, 30);
        }

        // Left player aims right, right player aims left
        assert!(state.players[0].aim_angle.abs() < 1e-6);
        assert!((state.players[2].aim_angle.abs() - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(state.triumphant_player(), None);
    }

    #[test]
    fn test_reset_clears_progress() {
        let mut state = GameState::new(5);
        state.players[0].energy = 12.0;
        state.players[1].health = 3;
        state.players[0]
            .bullets
            .push(Bullet::new(Vec2::ZERO, Vec2::X, 0.0));
        state.rings.spawn(Vec2::ZERO, 0, 0.0);
        state.time = 10.0;

        state.reset(5);
        assert_eq!(state.players[0].energy, 0.0);
        assert_eq!(state.players[1].health, 30);
        assert_eq!(state.active_bullets(), 0);
        assert!(state.rings.is_empty());
        assert_eq!(state.time, 0.0);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = MatchParams::for_players(6);
        assert!(GameState::with_params(params, Arena::default(), 0).is_err());
    }

    #[test]
    fn test_trim_events_keeps_newest() {
        let mut state = GameState::new(1);
        for player in 0..10 {
            state.events.push(GameEvent::MenuRequested { player });
        }
        assert_eq!(state.trim_events(4), 6);
        assert_eq!(state.trim_events(4), 0);
        let kept: Vec<usize> = state
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::MenuRequested { player } => Some(player),
                _ => None,
            })
            .collect();
        assert_eq!(kept, vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_bullet_pool_capacity() {
        let mut pool = BulletPool::with_capacity(2);
        assert!(pool.push(Bullet::new(Vec2::ZERO, Vec2::X, 0.0)));
        assert!(pool.push(Bullet::new(Vec2::ONE, Vec2::X, 0.0)));
        assert!(!pool.push(Bullet::new(Vec2::ONE, Vec2::X, 0.0)));
        assert_eq!(pool.remaining(), 0);

        let removed = pool.swap_remove(0);
        assert_eq!(removed.position, Vec2::ZERO);
        assert_eq!(pool.len(), 1);
        // The last bullet took the freed slot
        assert_eq!(pool.get(0).map(|b| b.position), Some(Vec2::ONE));
    }

    #[test]
    fn test_bullet_spin_curves_velocity() {
        let mut bullet = Bullet::new(Vec2::ZERO, Vec2::new(100.0, 0.0), std::f32::consts::PI);
        bullet.advance(0.5);
        assert!((bullet.position.x - 50.0).abs() < 1e-4);
        // Half a second at π rad/s is a quarter turn
        assert!(bullet.velocity.x.abs() < 1e-3);
        assert!((bullet.velocity.y - 100.0).abs() < 1e-3);
        assert!((bullet.velocity.length() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_bullet_opacity_window() {
        let params = MatchParams::default();
        let mut bullet = Bullet::new(Vec2::ZERO, Vec2::X, 0.0);
        assert_eq!(bullet.opacity(&params), 0.0);
        bullet.lifetime = 0.05;
        assert!((bullet.opacity(&params) - 0.5).abs() < 1e-5);
        bullet.lifetime = 1.0;
        assert_eq!(bullet.opacity(&params), 1.0);
        bullet.lifetime = params.bullet_lifetime - 0.2;
        assert!((bullet.opacity(&params) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_ring_pool_expires() {
        let mut rings = RingPool::default();
        rings.spawn(Vec2::ZERO, 0, 0.0);
        rings.advance(RING_DURATION * 0.5);
        assert_eq!(rings.len(), 1);
        rings.advance(RING_DURATION * 0.6);
        assert!(rings.is_empty());
    }

    #[test]
    fn test_ring_pool_caps() {
        let mut rings = RingPool::default();
        for _ in 0..MAX_ACTIVE_RINGS {
            assert!(rings.spawn(Vec2::ZERO, 0, 0.0));
        }
        assert!(!rings.spawn(Vec2::ZERO, 0, 0.0));
        assert_eq!(rings.len(), MAX_ACTIVE_RINGS);
    }

    #[test]
    fn test_clamp_circle_centers_oversized_axis() {
        let arena = Arena::new(1440.0, 900.0);
        assert_eq!(arena.max_radius(), 450.0);

        let clamped = arena.clamp_circle(Vec2::new(100.0, 100.0), 450.0);
        assert_eq!(clamped, Vec2::new(450.0, 450.0));
        assert!(arena.contains_circle(clamped, 450.0));

        let clamped = arena.clamp_circle(Vec2::new(2000.0, -5.0), 30.0);
        assert_eq!(clamped, Vec2::new(1410.0, 30.0));
    }

    #[test]
    fn test_arena_playzone() {
        let arena = Arena::new(100.0, 50.0);
        assert!(!arena.outside_playzone(Vec2::new(-50.0, 10.0), 100.0));
        assert!(arena.outside_playzone(Vec2::new(-101.0, 10.0), 100.0));
        assert!(arena.outside_playzone(Vec2::new(10.0, 150.0), 100.0));
        assert!(arena.contains_circle(Vec2::new(10.0, 10.0), 10.0));
        assert!(!arena.contains_circle(Vec2::new(5.0, 10.0), 10.0));
    }
}
