//! Projectile spawning and lifecycle
//!
//! Two spawn patterns share one bullet type:
//! - Ring: omnidirectional burst released by a hard impact (or by dying)
//! - Fan: aimed volley released from the charged weapon
//!
//! Each tick every live bullet ages, moves, curves by its spin and is tested
//! against every other living player.

use std::f32::consts::TAU;

use glam::Vec2;

use super::economy;
use super::rng::MatchRng;
use super::state::{Bullet, GameEvent, GameState, Player, RingPool, SpawnPattern};
use crate::consts::*;
use crate::params::MatchParams;
use crate::{direction, lerp};

/// Shape of an aimed volley, derived from charge and comeback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanVolley {
    pub count: usize,
    pub speed: f32,
    /// Total angular spread (radians)
    pub spread: f32,
}

impl FanVolley {
    /// More charge: narrower, faster, fewer bullets. Comeback scales count and speed.
    pub fn new(charge: f32, comeback: f32, params: &MatchParams) -> Self {
        let charge = if charge.is_finite() {
            charge.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let boost = 1.0 + comeback.max(0.0);

        let speed = lerp(params.fan_speed_uncharged, params.fan_speed_charged, charge) * boost;
        let spread = lerp(params.fan_spread_uncharged, params.fan_spread_charged, charge);
        let count = lerp(
            params.fan_count_uncharged as f32,
            params.fan_count_charged as f32,
            charge,
        ) * boost;

        Self {
            count: count.round().max(1.0) as usize,
            speed,
            spread,
        }
    }
}

/// Spawn an aimed volley from `player`
///
/// The count is truncated to free pool slots and to what the player's energy
/// pays for. Returns the number of bullets spawned.
pub fn spawn_fan(
    player: &mut Player,
    volley: &FanVolley,
    params: &MatchParams,
    events: &mut Vec<GameEvent>,
) -> usize {
    let count = volley
        .count
        .min(player.bullets.remaining())
        .min(economy::affordable(player.energy, params.fan_cost));
    if count == 0 {
        return 0;
    }

    economy::spend(&mut player.energy, count as f32 * params.fan_cost);

    let inherited = player.velocity * FAN_VELOCITY_INHERIT;
    let spin = player.angular_velocity * BULLET_SPIN_SHARE;
    for i in 0..count {
        let offset = if count > 1 {
            volley.spread * (i as f32 / (count - 1) as f32 - 0.5)
        } else {
            0.0
        };
        let velocity = direction(player.aim_angle + offset) * volley.speed + inherited;
        player.bullets.push(Bullet::new(player.position, velocity, spin));
    }

    events.push(GameEvent::BurstFired {
        player: player.id,
        pattern: SpawnPattern::Fan,
        count,
    });
    log::debug!(
        "Player {} fired {} bullets at {:.0} u/s",
        player.id,
        count,
        volley.speed
    );

    count
}

/// Spawn an omnidirectional burst around `player`
///
/// Impact rings spend `0.5 + 0.5 * comeback` of the player's energy; a death
/// burst spends all of it and never releases fewer than
/// `DEATH_BURST_MIN_BULLETS` (pool space permitting). Returns the number of
/// bullets spawned.
pub fn spawn_ring(
    player: &mut Player,
    pattern: SpawnPattern,
    params: &MatchParams,
    rng: &mut MatchRng,
    rings: &mut RingPool,
    events: &mut Vec<GameEvent>,
) -> usize {
    let share = match pattern {
        SpawnPattern::DeathBurst => 1.0,
        _ => 0.5 + 0.5 * player.comeback(params),
    };

    let mut count = economy::affordable(player.energy * share, params.ring_cost);
    if pattern == SpawnPattern::DeathBurst {
        count = count.max(DEATH_BURST_MIN_BULLETS);
    }
    count = count.min(player.bullets.remaining());
    if count == 0 {
        return 0;
    }

    economy::spend(&mut player.energy, count as f32 * params.ring_cost);

    let speed = params.ring_base_speed + player.velocity.length() * RING_VELOCITY_SHARE;
    let spin = player.angular_velocity * BULLET_SPIN_SHARE;
    let step = TAU / count as f32;
    let start = rng.next_angle();

    for i in 0..count {
        let angle = start + step * i as f32;
        player
            .bullets
            .push(Bullet::new(player.position, direction(angle) * speed, spin));
    }

    if rings.spawn(player.position, player.id, start) {
        events.push(GameEvent::RingSpawned {
            owner: player.id,
            position: player.position,
        });
    }
    events.push(GameEvent::BurstFired {
        player: player.id,
        pattern,
        count,
    });
    log::debug!("Player {} released {:?} of {} bullets", player.id, pattern, count);

    count
}

/// First living non-owner player the bullet overlaps, in seat order
fn struck_player(players: &[Player], owner: usize, bullet: &Bullet, params: &MatchParams) -> Option<usize> {
    players.iter().position(|p| {
        if p.id == owner || !p.is_alive() {
            return false;
        }
        let reach = params.bullet_radius + p.radius(params);
        p.position.distance_squared(bullet.position) < reach * reach
    })
}

/// Age, move and collide every bullet of every player
///
/// Hits only register while the match is playing; after that bullets keep
/// flying until they expire.
pub fn advance_bullets(state: &mut GameState, dt: f32) {
    let GameState {
        players,
        params,
        arena,
        rng,
        rings,
        status,
        events,
        ..
    } = state;

    for owner in 0..players.len() {
        let mut pool = std::mem::take(&mut players[owner].bullets);

        let mut i = 0;
        while let Some(bullet) = pool.get_mut(i) {
            bullet.lifetime += dt;
            if bullet.lifetime > params.bullet_lifetime
                || arena.outside_playzone(bullet.position, PLAYZONE_MARGIN)
            {
                pool.swap_remove(i);
                continue;
            }

            bullet.advance(dt);
            let bullet = *bullet;

            if status.is_over() {
                i += 1;
                continue;
            }

            let Some(target) = struck_player(players, owner, &bullet, params) else {
                i += 1;
                continue;
            };
            pool.swap_remove(i);

            let victim = &mut players[target];
            victim.health = victim.health.saturating_sub(1);
            victim.velocity += bullet.velocity * params.knockback;
            victim.hit_flash_timer = HIT_FLASH_DURATION;
            events.push(GameEvent::PlayerHit {
                player: target,
                by: owner,
            });

            let impact_angle = bullet.velocity.y.atan2(bullet.velocity.x);
            if rings.spawn(bullet.position, owner, impact_angle) {
                events.push(GameEvent::RingSpawned {
                    owner,
                    position: bullet.position,
                });
            }

            if !victim.is_alive() {
                victim.death_animation_timer = DEATH_ANIMATION_DURATION;
                spawn_ring(victim, SpawnPattern::DeathBurst, params, rng, rings, events);
                victim.velocity = Vec2::ZERO;
                victim.angular_velocity = 0.0;
                victim.shoot_charge = 0.0;
                status.register_death(target, players, events);
            }
        }

        players[owner].bullets = pool;
    }
}
