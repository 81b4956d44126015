//! Collision detection and response between players and the arena
//!
//! Player-player contacts are resolved on provisional next-tick positions
//! (`position + velocity * dt`) over several passes, so chains of three or
//! more touching players settle within a tick. The wall pass runs afterwards
//! on the already-separated positions and commits the move.

use glam::Vec2;

use super::state::{Arena, Player};
use crate::consts::*;
use crate::params::MatchParams;

/// Outcome of the player-player resolution for one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactReport {
    /// Per player: a contact left it above the hard-hit speed
    pub hard_hits: Vec<bool>,
    /// Passes actually run
    pub passes: u32,
    /// Velocity exchanges performed
    pub impacts: u32,
}

/// 1-D elastic collision along the contact normal
///
/// `u1`, `u2` are the normal velocity components before impact, `m1`, `m2`
/// the masses. Returns the components after impact.
#[inline]
pub fn elastic_normal_velocities(u1: f32, u2: f32, m1: f32, m2: f32) -> (f32, f32) {
    let total = m1 + m2;
    if total <= 0.0 {
        return (u1, u2);
    }
    let v1 = (u1 * (m1 - m2) + 2.0 * m2 * u2) / total;
    let v2 = (u2 * (m2 - m1) + 2.0 * m1 * u1) / total;
    (v1, v2)
}

/// Mutable references to two distinct players, `i < j`
fn pair_mut(players: &mut [Player], i: usize, j: usize) -> (&mut Player, &mut Player) {
    let (head, tail) = players.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Separate overlapping live players and exchange normal momentum
///
/// Each pass pushes every overlapping pair apart by half the overlap each and,
/// for pairs still approaching, swaps their normal velocity components with the
/// elastic formula (radius as mass). Tangential components are untouched.
/// Stops early once a pass corrects less than `COLLISION_EPSILON` in total.
pub fn resolve_player_contacts(players: &mut [Player], params: &MatchParams, dt: f32) -> ContactReport {
    let count = players.len();
    let mut report = ContactReport {
        hard_hits: vec![false; count],
        ..ContactReport::default()
    };

    for _ in 0..COLLISION_PASSES {
        report.passes += 1;
        let mut total_correction = 0.0;

        for i in 0..count {
            for j in (i + 1)..count {
                let (a, b) = pair_mut(players, i, j);
                if !a.is_alive() || !b.is_alive() {
                    continue;
                }

                let mass_a = a.radius(params);
                let mass_b = b.radius(params);
                let next_a = a.position + a.velocity * dt;
                let next_b = b.position + b.velocity * dt;

                let delta = next_b - next_a;
                let distance = delta.length();
                let overlap = mass_a + mass_b - distance;
                if overlap <= 0.0 {
                    continue;
                }

                // Coincident centers: fall back to a fixed axis
                let normal = if distance > MIN_SEPARATION {
                    delta / distance
                } else {
                    Vec2::X
                };

                let push = normal * (overlap * 0.5);
                a.position -= push;
                b.position += push;
                total_correction += overlap;

                let u_a = a.velocity.dot(normal);
                let u_b = b.velocity.dot(normal);
                if u_a - u_b <= 0.0 {
                    // Already separating
                    continue;
                }

                let (v_a, v_b) = elastic_normal_velocities(u_a, u_b, mass_a, mass_b);
                a.velocity += normal * (v_a - u_a);
                b.velocity += normal * (v_b - u_b);
                report.impacts += 1;

                if v_a.abs() > params.hard_hit_speed {
                    report.hard_hits[i] = true;
                }
                if v_b.abs() > params.hard_hit_speed {
                    report.hard_hits[j] = true;
                }

                log::trace!(
                    "Contact {}-{}: overlap {:.2}, normal speeds {:.1}/{:.1} -> {:.1}/{:.1}",
                    i,
                    j,
                    overlap,
                    u_a,
                    u_b,
                    v_a,
                    v_b
                );
            }
        }

        if total_correction < COLLISION_EPSILON {
            break;
        }
    }

    report
}

/// Clamp one axis against `[radius, extent - radius]`
///
/// Returns the incoming speed on a bounce. The reflected velocity keeps
/// `WALL_RESTITUTION` of the incoming speed plus the penetration depth.
fn bounce_axis(position: &mut f32, velocity: &mut f32, radius: f32, extent: f32) -> f32 {
    let far = extent - radius;
    if *position > far {
        let difference = far - *position;
        *position = far;
        if *velocity > 0.0 {
            let incoming = *velocity;
            *velocity = -WALL_RESTITUTION * incoming + difference;
            return incoming.abs();
        }
    } else if *position < radius {
        let difference = radius - *position;
        *position = radius;
        if *velocity < 0.0 {
            let incoming = *velocity;
            *velocity = -WALL_RESTITUTION * incoming + difference;
            return incoming.abs();
        }
    }
    0.0
}

/// Move a live player to its next position, bouncing off the arena edges
///
/// Returns the bounce magnitude summed over both axes (0 if no wall was hit).
pub fn resolve_boundary(player: &mut Player, radius: f32, arena: &Arena, dt: f32) -> f32 {
    let mut next = player.position + player.velocity * dt;
    let mut velocity = player.velocity;

    let bounce = bounce_axis(&mut next.x, &mut velocity.x, radius, arena.width)
        + bounce_axis(&mut next.y, &mut velocity.y, radius, arena.height);

    player.position = next;
    player.velocity = velocity;
    bounce
}
