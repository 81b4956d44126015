//! Fixed timestep simulation tick
//!
//! Runs the components in order: kinetics, player-player contacts, wall
//! bounce (which commits positions), energy accrual, impact rings, then
//! projectiles. The match state machine is driven from the projectile step,
//! where deaths happen.

use glam::Vec2;

use super::collision::{resolve_boundary, resolve_player_contacts};
use super::control::{ControlSample, finish_release, steer};
use super::economy;
use super::projectile::{advance_bullets, spawn_fan, spawn_ring};
use super::state::{GameEvent, GameState, SpawnPattern};

/// Advance the game state by one fixed timestep
///
/// `controls` is indexed by player; missing entries count as idle input.
/// Once the match is over players stop moving and shooting, while bullets
/// already in flight finish their lifecycle without dealing damage.
pub fn tick(state: &mut GameState, controls: &[ControlSample], dt: f32) {
    state.time_ticks += 1;
    state.time += dt;

    for (player, control) in controls.iter().enumerate().take(state.players.len()) {
        if control.menu.pressed {
            state.events.push(GameEvent::MenuRequested { player });
        }
    }

    for player in &mut state.players {
        player.tick_timers(dt);
    }
    state.rings.advance(dt);

    if !state.is_over() {
        move_players(state, controls, dt);
    }

    advance_bullets(state, dt);
}

fn move_players(state: &mut GameState, controls: &[ControlSample], dt: f32) {
    let GameState {
        players,
        params,
        arena,
        rng,
        rings,
        events,
        time,
        ..
    } = state;
    let now = *time;
    let energy_cap = economy::energy_cap(params.minimum_radius, arena.max_radius());
    let start: Vec<Vec2> = players.iter().map(|p| p.position).collect();

    for player in players.iter_mut().filter(|p| p.is_alive()) {
        // No player may outgrow the arena
        player.energy = player.energy.min(energy_cap);

        let control = controls.get(player.id).copied().unwrap_or_default();
        if let Some(volley) = steer(player, &control, params, now, dt) {
            let spawned = spawn_fan(player, &volley, params, events);
            finish_release(player, &volley, spawned, params, now);
        }
    }

    let contacts = resolve_player_contacts(players, params, dt);

    for (index, player) in players.iter_mut().enumerate() {
        if !player.is_alive() {
            continue;
        }

        let radius = player.radius(params);
        let bounce = resolve_boundary(player, radius, arena, dt);

        let distance = player.position.distance(start[index]);
        let gain = economy::energy_gain(distance, player.energy, player.comeback(params));
        if gain.is_finite() {
            player.energy = (player.energy + gain).min(energy_cap);
        }

        // Growth can push the rim past a wall the center was clamped against
        let grown = player.radius(params);
        if grown > radius {
            player.position = arena.clamp_circle(player.position, grown);
        }

        if contacts.hard_hits[index] {
            spawn_ring(player, SpawnPattern::Ring, params, rng, rings, events);
        }
        if bounce > params.hard_hit_speed {
            spawn_ring(player, SpawnPattern::Ring, params, rng, rings, events);
        }
    }
}
