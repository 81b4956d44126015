//! Player kinetics and weapon control
//!
//! Turns a control sample into velocity change, aim smoothing and weapon
//! charge. Firing itself is left to the projectile system; `steer` only
//! reports that a volley was released.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::projectile::FanVolley;
use super::state::Player;
use crate::consts::*;
use crate::params::MatchParams;
use crate::{normalize_angle, shortest_angle_delta};

/// Level and edge state of one button for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    pub down: bool,
    pub pressed: bool,
    pub released: bool,
}

impl ButtonState {
    /// Build from the previous and current level
    pub fn from_levels(was_down: bool, is_down: bool) -> Self {
        Self {
            down: is_down,
            pressed: is_down && !was_down,
            released: was_down && !is_down,
        }
    }

    /// Keep the level, fold in any edges not yet consumed
    pub fn latch(&mut self, next: ButtonState) {
        self.down = next.down;
        self.pressed |= next.pressed;
        self.released |= next.released;
    }

    pub fn clear_edges(&mut self) {
        self.pressed = false;
        self.released = false;
    }
}

/// Per-player input for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlSample {
    /// Movement direction, magnitude at most 1
    pub direction: Vec2,
    pub action: ButtonState,
    pub menu: ButtonState,
}

impl ControlSample {
    pub fn moving(direction: Vec2) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn latch(&mut self, next: &ControlSample) {
        self.direction = next.direction;
        self.action.latch(next.action);
        self.menu.latch(next.menu);
    }

    pub fn clear_edges(&mut self) {
        self.action.clear_edges();
        self.menu.clear_edges();
    }
}

/// Apply one tick of control to a live player
///
/// Updates aim, angular velocity, weapon charge and velocity (explicit Euler).
/// Returns the volley to spawn if the action button was released with the
/// weapon ready. The release is only settled (charge, cooldown, recoil) by
/// `finish_release` once the volley has been spawned.
pub fn steer(
    player: &mut Player,
    control: &ControlSample,
    params: &MatchParams,
    now: f32,
    dt: f32,
) -> Option<FanVolley> {
    let input = if control.direction.is_finite() {
        control.direction
    } else {
        Vec2::ZERO
    };

    let (direction, friction_fraction, aim_change) = if input == Vec2::ZERO {
        (Vec2::ZERO, IDLE_FRICTION_FRACTION, 0.0)
    } else {
        let direction = input.normalize_or_zero();
        let target = direction.y.atan2(direction.x);
        let change = AIM_TURN_RATE * dt * shortest_angle_delta(player.aim_angle, target);
        (direction, STEER_FRICTION_FRACTION, change)
    };

    player.aim_angle = normalize_angle(player.aim_angle + aim_change);
    player.angular_velocity = ANGULAR_VELOCITY_RETAIN * player.angular_velocity
        + (1.0 - ANGULAR_VELOCITY_RETAIN) * aim_change * ANGULAR_VELOCITY_GAIN;

    let tuning = player.tuning;
    let acceleration =
        direction * tuning.acceleration - player.velocity * tuning.friction * friction_fraction;
    player.velocity += acceleration * dt;

    let ready = now >= player.shoot_cooldown_until;
    if control.action.down && ready {
        player.shoot_charge = (player.shoot_charge + params.charge_rate * dt).min(1.0);
    }

    if control.action.released && ready {
        Some(FanVolley::new(player.shoot_charge, player.comeback(params), params))
    } else {
        None
    }
}

/// Settle a release after `spawned` bullets of `volley` left the weapon
///
/// A release that spawned nothing leaves the player untouched. Otherwise the
/// charge is consumed, the cooldown starts and recoil pushes back against the
/// shot, scaled by the share of the volley actually fired and by how well the
/// shot lines up with the current heading.
pub fn finish_release(
    player: &mut Player,
    volley: &FanVolley,
    spawned: usize,
    params: &MatchParams,
    now: f32,
) {
    if spawned == 0 || volley.count == 0 {
        return;
    }

    player.shoot_charge = 0.0;
    player.shoot_cooldown_until = now + params.shoot_cooldown;

    let shot_direction = crate::direction(player.aim_angle);
    let alignment = shot_direction.dot(player.velocity.normalize_or_zero()).max(0.0);
    let fired_share = spawned.min(volley.count) as f32 / volley.count as f32;
    let recoil = volley.speed * params.recoil * alignment * fired_share;
    player.velocity -= shot_direction * recoil;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> (Player, MatchParams) {
        let params = MatchParams::default();
        let player = Player::new(0, Vec2::new(500.0, 400.0), 0.0, &params);
        (player, params)
    }

    fn hold() -> ControlSample {
        ControlSample {
            action: ButtonState {
                down: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn release() -> ControlSample {
        ControlSample {
            action: ButtonState {
                released: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_button_edges_from_levels() {
        let b = ButtonState::from_levels(false, true);
        assert!(b.down && b.pressed && !b.released);
        let b = ButtonState::from_levels(true, false);
        assert!(!b.down && !b.pressed && b.released);
        let b = ButtonState::from_levels(true, true);
        assert!(b.down && !b.pressed && !b.released);
    }

    #[test]
    fn test_latch_keeps_edges() {
        let mut latched = ControlSample::default();
        latched.latch(&ControlSample {
            action: ButtonState::from_levels(false, true),
            ..Default::default()
        });
        latched.latch(&ControlSample {
            action: ButtonState::from_levels(true, false),
            ..Default::default()
        });
        assert!(latched.action.pressed);
        assert!(latched.action.released);
        assert!(!latched.action.down);

        latched.clear_edges();
        assert_eq!(latched.action, ButtonState::default());
    }

    #[test]
    fn test_acceleration_along_input() {
        let (mut p, params) = player();
        steer(&mut p, &ControlSample::moving(Vec2::new(0.0, 1.0)), &params, 0.0, SIM_DT);
        assert!(p.velocity.x.abs() < 1e-6);
        assert!((p.velocity.y - params.acceleration * SIM_DT).abs() < 1e-4);
    }

    #[test]
    fn test_input_is_normalized() {
        let (mut a, params) = player();
        let (mut b, _) = player();
        steer(&mut a, &ControlSample::moving(Vec2::new(0.3, 0.0)), &params, 0.0, SIM_DT);
        steer(&mut b, &ControlSample::moving(Vec2::new(1.0, 0.0)), &params, 0.0, SIM_DT);
        assert_eq!(a.velocity, b.velocity);
    }

    #[test]
    fn test_idle_friction_stronger_than_steering() {
        let (mut idle, params) = player();
        idle.velocity = Vec2::new(200.0, 0.0);
        steer(&mut idle, &ControlSample::default(), &params, 0.0, SIM_DT);

        let (mut steering, _) = player();
        steering.velocity = Vec2::new(200.0, 0.0);
        // Steer sideways so acceleration does not add to x
        steer(&mut steering, &ControlSample::moving(Vec2::Y), &params, 0.0, SIM_DT);

        assert!(idle.velocity.x < steering.velocity.x);
        assert!(idle.velocity.x > 0.0);
    }

    #[test]
    fn test_idle_player_comes_to_rest() {
        let (mut p, params) = player();
        p.velocity = Vec2::new(300.0, -200.0);
        for _ in 0..200 {
            steer(&mut p, &ControlSample::default(), &params, 0.0, SIM_DT);
        }
        assert!(p.velocity.length() < 1.0);
    }

    #[test]
    fn test_strongest_accepted_friction_stays_finite() {
        let params = MatchParams {
            friction: 99.0,
            ..MatchParams::default()
        };
        assert!(params.validate().is_ok());
        let mut p = Player::new(0, Vec2::new(500.0, 400.0), 0.0, &params);
        p.velocity = Vec2::new(10.0, 0.0);
        for _ in 0..400 {
            steer(&mut p, &ControlSample::default(), &params, 0.0, SIM_DT);
            assert!(p.velocity.is_finite());
        }
        assert!(p.velocity.length() < 1e-3);
    }

    #[test]
    fn test_aim_turns_along_shortest_path() {
        let (mut p, params) = player();
        p.aim_angle = 3.0;
        // Target just past -π: the short way is counterclockwise through π
        steer(&mut p, &ControlSample::moving(Vec2::new(-1.0, -0.1)), &params, 0.0, SIM_DT);
        assert!(p.aim_angle > 3.0 || p.aim_angle < -3.0);
        assert!(p.angular_velocity > 0.0);
    }

    #[test]
    fn test_angular_velocity_decays_when_idle() {
        let (mut p, params) = player();
        p.angular_velocity = 2.0;
        steer(&mut p, &ControlSample::default(), &params, 0.0, SIM_DT);
        assert!((p.angular_velocity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_charge_accumulates_and_caps() {
        let (mut p, params) = player();
        for _ in 0..10 {
            steer(&mut p, &hold(), &params, 0.0, SIM_DT);
        }
        assert!((p.shoot_charge - params.charge_rate * 10.0 * SIM_DT).abs() < 1e-4);

        for _ in 0..1000 {
            steer(&mut p, &hold(), &params, 0.0, SIM_DT);
        }
        assert_eq!(p.shoot_charge, 1.0);
    }

    #[test]
    fn test_release_reports_volley_without_settling() {
        let (mut p, params) = player();
        p.shoot_charge = 1.0;
        let volley = steer(&mut p, &release(), &params, 2.0, SIM_DT).expect("fires");
        assert_eq!(volley.speed, params.fan_speed_charged);
        assert_eq!(p.shoot_charge, 1.0);
        assert_eq!(p.shoot_cooldown_until, 0.0);
    }

    #[test]
    fn test_settled_release_starts_cooldown() {
        let (mut p, params) = player();
        p.shoot_charge = 1.0;
        let volley = steer(&mut p, &release(), &params, 2.0, SIM_DT).expect("fires");
        finish_release(&mut p, &volley, volley.count, &params, 2.0);
        assert_eq!(p.shoot_charge, 0.0);
        assert!((p.shoot_cooldown_until - (2.0 + params.shoot_cooldown)).abs() < 1e-6);

        // Held during cooldown: no charge, release does nothing
        steer(&mut p, &hold(), &params, 2.1, SIM_DT);
        assert_eq!(p.shoot_charge, 0.0);
        assert!(steer(&mut p, &release(), &params, 2.1, SIM_DT).is_none());
    }

    #[test]
    fn test_empty_release_changes_nothing() {
        let (mut p, params) = player();
        p.velocity = Vec2::new(400.0, 0.0);
        p.shoot_charge = 1.0;
        let volley = steer(&mut p, &release(), &params, 0.0, SIM_DT).expect("fires");

        let (mut q, _) = player();
        q.velocity = Vec2::new(400.0, 0.0);
        steer(&mut q, &ControlSample::default(), &params, 0.0, SIM_DT);

        finish_release(&mut p, &volley, 0, &params, 0.0);
        assert_eq!(p.velocity, q.velocity);
        assert_eq!(p.shoot_charge, 1.0);
        assert_eq!(p.shoot_cooldown_until, 0.0);
    }

    #[test]
    fn test_recoil_brakes_forward_shot() {
        let (mut p, params) = player();
        p.velocity = Vec2::new(400.0, 0.0);
        p.aim_angle = 0.0;
        let volley = steer(&mut p, &release(), &params, 0.0, SIM_DT).expect("fires");
        let before = p.velocity.x;
        finish_release(&mut p, &volley, volley.count, &params, 0.0);

        let expected = before - volley.speed * params.recoil;
        assert!((p.velocity.x - expected).abs() < 1e-3);
    }

    #[test]
    fn test_recoil_scales_with_bullets_fired() {
        let (mut full, params) = player();
        full.velocity = Vec2::new(400.0, 0.0);
        let mut partial = full.clone();
        let volley = FanVolley {
            count: 4,
            speed: 500.0,
            spread: 0.5,
        };

        finish_release(&mut full, &volley, 4, &params, 0.0);
        finish_release(&mut partial, &volley, 1, &params, 0.0);

        let full_kick = 400.0 - full.velocity.x;
        let partial_kick = 400.0 - partial.velocity.x;
        assert!((partial_kick * 4.0 - full_kick).abs() < 1e-3);
    }

    #[test]
    fn test_no_recoil_when_stationary() {
        let (mut p, params) = player();
        let volley = steer(&mut p, &release(), &params, 0.0, SIM_DT).expect("fires");
        finish_release(&mut p, &volley, volley.count, &params, 0.0);
        assert_eq!(p.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_non_finite_input_ignored() {
        let (mut p, params) = player();
        steer(&mut p, &ControlSample::moving(Vec2::new(f32::NAN, 1.0)), &params, 0.0, SIM_DT);
        assert!(p.velocity.is_finite());
        assert!(p.aim_angle.is_finite());
    }
}
