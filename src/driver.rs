//! Fixed-step driver
//!
//! Feeds variable frame times into the 100 Hz simulation. Leftover time is
//! kept between frames and exposed as an interpolation fraction for rendering.

use glam::Vec2;

use crate::consts::{MAX_FRAME_TIME, MAX_PENDING_EVENTS, SIM_DT};
use crate::sim::{ControlSample, GameState, tick};

#[derive(Debug, Clone)]
pub struct FixedStepDriver {
    accumulator: f64,
    tick_dt: f32,
    /// Latest controls per player, with edges held until a tick consumes them
    pending: Vec<ControlSample>,
}

impl Default for FixedStepDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedStepDriver {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            tick_dt: SIM_DT,
            pending: Vec::new(),
        }
    }

    pub fn tick_dt(&self) -> f32 {
        self.tick_dt
    }

    /// Run as many ticks as the elapsed frame time covers
    ///
    /// `frame_dt` is clamped to `[0, MAX_FRAME_TIME]` (non-finite counts as
    /// zero). Button edges seen this frame are latched, so a press and release
    /// between two ticks is still delivered. Returns the number of ticks run.
    ///
    /// Events raised by the ticks stay on the state until the caller takes
    /// them with `GameState::drain_events`, normally once per frame. Only the
    /// newest `MAX_PENDING_EVENTS` are kept for a caller that never drains.
    pub fn advance(&mut self, state: &mut GameState, controls: &[ControlSample], frame_dt: f32) -> u32 {
        if self.pending.len() < controls.len() {
            self.pending.resize(controls.len(), ControlSample::default());
        }
        for (latched, next) in self.pending.iter_mut().zip(controls) {
            latched.latch(next);
        }

        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_TIME)
        } else {
            0.0
        };
        self.accumulator += frame_dt as f64;

        let step = self.tick_dt as f64;
        let mut ticks = 0;
        while self.accumulator >= step {
            tick(state, &self.pending, self.tick_dt);
            self.accumulator -= step;
            ticks += 1;

            for control in &mut self.pending {
                control.clear_edges();
            }
        }

        if ticks > 1 {
            log::trace!("Caught up {} ticks in one frame", ticks);
        }

        let dropped = state.trim_events(MAX_PENDING_EVENTS);
        if dropped > 0 {
            log::warn!("Dropped {} undrained game events", dropped);
        }
        ticks
    }

    /// Fraction of a tick accumulated but not yet simulated, in [0, 1)
    pub fn interpolation_fraction(&self) -> f32 {
        let fraction = (self.accumulator / self.tick_dt as f64) as f32;
        fraction.clamp(0.0, 1.0 - f32::EPSILON)
    }

    /// Position extrapolated by the leftover fraction of a tick
    pub fn extrapolate(&self, position: Vec2, velocity: Vec2) -> Vec2 {
        position + velocity * (self.interpolation_fraction() * self.tick_dt)
    }

    /// Drop leftover time and latched input (after a restart)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.pending.clear();
    }
}
