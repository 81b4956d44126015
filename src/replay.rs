//! Recorded input sequences
//!
//! A replay is a seed, a parameter set and the per-frame controls fed to the
//! fixed-step driver. Running the same replay twice yields identical states.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::driver::FixedStepDriver;
use crate::params::{MatchParams, ParamsError};
use crate::sim::{Arena, ButtonState, ControlSample, GameState};

/// Frame time used by scripted replays (60 fps display)
const SCRIPTED_FRAME_DT: f32 = 1.0 / 60.0;
/// Frames per hold-and-release cycle in scripted replays
const SCRIPTED_FIRE_PERIOD: usize = 90;
/// Frames the action button is held within each cycle
const SCRIPTED_HOLD_FRAMES: usize = 60;
/// Steering rotation per frame (radians)
const SCRIPTED_TURN: f32 = 0.02;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid replay parameters: {0}")]
    Params(#[from] ParamsError),
    #[error("failed to read replay: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse replay: {0}")]
    Json(#[from] serde_json::Error),
}

/// Controls delivered in one display frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub dt: f32,
    pub controls: Vec<ControlSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    pub seed: u64,
    #[serde(default)]
    pub params: MatchParams,
    pub frames: Vec<ReplayFrame>,
}

impl Replay {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let replay: Self = serde_json::from_str(json)?;
        replay.params.validate()?;
        Ok(replay)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let replay = Self::from_json(&json)?;
        log::info!("Loaded replay {} ({} frames)", path.display(), replay.frames.len());
        Ok(replay)
    }

    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Synthetic input script
    ///
    /// Every player steers in a slowly rotating direction, offset by seat,
    /// and repeatedly charges and releases its weapon on a staggered cycle.
    pub fn scripted(seed: u64, params: MatchParams, frames: usize) -> Self {
        let players = params.player_count;
        let mut held = vec![false; players];

        let frames = (0..frames)
            .map(|frame| {
                let controls = (0..players)
                    .map(|seat| {
                        let heading = frame as f32 * SCRIPTED_TURN
                            + seat as f32 * std::f32::consts::TAU / players as f32;
                        let phase = (frame + seat * SCRIPTED_FIRE_PERIOD / players) % SCRIPTED_FIRE_PERIOD;
                        let down = phase < SCRIPTED_HOLD_FRAMES;
                        let action = ButtonState::from_levels(held[seat], down);
                        held[seat] = down;

                        ControlSample {
                            direction: crate::direction(heading),
                            action,
                            menu: ButtonState::default(),
                        }
                    })
                    .collect();

                ReplayFrame {
                    dt: SCRIPTED_FRAME_DT,
                    controls,
                }
            })
            .collect();

        Self {
            seed,
            params,
            frames,
        }
    }

    /// Play every frame into a fresh match and return the final state
    ///
    /// Events are drained (and traced) after every frame.
    pub fn run(&self) -> Result<GameState, ReplayError> {
        let mut state = GameState::with_params(self.params.clone(), Arena::default(), self.seed)?;
        let mut driver = FixedStepDriver::new();

        for frame in &self.frames {
            driver.advance(&mut state, &frame.controls, frame.dt);
            for event in state.drain_events() {
                log::trace!("t={:.2} {:?}", state.time, event);
            }
        }

        log::debug!(
            "Replay finished after {} ticks ({} bullets live)",
            state.time_ticks,
            state.active_bullets()
        );
        Ok(state)
    }
}
