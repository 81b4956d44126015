//! Headless match runner
//!
//! `orb-brawl [replay.json]` plays a recorded replay, or a scripted one when
//! no file is given, and logs how the match ended.

use orb_brawl::{MatchParams, Replay};

/// Frames in the built-in scripted replay (one minute at 60 fps)
const SCRIPTED_FRAMES: usize = 3600;

fn main() {
    env_logger::init();
    log::info!("Orb Brawl (headless) starting...");

    let replay = match std::env::args().nth(1) {
        Some(path) => match Replay::load(&path) {
            Ok(replay) => replay,
            Err(e) => {
                log::error!("Failed to load replay {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => {
            log::info!("No replay given, running {} scripted frames", SCRIPTED_FRAMES);
            Replay::scripted(0x0b5e_55ed, MatchParams::default(), SCRIPTED_FRAMES)
        }
    };

    let state = match replay.run() {
        Ok(state) => state,
        Err(e) => {
            log::error!("Replay failed: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("{} of {} players eliminated", state.status.dead_players, state.players.len());

    for player in &state.players {
        log::info!(
            "Player {}: health {}, energy {:.1}, {} bullets live",
            player.id,
            player.health,
            player.energy,
            player.bullets.len()
        );
    }

    match state.triumphant_player() {
        Some(winner) => log::info!(
            "Player {} wins after {:.2}s ({} ticks)",
            winner,
            state.time,
            state.time_ticks
        ),
        None => log::info!(
            "No winner after {:.2}s ({} ticks)",
            state.time,
            state.time_ticks
        ),
    }
}
