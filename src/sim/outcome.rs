//! Match state machine
//!
//! `Playing` until all but one player is dead, then `Over` for good. The only
//! way back to `Playing` is a full reset.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// A winner has been decided
    Over,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStatus {
    pub phase: GamePhase,
    pub dead_players: usize,
    pub triumphant_player: Option<usize>,
}

impl Default for MatchStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchStatus {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Playing,
            dead_players: 0,
            triumphant_player: None,
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    /// Record that `player` just reached zero health
    ///
    /// Returns the winner if this death ended the match. When nobody is left
    /// alive the lowest seat wins.
    pub fn register_death(
        &mut self,
        player: usize,
        players: &[Player],
        events: &mut Vec<GameEvent>,
    ) -> Option<usize> {
        if self.is_over() {
            return None;
        }

        self.dead_players += 1;
        events.push(GameEvent::PlayerDied { player });
        log::debug!(
            "Player {} eliminated ({} of {} down)",
            player,
            self.dead_players,
            players.len()
        );

        if self.dead_players + 1 < players.len() {
            return None;
        }

        let winner = players
            .iter()
            .find(|p| p.is_alive())
            .map(|p| p.id)
            .unwrap_or(0);

        self.phase = GamePhase::Over;
        self.triumphant_player = Some(winner);
        events.push(GameEvent::Victory { player: winner });
        log::info!("Player {} wins", winner);

        Some(winner)
    }
}
