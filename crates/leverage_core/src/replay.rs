//! Replay system for recording and re-running games.
//!
//! A replay stores the level, the seed and every intent issued during the
//! game. Re-running the intents against a fresh world with the same seed
//! must land on the recorded final hash. Rejected intents are kept in the
//! stream; they are rejected again on playback and change nothing.
//!
//! Replays are JSON text. Intents are internally tagged, which rules out
//! non-self-describing formats.

use serde::{Deserialize, Serialize};

use crate::data::LevelData;
use crate::error::{GameError, Result};
use crate::intent::Intent;
use crate::random::{RandomSource, SeededRandom};
use crate::world::World;

/// Replay format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// A recorded game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Level the game was played on.
    pub level: LevelData,
    /// Seed of the world's random source.
    pub seed: u64,
    /// Every intent, in the order it was issued.
    pub intents: Vec<Intent>,
    /// Day the recording stopped on.
    pub final_day: u32,
    /// State hash the recording stopped on, from [`crate::world::World::state_hash`].
    pub final_hash: u64,
}

impl Replay {
    /// Start recording a game.
    #[must_use]
    pub fn new(level: LevelData, seed: u64) -> Self {
        Self {
            version: REPLAY_VERSION,
            level,
            seed,
            intents: Vec::new(),
            final_day: 0,
            final_hash: 0,
        }
    }

    /// Record an intent.
    pub fn record(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Stamp the final day and state hash from the recorded world.
    pub fn finalize<R: RandomSource>(&mut self, world: &World<R>) {
        self.final_day = world.day();
        self.final_hash = world.state_hash();
    }

    /// Number of recorded intents.
    #[must_use]
    pub fn intent_count(&self) -> usize {
        self.intents.len()
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize replay: {e}")))
    }

    /// Parse from JSON, checking the format version.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or a version mismatch.
    pub fn from_json(text: &str) -> Result<Self> {
        let replay: Self = serde_json::from_str(text)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }

        Ok(replay)
    }

    /// Re-run every intent against a fresh world.
    ///
    /// # Errors
    ///
    /// Returns an error if the level is invalid.
    pub fn run(&self) -> Result<World> {
        let mut world = World::new(&self.level, SeededRandom::new(self.seed))?;
        for (index, intent) in self.intents.iter().enumerate() {
            if let Err(e) = world.apply(intent) {
                tracing::debug!(index, error = %e, "Replayed intent rejected");
            }
        }
        Ok(world)
    }

    /// Re-run the replay and check it ends on the recorded state.
    ///
    /// Returns the final hash.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the run diverges from the
    /// recording.
    pub fn verify(&self) -> Result<u64> {
        let world = self.run()?;
        let hash = world.state_hash();
        if world.day() != self.final_day || hash != self.final_hash {
            return Err(GameError::InvalidState(format!(
                "Replay diverged: expected day {} hash {:#018x}, got day {} hash {hash:#018x}",
                self.final_day,
                self.final_hash,
                world.day()
            )));
        }
        tracing::info!(intents = self.intents.len(), hash, "Replay verified");
        Ok(hash)
    }
}
