//! Batch playthrough runner for balance testing.
//!
//! Plays one level under a scripted strategy across many seeds in
//! parallel using rayon and summarizes the results.

use std::path::Path;
use std::time::Instant;

use leverage_core::data::LevelData;
use leverage_core::error::Result as GameResult;
use leverage_core::intent::Intent;
use leverage_core::random::SeededRandom;
use leverage_core::target::TargetState;
use leverage_core::world::{GameState, World};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::strategies::Strategy;

/// Intents a strategy may issue in one day before the runner ends it.
pub const MAX_INTENTS_PER_DAY: u32 = 64;

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of games to run.
    pub game_count: u32,
    /// Seed of the first game; game `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Day limit per game.
    pub max_days: u32,
    /// Run games on the rayon pool.
    pub parallel: bool,
    /// Strategy every game plays.
    pub strategy: Strategy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            seed_start: 0,
            max_days: 60,
            parallel: true,
            strategy: Strategy::default(),
        }
    }
}

impl BatchConfig {
    /// Create a config for `game_count` games.
    #[must_use]
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Self::default()
        }
    }

    /// Set the first seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the day limit.
    #[must_use]
    pub const fn with_max_days(mut self, max_days: u32) -> Self {
        self.max_days = max_days;
        self
    }

    /// Set the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Run games one after another.
    #[must_use]
    pub const fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Result of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Seed the game ran with.
    pub seed: u64,
    /// Final game state.
    pub result: GameState,
    /// Days played.
    pub days: u32,
    /// Intents issued, rejected ones included.
    pub intents: u32,
    /// Intents the world rejected.
    pub rejected: u32,
    /// Targets defeated.
    pub defeated: usize,
    /// Final state hash.
    pub final_hash: u64,
}

/// Aggregate statistics over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Games run.
    pub games: u32,
    /// Games won.
    pub wins: u32,
    /// Games lost.
    pub losses: u32,
    /// Games still going at the day limit.
    pub ongoing: u32,
    /// Mean days played.
    pub avg_days: f64,
    /// Wins over games.
    pub win_rate: f64,
}

impl BatchSummary {
    /// Summarize a set of games.
    #[must_use]
    pub fn from_games(games: &[GameSummary]) -> Self {
        let mut summary = Self {
            games: u32::try_from(games.len()).unwrap_or(u32::MAX),
            ..Self::default()
        };
        if games.is_empty() {
            return summary;
        }

        for game in games {
            match game.result {
                GameState::Win => summary.wins += 1,
                GameState::Lose => summary.losses += 1,
                GameState::Ongoing => summary.ongoing += 1,
            }
        }

        let total_days: u32 = games.iter().map(|g| g.days).sum();
        summary.avg_days = f64::from(total_days) / f64::from(summary.games);
        summary.win_rate = f64::from(summary.wins) / f64::from(summary.games);
        summary
    }
}

/// Error during a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Results from a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResults {
    /// Level played.
    pub level: String,
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual games, in seed order.
    pub games: Vec<GameSummary>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total runtime.
    pub duration_seconds: f64,
    /// Games that could not run.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Play one game to the end or to `max_days`.
///
/// # Errors
///
/// Returns an error if the level is invalid.
pub fn run_game(
    level: &LevelData,
    seed: u64,
    strategy: &Strategy,
    max_days: u32,
) -> GameResult<GameSummary> {
    let mut world = World::new(level, SeededRandom::new(seed))?;
    let mut intents = 0;
    let mut rejected = 0;
    let mut today = 0;

    while !world.game_state().is_over() && world.day() < max_days {
        let intent = if today >= MAX_INTENTS_PER_DAY {
            Intent::EndDay
        } else {
            strategy.decide(&world)
        };

        intents += 1;
        today += 1;
        match world.apply(&intent) {
            Ok(_) => {
                if intent.action().is_none() {
                    today = 0;
                }
            }
            Err(e) => {
                rejected += 1;
                debug!(seed, ?intent, error = %e, "Strategy intent rejected");
                world.end_day();
                today = 0;
            }
        }
    }

    let result = world.game_state();
    debug!(seed, ?result, day = world.day(), "Game finished");

    Ok(GameSummary {
        seed,
        result,
        days: world.day(),
        intents,
        rejected,
        defeated: world
            .targets()
            .filter(|t| t.state() == TargetState::Defeated)
            .count(),
        final_hash: world.state_hash(),
    })
}

/// Run a batch of games.
#[must_use]
pub fn run_batch(level: &LevelData, config: &BatchConfig) -> BatchResults {
    let start = Instant::now();
    let seeds: Vec<u64> = (0..u64::from(config.game_count))
        .map(|i| config.seed_start.wrapping_add(i))
        .collect();

    info!(
        level = %level.name,
        games = config.game_count,
        strategy = %config.strategy.name,
        parallel = config.parallel,
        "Starting batch"
    );

    let play = |seed: u64| run_game(level, seed, &config.strategy, config.max_days);
    let outcomes: Vec<(u64, GameResult<GameSummary>)> = if config.parallel {
        seeds.into_par_iter().map(|seed| (seed, play(seed))).collect()
    } else {
        seeds.into_iter().map(|seed| (seed, play(seed))).collect()
    };

    let mut games = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for (seed, outcome) in outcomes {
        match outcome {
            Ok(game) => games.push(game),
            Err(e) => {
                warn!(seed, error = %e, "Game failed");
                errors.push(BatchError {
                    seed,
                    message: e.to_string(),
                });
            }
        }
    }

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        wins = summary.wins,
        losses = summary.losses,
        ongoing = summary.ongoing,
        avg_days = summary.avg_days,
        duration_seconds,
        "Batch complete"
    );

    BatchResults {
        level: level.name.clone(),
        config: config.clone(),
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Play the same seed `runs` times and check every run ends identically.
///
/// # Errors
///
/// Returns an error if the level is invalid.
pub fn verify_determinism(
    level: &LevelData,
    seed: u64,
    strategy: &Strategy,
    max_days: u32,
    runs: usize,
) -> GameResult<bool> {
    let first = run_game(level, seed, strategy, max_days)?;
    for _ in 1..runs {
        if run_game(level, seed, strategy, max_days)? != first {
            return Ok(false);
        }
    }
    Ok(true)
}
