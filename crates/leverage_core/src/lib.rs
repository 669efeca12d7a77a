//! # Leverage Core
//!
//! Turn-based simulation core for a narrative blackmail game.
//!
//! The player investigates targets by hacking and scanning facts about
//! them, then breaks them with threats, exposures and harassment, all
//! under a daily budget of action points, stress and currency. Targets grow
//! suspicious and paranoid on their own clock; one that stays paranoid too
//! long ends the game.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No ambient randomness (every roll goes through [`random::RandomSource`])
//! - No floating-point math (player resources are fixed-point)
//!
//! ## Crate Structure
//!
//! - [`traits`] - Target trait flags and their modifiers
//! - [`facts`] - Per-target fact graphs
//! - [`combo`] - Combo rules and resolution
//! - [`target`] - Target state machine
//! - [`player`] - Player resources and action costs
//! - [`world`] - Level controller
//! - [`intent`] - Serializable command surface
//! - [`replay`] - Replay recording and verification
//! - [`hash`] - Portable state hashing
//! - [`data`] - Level definition types

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combo;
pub mod data;
pub mod error;
pub mod facts;
pub mod hash;
pub mod intent;
pub mod math;
pub mod player;
pub mod random;
pub mod replay;
pub mod target;
pub mod traits;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combo::{Combo, ComboApplication};
    pub use crate::data::{ComboData, FactData, LevelData, TargetData};
    pub use crate::error::{GameError, Result};
    pub use crate::facts::{Fact, Pod};
    pub use crate::intent::{Intent, IntentOutcome};
    pub use crate::math::Fixed;
    pub use crate::player::{Action, Player};
    pub use crate::random::{RandomSource, ScriptedRandom, SeededRandom};
    pub use crate::replay::Replay;
    pub use crate::target::{Target, TargetState};
    pub use crate::traits::{TargetTrait, TraitSet};
    pub use crate::world::{Dossier, GameState, HackOutcome, World, WorldSnapshot};
}
