//! Error types for the game simulation.

use thiserror::Error;

use crate::player::Action;
use crate::target::TargetState;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
///
/// Every variant is reported before any state is mutated. A failed hack roll
/// is not an error; see [`crate::world::HackOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// No target with this name exists in the level.
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    /// The target's pod has no fact with this name.
    #[error("Unknown fact '{fact}' on target '{target}'")]
    UnknownFact {
        /// Target name.
        target: String,
        /// Fact name.
        fact: String,
    },

    /// The fact exists but has not been revealed yet.
    #[error("Fact '{fact}' on target '{target}' is not visible yet")]
    FactNotVisible {
        /// Target name.
        target: String,
        /// Fact name.
        fact: String,
    },

    /// The fact was already hacked successfully.
    #[error("Fact '{fact}' on target '{target}' is already hacked")]
    FactAlreadyHacked {
        /// Target name.
        target: String,
        /// Fact name.
        fact: String,
    },

    /// The fact is locked and must be hacked before it can be scanned.
    #[error("Fact '{fact}' on target '{target}' is locked; hack it first")]
    FactLocked {
        /// Target name.
        target: String,
        /// Fact name.
        fact: String,
    },

    /// The fact was already scanned.
    #[error("Fact '{fact}' on target '{target}' is already scanned")]
    FactAlreadyScanned {
        /// Target name.
        target: String,
        /// Fact name.
        fact: String,
    },

    /// The fact must be scanned before it can be used against the target.
    #[error("Fact '{fact}' on target '{target}' has not been scanned")]
    FactNotScanned {
        /// Target name.
        target: String,
        /// Fact name.
        fact: String,
    },

    /// The fact was already exposed and cannot be used again.
    #[error("Fact '{fact}' on target '{target}' is no longer exposable")]
    FactNotExposable {
        /// Target name.
        target: String,
        /// Fact name.
        fact: String,
    },

    /// The target is in a terminal state and accepts no further actions.
    #[error("Target '{target}' is inactive ({state:?})")]
    TargetInactive {
        /// Target name.
        target: String,
        /// Terminal state the target is in.
        state: TargetState,
    },

    /// Not enough action points left today.
    #[error("Insufficient action points for {action:?}: need {required}, have {available}")]
    InsufficientActionPoints {
        /// Action that was attempted.
        action: Action,
        /// Action points required.
        required: u32,
        /// Action points available.
        available: u32,
    },

    /// Overwork was already used today.
    #[error("Already overworked today")]
    AlreadyOverworked,

    /// Level data failed consistency checks.
    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Build an [`GameError::UnknownFact`] from borrowed names.
    pub(crate) fn unknown_fact(target: &str, fact: &str) -> Self {
        Self::UnknownFact {
            target: target.to_owned(),
            fact: fact.to_owned(),
        }
    }
}
