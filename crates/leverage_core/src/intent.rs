//! Serializable command surface.
//!
//! Every player action is an [`Intent`]. Front ends (the JSON-lines
//! protocol, replays, scripted strategies) build intents and hand them to
//! [`World::apply`], which dispatches to the matching world method.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::Fixed;
use crate::player::Action;
use crate::random::RandomSource;
use crate::world::{GameState, HackOutcome, World};

/// A player command.
///
/// Serialized with a `cmd` tag, e.g.
/// `{"cmd":"scan","target":"mayor","fact":"office"}` or `{"cmd":"end_day"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Intent {
    /// Hack a visible fact.
    Hack {
        /// Target name.
        target: String,
        /// Fact name.
        fact: String,
    },
    /// Scan a visible fact.
    Scan {
        /// Target name.
        target: String,
        /// Fact name.
        fact: String,
    },
    /// Threaten a target with a scanned fact.
    Threaten {
        /// Target name.
        target: String,
        /// Fact name.
        fact: String,
    },
    /// Expose a scanned fact.
    Expose {
        /// Target name.
        target: String,
        /// Fact name.
        fact: String,
    },
    /// Harass a target.
    Harass {
        /// Target name.
        target: String,
    },
    /// Coerce a target.
    Coerce {
        /// Target name.
        target: String,
    },
    /// Trade stress for extra AP.
    Overwork,
    /// Trade AP for stress relief.
    Relax,
    /// Trade AP for currency.
    Vtube,
    /// Advance to the next day.
    EndDay,
}

impl Intent {
    /// Build a hack intent.
    #[must_use]
    pub fn hack(target: impl Into<String>, fact: impl Into<String>) -> Self {
        Self::Hack {
            target: target.into(),
            fact: fact.into(),
        }
    }

    /// Build a scan intent.
    #[must_use]
    pub fn scan(target: impl Into<String>, fact: impl Into<String>) -> Self {
        Self::Scan {
            target: target.into(),
            fact: fact.into(),
        }
    }

    /// Build a threaten intent.
    #[must_use]
    pub fn threaten(target: impl Into<String>, fact: impl Into<String>) -> Self {
        Self::Threaten {
            target: target.into(),
            fact: fact.into(),
        }
    }

    /// Build an expose intent.
    #[must_use]
    pub fn expose(target: impl Into<String>, fact: impl Into<String>) -> Self {
        Self::Expose {
            target: target.into(),
            fact: fact.into(),
        }
    }

    /// The AP-costing action behind this intent, if any.
    #[must_use]
    pub const fn action(&self) -> Option<Action> {
        match self {
            Self::Hack { .. } => Some(Action::Hack),
            Self::Scan { .. } => Some(Action::Scan),
            Self::Threaten { .. } => Some(Action::Threaten),
            Self::Expose { .. } => Some(Action::Expose),
            Self::Harass { .. } => Some(Action::Harass),
            Self::Coerce { .. } => Some(Action::Coerce),
            Self::Overwork => Some(Action::Overwork),
            Self::Relax => Some(Action::Relax),
            Self::Vtube => Some(Action::Vtube),
            Self::EndDay => None,
        }
    }

    /// The target this intent names, if any.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Hack { target, .. }
            | Self::Scan { target, .. }
            | Self::Threaten { target, .. }
            | Self::Expose { target, .. }
            | Self::Harass { target }
            | Self::Coerce { target } => Some(target.as_str()),
            Self::Overwork | Self::Relax | Self::Vtube | Self::EndDay => None,
        }
    }
}

/// What an accepted intent did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum IntentOutcome {
    /// A hack roll was made.
    Hacked {
        /// Whether it worked.
        outcome: HackOutcome,
    },
    /// A fact was scanned.
    Scanned {
        /// The fact's content.
        content: String,
    },
    /// A threat, exposure or harassment landed (possibly for zero).
    StressDealt {
        /// Stress dealt to the target.
        damage: i32,
    },
    /// Coercion had no effect.
    Coerced,
    /// The player overworked.
    Overworked {
        /// Stress taken.
        stress: i32,
    },
    /// The player relaxed.
    Relaxed {
        /// Stress removed.
        relief: i32,
    },
    /// The player streamed.
    Earned {
        /// Currency earned.
        income: i32,
    },
    /// The day ended.
    DayEnded {
        /// New day number.
        day: u32,
        /// Game state after the day.
        state: GameState,
    },
}

fn whole(value: Fixed) -> i32 {
    value.saturating_to_num::<i32>()
}

impl<R: RandomSource> World<R> {
    /// Apply one intent.
    ///
    /// # Errors
    ///
    /// Returns whatever the dispatched action returns. A rejected intent
    /// leaves the world untouched.
    pub fn apply(&mut self, intent: &Intent) -> Result<IntentOutcome> {
        match intent {
            Intent::Hack { target, fact } => self
                .hack(target, fact)
                .map(|outcome| IntentOutcome::Hacked { outcome }),
            Intent::Scan { target, fact } => self
                .scan(target, fact)
                .map(|content| IntentOutcome::Scanned { content }),
            Intent::Threaten { target, fact } => self
                .threaten(target, fact)
                .map(|damage| IntentOutcome::StressDealt { damage }),
            Intent::Expose { target, fact } => self
                .expose(target, fact)
                .map(|damage| IntentOutcome::StressDealt { damage }),
            Intent::Harass { target } => self
                .harass(target)
                .map(|damage| IntentOutcome::StressDealt { damage }),
            Intent::Coerce { target } => self.coerce(target).map(|()| IntentOutcome::Coerced),
            Intent::Overwork => self.overwork().map(|stress| IntentOutcome::Overworked {
                stress: whole(stress),
            }),
            Intent::Relax => self.relax().map(|relief| IntentOutcome::Relaxed {
                relief: whole(relief),
            }),
            Intent::Vtube => self.vtube().map(|income| IntentOutcome::Earned {
                income: whole(income),
            }),
            Intent::EndDay => {
                let state = self.end_day();
                Ok(IntentOutcome::DayEnded {
                    day: self.day(),
                    state,
                })
            }
        }
    }
}
