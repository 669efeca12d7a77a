//! Scripted player strategies for automated playthroughs.
//!
//! A strategy looks at the world and picks the next [`Intent`]. It only
//! ever picks intents the player can afford, and falls back to
//! [`Intent::EndDay`] when nothing useful is left.

use leverage_core::intent::Intent;
use leverage_core::math::Fixed;
use leverage_core::player::Action;
use leverage_core::random::RandomSource;
use leverage_core::target::Target;
use leverage_core::traits::TraitSet;
use leverage_core::world::{Dossier, World};
use serde::{Deserialize, Serialize};

/// Tunable greedy strategy.
///
/// Priority each step:
/// 1. relax when stressed
/// 2. stream when short of money
/// 3. expose a fact that breaks its target outright
/// 4. scan anything readable
/// 5. hack locked facts
/// 6. use the most damaging scanned fact
/// 7. end the day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Relax once player stress reaches this.
    pub relax_at_stress: i32,
    /// Stream while currency is below this.
    pub stream_below_currency: i32,
    /// Threaten with the best fact instead of exposing it.
    pub prefer_threaten: bool,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::greedy()
    }
}

impl Strategy {
    /// Expose-first strategy.
    #[must_use]
    pub fn greedy() -> Self {
        Self {
            name: "greedy".to_string(),
            relax_at_stress: 70,
            stream_below_currency: 40,
            prefer_threaten: false,
        }
    }

    /// Threaten-first strategy that keeps a larger cash buffer.
    #[must_use]
    pub fn cautious() -> Self {
        Self {
            name: "cautious".to_string(),
            relax_at_stress: 50,
            stream_below_currency: 60,
            prefer_threaten: true,
        }
    }

    /// Look up a preset by name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "greedy" => Some(Self::greedy()),
            "cautious" => Some(Self::cautious()),
            _ => None,
        }
    }

    /// Pick the next intent.
    #[must_use]
    pub fn decide<R: RandomSource>(&self, world: &World<R>) -> Intent {
        let player = world.player();
        let no_traits = TraitSet::new();

        if player.stress() >= Fixed::from_num(self.relax_at_stress)
            && player.can_perform(Action::Relax, &no_traits)
        {
            return Intent::Relax;
        }

        if player.currency() < Fixed::from_num(self.stream_below_currency)
            && player.can_perform(Action::Vtube, &no_traits)
        {
            return Intent::Vtube;
        }

        let active: Vec<(&Target, &Dossier)> = world
            .targets()
            .filter(|t| t.is_active())
            .filter_map(|t| world.dossier(t.name()).ok().map(|d| (t, d)))
            .collect();

        let affordable =
            |action: Action, target: &Target| player.can_perform(action, target.traits());

        for (target, dossier) in &active {
            if !affordable(Action::Expose, target) {
                continue;
            }
            let remaining = target.max_stress() - target.stress();
            if let Some(fact) = dossier
                .exposable()
                .iter()
                .find(|fact| damage(target, fact) >= remaining)
            {
                return Intent::expose(target.name(), fact.as_str());
            }
        }

        for (target, dossier) in &active {
            if !affordable(Action::Scan, target) {
                continue;
            }
            let readable = dossier
                .visible()
                .iter()
                .find(|fact| dossier.is_hacked(fact) && !dossier.is_scanned(fact));
            if let Some(fact) = readable {
                return Intent::scan(target.name(), fact.as_str());
            }
        }

        for (target, dossier) in &active {
            if !affordable(Action::Hack, target) {
                continue;
            }
            let locked = dossier
                .visible()
                .iter()
                .find(|fact| !dossier.is_hacked(fact));
            if let Some(fact) = locked {
                return Intent::hack(target.name(), fact.as_str());
            }
        }

        let action = if self.prefer_threaten {
            Action::Threaten
        } else {
            Action::Expose
        };
        let best = active
            .iter()
            .filter(|(target, _)| affordable(action, target))
            .flat_map(|(target, dossier)| {
                dossier
                    .exposable()
                    .iter()
                    .map(move |fact| (damage(target, fact), *target, fact))
            })
            .filter(|(damage, _, _)| *damage > 0)
            .max_by_key(|(damage, _, _)| *damage);

        match best {
            Some((_, target, fact)) if self.prefer_threaten => {
                Intent::threaten(target.name(), fact.as_str())
            }
            Some((_, target, fact)) => Intent::expose(target.name(), fact.as_str()),
            None => Intent::EndDay,
        }
    }
}

fn damage(target: &Target, fact: &str) -> i32 {
    target
        .fact(fact)
        .map_or(0, |f| target.traits().scale_stress(f.target_stress_damage()))
}
