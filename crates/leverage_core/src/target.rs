//! Target state machine.
//!
//! A target drifts between awareness states on a paranoia countdown and is
//! pushed around by the player's skills. Stress only ever rises (apart from
//! daily therapy relief); reaching max stress defeats the target. A target
//! left paranoid when its countdown runs out ends the game.
//!
//! # Day cycle
//!
//! ```text
//!            roll < suspicion
//!  Unaware ------------------> Suspicious
//!     ^                            |
//!     +------- countdown ----------+
//!
//!  threaten ─> Threatened ─countdown─> Paranoid ─countdown─> GameOver
//!  expose   ─────────────────────────> Paranoid
//!  stress >= max ─> Defeated
//! ```
//!
//! `Defeated` and `GameOver` are terminal: every mutator becomes a no-op.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::combo::{resolve_combos, Combo, ComboApplication};
use crate::data::TargetData;
use crate::error::Result;
use crate::facts::{Fact, Pod};
use crate::random::{rand_in_range, RandomSource};
use crate::traits::{TargetTrait, TraitSet, THERAPY_RELIEF};

/// Upper bound of suspicion.
pub const MAX_SUSPICION: i32 = 100;

/// Paranoia and the suspicious-state cadence sum to this constant.
pub const INV_PARANOIA_CONSTANT: i32 = 10;

/// A threat only lands if the fact deals more stress than this.
pub const THREATEN_THRESHOLD: i32 = 10;

/// Suspicion band for quiet actions (base, percent).
pub const SUSPICION_LOW: (i32, i32) = (5, 50);

/// Suspicion band for loud actions (base, percent).
pub const SUSPICION_MEDIUM: (i32, i32) = (15, 50);

/// Stress band for harassment (base, percent).
pub const HARASS_STRESS: (i32, i32) = (5, 40);

/// Awareness state of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetState {
    /// Going about their day.
    #[default]
    Unaware,
    /// Noticed something; calms down when the countdown ends.
    Suspicious,
    /// Knows they are being targeted; game over when the countdown ends.
    Paranoid,
    /// Recently threatened; turns paranoid when the countdown ends.
    Threatened,
    /// Broken by stress. The player's goal.
    Defeated,
    /// Escaped the player's grip. The player loses.
    GameOver,
}

impl TargetState {
    /// Check whether this state accepts no further changes.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Defeated | Self::GameOver)
    }
}

/// An NPC under investigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    name: String,
    max_stress: i32,
    stress: i32,
    suspicion: i32,
    paranoia: i32,
    countdown: i32,
    state: TargetState,
    traits: TraitSet,
    pod: Pod,
    combos: Vec<Combo>,
}

impl Target {
    /// Create a target with the given pod and no combos.
    #[must_use]
    pub fn new(name: impl Into<String>, paranoia: i32, max_stress: i32, pod: Pod) -> Self {
        let paranoia = paranoia.max(0);
        Self {
            name: name.into(),
            max_stress,
            stress: 0,
            suspicion: 0,
            paranoia,
            countdown: paranoia.max(1),
            state: TargetState::Unaware,
            traits: TraitSet::new(),
            pod,
            combos: Vec::new(),
        }
    }

    /// Attach traits.
    #[must_use]
    pub fn with_traits(mut self, traits: TraitSet) -> Self {
        self.traits = traits;
        self
    }

    /// Attach combos.
    #[must_use]
    pub fn with_combos(mut self, combos: Vec<Combo>) -> Self {
        self.combos = combos;
        self
    }

    /// Build a target from its definition.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GameError::InvalidLevel`] if the fact graph is
    /// inconsistent.
    pub fn from_data(data: &TargetData) -> Result<Self> {
        let pod = Pod::from_data(data)?;
        Ok(Self::new(data.name.clone(), data.paranoia, data.max_stress, pod)
            .with_traits(data.traits.iter().copied().collect())
            .with_combos(data.combos.iter().map(Combo::from_data).collect()))
    }

    /// Name, unique within the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current stress.
    #[must_use]
    pub const fn stress(&self) -> i32 {
        self.stress
    }

    /// Stress at which the target is defeated.
    #[must_use]
    pub const fn max_stress(&self) -> i32 {
        self.max_stress
    }

    /// Current suspicion, always within `[0, 100]`.
    #[must_use]
    pub const fn suspicion(&self) -> i32 {
        self.suspicion
    }

    /// Current paranoia.
    #[must_use]
    pub const fn paranoia(&self) -> i32 {
        self.paranoia
    }

    /// Days until the next state check.
    #[must_use]
    pub const fn countdown(&self) -> i32 {
        self.countdown
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TargetState {
        self.state
    }

    /// Traits.
    #[must_use]
    pub fn traits(&self) -> &TraitSet {
        &self.traits
    }

    /// Fact graph.
    #[must_use]
    pub fn pod(&self) -> &Pod {
        &self.pod
    }

    /// Look up a fact in this target's pod.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GameError::UnknownFact`] if absent.
    pub fn fact(&self, name: &str) -> Result<&Fact> {
        self.pod.fact(name)
    }

    /// Combos not yet applied or pruned.
    #[must_use]
    pub fn combos(&self) -> &[Combo] {
        &self.combos
    }

    /// Check whether the target still accepts actions.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }

    /// Lower paranoia, floored at zero. Used by the level-wide paranoiac effect.
    pub fn reduce_paranoia(&mut self, amount: i32) {
        self.paranoia = (self.paranoia - amount).max(0);
        self.countdown = self.countdown.min(self.paranoia.max(1));
    }

    fn reset_countdown(&mut self, days: i32) {
        self.countdown = days.max(1);
    }

    fn enter(&mut self, state: TargetState) {
        if self.state != state {
            tracing::info!(target_name = %self.name, from = ?self.state, to = ?state, "Target state changed");
        }
        self.state = state;
    }

    /// Advance to the next day and return the resulting state.
    pub fn next_turn<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> TargetState {
        if self.state.is_terminal() {
            return self.state;
        }

        if self.traits.contains(TargetTrait::Therapy) {
            self.stress = (self.stress - THERAPY_RELIEF).max(0);
        }

        self.countdown -= 1;
        if self.countdown > 0 {
            return self.state;
        }

        match self.state {
            TargetState::Unaware => {
                if rng.percent() < self.suspicion {
                    self.enter(TargetState::Suspicious);
                    self.reset_countdown(INV_PARANOIA_CONSTANT - self.paranoia);
                } else {
                    self.reset_countdown(self.paranoia);
                }
            }
            TargetState::Suspicious => {
                self.enter(TargetState::Unaware);
                self.reset_countdown(self.paranoia);
            }
            TargetState::Paranoid => {
                self.enter(TargetState::GameOver);
            }
            TargetState::Threatened => {
                self.enter(TargetState::Paranoid);
                self.reset_countdown(self.paranoia);
            }
            TargetState::Defeated | TargetState::GameOver => {}
        }

        self.state
    }

    /// Add stress. Returns whether the target is still active afterwards.
    ///
    /// Negative amounts are ignored; use therapy for relief.
    pub fn add_stress(&mut self, amount: i32) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.stress = self
            .stress
            .saturating_add(self.traits.scale_stress(amount.max(0)));
        if self.stress >= self.max_stress {
            self.enter(TargetState::Defeated);
            return false;
        }
        true
    }

    /// Add (or remove) suspicion, clamped to `[0, 100]`.
    pub fn add_suspicion(&mut self, amount: i32) {
        if self.state.is_terminal() {
            return;
        }
        self.suspicion = (self.suspicion.saturating_add(amount)).clamp(0, MAX_SUSPICION);
    }

    fn raise_suspicion<R: RandomSource + ?Sized>(&mut self, rng: &mut R, band: (i32, i32)) {
        let (base, percent) = band;
        let amount = rand_in_range(rng, self.traits.scale_suspicion(base), percent);
        self.add_suspicion(amount);
    }

    /// Pester the target. Returns the stress dealt.
    pub fn harass<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> i32 {
        if self.state.is_terminal() {
            return 0;
        }
        self.raise_suspicion(rng, SUSPICION_LOW);
        let (base, percent) = HARASS_STRESS;
        let damage = rand_in_range(rng, base, percent);
        self.add_stress(damage);
        damage
    }

    /// Threaten the target with one of their facts.
    ///
    /// Only facts dealing more than [`THREATEN_THRESHOLD`] stress land; a
    /// landed threat leaves the target [`TargetState::Threatened`]. Returns
    /// the stress dealt (zero when the threat falls flat).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GameError::UnknownFact`] if absent.
    pub fn threaten<R: RandomSource + ?Sized>(&mut self, fact: &str, rng: &mut R) -> Result<i32> {
        let damage = self.pod.fact(fact)?.target_stress_damage();
        if self.state.is_terminal() {
            return Ok(0);
        }
        self.raise_suspicion(rng, SUSPICION_LOW);
        if damage <= THREATEN_THRESHOLD {
            return Ok(0);
        }
        if self.add_stress(damage) {
            self.enter(TargetState::Threatened);
            self.reset_countdown(self.paranoia);
        }
        Ok(damage)
    }

    /// Expose one of the target's facts. Returns the stress dealt.
    ///
    /// Any damaging exposure leaves the target [`TargetState::Paranoid`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GameError::UnknownFact`] if absent.
    pub fn expose<R: RandomSource + ?Sized>(&mut self, fact: &str, rng: &mut R) -> Result<i32> {
        let damage = self.pod.fact(fact)?.target_stress_damage().max(0);
        if self.state.is_terminal() {
            return Ok(0);
        }
        self.raise_suspicion(rng, SUSPICION_MEDIUM);
        if damage > 0 && self.add_stress(damage) {
            self.enter(TargetState::Paranoid);
            self.reset_countdown(self.paranoia);
        }
        Ok(damage)
    }

    /// Resolve combos for a newly scanned fact against the facts already known.
    pub fn check_for_combo(
        &mut self,
        known: &BTreeSet<String>,
        scanned: &str,
    ) -> Vec<ComboApplication> {
        resolve_combos(&mut self.pod, &mut self.combos, known, scanned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FactData;
    use crate::random::ScriptedRandom;

    fn fact(name: &str, damage: i32) -> Fact {
        Fact::from_data(&FactData {
            name: name.to_string(),
            title: name.to_string(),
            content: String::new(),
            summary: String::new(),
            locked: false,
            children: vec![],
            target_stress_damage: damage,
            player_stress_damage: 0,
        })
    }

    fn target(paranoia: i32, max_stress: i32) -> Target {
        let pod = Pod::new(
            "mayor",
            vec![fact("weak", 5), fact("strong", 25), fact("empty", 0)],
            vec!["weak".to_string()],
        )
        .unwrap();
        Target::new("mayor", paranoia, max_stress, pod)
    }

    fn with_traits(target: Target, list: &[TargetTrait]) -> Target {
        target.with_traits(list.iter().copied().collect())
    }

    #[test]
    fn test_initial_state() {
        let t = target(3, 100);
        assert_eq!(t.state(), TargetState::Unaware);
        assert_eq!(t.countdown(), 3);
        assert_eq!(t.stress(), 0);
        assert_eq!(t.suspicion(), 0);
        assert!(t.is_active());
    }

    #[test]
    fn test_defeat_is_terminal() {
        let mut t = target(3, 100);
        assert!(t.add_stress(60));
        assert!(!t.add_stress(45));
        assert_eq!(t.state(), TargetState::Defeated);
        assert!(t.stress() >= 100);

        let stress = t.stress();
        assert!(!t.add_stress(10));
        assert_eq!(t.stress(), stress);
        t.add_suspicion(50);
        assert_eq!(t.suspicion(), 0);
        assert_eq!(t.next_turn(&mut ScriptedRandom::lowest()), TargetState::Defeated);
    }

    #[test]
    fn test_stress_saturates_at_max() {
        let mut t = target(3, i32::MAX);
        assert!(t.add_stress(2_000_000_000));
        assert!(!t.add_stress(2_000_000_000));
        assert_eq!(t.stress(), i32::MAX);
        assert_eq!(t.state(), TargetState::Defeated);

        let mut sensitive = with_traits(target(3, i32::MAX), &[TargetTrait::Sensitive]);
        assert!(!sensitive.add_stress(i32::MAX));
        assert_eq!(sensitive.stress(), i32::MAX);
    }

    #[test]
    fn test_suspicion_clamped() {
        let mut t = target(3, 100);
        t.add_suspicion(150);
        assert_eq!(t.suspicion(), 100);
        t.add_suspicion(-250);
        assert_eq!(t.suspicion(), 0);
        t.add_suspicion(i32::MAX);
        assert_eq!(t.suspicion(), 100);
    }

    #[test]
    fn test_countdown_only_checks_at_zero() {
        let mut t = target(3, 100);
        t.add_suspicion(100);
        let mut rng = ScriptedRandom::lowest();
        assert_eq!(t.next_turn(&mut rng), TargetState::Unaware);
        assert_eq!(t.next_turn(&mut rng), TargetState::Unaware);
        assert_eq!(t.next_turn(&mut rng), TargetState::Suspicious);
        assert_eq!(t.countdown(), INV_PARANOIA_CONSTANT - 3);
    }

    #[test]
    fn test_failed_paranoia_check_resets_countdown() {
        let mut t = target(2, 100);
        let mut rng = ScriptedRandom::highest();
        t.next_turn(&mut rng);
        assert_eq!(t.next_turn(&mut rng), TargetState::Unaware);
        assert_eq!(t.countdown(), 2);
    }

    #[test]
    fn test_suspicious_calms_down() {
        let mut t = target(1, 100);
        t.add_suspicion(100);
        let mut rng = ScriptedRandom::lowest();
        assert_eq!(t.next_turn(&mut rng), TargetState::Suspicious);
        for _ in 0..INV_PARANOIA_CONSTANT - 2 {
            assert_eq!(t.next_turn(&mut rng), TargetState::Suspicious);
        }
        assert_eq!(t.next_turn(&mut rng), TargetState::Unaware);
        assert_eq!(t.countdown(), 1);
    }

    #[test]
    fn test_threaten_escalates_to_game_over() {
        let mut t = target(1, 100);
        let mut rng = ScriptedRandom::lowest();

        assert_eq!(t.threaten("strong", &mut rng).unwrap(), 25);
        assert_eq!(t.state(), TargetState::Threatened);
        assert_eq!(t.stress(), 25);
        assert_eq!(t.suspicion(), 3);

        assert_eq!(t.next_turn(&mut rng), TargetState::Paranoid);
        assert_eq!(t.next_turn(&mut rng), TargetState::GameOver);
        assert_eq!(t.next_turn(&mut rng), TargetState::GameOver);
    }

    #[test]
    fn test_weak_threat_falls_flat() {
        let mut t = target(3, 100);
        let mut rng = ScriptedRandom::highest();
        assert_eq!(t.threaten("weak", &mut rng).unwrap(), 0);
        assert_eq!(t.state(), TargetState::Unaware);
        assert_eq!(t.stress(), 0);
        assert_eq!(t.suspicion(), 7);
    }

    #[test]
    fn test_expose_makes_paranoid() {
        let mut t = target(3, 100);
        let mut rng = ScriptedRandom::lowest();
        assert_eq!(t.expose("weak", &mut rng).unwrap(), 5);
        assert_eq!(t.state(), TargetState::Paranoid);
        assert_eq!(t.suspicion(), 8);
        assert_eq!(t.countdown(), 3);
    }

    #[test]
    fn test_empty_expose_changes_nothing_but_suspicion() {
        let mut t = target(3, 100);
        let mut rng = ScriptedRandom::highest();
        assert_eq!(t.expose("empty", &mut rng).unwrap(), 0);
        assert_eq!(t.state(), TargetState::Unaware);
        assert_eq!(t.suspicion(), 22);
    }

    #[test]
    fn test_negative_expose_is_harmless() {
        let pod = Pod::new("mark", vec![fact("smear", -5)], vec!["smear".to_string()]).unwrap();
        let mut t = Target::new("mark", 3, 100, pod);
        assert_eq!(t.expose("smear", &mut ScriptedRandom::lowest()).unwrap(), 0);
        assert_eq!(t.state(), TargetState::Unaware);
        assert_eq!(t.stress(), 0);
    }

    #[test]
    fn test_lethal_expose_defeats() {
        let mut t = target(3, 20);
        assert_eq!(t.expose("strong", &mut ScriptedRandom::lowest()).unwrap(), 25);
        assert_eq!(t.state(), TargetState::Defeated);
    }

    #[test]
    fn test_unknown_fact() {
        let mut t = target(3, 100);
        assert!(t.threaten("ghost", &mut ScriptedRandom::lowest()).is_err());
        assert!(t.expose("ghost", &mut ScriptedRandom::lowest()).is_err());
    }

    #[test]
    fn test_harass_band() {
        let mut t = target(3, 100);
        let damage = t.harass(&mut ScriptedRandom::highest());
        assert_eq!(damage, 7);
        assert_eq!(t.stress(), 7);
        assert_eq!(t.suspicion(), 7);
        assert_eq!(t.state(), TargetState::Unaware);
    }

    #[test]
    fn test_sensitive_and_vigilant() {
        let mut t = with_traits(
            target(3, 100),
            &[TargetTrait::Sensitive, TargetTrait::Vigilant],
        );
        t.threaten("strong", &mut ScriptedRandom::lowest()).unwrap();
        assert_eq!(t.stress(), 37);
        assert_eq!(t.suspicion(), 5);
    }

    #[test]
    fn test_therapy_relieves_stress() {
        let mut t = with_traits(target(5, 100), &[TargetTrait::Therapy]);
        t.add_stress(12);
        t.next_turn(&mut ScriptedRandom::highest());
        assert_eq!(t.stress(), 7);
        t.next_turn(&mut ScriptedRandom::highest());
        t.next_turn(&mut ScriptedRandom::highest());
        assert_eq!(t.stress(), 0);
    }

    #[test]
    fn test_reduce_paranoia_floors() {
        let mut t = target(1, 100);
        t.reduce_paranoia(1);
        assert_eq!(t.paranoia(), 0);
        assert_eq!(t.countdown(), 1);
        t.reduce_paranoia(1);
        assert_eq!(t.paranoia(), 0);
    }
}
