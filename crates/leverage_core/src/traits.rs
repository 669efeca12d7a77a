//! Per-target modifier traits.
//!
//! Traits are flags attached to a target in its level definition. They
//! alter action costs (see [`crate::player::Action::cost`]), how the target
//! takes stress and suspicion, and one level-wide effect applied when the
//! world is built.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A modifier flag on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTrait {
    /// Hack and scan cost one less action point.
    TechIlliterate,
    /// Threaten, expose, harass and coerce cost one more action point.
    BadConnection,
    /// Every target in the level starts with one less paranoia.
    Paranoiac,
    /// Takes half again as much stress.
    Sensitive,
    /// Gains suspicion twice as fast.
    Vigilant,
    /// Gains suspicion half as fast.
    Oblivious,
    /// Sheds a little stress every day.
    Therapy,
}

/// Stress shed each day by a target in therapy.
pub const THERAPY_RELIEF: i32 = 5;

/// The set of traits a target carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitSet(BTreeSet<TargetTrait>);

impl TraitSet {
    /// Create an empty trait set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a trait is present.
    #[must_use]
    pub fn contains(&self, target_trait: TargetTrait) -> bool {
        self.0.contains(&target_trait)
    }

    /// Iterate traits in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = TargetTrait> + '_ {
        self.0.iter().copied()
    }

    /// Check if no traits are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Scale a suspicion base value by the vigilance traits.
    #[must_use]
    pub fn scale_suspicion(&self, base: i32) -> i32 {
        let mut scaled = base;
        if self.contains(TargetTrait::Vigilant) {
            scaled = scaled.saturating_mul(2);
        }
        if self.contains(TargetTrait::Oblivious) {
            scaled /= 2;
        }
        scaled
    }

    /// Scale incoming stress by the sensitivity trait.
    #[must_use]
    pub fn scale_stress(&self, amount: i32) -> i32 {
        if self.contains(TargetTrait::Sensitive) {
            amount.saturating_add(amount / 2)
        } else {
            amount
        }
    }
}

impl FromIterator<TargetTrait> for TraitSet {
    fn from_iter<I: IntoIterator<Item = TargetTrait>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_is_neutral() {
        let traits = TraitSet::new();
        assert_eq!(traits.scale_suspicion(10), 10);
        assert_eq!(traits.scale_stress(10), 10);
    }

    #[test]
    fn test_sensitive_multiplies_stress() {
        let traits: TraitSet = [TargetTrait::Sensitive].into_iter().collect();
        assert_eq!(traits.scale_stress(10), 15);
        assert_eq!(traits.scale_stress(5), 7);
    }

    #[test]
    fn test_scaling_saturates() {
        let traits: TraitSet = [TargetTrait::Sensitive, TargetTrait::Vigilant]
            .into_iter()
            .collect();
        assert_eq!(traits.scale_stress(i32::MAX), i32::MAX);
        assert_eq!(traits.scale_suspicion(i32::MAX), i32::MAX);
    }

    #[test]
    fn test_vigilance_traits_cancel() {
        let traits: TraitSet = [TargetTrait::Vigilant, TargetTrait::Oblivious]
            .into_iter()
            .collect();
        assert_eq!(traits.scale_suspicion(10), 10);
    }

    #[test]
    fn test_deserializes_snake_case_list() {
        let traits: TraitSet = ron::from_str("[tech_illiterate, therapy]").unwrap();
        assert!(traits.contains(TargetTrait::TechIlliterate));
        assert!(traits.contains(TargetTrait::Therapy));
        assert!(!traits.contains(TargetTrait::Sensitive));
    }
}
