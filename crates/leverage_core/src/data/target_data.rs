//! Target, fact and combo definitions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::traits::TargetTrait;

/// Data-driven fact definition.
///
/// # Example RON
///
/// ```ron
/// FactData(
///     name: "ledger",
///     title: "The Ledger",
///     content: "A spreadsheet of payments routed through a shell company.",
///     summary: "Moves money through a shell company.",
///     locked: true,
///     children: ["shell_company"],
///     target_stress_damage: 15,
///     player_stress_damage: 2,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactData {
    /// Name, unique within the target's pod.
    pub name: String,

    /// Display title.
    pub title: String,

    /// Full text revealed on scan.
    pub content: String,

    /// Short text revealed on scan.
    pub summary: String,

    /// Whether a successful hack is required before scanning.
    #[serde(default)]
    pub locked: bool,

    /// Facts revealed when this fact is scanned.
    #[serde(default)]
    pub children: Vec<String>,

    /// Stress dealt to the target when used against them.
    #[serde(default)]
    pub target_stress_damage: i32,

    /// Stress the player takes when using this fact.
    #[serde(default)]
    pub player_stress_damage: i32,
}

/// Data-driven combo definition.
///
/// Once every fact in `required` is known, the fact named `overwrite` takes
/// this combo's summary (and content, if given) and stress damage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboData {
    /// Facts that must all be known.
    pub required: Vec<String>,

    /// Fact whose payload is rewritten.
    pub overwrite: String,

    /// Replacement summary.
    pub summary: String,

    /// Replacement content.
    #[serde(default)]
    pub content: Option<String>,

    /// Replacement target stress damage.
    pub target_stress_damage: i32,
}

/// Data-driven target definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetData {
    /// Name, unique within the level.
    pub name: String,

    /// Days between paranoia checks.
    #[serde(default = "default_paranoia")]
    pub paranoia: i32,

    /// Stress at which the target breaks.
    #[serde(default = "default_max_stress")]
    pub max_stress: i32,

    /// Modifier traits.
    #[serde(default)]
    pub traits: Vec<TargetTrait>,

    /// Facts visible from the start.
    pub first_facts: Vec<String>,

    /// Every fact in the target's pod.
    pub facts: Vec<FactData>,

    /// Combos over this target's facts, in priority order for ties.
    #[serde(default)]
    pub combos: Vec<ComboData>,
}

/// Default paranoia.
const fn default_paranoia() -> i32 {
    3
}

/// Default max stress.
const fn default_max_stress() -> i32 {
    100
}

impl TargetData {
    /// Find a fact by name.
    #[must_use]
    pub fn get_fact(&self, name: &str) -> Option<&FactData> {
        self.facts.iter().find(|f| f.name == name)
    }

    /// Check whether the target has a trait.
    #[must_use]
    pub fn has_trait(&self, target_trait: TargetTrait) -> bool {
        self.traits.contains(&target_trait)
    }

    /// Validate internal consistency of this target.
    ///
    /// Checks for:
    /// - Duplicate fact names
    /// - First facts, children and combo references that name missing facts
    /// - Empty combos and non-positive max stress
    /// - Negative stress damage on facts and combos
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_stress <= 0 {
            errors.push(format!(
                "Target '{}' has non-positive max_stress {}",
                self.name, self.max_stress
            ));
        }

        if self.paranoia < 0 {
            errors.push(format!(
                "Target '{}' has negative paranoia {}",
                self.name, self.paranoia
            ));
        }

        let mut seen = BTreeSet::new();
        for fact in &self.facts {
            if !seen.insert(fact.name.as_str()) {
                errors.push(format!(
                    "Target '{}' defines fact '{}' more than once",
                    self.name, fact.name
                ));
            }
        }

        if self.first_facts.is_empty() {
            errors.push(format!("Target '{}' has no first facts", self.name));
        }

        for name in &self.first_facts {
            if !seen.contains(name.as_str()) {
                errors.push(format!(
                    "Target '{}' lists unknown first fact '{}'",
                    self.name, name
                ));
            }
        }

        for fact in &self.facts {
            if fact.target_stress_damage < 0 || fact.player_stress_damage < 0 {
                errors.push(format!(
                    "Fact '{}' on target '{}' has negative stress damage",
                    fact.name, self.name
                ));
            }
            for child in &fact.children {
                if !seen.contains(child.as_str()) {
                    errors.push(format!(
                        "Fact '{}' on target '{}' has unknown child '{}'",
                        fact.name, self.name, child
                    ));
                }
            }
        }

        for (index, combo) in self.combos.iter().enumerate() {
            if combo.required.is_empty() {
                errors.push(format!(
                    "Combo #{} on target '{}' requires no facts",
                    index, self.name
                ));
            }
            if combo.target_stress_damage < 0 {
                errors.push(format!(
                    "Combo #{} on target '{}' has negative stress damage {}",
                    index, self.name, combo.target_stress_damage
                ));
            }
            if !seen.contains(combo.overwrite.as_str()) {
                errors.push(format!(
                    "Combo #{} on target '{}' overwrites unknown fact '{}'",
                    index, self.name, combo.overwrite
                ));
            }
            for required in &combo.required {
                if !seen.contains(required.as_str()) {
                    errors.push(format!(
                        "Combo #{} on target '{}' requires unknown fact '{}'",
                        index, self.name, required
                    ));
                }
            }
        }

        errors
    }
}
