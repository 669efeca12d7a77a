//! Combo rules and their resolution.
//!
//! A combo fires when every fact it requires is known about a target. It
//! rewrites one fact (the "overwrite" fact) with an upgraded summary and
//! stress payload. When several combos match the same overwrite fact, the
//! longest wins and every matched combo is consumed.
//!
//! # Resolution order
//!
//! 1. Snapshot the candidate set (known facts plus the newly scanned one).
//! 2. For each candidate fact in name order, collect the remaining combos
//!    that overwrite it and whose requirements are all candidates.
//! 3. Apply the longest match; on equal length the earliest in definition
//!    order wins.
//! 4. Once the pass is complete, drop every matched combo.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::ComboData;
use crate::facts::Pod;

/// An immutable combo rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combo {
    required: BTreeSet<String>,
    overwrite: String,
    summary: String,
    content: Option<String>,
    target_stress_damage: i32,
}

impl Combo {
    /// Create a combo rule.
    #[must_use]
    pub fn new(
        required: impl IntoIterator<Item = String>,
        overwrite: impl Into<String>,
        summary: impl Into<String>,
        target_stress_damage: i32,
    ) -> Self {
        Self {
            required: required.into_iter().collect(),
            overwrite: overwrite.into(),
            summary: summary.into(),
            content: None,
            target_stress_damage,
        }
    }

    /// Set replacement content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Build a combo from its definition.
    #[must_use]
    pub fn from_data(data: &ComboData) -> Self {
        Self {
            required: data.required.iter().cloned().collect(),
            overwrite: data.overwrite.clone(),
            summary: data.summary.clone(),
            content: data.content.clone(),
            target_stress_damage: data.target_stress_damage,
        }
    }

    /// Facts that must all be known.
    #[must_use]
    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Fact rewritten by this combo.
    #[must_use]
    pub fn overwrite(&self) -> &str {
        &self.overwrite
    }

    /// Replacement summary.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Replacement content, if any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Replacement stress damage.
    #[must_use]
    pub const fn target_stress_damage(&self) -> i32 {
        self.target_stress_damage
    }

    /// Number of required facts.
    #[must_use]
    pub fn length(&self) -> usize {
        self.required.len()
    }

    /// Check whether this combo can fire on `fact` given `candidates`.
    #[must_use]
    pub fn matches(&self, fact: &str, candidates: &BTreeSet<String>) -> bool {
        self.overwrite == fact && self.required.is_subset(candidates)
    }
}

/// Record of one combo applied during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboApplication {
    /// Fact that was rewritten.
    pub fact: String,
    /// Facts the winning combo required.
    pub required: BTreeSet<String>,
    /// Number of combos consumed for this fact, winner included.
    pub consumed: usize,
}

/// Find and apply combos for a newly scanned fact.
///
/// `known` holds the facts already known about the target; `scanned` joins
/// them for matching. Applied combos rewrite facts in `pod`; every combo
/// that matched is removed from `combos`. Returns one record per rewritten
/// fact, empty when nothing fired.
pub fn resolve_combos(
    pod: &mut Pod,
    combos: &mut Vec<Combo>,
    known: &BTreeSet<String>,
    scanned: &str,
) -> Vec<ComboApplication> {
    if combos.is_empty() {
        return Vec::new();
    }

    let mut candidates = known.clone();
    candidates.insert(scanned.to_owned());

    let mut consumed = vec![false; combos.len()];
    let mut applications = Vec::new();

    for fact in &candidates {
        let mut winner: Option<usize> = None;
        let mut matched = 0;

        for (index, combo) in combos.iter().enumerate() {
            if !combo.matches(fact, &candidates) {
                continue;
            }
            consumed[index] = true;
            matched += 1;
            let longer = winner.map_or(true, |w| combo.length() > combos[w].length());
            if longer {
                winner = Some(index);
            }
        }

        let Some(winner) = winner else {
            continue;
        };
        let combo = &combos[winner];

        match pod.fact_mut(fact) {
            Ok(target_fact) => target_fact.apply_combo(combo),
            Err(e) => {
                tracing::warn!(fact = %fact, error = %e, "Combo overwrites a fact outside the pod");
                continue;
            }
        }

        tracing::debug!(
            owner = pod.owner(),
            fact = %fact,
            length = combo.length(),
            consumed = matched,
            "Combo applied"
        );
        applications.push(ComboApplication {
            fact: fact.clone(),
            required: combo.required.clone(),
            consumed: matched,
        });
    }

    let mut flags = consumed.into_iter();
    combos.retain(|_| !flags.next().unwrap_or(false));

    applications
}
