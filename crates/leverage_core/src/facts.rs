//! Fact graphs ("pods").
//!
//! Each target owns a pod: the set of discoverable facts about them, with
//! parent → child edges deciding which facts become visible once a fact is
//! scanned. Pods are built once from level data and never change shape.
//! Cycles are allowed; every traversal here uses a visited set.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::combo::Combo;
use crate::data::{FactData, TargetData};
use crate::error::{GameError, Result};

/// A discoverable piece of information about a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fact {
    name: String,
    title: String,
    content: String,
    summary: String,
    locked: bool,
    target_stress_damage: i32,
    player_stress_damage: i32,
    children: BTreeSet<String>,
}

impl Fact {
    /// Build a fact from its definition.
    #[must_use]
    pub fn from_data(data: &FactData) -> Self {
        Self {
            name: data.name.clone(),
            title: data.title.clone(),
            content: data.content.clone(),
            summary: data.summary.clone(),
            locked: data.locked,
            target_stress_damage: data.target_stress_damage,
            player_stress_damage: data.player_stress_damage,
            children: data.children.iter().cloned().collect(),
        }
    }

    /// Name, unique within the pod.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Full text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Short text.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Whether a successful hack is required before scanning.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Stress dealt to the target when this fact is used.
    #[must_use]
    pub const fn target_stress_damage(&self) -> i32 {
        self.target_stress_damage
    }

    /// Stress the player takes when using this fact.
    #[must_use]
    pub const fn player_stress_damage(&self) -> i32 {
        self.player_stress_damage
    }

    /// Facts revealed when this fact is scanned.
    #[must_use]
    pub fn children(&self) -> &BTreeSet<String> {
        &self.children
    }

    /// Rewrite this fact's payload with a combo's replacement values.
    ///
    /// Identity, children and lock status are untouched.
    pub(crate) fn apply_combo(&mut self, combo: &Combo) {
        self.summary = combo.summary().to_owned();
        if let Some(content) = combo.content() {
            self.content = content.to_owned();
        }
        self.target_stress_damage = combo.target_stress_damage();
    }
}

/// A target's full fact graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pod {
    owner: String,
    facts: BTreeMap<String, Fact>,
    first_facts: BTreeSet<String>,
}

impl Pod {
    /// Build a pod, checking that every reference resolves inside it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidLevel`] on duplicate facts or when the
    /// first facts or any child set name a fact outside the pod.
    pub fn new(
        owner: impl Into<String>,
        facts: impl IntoIterator<Item = Fact>,
        first_facts: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let owner = owner.into();
        let mut by_name = BTreeMap::new();
        for fact in facts {
            let name = fact.name.clone();
            if by_name.insert(name.clone(), fact).is_some() {
                return Err(GameError::InvalidLevel(format!(
                    "Target '{owner}' defines fact '{name}' more than once"
                )));
            }
        }

        let first_facts: BTreeSet<String> = first_facts.into_iter().collect();
        if let Some(missing) = first_facts.iter().find(|f| !by_name.contains_key(*f)) {
            return Err(GameError::InvalidLevel(format!(
                "Target '{owner}' lists unknown first fact '{missing}'"
            )));
        }

        for fact in by_name.values() {
            if let Some(missing) = fact.children.iter().find(|c| !by_name.contains_key(*c)) {
                return Err(GameError::InvalidLevel(format!(
                    "Fact '{}' on target '{owner}' has unknown child '{missing}'",
                    fact.name
                )));
            }
        }

        Ok(Self {
            owner,
            facts: by_name,
            first_facts,
        })
    }

    /// Build a pod from a target definition.
    ///
    /// # Errors
    ///
    /// See [`Pod::new`].
    pub fn from_data(data: &TargetData) -> Result<Self> {
        Self::new(
            data.name.clone(),
            data.facts.iter().map(Fact::from_data),
            data.first_facts.iter().cloned(),
        )
    }

    /// Name of the target owning this pod.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Facts visible when the level starts.
    #[must_use]
    pub fn first_facts(&self) -> &BTreeSet<String> {
        &self.first_facts
    }

    /// Look up a fact.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownFact`] if the pod has no such fact.
    pub fn fact(&self, name: &str) -> Result<&Fact> {
        self.facts
            .get(name)
            .ok_or_else(|| GameError::unknown_fact(&self.owner, name))
    }

    /// Children of a fact.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownFact`] if the pod has no such fact.
    pub fn children(&self, name: &str) -> Result<&BTreeSet<String>> {
        self.fact(name).map(Fact::children)
    }

    pub(crate) fn fact_mut(&mut self, name: &str) -> Result<&mut Fact> {
        let owner = &self.owner;
        self.facts
            .get_mut(name)
            .ok_or_else(|| GameError::unknown_fact(owner, name))
    }

    /// Number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Check if the pod has no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterate facts in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }

    /// Every fact reachable from the first facts through child edges.
    #[must_use]
    pub fn reachable(&self) -> BTreeSet<String> {
        let mut visited: BTreeSet<String> = BTreeSet::new();
        let mut pending: Vec<&str> = self.first_facts.iter().map(String::as_str).collect();

        while let Some(name) = pending.pop() {
            if !visited.insert(name.to_owned()) {
                continue;
            }
            if let Some(fact) = self.facts.get(name) {
                pending.extend(
                    fact.children
                        .iter()
                        .filter(|c| !visited.contains(*c))
                        .map(String::as_str),
                );
            }
        }

        visited
    }

    /// Facts no scan sequence can ever reveal.
    #[must_use]
    pub fn unreachable(&self) -> Vec<&str> {
        let reachable = self.reachable();
        self.iter()
            .map(Fact::name)
            .filter(|name| !reachable.contains(*name))
            .collect()
    }
}
