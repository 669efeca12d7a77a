//! World/level controller.
//!
//! The [`World`] owns the player, every target in the level and the
//! player's dossier on each target. It checks every player action against
//! the fact graphs and the player's resources, spends the resources, hands
//! skill effects to the targets and advances the day.
//!
//! # Day order
//!
//! 1. Player turn (overwork reset, AP top-up, upkeep, dream stress)
//! 2. Target turns, in name order
//! 3. Day counter increment
//! 4. Aggregate game state
//!
//! Every query and action takes target and fact names; unknown names are
//! reported as errors before anything changes.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::data::LevelData;
use crate::error::{GameError, Result};
use crate::facts::Fact;
use crate::hash::StableHasher;
use crate::math::Fixed;
use crate::player::{Action, Player};
use crate::random::{RandomSource, SeededRandom};
use crate::target::{Target, TargetState};
use crate::traits::TargetTrait;

/// Percent chance that a hack attempt fails.
pub const HACK_FAILURE_CHANCE: i32 = 20;

/// Suspicion a failed hack adds to the target.
pub const HACK_FAILURE_SUSPICION: i32 = 25;

/// Result of a hack attempt that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HackOutcome {
    /// The fact is now hacked.
    Succeeded,
    /// The roll failed. AP was spent and the target grew suspicious.
    Failed,
}

/// Aggregate outcome of the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// Still playing.
    #[default]
    Ongoing,
    /// Every target is defeated.
    Win,
    /// The player burned out or went broke, or a target escaped.
    Lose,
}

impl GameState {
    /// Check whether the level has ended.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

/// What the player knows about one target.
///
/// Visibility, hack and scan records only grow; a fact leaves the
/// exposable set once it is exposed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dossier {
    visible: BTreeSet<String>,
    hacked: BTreeSet<String>,
    exposable: BTreeSet<String>,
    summaries: BTreeMap<String, String>,
    contents: BTreeMap<String, String>,
}

impl Dossier {
    fn new(target: &Target) -> Result<Self> {
        let mut dossier = Self::default();
        for name in target.pod().first_facts() {
            dossier.reveal(target.fact(name)?);
        }
        Ok(dossier)
    }

    /// Make a fact visible. Unlocked facts count as hacked on sight.
    fn reveal(&mut self, fact: &Fact) {
        self.visible.insert(fact.name().to_owned());
        if !fact.is_locked() {
            self.hacked.insert(fact.name().to_owned());
        }
    }

    /// Facts the player can see.
    #[must_use]
    pub fn visible(&self) -> &BTreeSet<String> {
        &self.visible
    }

    /// Facts hacked successfully, plus every unlocked fact in sight.
    #[must_use]
    pub fn hacked(&self) -> &BTreeSet<String> {
        &self.hacked
    }

    /// Scanned facts not yet exposed.
    #[must_use]
    pub fn exposable(&self) -> &BTreeSet<String> {
        &self.exposable
    }

    /// Known summaries, keyed by fact.
    #[must_use]
    pub fn summaries(&self) -> &BTreeMap<String, String> {
        &self.summaries
    }

    /// Known contents, keyed by fact.
    #[must_use]
    pub fn contents(&self) -> &BTreeMap<String, String> {
        &self.contents
    }

    /// Check whether a fact is visible.
    #[must_use]
    pub fn is_visible(&self, fact: &str) -> bool {
        self.visible.contains(fact)
    }

    /// Check whether a fact was hacked.
    #[must_use]
    pub fn is_hacked(&self, fact: &str) -> bool {
        self.hacked.contains(fact)
    }

    /// Check whether a fact was scanned.
    #[must_use]
    pub fn is_scanned(&self, fact: &str) -> bool {
        self.summaries.contains_key(fact)
    }

    /// Check whether a fact can still be threatened with or exposed.
    #[must_use]
    pub fn is_exposable(&self, fact: &str) -> bool {
        self.exposable.contains(fact)
    }

    /// Every scanned fact.
    #[must_use]
    pub fn known(&self) -> BTreeSet<String> {
        self.summaries.keys().cloned().collect()
    }

    /// Known summary of a fact.
    #[must_use]
    pub fn summary(&self, fact: &str) -> Option<&str> {
        self.summaries.get(fact).map(String::as_str)
    }

    /// Known content of a fact.
    #[must_use]
    pub fn content(&self, fact: &str) -> Option<&str> {
        self.contents.get(fact).map(String::as_str)
    }

    fn record(&mut self, fact: &Fact) {
        self.summaries
            .insert(fact.name().to_owned(), fact.summary().to_owned());
        self.contents
            .insert(fact.name().to_owned(), fact.content().to_owned());
    }
}

/// Serializable world state, without the random source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Days elapsed.
    pub day: u32,
    /// Player resources.
    pub player: Player,
    /// Targets by name.
    pub targets: BTreeMap<String, Target>,
    /// Dossiers by target name.
    pub dossiers: BTreeMap<String, Dossier>,
}

/// The level being played.
///
/// Generic over its random source so tests can script every roll.
///
/// # Example
///
/// ```
/// use leverage_core::data::{FactData, LevelData, TargetData};
/// use leverage_core::random::SeededRandom;
/// use leverage_core::world::{GameState, World};
///
/// let level = LevelData {
///     name: "demo".to_string(),
///     starting_currency: 100,
///     targets: vec![TargetData {
///         name: "clerk".to_string(),
///         paranoia: 3,
///         max_stress: 100,
///         traits: vec![],
///         first_facts: vec!["desk".to_string()],
///         facts: vec![FactData {
///             name: "desk".to_string(),
///             title: "Desk".to_string(),
///             content: "A cluttered desk.".to_string(),
///             summary: "Messy.".to_string(),
///             locked: false,
///             children: vec![],
///             target_stress_damage: 5,
///             player_stress_damage: 0,
///         }],
///         combos: vec![],
///     }],
/// };
///
/// let mut world = World::new(&level, SeededRandom::new(7)).unwrap();
/// assert_eq!(world.scan("clerk", "desk").unwrap(), "A cluttered desk.");
/// assert_eq!(world.end_day(), GameState::Ongoing);
/// assert_eq!(world.day(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct World<R: RandomSource = SeededRandom> {
    day: u32,
    player: Player,
    targets: BTreeMap<String, Target>,
    dossiers: BTreeMap<String, Dossier>,
    rng: R,
}

fn entry<'a>(
    targets: &'a mut BTreeMap<String, Target>,
    dossiers: &'a mut BTreeMap<String, Dossier>,
    name: &str,
) -> Result<(&'a mut Target, &'a mut Dossier)> {
    let target = targets
        .get_mut(name)
        .ok_or_else(|| GameError::UnknownTarget(name.to_owned()))?;
    let dossier = dossiers
        .get_mut(name)
        .ok_or_else(|| GameError::InvalidState(format!("No dossier for target '{name}'")))?;
    Ok((target, dossier))
}

fn ensure_active(target: &Target) -> Result<()> {
    if target.is_active() {
        Ok(())
    } else {
        Err(GameError::TargetInactive {
            target: target.name().to_owned(),
            state: target.state(),
        })
    }
}

/// Check that a fact was scanned and has not been exposed yet.
fn ensure_usable(target: &Target, dossier: &Dossier, fact: &str) -> Result<()> {
    target.fact(fact)?;
    let names = || (target.name().to_owned(), fact.to_owned());
    if !dossier.is_scanned(fact) {
        let (target, fact) = names();
        return Err(GameError::FactNotScanned { target, fact });
    }
    if !dossier.is_exposable(fact) {
        let (target, fact) = names();
        return Err(GameError::FactNotExposable { target, fact });
    }
    Ok(())
}

impl<R: RandomSource> World<R> {
    /// Build a world from a level definition.
    ///
    /// If any target carries the `paranoiac` trait, every target's paranoia
    /// drops by one, once.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidLevel`] if the level fails validation.
    pub fn new(level: &LevelData, rng: R) -> Result<Self> {
        let errors = level.validate();
        if !errors.is_empty() {
            return Err(GameError::InvalidLevel(errors.join("; ")));
        }

        let mut targets = BTreeMap::new();
        let mut dossiers = BTreeMap::new();
        for data in &level.targets {
            let target = Target::from_data(data)?;
            dossiers.insert(data.name.clone(), Dossier::new(&target)?);
            targets.insert(data.name.clone(), target);
        }

        if level
            .targets
            .iter()
            .any(|t| t.has_trait(TargetTrait::Paranoiac))
        {
            for target in targets.values_mut() {
                target.reduce_paranoia(1);
            }
        }

        tracing::info!(
            level = %level.name,
            targets = targets.len(),
            "World created"
        );

        Ok(Self {
            day: 0,
            player: Player::new(level.starting_currency),
            targets,
            dossiers,
            rng,
        })
    }

    /// Rebuild a world from a snapshot with a fresh random source.
    #[must_use]
    pub fn restore(snapshot: WorldSnapshot, rng: R) -> Self {
        Self {
            day: snapshot.day,
            player: snapshot.player,
            targets: snapshot.targets,
            dossiers: snapshot.dossiers,
            rng,
        }
    }

    /// Copy out the world state.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            day: self.day,
            player: self.player.clone(),
            targets: self.targets.clone(),
            dossiers: self.dossiers.clone(),
        }
    }

    /// Serialize the world state. The random source is not included.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(&self.snapshot())
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize world: {e}")))
    }

    /// Deserialize world state produced by [`World::serialize`].
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8], rng: R) -> Result<Self> {
        let snapshot: WorldSnapshot = bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize world: {e}")))?;
        Ok(Self::restore(snapshot, rng))
    }

    /// Hash of the full world state, for determinism checks.
    ///
    /// Uses [`StableHasher`], so the value is the same on every platform and
    /// toolchain and can be stored in replay files.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = StableHasher::new();
        self.day.hash(&mut hasher);
        self.player.hash(&mut hasher);
        self.targets.hash(&mut hasher);
        self.dossiers.hash(&mut hasher);
        hasher.finish()
    }

    /// Days elapsed.
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Player resources.
    #[must_use]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// Look up a target.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTarget`] if absent.
    pub fn target(&self, name: &str) -> Result<&Target> {
        self.targets
            .get(name)
            .ok_or_else(|| GameError::UnknownTarget(name.to_owned()))
    }

    /// Iterate targets in name order.
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    /// The player's dossier on a target.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTarget`] if absent.
    pub fn dossier(&self, name: &str) -> Result<&Dossier> {
        self.dossiers
            .get(name)
            .ok_or_else(|| GameError::UnknownTarget(name.to_owned()))
    }

    /// Visible facts of a target.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTarget`] if absent.
    pub fn visible_facts(&self, target: &str) -> Result<&BTreeSet<String>> {
        self.dossier(target).map(Dossier::visible)
    }

    /// Hacked facts of a target.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTarget`] if absent.
    pub fn hacked_facts(&self, target: &str) -> Result<&BTreeSet<String>> {
        self.dossier(target).map(Dossier::hacked)
    }

    /// Exposable facts of a target.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTarget`] if absent.
    pub fn exposable_facts(&self, target: &str) -> Result<&BTreeSet<String>> {
        self.dossier(target).map(Dossier::exposable)
    }

    /// Known summary of a scanned fact.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTarget`] or [`GameError::UnknownFact`]
    /// for bad names, [`GameError::FactNotScanned`] if not scanned yet.
    pub fn summary(&self, target: &str, fact: &str) -> Result<&str> {
        self.target(target)?.fact(fact)?;
        self.dossier(target)?
            .summary(fact)
            .ok_or_else(|| GameError::FactNotScanned {
                target: target.to_owned(),
                fact: fact.to_owned(),
            })
    }

    /// Known content of a scanned fact.
    ///
    /// # Errors
    ///
    /// Same as [`World::summary`].
    pub fn content(&self, target: &str, fact: &str) -> Result<&str> {
        self.target(target)?.fact(fact)?;
        self.dossier(target)?
            .content(fact)
            .ok_or_else(|| GameError::FactNotScanned {
                target: target.to_owned(),
                fact: fact.to_owned(),
            })
    }

    /// Aggregate game state, computed fresh.
    #[must_use]
    pub fn game_state(&self) -> GameState {
        let escaped = self
            .targets
            .values()
            .any(|t| t.state() == TargetState::GameOver);
        if !self.player.is_living() || escaped {
            return GameState::Lose;
        }
        if self
            .targets
            .values()
            .all(|t| t.state() == TargetState::Defeated)
        {
            return GameState::Win;
        }
        GameState::Ongoing
    }

    /// Try to hack a visible fact.
    ///
    /// Unlocked facts are hacked on sight, so only locked facts need this.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names, an inactive target, a fact that
    /// is not visible or already hacked, or insufficient AP.
    pub fn hack(&mut self, target_name: &str, fact: &str) -> Result<HackOutcome> {
        let (target, dossier) = entry(&mut self.targets, &mut self.dossiers, target_name)?;
        ensure_active(target)?;
        target.fact(fact)?;
        if !dossier.is_visible(fact) {
            return Err(GameError::FactNotVisible {
                target: target_name.to_owned(),
                fact: fact.to_owned(),
            });
        }
        if dossier.is_hacked(fact) {
            return Err(GameError::FactAlreadyHacked {
                target: target_name.to_owned(),
                fact: fact.to_owned(),
            });
        }

        self.player.spend(Action::Hack, target.traits())?;

        if self.rng.percent() < HACK_FAILURE_CHANCE {
            target.add_suspicion(HACK_FAILURE_SUSPICION);
            tracing::debug!(target_name, fact, suspicion = target.suspicion(), "Hack failed");
            return Ok(HackOutcome::Failed);
        }

        dossier.hacked.insert(fact.to_owned());
        tracing::debug!(target_name, fact, "Hack succeeded");
        Ok(HackOutcome::Succeeded)
    }

    /// Scan a visible fact and return its content.
    ///
    /// Scanning records the fact's text, resolves combos against the facts
    /// already scanned, makes the fact exposable and reveals its children.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names, an inactive target, a fact that
    /// is not visible, already scanned, or not in the hacked set, or
    /// insufficient AP.
    pub fn scan(&mut self, target_name: &str, fact: &str) -> Result<String> {
        let (target, dossier) = entry(&mut self.targets, &mut self.dossiers, target_name)?;
        ensure_active(target)?;
        target.fact(fact)?;
        let names = || (target_name.to_owned(), fact.to_owned());
        if !dossier.is_visible(fact) {
            let (target, fact) = names();
            return Err(GameError::FactNotVisible { target, fact });
        }
        if dossier.is_scanned(fact) {
            let (target, fact) = names();
            return Err(GameError::FactAlreadyScanned { target, fact });
        }
        if !dossier.is_hacked(fact) {
            let (target, fact) = names();
            return Err(GameError::FactLocked { target, fact });
        }

        self.player.spend(Action::Scan, target.traits())?;

        let known = dossier.known();
        let applications = target.check_for_combo(&known, fact);
        for application in &applications {
            dossier.record(target.fact(&application.fact)?);
        }

        let scanned = target.fact(fact)?;
        dossier.record(scanned);
        dossier.exposable.insert(fact.to_owned());
        for child in scanned.children() {
            dossier.reveal(target.fact(child)?);
        }

        tracing::debug!(
            target_name,
            fact,
            combos = applications.len(),
            visible = dossier.visible.len(),
            "Fact scanned"
        );
        Ok(scanned.content().to_owned())
    }

    /// Threaten a target with a scanned fact. Returns the stress dealt.
    ///
    /// The fact stays exposable. The player takes the fact's player stress.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names, an inactive target, a fact that
    /// is not scanned or no longer exposable, or insufficient AP.
    pub fn threaten(&mut self, target_name: &str, fact: &str) -> Result<i32> {
        let (target, dossier) = entry(&mut self.targets, &mut self.dossiers, target_name)?;
        ensure_active(target)?;
        ensure_usable(target, dossier, fact)?;
        let player_damage = target.fact(fact)?.player_stress_damage();

        self.player.spend(Action::Threaten, target.traits())?;
        let damage = target.threaten(fact, &mut self.rng)?;
        self.player.add_stress(Fixed::from_num(player_damage));

        tracing::debug!(target_name, fact, damage, state = ?target.state(), "Target threatened");
        Ok(damage)
    }

    /// Expose a scanned fact. Returns the stress dealt.
    ///
    /// The fact can never be used again. The player takes the fact's player
    /// stress.
    ///
    /// # Errors
    ///
    /// Same as [`World::threaten`].
    pub fn expose(&mut self, target_name: &str, fact: &str) -> Result<i32> {
        let (target, dossier) = entry(&mut self.targets, &mut self.dossiers, target_name)?;
        ensure_active(target)?;
        ensure_usable(target, dossier, fact)?;
        let player_damage = target.fact(fact)?.player_stress_damage();

        self.player.spend(Action::Expose, target.traits())?;
        let damage = target.expose(fact, &mut self.rng)?;
        dossier.exposable.remove(fact);
        self.player.add_stress(Fixed::from_num(player_damage));

        tracing::debug!(target_name, fact, damage, state = ?target.state(), "Fact exposed");
        Ok(damage)
    }

    /// Harass a target. Returns the stress dealt.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown or inactive target, or insufficient AP.
    pub fn harass(&mut self, target_name: &str) -> Result<i32> {
        let target = self
            .targets
            .get_mut(target_name)
            .ok_or_else(|| GameError::UnknownTarget(target_name.to_owned()))?;
        ensure_active(target)?;

        self.player.spend(Action::Harass, target.traits())?;
        let damage = target.harass(&mut self.rng);

        tracing::debug!(target_name, damage, "Target harassed");
        Ok(damage)
    }

    /// Coerce a target. Has no effect and spends nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTarget`] if absent.
    pub fn coerce(&mut self, target_name: &str) -> Result<()> {
        self.target(target_name)?;
        tracing::debug!(target_name, "Coerce has no effect");
        Ok(())
    }

    /// Gain AP for stress. Returns the stress taken.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AlreadyOverworked`] on a second use in one day.
    pub fn overwork(&mut self) -> Result<Fixed> {
        self.player.overwork(&mut self.rng)
    }

    /// Shed stress. Returns the stress removed.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientActionPoints`] if unaffordable.
    pub fn relax(&mut self) -> Result<Fixed> {
        self.player.relax(&mut self.rng)
    }

    /// Earn currency. Returns the income.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientActionPoints`] if unaffordable.
    pub fn vtube(&mut self) -> Result<Fixed> {
        self.player.vtube(&mut self.rng)
    }

    /// End the day and return the resulting game state.
    pub fn end_day(&mut self) -> GameState {
        self.player.next_turn(&mut self.rng);
        for target in self.targets.values_mut() {
            target.next_turn(&mut self.rng);
        }
        self.day += 1;

        #[cfg(feature = "debug-validation")]
        self.check_invariants();

        let state = self.game_state();
        if state.is_over() {
            tracing::info!(day = self.day, ?state, "Level finished");
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(day = self.day, state_hash = hash, "World state hash");
        }

        state
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) {
        for (name, target) in &self.targets {
            assert!(
                (0..=crate::target::MAX_SUSPICION).contains(&target.suspicion()),
                "suspicion out of range on {name}"
            );
            assert!(target.stress() >= 0, "negative stress on {name}");
            assert!(
                target.stress() < target.max_stress() || !target.is_active(),
                "active target at max stress: {name}"
            );
        }
        for (name, dossier) in &self.dossiers {
            assert!(
                dossier.hacked.is_subset(&dossier.visible),
                "hacked fact not visible on {name}"
            );
            assert!(
                dossier.summaries.keys().all(|f| dossier.is_hacked(f)),
                "scanned fact not hacked on {name}"
            );
            assert!(
                dossier.exposable.iter().all(|f| dossier.is_scanned(f)),
                "exposable fact not scanned on {name}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ComboData, FactData, TargetData};
    use crate::random::ScriptedRandom;

    fn fact(name: &str, locked: bool, children: &[&str], damage: i32, player: i32) -> FactData {
        FactData {
            name: name.to_string(),
            title: name.to_uppercase(),
            content: format!("{name} content"),
            summary: format!("{name} summary"),
            locked,
            children: children.iter().map(|c| (*c).to_string()).collect(),
            target_stress_damage: damage,
            player_stress_damage: player,
        }
    }

    fn mayor() -> TargetData {
        TargetData {
            name: "mayor".to_string(),
            paranoia: 3,
            max_stress: 100,
            traits: vec![],
            first_facts: vec!["office".to_string()],
            facts: vec![
                fact("office", false, &["emails", "ledger"], 5, 0),
                fact("emails", true, &["affair"], 15, 2),
                fact("ledger", false, &[], 8, 0),
                fact("affair", false, &[], 30, 5),
            ],
            combos: vec![ComboData {
                required: vec!["emails".to_string(), "ledger".to_string()],
                overwrite: "ledger".to_string(),
                summary: "Embezzlement proven".to_string(),
                content: None,
                target_stress_damage: 40,
            }],
        }
    }

    fn clerk() -> TargetData {
        TargetData {
            name: "clerk".to_string(),
            paranoia: 2,
            max_stress: 10,
            traits: vec![TargetTrait::TechIlliterate],
            first_facts: vec!["desk".to_string()],
            facts: vec![fact("desk", false, &[], 12, 0)],
            combos: vec![],
        }
    }

    fn level(targets: Vec<TargetData>) -> LevelData {
        LevelData {
            name: "city_hall".to_string(),
            starting_currency: 100,
            targets,
        }
    }

    fn world(rng: ScriptedRandom) -> World<ScriptedRandom> {
        World::new(&level(vec![mayor(), clerk()]), rng).unwrap()
    }

    #[test]
    fn test_initial_world() {
        let w = world(ScriptedRandom::highest());
        assert_eq!(w.day(), 0);
        assert_eq!(w.player().action_points(), 6);
        assert!(w.visible_facts("mayor").unwrap().contains("office"));
        assert_eq!(
            w.hacked_facts("mayor").unwrap().iter().collect::<Vec<_>>(),
            vec!["office"]
        );
        assert_eq!(w.game_state(), GameState::Ongoing);
        let names: Vec<_> = w.targets().map(Target::name).collect();
        assert_eq!(names, vec!["clerk", "mayor"]);
    }

    #[test]
    fn test_invalid_level_rejected() {
        let mut bad = mayor();
        bad.facts[0].children.push("ghost".to_string());
        let result = World::new(&level(vec![bad]), ScriptedRandom::highest());
        assert!(matches!(result, Err(GameError::InvalidLevel(_))));
    }

    #[test]
    fn test_scan_reveals_children() {
        let mut w = world(ScriptedRandom::highest());
        assert_eq!(w.scan("mayor", "office").unwrap(), "office content");

        let visible = w.visible_facts("mayor").unwrap();
        assert!(visible.contains("emails"));
        assert!(visible.contains("ledger"));
        assert!(w.exposable_facts("mayor").unwrap().contains("office"));
        assert_eq!(w.summary("mayor", "office").unwrap(), "office summary");
        assert_eq!(w.player().action_points(), 5);
    }

    #[test]
    fn test_scan_twice_fails_without_cost() {
        let mut w = world(ScriptedRandom::highest());
        w.scan("mayor", "office").unwrap();
        let before = w.snapshot();

        let err = w.scan("mayor", "office").unwrap_err();
        assert!(matches!(err, GameError::FactAlreadyScanned { .. }));
        assert_eq!(w.snapshot(), before);
    }

    #[test]
    fn test_locked_fact_needs_hack() {
        let mut w = world(ScriptedRandom::highest());
        w.scan("mayor", "office").unwrap();

        let err = w.scan("mayor", "emails").unwrap_err();
        assert!(matches!(err, GameError::FactLocked { .. }));

        assert_eq!(w.hack("mayor", "emails").unwrap(), HackOutcome::Succeeded);
        assert_eq!(w.scan("mayor", "emails").unwrap(), "emails content");
        assert!(w.visible_facts("mayor").unwrap().contains("affair"));
    }

    #[test]
    fn test_hack_failure_raises_suspicion() {
        let mut w = world(ScriptedRandom::lowest());
        w.scan("mayor", "office").unwrap();

        assert_eq!(w.hack("mayor", "emails").unwrap(), HackOutcome::Failed);
        assert!(!w.hacked_facts("mayor").unwrap().contains("emails"));
        assert_eq!(w.target("mayor").unwrap().suspicion(), HACK_FAILURE_SUSPICION);
        assert_eq!(w.player().action_points(), 3);
    }

    #[test]
    fn test_hack_validation() {
        let mut w = world(ScriptedRandom::highest());
        assert!(matches!(
            w.hack("mayor", "emails"),
            Err(GameError::FactNotVisible { .. })
        ));
        assert!(matches!(
            w.hack("mayor", "ghost"),
            Err(GameError::UnknownFact { .. })
        ));
        assert!(matches!(
            w.hack("nobody", "office"),
            Err(GameError::UnknownTarget(_))
        ));

        assert!(matches!(
            w.hack("mayor", "office"),
            Err(GameError::FactAlreadyHacked { .. })
        ));
        w.scan("mayor", "office").unwrap();
        w.hack("mayor", "emails").unwrap();
        assert!(matches!(
            w.hack("mayor", "emails"),
            Err(GameError::FactAlreadyHacked { .. })
        ));
    }

    #[test]
    fn test_scan_requires_hacked_set() {
        let mut w = world(ScriptedRandom::lowest());
        w.scan("mayor", "office").unwrap();

        let hacked = w.hacked_facts("mayor").unwrap();
        assert!(hacked.contains("ledger"));
        assert!(!hacked.contains("emails"));

        assert_eq!(w.hack("mayor", "emails").unwrap(), HackOutcome::Failed);
        let before = w.snapshot();
        assert!(matches!(
            w.scan("mayor", "emails"),
            Err(GameError::FactLocked { .. })
        ));
        assert_eq!(w.snapshot(), before);
        assert!(matches!(
            w.hack("mayor", "ledger"),
            Err(GameError::FactAlreadyHacked { .. })
        ));
    }

    #[test]
    fn test_scan_resolves_combo() {
        let mut w = world(ScriptedRandom::highest());
        w.scan("mayor", "office").unwrap();
        w.hack("mayor", "emails").unwrap();
        w.scan("mayor", "emails").unwrap();
        w.scan("mayor", "ledger").unwrap();

        assert_eq!(w.summary("mayor", "ledger").unwrap(), "Embezzlement proven");
        let mayor = w.target("mayor").unwrap();
        assert_eq!(mayor.fact("ledger").unwrap().target_stress_damage(), 40);
        assert!(mayor.combos().is_empty());
    }

    #[test]
    fn test_threaten_and_expose() {
        let mut w = world(ScriptedRandom::highest());
        w.scan("mayor", "office").unwrap();
        w.hack("mayor", "emails").unwrap();
        w.scan("mayor", "emails").unwrap();

        assert!(matches!(
            w.threaten("mayor", "ledger"),
            Err(GameError::FactNotScanned { .. })
        ));

        assert_eq!(w.threaten("mayor", "emails").unwrap(), 15);
        assert_eq!(w.target("mayor").unwrap().state(), TargetState::Threatened);
        assert_eq!(w.player().stress(), Fixed::from_num(2));
        assert!(w.exposable_facts("mayor").unwrap().contains("emails"));
        assert_eq!(w.player().action_points(), 0);

        w.end_day();
        assert_eq!(w.expose("mayor", "office").unwrap(), 5);
        assert!(!w.exposable_facts("mayor").unwrap().contains("office"));
        assert!(matches!(
            w.expose("mayor", "office"),
            Err(GameError::FactNotExposable { .. })
        ));
    }

    #[test]
    fn test_defeating_every_target_wins() {
        let mut w = World::new(&level(vec![clerk()]), ScriptedRandom::highest()).unwrap();
        w.scan("clerk", "desk").unwrap();
        assert_eq!(w.expose("clerk", "desk").unwrap(), 12);

        assert_eq!(w.target("clerk").unwrap().state(), TargetState::Defeated);
        assert_eq!(w.game_state(), GameState::Win);
        assert!(matches!(
            w.harass("clerk"),
            Err(GameError::TargetInactive {
                state: TargetState::Defeated,
                ..
            })
        ));
    }

    #[test]
    fn test_bankruptcy_loses() {
        let mut broke = level(vec![mayor()]);
        broke.starting_currency = 15;
        let mut w = World::new(&broke, ScriptedRandom::highest()).unwrap();
        assert_eq!(w.end_day(), GameState::Lose);
    }

    #[test]
    fn test_overwork_once_per_day() {
        let mut w = world(ScriptedRandom::lowest());
        w.overwork().unwrap();
        assert_eq!(w.overwork(), Err(GameError::AlreadyOverworked));
        w.end_day();
        assert!(w.overwork().is_ok());
    }

    #[test]
    fn test_tech_illiterate_scan_is_free() {
        let mut w = world(ScriptedRandom::highest());
        w.scan("clerk", "desk").unwrap();
        assert_eq!(w.player().action_points(), 6);
    }

    #[test]
    fn test_paranoiac_reduces_every_paranoia_once() {
        let mut nervous = clerk();
        nervous.traits.push(TargetTrait::Paranoiac);
        let w = World::new(&level(vec![mayor(), nervous]), ScriptedRandom::highest()).unwrap();
        assert_eq!(w.target("mayor").unwrap().paranoia(), 2);
        assert_eq!(w.target("clerk").unwrap().paranoia(), 1);
    }

    #[test]
    fn test_coerce_is_noop() {
        let mut w = world(ScriptedRandom::highest());
        let before = w.state_hash();
        w.coerce("mayor").unwrap();
        assert_eq!(w.state_hash(), before);
        assert!(w.coerce("nobody").is_err());
    }

    #[test]
    fn test_end_day_advances() {
        let mut w = world(ScriptedRandom::highest());
        w.harass("mayor").unwrap();
        assert_eq!(w.end_day(), GameState::Ongoing);
        assert_eq!(w.day(), 1);
        assert_eq!(w.player().action_points(), 6);
        assert_eq!(w.player().currency(), Fixed::from_num(85));
        assert_eq!(w.target("mayor").unwrap().countdown(), 2);
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut w = world(ScriptedRandom::highest());
        w.scan("mayor", "office").unwrap();
        w.end_day();

        let bytes = w.serialize().unwrap();
        let restored = World::deserialize(&bytes, ScriptedRandom::highest()).unwrap();
        assert_eq!(restored.state_hash(), w.state_hash());
        assert_eq!(restored.snapshot(), w.snapshot());
        assert!(World::deserialize(&[1, 2, 3], ScriptedRandom::highest()).is_err());
    }

    #[test]
    fn test_same_seed_same_hash() {
        let run = |seed| {
            let mut w = World::new(&level(vec![mayor(), clerk()]), SeededRandom::new(seed)).unwrap();
            w.scan("mayor", "office").ok();
            w.hack("mayor", "emails").ok();
            w.harass("clerk").ok();
            w.end_day();
            w.state_hash()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_state_hash_uses_stable_hasher() {
        let mut w = world(ScriptedRandom::highest());
        let fresh = w.state_hash();
        w.scan("mayor", "office").unwrap();
        assert_ne!(w.state_hash(), fresh);

        let expected =
            crate::hash::stable_hash(&(w.day, &w.player, &w.targets, &w.dossiers));
        assert_eq!(w.state_hash(), expected);
    }
}
