//! Player resource model.
//!
//! The player spends action points (AP) on actions, accumulates stress from
//! overwork and from using damaging facts, and pays a daily currency upkeep.
//! Every mutator re-checks its preconditions and fails without changing
//! anything, but callers are expected to ask first through
//! [`Player::can_perform`] and [`Player::can_overwork`].

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_serde, non_negative, Fixed};
use crate::random::{rand_in_range, RandomSource};
use crate::traits::{TargetTrait, TraitSet};

/// Action points granted at the start of every day.
pub const DAILY_ACTION_POINTS: u32 = 6;

/// Stress at which the player breaks down.
pub const MAX_STRESS: i32 = 100;

/// Currency a new player starts with.
pub const STARTING_CURRENCY: i32 = 100;

/// Currency paid at every day boundary.
pub const DAILY_UPKEEP: i32 = 15;

/// Extra AP granted by overworking.
pub const OVERWORK_BONUS_AP: u32 = 3;

/// Stress band for overworking (base, percent).
pub const OVERWORK_STRESS: (i32, i32) = (10, 50);

/// Stress relief band for relaxing (base, percent).
pub const RELAX_RELIEF: (i32, i32) = (10, 30);

/// Income band for streaming (base, percent).
pub const VTUBE_INCOME: (i32, i32) = (25, 40);

/// Bounds of the nightly stress drift.
pub const DREAM_STRESS_RANGE: (i32, i32) = (-5, 5);

/// Everything the player can spend action points on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Try to unlock a fact.
    Hack,
    /// Read a fact.
    Scan,
    /// Lean on a target with a fact.
    Threaten,
    /// Publish a fact.
    Expose,
    /// Pester a target without evidence.
    Harass,
    /// Reserved; costs are defined but the action does nothing yet.
    Coerce,
    /// Trade stress for extra AP.
    Overwork,
    /// Trade AP for stress relief.
    Relax,
    /// Trade AP for currency.
    Vtube,
}

impl Action {
    /// Base AP cost before trait modifiers.
    #[must_use]
    pub const fn base_cost(self) -> u32 {
        match self {
            Self::Hack => 2,
            Self::Scan => 1,
            Self::Threaten => 2,
            Self::Expose => 3,
            Self::Harass => 1,
            Self::Coerce => 2,
            Self::Overwork => 0,
            Self::Relax => 1,
            Self::Vtube => 2,
        }
    }

    /// AP cost against a target with the given traits.
    #[must_use]
    pub fn cost(self, traits: &TraitSet) -> u32 {
        let base = self.base_cost();
        match self {
            Self::Hack | Self::Scan if traits.contains(TargetTrait::TechIlliterate) => {
                base.saturating_sub(1)
            }
            Self::Threaten | Self::Expose | Self::Harass | Self::Coerce
                if traits.contains(TargetTrait::BadConnection) =>
            {
                base + 1
            }
            _ => base,
        }
    }
}

/// The player's resource bag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    action_points: u32,
    #[serde(with = "fixed_serde")]
    stress: Fixed,
    #[serde(with = "fixed_serde")]
    currency: Fixed,
    overworked_today: bool,
}

impl Player {
    /// Create a player with a full day of AP, no stress and the given currency.
    #[must_use]
    pub fn new(starting_currency: i32) -> Self {
        Self {
            action_points: DAILY_ACTION_POINTS,
            stress: Fixed::ZERO,
            currency: Fixed::from_num(starting_currency),
            overworked_today: false,
        }
    }

    /// Remaining action points.
    #[must_use]
    pub const fn action_points(&self) -> u32 {
        self.action_points
    }

    /// Current stress.
    #[must_use]
    pub const fn stress(&self) -> Fixed {
        self.stress
    }

    /// Current currency.
    #[must_use]
    pub const fn currency(&self) -> Fixed {
        self.currency
    }

    /// Whether overwork was used today.
    #[must_use]
    pub const fn overworked_today(&self) -> bool {
        self.overworked_today
    }

    /// Check whether the player can afford an action against these traits.
    #[must_use]
    pub fn can_perform(&self, action: Action, traits: &TraitSet) -> bool {
        self.action_points >= action.cost(traits)
    }

    /// Check whether overwork is still available today.
    #[must_use]
    pub const fn can_overwork(&self) -> bool {
        !self.overworked_today
    }

    /// Pay for an action. Returns the AP spent.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientActionPoints`] without spending
    /// anything if the player cannot afford it.
    pub fn spend(&mut self, action: Action, traits: &TraitSet) -> Result<u32> {
        let required = action.cost(traits);
        if self.action_points < required {
            return Err(GameError::InsufficientActionPoints {
                action,
                required,
                available: self.action_points,
            });
        }
        self.action_points -= required;
        Ok(required)
    }

    /// Gain AP at the price of stress. Once per day.
    ///
    /// Returns the stress taken.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AlreadyOverworked`] on a second use in one day.
    pub fn overwork<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<Fixed> {
        if self.overworked_today {
            return Err(GameError::AlreadyOverworked);
        }
        let (base, percent) = OVERWORK_STRESS;
        let penalty = Fixed::from_num(rand_in_range(rng, base, percent));
        self.overworked_today = true;
        self.action_points += OVERWORK_BONUS_AP;
        self.add_stress(penalty);
        tracing::debug!(ap = self.action_points, stress = %self.stress, "Player overworked");
        Ok(penalty)
    }

    /// Spend AP to shed stress. Returns the stress removed.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientActionPoints`] if unaffordable.
    pub fn relax<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<Fixed> {
        self.spend(Action::Relax, &TraitSet::new())?;
        let (base, percent) = RELAX_RELIEF;
        let relief = Fixed::from_num(rand_in_range(rng, base, percent)).min(self.stress);
        self.stress -= relief;
        Ok(relief)
    }

    /// Spend AP to earn currency. Returns the income.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientActionPoints`] if unaffordable.
    pub fn vtube<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<Fixed> {
        self.spend(Action::Vtube, &TraitSet::new())?;
        let (base, percent) = VTUBE_INCOME;
        let income = Fixed::from_num(rand_in_range(rng, base, percent));
        self.currency = self.currency.saturating_add(income);
        Ok(income)
    }

    /// Add (or with a negative amount, remove) stress, floored at zero and
    /// saturating at the top of the fixed-point range.
    pub fn add_stress(&mut self, amount: Fixed) {
        self.stress = non_negative(self.stress.saturating_add(amount));
    }

    /// The player survives while solvent and below max stress.
    #[must_use]
    pub fn is_living(&self) -> bool {
        self.currency > Fixed::ZERO && self.stress < Fixed::from_num(MAX_STRESS)
    }

    /// Advance to the next day.
    ///
    /// Clears the overwork flag, tops AP up to the daily allotment (leftover
    /// AP above it is kept), pays upkeep and applies the nightly stress drift.
    pub fn next_turn<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        self.overworked_today = false;
        self.action_points = self.action_points.max(DAILY_ACTION_POINTS);
        self.currency = self.currency.saturating_sub(Fixed::from_num(DAILY_UPKEEP));
        let (low, high) = DREAM_STRESS_RANGE;
        let dream = Fixed::from_num(rng.range_inclusive(low, high));
        self.add_stress(dream);
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(STARTING_CURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    fn traits(list: &[TargetTrait]) -> TraitSet {
        list.iter().copied().collect()
    }

    #[test]
    fn test_new_player() {
        let player = Player::default();
        assert_eq!(player.action_points(), DAILY_ACTION_POINTS);
        assert_eq!(player.stress(), Fixed::ZERO);
        assert_eq!(player.currency(), Fixed::from_num(STARTING_CURRENCY));
        assert!(player.is_living());
    }

    #[test]
    fn test_trait_costs() {
        let none = TraitSet::new();
        let illiterate = traits(&[TargetTrait::TechIlliterate]);
        let bad_line = traits(&[TargetTrait::BadConnection]);

        assert_eq!(Action::Hack.cost(&none), 2);
        assert_eq!(Action::Hack.cost(&illiterate), 1);
        assert_eq!(Action::Scan.cost(&illiterate), 0);
        assert_eq!(Action::Expose.cost(&illiterate), 3);

        assert_eq!(Action::Threaten.cost(&bad_line), 3);
        assert_eq!(Action::Expose.cost(&bad_line), 4);
        assert_eq!(Action::Harass.cost(&bad_line), 2);
        assert_eq!(Action::Coerce.cost(&bad_line), 3);
        assert_eq!(Action::Hack.cost(&bad_line), 2);
    }

    #[test]
    fn test_three_hacks_then_out_of_ap() {
        let mut player = Player::default();
        let none = TraitSet::new();

        for _ in 0..3 {
            assert!(player.can_perform(Action::Hack, &none));
            player.spend(Action::Hack, &none).unwrap();
        }
        assert_eq!(player.action_points(), 0);
        assert!(!player.can_perform(Action::Hack, &none));
        assert_eq!(
            player.spend(Action::Hack, &none),
            Err(GameError::InsufficientActionPoints {
                action: Action::Hack,
                required: 2,
                available: 0,
            })
        );
        assert_eq!(player.action_points(), 0);
    }

    #[test]
    fn test_overwork_once_per_day() {
        let mut player = Player::default();
        let mut rng = ScriptedRandom::lowest();

        let penalty = player.overwork(&mut rng).unwrap();
        assert_eq!(penalty, Fixed::from_num(5));
        assert_eq!(player.action_points(), DAILY_ACTION_POINTS + OVERWORK_BONUS_AP);
        assert!(!player.can_overwork());
        assert_eq!(player.overwork(&mut rng), Err(GameError::AlreadyOverworked));

        player.next_turn(&mut rng);
        assert!(player.can_overwork());
        assert!(player.overwork(&mut rng).is_ok());
    }

    #[test]
    fn test_next_turn_keeps_surplus_ap() {
        let mut player = Player::default();
        let mut rng = ScriptedRandom::constant(0);
        player.overwork(&mut rng).unwrap();

        player.next_turn(&mut rng);
        assert_eq!(player.action_points(), DAILY_ACTION_POINTS + OVERWORK_BONUS_AP);

        player.spend(Action::Expose, &TraitSet::new()).unwrap();
        player.spend(Action::Expose, &TraitSet::new()).unwrap();
        player.next_turn(&mut rng);
        assert_eq!(player.action_points(), DAILY_ACTION_POINTS);
    }

    #[test]
    fn test_next_turn_upkeep_and_dream_floor() {
        let mut player = Player::default();
        player.next_turn(&mut ScriptedRandom::lowest());
        assert_eq!(
            player.currency(),
            Fixed::from_num(STARTING_CURRENCY - DAILY_UPKEEP)
        );
        assert_eq!(player.stress(), Fixed::ZERO);

        player.next_turn(&mut ScriptedRandom::highest());
        assert_eq!(player.stress(), Fixed::from_num(5));
    }

    #[test]
    fn test_relax_cannot_go_negative() {
        let mut player = Player::default();
        player.add_stress(Fixed::from_num(4));
        let relief = player.relax(&mut ScriptedRandom::highest()).unwrap();
        assert_eq!(relief, Fixed::from_num(4));
        assert_eq!(player.stress(), Fixed::ZERO);
        assert_eq!(player.action_points(), DAILY_ACTION_POINTS - 1);
    }

    #[test]
    fn test_vtube_earns_currency() {
        let mut player = Player::default();
        let income = player.vtube(&mut ScriptedRandom::lowest()).unwrap();
        assert_eq!(income, Fixed::from_num(15));
        assert_eq!(player.currency(), Fixed::from_num(STARTING_CURRENCY + 15));
    }

    #[test]
    fn test_is_living_thresholds() {
        let mut broke = Player::new(0);
        assert!(!broke.is_living());
        broke = Player::new(1);
        assert!(broke.is_living());

        let mut stressed = Player::default();
        stressed.add_stress(Fixed::from_num(MAX_STRESS));
        assert!(!stressed.is_living());
    }

    #[test]
    fn test_stress_and_currency_saturate() {
        let mut player = Player::default();
        player.add_stress(Fixed::from_num(5));
        player.add_stress(Fixed::from_num(i32::MAX));
        assert_eq!(player.stress(), Fixed::MAX);
        assert!(!player.is_living());

        let mut debtor = Player::new(i32::MIN);
        debtor.next_turn(&mut ScriptedRandom::lowest());
        assert_eq!(debtor.currency(), Fixed::MIN);
    }
}
