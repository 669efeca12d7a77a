//! Test fixtures and helpers.
//!
//! Level builders for consistent testing, plus the bundled sample levels.

use fixed::types::I32F32;
use leverage_core::data::{ComboData, FactData, LevelData, TargetData};
use leverage_core::random::{ScriptedRandom, SeededRandom};
use leverage_core::traits::TargetTrait;
use leverage_core::world::World;

/// RON text of the bundled `city_hall` level.
pub const CITY_HALL_RON: &str = include_str!("../../../assets/levels/city_hall.ron");

/// JSON text of the bundled `tutorial` level.
pub const TUTORIAL_JSON: &str = include_str!("../../../assets/levels/tutorial.json");

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// An unlocked fact with no children.
#[must_use]
pub fn fact(name: &str, target_stress_damage: i32) -> FactData {
    FactData {
        name: name.to_string(),
        title: name.to_string(),
        content: format!("{name} content"),
        summary: format!("{name} summary"),
        locked: false,
        children: Vec::new(),
        target_stress_damage,
        player_stress_damage: 0,
    }
}

/// Mark a fact as locked.
#[must_use]
pub fn locked(mut fact: FactData) -> FactData {
    fact.locked = true;
    fact
}

/// Give a fact children.
#[must_use]
pub fn with_children(mut fact: FactData, children: &[&str]) -> FactData {
    fact.children = children.iter().map(|c| (*c).to_string()).collect();
    fact
}

/// Give a fact a player stress cost.
#[must_use]
pub fn with_player_damage(mut fact: FactData, damage: i32) -> FactData {
    fact.player_stress_damage = damage;
    fact
}

/// A combo rule.
#[must_use]
pub fn combo(required: &[&str], overwrite: &str, summary: &str, damage: i32) -> ComboData {
    ComboData {
        required: required.iter().map(|r| (*r).to_string()).collect(),
        overwrite: overwrite.to_string(),
        summary: summary.to_string(),
        content: None,
        target_stress_damage: damage,
    }
}

/// A target with no traits and no combos.
#[must_use]
pub fn target(
    name: &str,
    paranoia: i32,
    max_stress: i32,
    first_facts: &[&str],
    facts: Vec<FactData>,
) -> TargetData {
    TargetData {
        name: name.to_string(),
        paranoia,
        max_stress,
        traits: Vec::new(),
        first_facts: first_facts.iter().map(|f| (*f).to_string()).collect(),
        facts,
        combos: Vec::new(),
    }
}

/// A level with the default starting currency.
#[must_use]
pub fn level(name: &str, targets: Vec<TargetData>) -> LevelData {
    LevelData {
        name: name.to_string(),
        starting_currency: 100,
        targets,
    }
}

/// One target, one visible unlocked fact dealing `damage`.
#[must_use]
pub fn single_target_level(max_stress: i32, damage: i32) -> LevelData {
    level(
        "single",
        vec![target("mark", 3, max_stress, &["secret"], vec![fact("secret", damage)])],
    )
}

/// A small two-target level exercising locks, children and combos.
///
/// `mayor`: `office` reveals `emails` (locked) and `ledger`; `emails`
/// reveals `affair`. Combos on `ledger`: `{emails, ledger}` (40 damage) and
/// `{emails, ledger, affair}` (60 damage).
///
/// `clerk`: tech illiterate, a single `desk` fact.
#[must_use]
pub fn investigation_level() -> LevelData {
    let mut mayor = target(
        "mayor",
        3,
        100,
        &["office"],
        vec![
            with_children(fact("office", 5), &["emails", "ledger"]),
            with_player_damage(with_children(locked(fact("emails", 15)), &["affair"]), 2),
            fact("ledger", 8),
            with_player_damage(fact("affair", 30), 5),
        ],
    );
    mayor.combos = vec![
        combo(&["emails", "ledger"], "ledger", "two-fact story", 40),
        combo(&["emails", "ledger", "affair"], "ledger", "three-fact story", 60),
    ];

    let mut clerk = target("clerk", 2, 30, &["desk"], vec![fact("desk", 12)]);
    clerk.traits = vec![TargetTrait::TechIlliterate];

    level("investigation", vec![mayor, clerk])
}

/// The bundled `city_hall` level.
///
/// # Panics
///
/// Panics if the bundled file does not parse.
#[must_use]
pub fn city_hall_level() -> LevelData {
    LevelData::from_ron_str(CITY_HALL_RON, "city_hall.ron").expect("bundled level parses")
}

/// The bundled `tutorial` level.
///
/// # Panics
///
/// Panics if the bundled file does not parse.
#[must_use]
pub fn tutorial_level() -> LevelData {
    LevelData::from_json_str(TUTORIAL_JSON, "tutorial.json").expect("bundled level parses")
}

/// A world over `level` whose rolls always land on the top of every band.
///
/// Hacks always succeed and paranoia checks always fail.
///
/// # Panics
///
/// Panics if the level is invalid.
#[must_use]
pub fn lucky_world(level: &LevelData) -> World<ScriptedRandom> {
    World::new(level, ScriptedRandom::highest()).expect("fixture level is valid")
}

/// A world over `level` whose rolls always land on the bottom of every band.
///
/// Hacks always fail and paranoia checks succeed whenever suspicion is
/// above zero.
///
/// # Panics
///
/// Panics if the level is invalid.
#[must_use]
pub fn unlucky_world(level: &LevelData) -> World<ScriptedRandom> {
    World::new(level, ScriptedRandom::lowest()).expect("fixture level is valid")
}

/// A seeded world over `level`.
///
/// # Panics
///
/// Panics if the level is invalid.
#[must_use]
pub fn seeded_world(level: &LevelData, seed: u64) -> World {
    World::new(level, SeededRandom::new(seed)).expect("fixture level is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_levels_are_valid() {
        let city_hall = city_hall_level();
        assert_eq!(city_hall.name, "city_hall");
        assert_eq!(city_hall.targets.len(), 3);
        assert!(city_hall.validate().is_empty(), "{:?}", city_hall.validate());

        let tutorial = tutorial_level();
        assert_eq!(tutorial.starting_currency, 100);
        assert!(tutorial.validate().is_empty(), "{:?}", tutorial.validate());
    }

    #[test]
    fn test_builders_produce_valid_levels() {
        assert!(investigation_level().validate().is_empty());
        assert!(single_target_level(10, 12).validate().is_empty());
    }

    #[test]
    fn test_fixture_worlds() {
        let level = investigation_level();
        assert_eq!(lucky_world(&level).day(), 0);
        assert_eq!(unlucky_world(&level).player().action_points(), 6);
        assert_eq!(seeded_world(&level, 1).player().currency(), fixed(100));
    }
}
