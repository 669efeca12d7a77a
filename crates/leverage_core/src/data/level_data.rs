//! Level definition combining every target in a level.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::target_data::TargetData;
use crate::error::{GameError, Result};

/// Complete level definition.
///
/// Loaded from a RON (or JSON) file when a level starts.
///
/// # Example RON
///
/// ```ron
/// LevelData(
///     name: "city_hall",
///     starting_currency: 120,
///     targets: [...],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    /// Level identifier.
    pub name: String,

    /// Currency the player starts with.
    #[serde(default = "default_starting_currency")]
    pub starting_currency: i32,

    /// Targets in this level.
    pub targets: Vec<TargetData>,
}

/// Default starting currency.
const fn default_starting_currency() -> i32 {
    100
}

impl LevelData {
    /// Parse a level from RON text.
    ///
    /// `source` names the text in error messages (usually a file path).
    pub fn from_ron_str(text: &str, source: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })
    }

    /// Parse a level from JSON text.
    ///
    /// `source` names the text in error messages (usually a file path).
    pub fn from_json_str(text: &str, source: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| GameError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })
    }

    /// Find a target by name.
    #[must_use]
    pub fn get_target(&self, name: &str) -> Option<&TargetData> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Validate internal consistency of the level.
    ///
    /// Checks for duplicate or missing targets, then validates each target.
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.targets.is_empty() {
            errors.push(format!("Level '{}' has no targets", self.name));
        }

        let mut seen = BTreeSet::new();
        for target in &self.targets {
            if !seen.insert(target.name.as_str()) {
                errors.push(format!(
                    "Level '{}' defines target '{}' more than once",
                    self.name, target.name
                ));
            }
            errors.extend(target.validate());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FactData;

    fn create_test_level() -> LevelData {
        LevelData {
            name: "test".to_string(),
            starting_currency: 100,
            targets: vec![TargetData {
                name: "clerk".to_string(),
                paranoia: 2,
                max_stress: 50,
                traits: vec![],
                first_facts: vec!["desk".to_string()],
                facts: vec![FactData {
                    name: "desk".to_string(),
                    title: "Desk".to_string(),
                    content: "A cluttered desk.".to_string(),
                    summary: "Messy.".to_string(),
                    locked: false,
                    children: vec![],
                    target_stress_damage: 5,
                    player_stress_damage: 0,
                }],
                combos: vec![],
            }],
        }
    }

    #[test]
    fn test_valid_level() {
        let level = create_test_level();
        assert!(level.validate().is_empty());
        assert!(level.get_target("clerk").is_some());
        assert!(level.get_target("mayor").is_none());
    }

    #[test]
    fn test_duplicate_target_names() {
        let mut level = create_test_level();
        level.targets.push(level.targets[0].clone());
        let errors = level.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("more than once"));
    }

    #[test]
    fn test_empty_level_is_invalid() {
        let mut level = create_test_level();
        level.targets.clear();
        assert!(!level.validate().is_empty());
    }

    #[test]
    fn test_ron_and_json_agree() {
        let level = create_test_level();
        let ron_text = ron::to_string(&level).unwrap();
        let json_text = serde_json::to_string(&level).unwrap();

        let from_ron = LevelData::from_ron_str(&ron_text, "inline.ron").unwrap();
        let from_json = LevelData::from_json_str(&json_text, "inline.json").unwrap();
        assert_eq!(from_ron, from_json);
        assert_eq!(from_ron, level);
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = LevelData::from_json_str("{ not json", "broken.json").unwrap_err();
        match err {
            GameError::DataParseError { path, .. } => assert_eq!(path, "broken.json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
