//! # Encounter Module
//!
//! Core encounter state management and combatant bookkeeping.
//!
//! This module contains the fundamental building blocks of the tracker:
//! - The combatant record with hit points, temporary hit points and conditions
//! - The encounter state machine (initiative order, turns and rounds)
//! - Events reported back to the dispatcher after every operation

pub mod events;
pub mod state;

pub use events::*;
pub use state::*;

use crate::config;
use serde::{Deserialize, Serialize};

/// One participant in an encounter, either a player character or a monster.
///
/// # Examples
///
/// ```
/// use skirmish::Combatant;
///
/// let goblin = Combatant::new("Goblin", 12, 7, false);
/// assert_eq!(goblin.current_hp, 7);
/// assert!(goblin.is_conscious);
/// assert!(goblin.status_effects.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Combatant {
    /// Display name, not required to be unique
    pub name: String,
    /// Turn order key, higher acts first
    pub initiative: i32,
    /// Ceiling for current hit points
    #[serde(rename = "maxHP")]
    pub max_hp: i32,
    /// Current hit points
    #[serde(rename = "currentHP")]
    pub current_hp: i32,
    /// Player character (true) or monster/NPC (false)
    #[serde(rename = "isPlayer")]
    pub is_player: bool,
    /// False once damage drops hit points to zero, until healed
    #[serde(rename = "isConscious")]
    pub is_conscious: bool,
    /// Damage buffer consumed before current hit points
    #[serde(rename = "temporaryHP")]
    pub temporary_hp: i32,
    /// Free-text conditions, duplicates allowed
    #[serde(rename = "statusEffects")]
    pub status_effects: Vec<String>,
}

impl Combatant {
    /// Creates a combatant at full health with no conditions.
    pub fn new(name: impl Into<String>, initiative: i32, max_hp: i32, is_player: bool) -> Self {
        Self {
            name: name.into(),
            initiative,
            max_hp,
            current_hp: max_hp,
            is_player,
            is_conscious: true,
            temporary_hp: 0,
            status_effects: Vec::new(),
        }
    }
}

impl Default for Combatant {
    fn default() -> Self {
        Self::new(String::new(), 0, 0, false)
    }
}

/// Returns the preset status-effect catalog offered in a fresh encounter.
pub fn default_status_effects() -> Vec<String> {
    config::DEFAULT_STATUS_EFFECTS
        .iter()
        .map(|effect| effect.to_string())
        .collect()
}

/// Splits a name into its base and trailing decimal number.
///
/// Names without trailing digits get number 0. Oversized numbers saturate.
///
/// # Examples
///
/// ```
/// use skirmish::split_trailing_number;
///
/// assert_eq!(split_trailing_number("Orc12"), ("Orc", 12));
/// assert_eq!(split_trailing_number("Skeleton"), ("Skeleton", 0));
/// ```
pub fn split_trailing_number(name: &str) -> (&str, u64) {
    let base = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let number = name[base.len()..].bytes().fold(0u64, |acc, digit| {
        acc.saturating_mul(10)
            .saturating_add(u64::from(digit - b'0'))
    });
    (base, number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combatant_creation() {
        let hero = Combatant::new("Hero", 10, 20, true);
        assert_eq!(hero.name, "Hero");
        assert_eq!(hero.initiative, 10);
        assert_eq!(hero.max_hp, 20);
        assert_eq!(hero.current_hp, 20);
        assert!(hero.is_player);
        assert!(hero.is_conscious);
        assert_eq!(hero.temporary_hp, 0);
    }

    #[test]
    fn test_split_trailing_number() {
        assert_eq!(split_trailing_number("Orc12"), ("Orc", 12));
        assert_eq!(split_trailing_number("Orc0"), ("Orc", 0));
        assert_eq!(split_trailing_number("Goblin"), ("Goblin", 0));
        assert_eq!(split_trailing_number("2B3"), ("2B", 3));
        assert_eq!(split_trailing_number("42"), ("", 42));
        assert_eq!(split_trailing_number(""), ("", 0));
    }

    #[test]
    fn test_split_trailing_number_saturates() {
        let (base, number) = split_trailing_number("Rat99999999999999999999999");
        assert_eq!(base, "Rat");
        assert_eq!(number, u64::MAX);
    }

    #[test]
    fn test_default_catalog() {
        let catalog = default_status_effects();
        assert_eq!(catalog.len(), 14);
        assert_eq!(catalog.first().map(String::as_str), Some("Blinded"));
        assert_eq!(catalog.last().map(String::as_str), Some("Unconscious"));
    }

    #[test]
    fn test_combatant_field_names() {
        let json = serde_json::to_value(Combatant::new("Wolf", 15, 10, false)).unwrap();
        for key in [
            "name",
            "initiative",
            "maxHP",
            "currentHP",
            "isPlayer",
            "isConscious",
            "temporaryHP",
            "statusEffects",
        ] {
            assert!(json.get(key).is_some(), "missing field {key}");
        }
    }

    #[test]
    fn test_combatant_missing_fields_default() {
        let combatant: Combatant = serde_json::from_str(r#"{"name":"Ghost","maxHP":5}"#).unwrap();
        assert_eq!(combatant.name, "Ghost");
        assert_eq!(combatant.max_hp, 5);
        assert_eq!(combatant.current_hp, 0);
        assert!(combatant.is_conscious);
        assert!(combatant.status_effects.is_empty());
    }
}
