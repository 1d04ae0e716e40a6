//! # Encounter State Module
//!
//! Central encounter state and every operation that mutates it.
//!
//! The [`Encounter`] owns the combatant roster and the turn/round counters.
//! Operations validate their arguments before touching any state, so a failed
//! call leaves the encounter exactly as it was. Successful calls return the
//! [`EncounterEvent`]s they produced; persisting the result is left to the
//! caller.

use crate::encounter::{default_status_effects, split_trailing_number, Combatant, EncounterEvent};
use crate::{config, TrackerError, TrackerResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Full tracked state of one combat session.
///
/// The order of `combatants` is the turn order once combat has started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Encounter {
    /// Roster in turn order
    pub combatants: Vec<Combatant>,
    /// Round counter, 0 until combat first starts
    pub round: u32,
    /// Whose turn it is; serialized as -1 when unset
    #[serde(with = "turn_index")]
    pub current_turn_idx: Option<usize>,
    /// True between start and end of combat
    pub is_active: bool,
    /// Campaign label
    pub campaign_name: String,
    /// Encounter label
    pub encounter_name: String,
    /// Quick-pick status effects offered to the operator
    #[serde(alias = "statusEffects")]
    pub available_status_effects: Vec<String>,
    /// Auto-save destination (not serialized)
    #[serde(skip)]
    pub save_target: Option<PathBuf>,
}

impl Encounter {
    /// Creates an empty, inactive encounter.
    ///
    /// # Examples
    ///
    /// ```
    /// use skirmish::Encounter;
    ///
    /// let encounter = Encounter::new();
    /// assert_eq!(encounter.round, 0);
    /// assert!(encounter.current_turn_idx.is_none());
    /// assert!(!encounter.is_active);
    /// ```
    pub fn new() -> Self {
        Self {
            combatants: Vec::new(),
            round: 0,
            current_turn_idx: None,
            is_active: false,
            campaign_name: config::DEFAULT_CAMPAIGN_NAME.to_string(),
            encounter_name: config::DEFAULT_ENCOUNTER_NAME.to_string(),
            available_status_effects: default_status_effects(),
            save_target: None,
        }
    }

    /// Creates an empty encounter that auto-saves to `target`.
    pub fn with_save_target(target: impl Into<PathBuf>) -> Self {
        Self {
            save_target: Some(target.into()),
            ..Self::new()
        }
    }

    /// Number of combatants in the roster.
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// Returns true if the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Gets a combatant by index.
    pub fn combatant(&self, index: usize) -> Option<&Combatant> {
        self.combatants.get(index)
    }

    /// Index of the combatant whose turn it is, only while combat is active.
    pub fn active_turn(&self) -> Option<usize> {
        if self.is_active {
            self.current_turn_idx.filter(|&idx| idx < self.combatants.len())
        } else {
            None
        }
    }

    /// The combatant whose turn it is, only while combat is active.
    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.active_turn().and_then(|idx| self.combatants.get(idx))
    }

    /// Appends a new combatant at full health.
    ///
    /// # Examples
    ///
    /// ```
    /// use skirmish::Encounter;
    ///
    /// let mut encounter = Encounter::new();
    /// encounter.add_combatant("Hero", 10, 20, true).unwrap();
    /// assert_eq!(encounter.len(), 1);
    /// assert_eq!(encounter.combatants[0].current_hp, 20);
    /// ```
    pub fn add_combatant(
        &mut self,
        name: impl Into<String>,
        initiative: i32,
        max_hp: i32,
        is_player: bool,
    ) -> TrackerResult<Vec<EncounterEvent>> {
        let combatant = Combatant::new(name, initiative, max_hp, is_player);
        let event = EncounterEvent::CombatantAdded {
            index: self.combatants.len(),
            name: combatant.name.clone(),
            initiative,
            max_hp,
        };
        debug!("Adding combatant {:?}", combatant.name);
        self.combatants.push(combatant);
        Ok(vec![event])
    }

    /// Sorts the roster by initiative, highest first. Ties keep their order.
    fn sort_by_initiative(&mut self) {
        self.combatants
            .sort_by(|a, b| b.initiative.cmp(&a.initiative));
    }

    /// Sorts the roster and starts round 1 with the first combatant.
    ///
    /// Can be called again after combat ended to restart from round 1.
    pub fn start_combat(&mut self) -> TrackerResult<Vec<EncounterEvent>> {
        if self.combatants.is_empty() {
            return Err(TrackerError::NoCombatants);
        }

        self.sort_by_initiative();
        self.round = 1;
        self.current_turn_idx = Some(0);
        self.is_active = true;
        debug!("Combat started with {} combatants", self.combatants.len());

        Ok(vec![EncounterEvent::CombatStarted {
            round: self.round,
            first: self.combatants[0].name.clone(),
        }])
    }

    /// Moves the turn pointer forward, wrapping into a new round.
    ///
    /// Unconscious combatants still get their turn.
    pub fn advance_turn(&mut self) -> TrackerResult<Vec<EncounterEvent>> {
        if !self.is_active {
            return Err(TrackerError::CombatNotActive);
        }
        if self.combatants.is_empty() {
            return Err(TrackerError::NoCombatants);
        }

        let mut events = Vec::new();
        let mut next = self.current_turn_idx.map_or(0, |idx| idx + 1);
        if next >= self.combatants.len() {
            next = 0;
            self.round = self.round.saturating_add(1);
            events.push(EncounterEvent::RoundStarted { round: self.round });
        }
        self.current_turn_idx = Some(next);
        debug!("Round {} turn {}", self.round, next);

        events.push(EncounterEvent::TurnAdvanced {
            index: next,
            name: self.combatants[next].name.clone(),
        });
        Ok(events)
    }

    /// Gets a mutable combatant or fails with [`TrackerError::InvalidIndex`].
    fn combatant_mut(&mut self, index: usize) -> TrackerResult<&mut Combatant> {
        let len = self.combatants.len();
        self.combatants
            .get_mut(index)
            .ok_or(TrackerError::InvalidIndex { index, len })
    }

    /// Applies damage (negative `delta`) or healing (zero or positive `delta`).
    ///
    /// Damage drains temporary hit points first. Hit points never drop below 0
    /// and healing never exceeds the maximum.
    ///
    /// # Examples
    ///
    /// ```
    /// use skirmish::Encounter;
    ///
    /// let mut encounter = Encounter::new();
    /// encounter.add_combatant("Hero", 10, 20, true).unwrap();
    /// encounter.set_temporary_hp(0, 5).unwrap();
    /// encounter.adjust_hp(0, -8).unwrap();
    ///
    /// let hero = &encounter.combatants[0];
    /// assert_eq!(hero.temporary_hp, 0);
    /// assert_eq!(hero.current_hp, 17);
    /// ```
    pub fn adjust_hp(&mut self, index: usize, delta: i32) -> TrackerResult<Vec<EncounterEvent>> {
        let combatant = self.combatant_mut(index)?;
        let mut events = Vec::new();

        if delta < 0 {
            let damage = i64::from(delta.unsigned_abs());
            let absorbed = damage.min(i64::from(combatant.temporary_hp.max(0)));
            combatant.temporary_hp -= absorbed as i32;

            let remaining = damage - absorbed;
            let hp = i64::from(combatant.current_hp) - remaining;
            if hp <= 0 {
                combatant.current_hp = 0;
                combatant.is_conscious = false;
                events.push(EncounterEvent::FellUnconscious {
                    name: combatant.name.clone(),
                });
            } else {
                combatant.current_hp = hp as i32;
            }
        } else {
            combatant.current_hp = combatant.current_hp.saturating_add(delta).min(combatant.max_hp);
            if !combatant.is_conscious && combatant.current_hp > 0 {
                combatant.is_conscious = true;
                events.push(EncounterEvent::RegainedConsciousness {
                    name: combatant.name.clone(),
                });
            }
        }

        events.push(EncounterEvent::HitPointsChanged {
            name: combatant.name.clone(),
            current: combatant.current_hp,
            max: combatant.max_hp,
            temporary: combatant.temporary_hp,
        });
        Ok(events)
    }

    /// Grants temporary hit points. They do not stack: the new amount only
    /// replaces the old one if it is strictly greater.
    pub fn set_temporary_hp(&mut self, index: usize, amount: i32) -> TrackerResult<Vec<EncounterEvent>> {
        let combatant = self.combatant_mut(index)?;

        if amount > combatant.temporary_hp {
            combatant.temporary_hp = amount;
            Ok(vec![EncounterEvent::TemporaryHitPointsGranted {
                name: combatant.name.clone(),
                amount,
            }])
        } else {
            Ok(vec![EncounterEvent::TemporaryHitPointsKept {
                name: combatant.name.clone(),
                existing: combatant.temporary_hp,
            }])
        }
    }

    /// Appends a status effect. The same label may be present more than once.
    pub fn add_status_effect(
        &mut self,
        index: usize,
        effect: impl Into<String>,
    ) -> TrackerResult<Vec<EncounterEvent>> {
        let combatant = self.combatant_mut(index)?;
        let effect = effect.into();
        combatant.status_effects.push(effect.clone());

        Ok(vec![EncounterEvent::StatusEffectAdded {
            name: combatant.name.clone(),
            effect,
        }])
    }

    /// Removes the first status effect equal to `effect`.
    ///
    /// The order of the remaining effects is not preserved. A missing label is
    /// reported with [`EncounterEvent::StatusEffectNotFound`] and changes nothing.
    pub fn remove_status_effect(&mut self, index: usize, effect: &str) -> TrackerResult<Vec<EncounterEvent>> {
        let combatant = self.combatant_mut(index)?;
        let name = combatant.name.clone();

        match combatant.status_effects.iter().position(|e| e == effect) {
            Some(pos) => {
                let removed = combatant.status_effects.swap_remove(pos);
                Ok(vec![EncounterEvent::StatusEffectRemoved {
                    name,
                    effect: removed,
                }])
            }
            None => Ok(vec![EncounterEvent::StatusEffectNotFound {
                name,
                effect: effect.to_string(),
            }]),
        }
    }

    /// Ends combat. Round and turn counters are kept as history.
    pub fn end_combat(&mut self) -> TrackerResult<Vec<EncounterEvent>> {
        if !self.is_active {
            return Err(TrackerError::CombatNotActive);
        }

        self.is_active = false;
        debug!("Combat ended in round {}", self.round);
        Ok(vec![EncounterEvent::CombatEnded { round: self.round }])
    }

    /// Overwrites the campaign and encounter labels.
    pub fn set_encounter_details(
        &mut self,
        campaign: impl Into<String>,
        encounter: impl Into<String>,
    ) -> TrackerResult<Vec<EncounterEvent>> {
        self.campaign_name = campaign.into();
        self.encounter_name = encounter.into();

        Ok(vec![EncounterEvent::DetailsChanged {
            campaign: self.campaign_name.clone(),
            encounter: self.encounter_name.clone(),
        }])
    }

    /// Appends `count` fresh copies of a combatant with numbered names.
    ///
    /// The trailing number of the source name is stripped and the copies
    /// continue counting from it. Existing names are not checked for collisions.
    ///
    /// # Examples
    ///
    /// ```
    /// use skirmish::Encounter;
    ///
    /// let mut encounter = Encounter::new();
    /// encounter.add_combatant("Orc12", 8, 15, false).unwrap();
    /// encounter.duplicate_combatant(0, 2).unwrap();
    ///
    /// let names: Vec<_> = encounter.combatants.iter().map(|c| c.name.as_str()).collect();
    /// assert_eq!(names, ["Orc12", "Orc13", "Orc14"]);
    /// ```
    pub fn duplicate_combatant(&mut self, index: usize, count: usize) -> TrackerResult<Vec<EncounterEvent>> {
        let len = self.combatants.len();
        let source = self
            .combatants
            .get(index)
            .ok_or(TrackerError::InvalidIndex { index, len })?;
        if count < 1 {
            return Err(TrackerError::InvalidCount(count));
        }

        let (base, number) = split_trailing_number(&source.name);
        let copies: Vec<Combatant> = (1..=count as u64)
            .map(|i| {
                Combatant::new(
                    format!("{base}{}", number.saturating_add(i)),
                    source.initiative,
                    source.max_hp,
                    source.is_player,
                )
            })
            .collect();

        let source_name = source.name.clone();
        let events = copies
            .iter()
            .map(|copy| EncounterEvent::CombatantDuplicated {
                source: source_name.clone(),
                name: copy.name.clone(),
            })
            .collect();
        debug!("Duplicating {source_name:?} {count} times");
        self.combatants.extend(copies);
        Ok(events)
    }

    /// Overwrites a combatant's initiative, re-sorting the roster during combat.
    ///
    /// The turn pointer is positional, so a re-sort can hand the current turn
    /// to a different combatant.
    pub fn change_initiative(&mut self, index: usize, initiative: i32) -> TrackerResult<Vec<EncounterEvent>> {
        let combatant = self.combatant_mut(index)?;
        let old = combatant.initiative;
        combatant.initiative = initiative;

        let mut events = vec![EncounterEvent::InitiativeChanged {
            name: combatant.name.clone(),
            old,
            new: initiative,
        }];
        if self.is_active {
            self.sort_by_initiative();
            events.push(EncounterEvent::TurnOrderUpdated);
        }
        Ok(events)
    }
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializes the turn pointer as a plain integer with -1 meaning none.
mod turn_index {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(idx: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match idx {
            Some(idx) => serializer.serialize_u64(*idx as u64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok())
    }
}
