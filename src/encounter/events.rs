//! # Encounter Events
//!
//! Events produced by encounter operations.

use std::fmt;

/// Something that happened to the encounter as the result of one operation.
///
/// The dispatcher renders these for the operator and uses
/// [`EncounterEvent::mutates_state`] to decide whether an auto-save is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncounterEvent {
    /// A combatant was appended to the roster
    CombatantAdded {
        index: usize,
        name: String,
        initiative: i32,
        max_hp: i32,
    },
    /// Combat began and the roster was sorted by initiative
    CombatStarted { round: u32, first: String },
    /// The turn pointer wrapped and a new round began
    RoundStarted { round: u32 },
    /// The turn pointer moved to another combatant
    TurnAdvanced { index: usize, name: String },
    /// Hit points changed through damage or healing
    HitPointsChanged {
        name: String,
        current: i32,
        max: i32,
        temporary: i32,
    },
    /// Damage dropped a combatant to zero hit points
    FellUnconscious { name: String },
    /// Healing brought an unconscious combatant back above zero
    RegainedConsciousness { name: String },
    /// Temporary hit points replaced a lower value
    TemporaryHitPointsGranted { name: String, amount: i32 },
    /// Temporary hit points were not replaced because the existing value is not lower
    TemporaryHitPointsKept { name: String, existing: i32 },
    /// A status effect was appended
    StatusEffectAdded { name: String, effect: String },
    /// The first matching status effect was removed
    StatusEffectRemoved { name: String, effect: String },
    /// No status effect matched the requested label
    StatusEffectNotFound { name: String, effect: String },
    /// Combat ended; round and turn counters are kept
    CombatEnded { round: u32 },
    /// Campaign and encounter labels were overwritten
    DetailsChanged { campaign: String, encounter: String },
    /// A copy of a combatant was appended
    CombatantDuplicated { source: String, name: String },
    /// A combatant's initiative was overwritten
    InitiativeChanged { name: String, old: i32, new: i32 },
    /// Active combat was re-sorted after an initiative change
    TurnOrderUpdated,
}

impl EncounterEvent {
    /// Returns true if the event reflects a committed change to the encounter.
    pub fn mutates_state(&self) -> bool {
        !matches!(
            self,
            EncounterEvent::TemporaryHitPointsKept { .. } | EncounterEvent::StatusEffectNotFound { .. }
        )
    }
}

impl fmt::Display for EncounterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncounterEvent::CombatantAdded {
                name,
                initiative,
                max_hp,
                ..
            } => write!(
                f,
                "Added {name} to combat with initiative {initiative} and {max_hp} HP"
            ),
            EncounterEvent::CombatStarted { round, first } => {
                write!(f, "===== COMBAT BEGINS =====\nRound {round}\nIt's {first}'s turn!")
            }
            EncounterEvent::RoundStarted { round } => write!(f, "===== ROUND {round} ====="),
            EncounterEvent::TurnAdvanced { name, .. } => write!(f, "It's {name}'s turn!"),
            EncounterEvent::HitPointsChanged {
                name,
                current,
                max,
                temporary,
            } => {
                write!(f, "{name} HP: {current}/{max}")?;
                if *temporary > 0 {
                    write!(f, " (Temp: {temporary})")?;
                }
                Ok(())
            }
            EncounterEvent::FellUnconscious { name } => write!(f, "{name} falls unconscious!"),
            EncounterEvent::RegainedConsciousness { name } => {
                write!(f, "{name} regains consciousness!")
            }
            EncounterEvent::TemporaryHitPointsGranted { name, amount } => {
                write!(f, "{name} now has {amount} temporary hit points!")
            }
            EncounterEvent::TemporaryHitPointsKept { name, existing } => write!(
                f,
                "{name} already has {existing} temporary hit points, which is higher!"
            ),
            EncounterEvent::StatusEffectAdded { name, effect } => {
                write!(f, "{name} is now affected by: {effect}")
            }
            EncounterEvent::StatusEffectRemoved { name, effect } => {
                write!(f, "{name} is no longer affected by: {effect}")
            }
            EncounterEvent::StatusEffectNotFound { name, effect } => {
                write!(f, "{name} was not affected by: {effect}")
            }
            EncounterEvent::CombatEnded { round } => {
                write!(f, "===== COMBAT ENDED ===== (after {round} rounds)")
            }
            EncounterEvent::DetailsChanged {
                campaign,
                encounter,
            } => write!(
                f,
                "Set encounter details - Campaign: {campaign}, Encounter: {encounter}"
            ),
            EncounterEvent::CombatantDuplicated { name, .. } => write!(f, "Created {name}"),
            EncounterEvent::InitiativeChanged { name, old, new } => {
                write!(f, "{name}'s initiative changed from {old} to {new}")
            }
            EncounterEvent::TurnOrderUpdated => write!(f, "Combat order updated."),
        }
    }
}
