//! # Command Definitions
//!
//! The fixed set of actions an operator can run against an encounter.

use std::path::PathBuf;

/// One fully parsed operator action.
///
/// Indexes are 0-based; the prompt layer converts from the 1-based numbers
/// shown on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddCombatant {
        name: String,
        initiative: i32,
        max_hp: i32,
        is_player: bool,
    },
    StartCombat,
    AdvanceTurn,
    AdjustHp { index: usize, delta: i32 },
    SetTemporaryHp { index: usize, amount: i32 },
    AddStatusEffect { index: usize, effect: String },
    RemoveStatusEffect { index: usize, effect: String },
    EndCombat,
    SetDetails { campaign: String, encounter: String },
    DuplicateCombatant { index: usize, count: usize },
    ChangeInitiative { index: usize, initiative: i32 },
    SaveTo(PathBuf),
    LoadFrom(PathBuf),
}

impl Command {
    /// Short name used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Command::AddCombatant { .. } => "add-combatant",
            Command::StartCombat => "start-combat",
            Command::AdvanceTurn => "advance-turn",
            Command::AdjustHp { .. } => "adjust-hp",
            Command::SetTemporaryHp { .. } => "set-temp-hp",
            Command::AddStatusEffect { .. } => "add-status",
            Command::RemoveStatusEffect { .. } => "remove-status",
            Command::EndCombat => "end-combat",
            Command::SetDetails { .. } => "set-details",
            Command::DuplicateCombatant { .. } => "duplicate-combatant",
            Command::ChangeInitiative { .. } => "change-initiative",
            Command::SaveTo(_) => "save-to",
            Command::LoadFrom(_) => "load-from",
        }
    }
}
