//! # Session Module
//!
//! Dispatches operator commands to the encounter and runs the auto-save hook.
//!
//! The session owns the single in-memory [`Encounter`] and the store it is
//! persisted through. After every command that changed the encounter it saves
//! to the configured target. A failed auto-save is logged and reported, but the
//! change that triggered it stays in memory.

use crate::encounter::{Encounter, EncounterEvent};
use crate::input::Command;
use crate::persistence::{autosave, EncounterStore};
use crate::TrackerResult;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// What happened to durability after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveStatus {
    /// Nothing changed, or no save target is configured
    Skipped,
    /// State was written to this path
    Saved(PathBuf),
    /// The write failed; the in-memory change stands
    Failed(String),
}

/// Outcome of one successfully executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    /// Events produced by the encounter
    pub events: Vec<EncounterEvent>,
    /// Result of the post-command save
    pub autosave: AutosaveStatus,
}

/// Owns the encounter for the lifetime of the process.
pub struct Session {
    encounter: Encounter,
    store: Box<dyn EncounterStore>,
}

impl Session {
    /// Creates a session around an existing encounter.
    pub fn new(encounter: Encounter, store: Box<dyn EncounterStore>) -> Self {
        Self { encounter, store }
    }

    /// Opens a session, loading `path` if given.
    ///
    /// If the load fails for any reason a fresh encounter is created that
    /// auto-saves to the same path.
    pub fn open(path: Option<PathBuf>, mut store: Box<dyn EncounterStore>) -> Self {
        let encounter = match path {
            Some(path) => match store.load(&path) {
                Ok(encounter) => encounter,
                Err(err) => {
                    warn!("Failed to load save file: {err}");
                    info!("Creating a new combat tracker instead");
                    Encounter::with_save_target(path)
                }
            },
            None => Encounter::new(),
        };
        Self::new(encounter, store)
    }

    /// The current encounter.
    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    /// The configured auto-save destination, if any.
    pub fn save_target(&self) -> Option<&Path> {
        self.encounter.save_target.as_deref()
    }

    /// Runs one command.
    ///
    /// Validation and load failures are returned as errors and leave the
    /// encounter untouched. Auto-save failures are not errors; see
    /// [`CommandReport::autosave`].
    pub fn execute(&mut self, command: Command) -> TrackerResult<CommandReport> {
        debug!("Executing {}", command.label());
        let encounter = &mut self.encounter;

        let events = match command {
            Command::AddCombatant {
                name,
                initiative,
                max_hp,
                is_player,
            } => encounter.add_combatant(name, initiative, max_hp, is_player)?,
            Command::StartCombat => encounter.start_combat()?,
            Command::AdvanceTurn => encounter.advance_turn()?,
            Command::AdjustHp { index, delta } => encounter.adjust_hp(index, delta)?,
            Command::SetTemporaryHp { index, amount } => encounter.set_temporary_hp(index, amount)?,
            Command::AddStatusEffect { index, effect } => encounter.add_status_effect(index, effect)?,
            Command::RemoveStatusEffect { index, effect } => {
                encounter.remove_status_effect(index, &effect)?
            }
            Command::EndCombat => encounter.end_combat()?,
            Command::SetDetails {
                campaign,
                encounter: name,
            } => encounter.set_encounter_details(campaign, name)?,
            Command::DuplicateCombatant { index, count } => encounter.duplicate_combatant(index, count)?,
            Command::ChangeInitiative { index, initiative } => {
                encounter.change_initiative(index, initiative)?
            }
            Command::SaveTo(path) => return self.save_to(path),
            Command::LoadFrom(path) => return self.load_from(&path),
        };

        let autosave = if events.iter().any(EncounterEvent::mutates_state) {
            self.autosave()
        } else {
            AutosaveStatus::Skipped
        };
        Ok(CommandReport { events, autosave })
    }

    /// Saves to the configured target, converting failures into a warning.
    pub fn autosave(&mut self) -> AutosaveStatus {
        match autosave(&self.encounter, self.store.as_mut()) {
            Ok(Some(path)) => AutosaveStatus::Saved(path),
            Ok(None) => AutosaveStatus::Skipped,
            Err(err) => {
                warn!("Auto-save failed: {err}");
                AutosaveStatus::Failed(err.to_string())
            }
        }
    }

    /// Writes the encounter to `path` and makes it the auto-save target.
    fn save_to(&mut self, path: PathBuf) -> TrackerResult<CommandReport> {
        self.store.write(&self.encounter, &path)?;
        self.encounter.save_target = Some(path.clone());
        Ok(CommandReport {
            events: Vec::new(),
            autosave: AutosaveStatus::Saved(path),
        })
    }

    /// Replaces the encounter with the one stored at `path`.
    fn load_from(&mut self, path: &Path) -> TrackerResult<CommandReport> {
        self.encounter = self.store.load(path)?;
        info!("Combat state loaded from {}", path.display());
        Ok(CommandReport {
            events: Vec::new(),
            autosave: AutosaveStatus::Skipped,
        })
    }

    /// Final save before the process exits.
    pub fn shutdown(&mut self) -> AutosaveStatus {
        if let Some(target) = self.save_target() {
            info!("Performing final save to {} before exit", target.display());
        }
        self.autosave()
    }
}
