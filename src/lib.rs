//! # Skirmish Encounter Tracker
//!
//! A turn-based encounter tracker for tabletop role-playing sessions.
//!
//! ## Architecture Overview
//!
//! Skirmish keeps one encounter in memory and writes it to disk after every
//! change. The core architecture revolves around a few key concepts:
//!
//! - **Encounter Engine**: the combatant roster, initiative order, turn and
//!   round counters, hit points and status effects
//! - **Persistence Gateway**: the JSON save format and atomic file writes
//! - **Session**: the dispatcher that runs a [`Command`] against the encounter
//!   and triggers the auto-save hook afterwards
//! - **Input and Rendering**: the line-oriented terminal menu
//!
//! The engine never talks to the filesystem. Each operation returns the
//! [`EncounterEvent`]s it produced and the session decides whether a save is due.

pub mod encounter;
pub mod input;
pub mod persistence;
pub mod rendering;
pub mod session;

// Core module re-exports
pub use encounter::*;
pub use input::*;
pub use persistence::*;
pub use rendering::*;
pub use session::*;

use std::path::PathBuf;

/// Core error type for the Skirmish tracker.
#[derive(thiserror::Error, Debug)]
pub enum TrackerError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Combatant index is outside the roster
    #[error("Invalid combatant index {index} (roster has {len} combatants)")]
    InvalidIndex { index: usize, len: usize },

    /// Duplicate count below one
    #[error("Invalid number of copies: {0}")]
    InvalidCount(usize),

    /// Combat cannot start with an empty roster
    #[error("Cannot start combat with no combatants")]
    NoCombatants,

    /// Operation requires active combat
    #[error("No active combat")]
    CombatNotActive,

    /// Save destination could not be read
    #[error("Error reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Save destination could not be written
    #[error("Error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Save payload could not be decoded
    #[error("Error parsing {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Save timestamp could not be formatted
    #[error("Timestamp error: {0}")]
    Timestamp(String),

    /// Operator input could not be understood
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TrackerError {
    /// Returns true for failures of the save destination or payload, as
    /// opposed to rejected operations.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            TrackerError::Io(_)
                | TrackerError::Serde(_)
                | TrackerError::Read { .. }
                | TrackerError::Write { .. }
                | TrackerError::Decode { .. }
                | TrackerError::Timestamp(_)
        )
    }

    /// Returns true when the operator's input ran out mid-prompt.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, TrackerError::Io(err) if err.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

/// Result type used throughout the Skirmish codebase.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Version information for the tracker.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tracker configuration constants.
pub mod config {
    /// Campaign label used until the operator sets one
    pub const DEFAULT_CAMPAIGN_NAME: &str = "Default Campaign";

    /// Encounter label used until the operator sets one
    pub const DEFAULT_ENCOUNTER_NAME: &str = "Unknown Encounter";

    /// Version tag written into every save payload
    pub const FORMAT_VERSION: &str = "1.0.0";

    /// Menu label for typing a status effect by hand
    pub const CUSTOM_STATUS_EFFECT: &str = "Custom Status Effect";

    /// Prefix of generated save file names
    pub const SAVE_FILE_PREFIX: &str = "combat";

    /// Extension enforced on save file names
    pub const SAVE_FILE_EXTENSION: &str = ".json";

    /// Status effects offered as quick picks in a fresh encounter
    pub const DEFAULT_STATUS_EFFECTS: [&str; 14] = [
        "Blinded",
        "Charmed",
        "Deafened",
        "Frightened",
        "Grappled",
        "Incapacitated",
        "Invisible",
        "Paralyzed",
        "Petrified",
        "Poisoned",
        "Prone",
        "Restrained",
        "Stunned",
        "Unconscious",
    ];
}
