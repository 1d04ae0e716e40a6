//! # Persistence Module
//!
//! Save file format and file-system access for encounters.
//!
//! An encounter is wrapped in a [`SaveState`] envelope together with the time
//! it was written and the format version, then encoded as indented JSON.
//! Writes go through a temporary file in the destination directory that is
//! renamed over the target, so an interrupted save never leaves a truncated file.

use crate::encounter::{default_status_effects, Encounter};
use crate::{config, TrackerError, TrackerResult};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Envelope written to disk for every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    /// The complete encounter, minus its save target
    #[serde(alias = "combatTracker")]
    pub encounter: Encounter,
    /// When the save was written (RFC 3339)
    #[serde(default, alias = "saveTime")]
    pub saved_at: String,
    /// Save format version
    #[serde(default, alias = "version")]
    pub format_version: String,
}

impl SaveState {
    /// Wraps a copy of the encounter with the current time and format version.
    pub fn new(encounter: &Encounter) -> TrackerResult<Self> {
        Ok(Self {
            encounter: encounter.clone(),
            saved_at: timestamp()?,
            format_version: config::FORMAT_VERSION.to_string(),
        })
    }
}

/// Storage backend the session saves to and loads from.
pub trait EncounterStore {
    /// Writes the full encounter to `destination`, replacing prior content.
    fn write(&mut self, encounter: &Encounter, destination: &Path) -> TrackerResult<()>;

    /// Reads an encounter back from `source`.
    ///
    /// The returned encounter's save target is set to `source`.
    fn load(&mut self, source: &Path) -> TrackerResult<Encounter>;
}

/// Stores encounters as JSON files on the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileStore;

impl JsonFileStore {
    /// Creates a new file store.
    pub fn new() -> Self {
        Self
    }
}

impl EncounterStore for JsonFileStore {
    fn write(&mut self, encounter: &Encounter, destination: &Path) -> TrackerResult<()> {
        let payload = serialize(encounter)?;
        write_to_target(&payload, destination)
    }

    fn load(&mut self, source: &Path) -> TrackerResult<Encounter> {
        load_from_target(source)
    }
}

/// Encodes the encounter into the save payload.
///
/// # Examples
///
/// ```
/// use skirmish::{serialize, Encounter};
///
/// let json = serialize(&Encounter::new()).unwrap();
/// assert!(json.contains("\"formatVersion\": \"1.0.0\""));
/// assert!(json.contains("\"availableStatusEffects\""));
/// ```
pub fn serialize(encounter: &Encounter) -> TrackerResult<String> {
    let state = SaveState::new(encounter)?;
    serde_json::to_string_pretty(&state).map_err(TrackerError::from)
}

/// Decodes a save payload into a [`SaveState`], re-seeding an empty
/// status-effect catalog with the defaults.
///
/// Older saves stored the custom-entry menu label in the catalog; it is dropped.
pub fn deserialize(payload: &str) -> TrackerResult<SaveState> {
    let mut state: SaveState = serde_json::from_str(payload)?;

    state
        .encounter
        .available_status_effects
        .retain(|effect| effect != config::CUSTOM_STATUS_EFFECT);
    if state.encounter.available_status_effects.is_empty() {
        state.encounter.available_status_effects = default_status_effects();
        info!("Initialized default status effects list");
    }
    if state.format_version != config::FORMAT_VERSION {
        warn!(
            "Save format version {:?} differs from {}, loading anyway",
            state.format_version,
            config::FORMAT_VERSION
        );
    }
    Ok(state)
}

/// Writes a serialized payload to `destination`, fully replacing it.
pub fn write_to_target(payload: &str, destination: &Path) -> TrackerResult<()> {
    let write_error = |source: std::io::Error| TrackerError::Write {
        path: destination.to_path_buf(),
        source,
    };

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(payload.as_bytes()).map_err(write_error)?;
    if let Some(permissions) = target_permissions(destination) {
        file.as_file()
            .set_permissions(permissions)
            .map_err(write_error)?;
    }
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(destination)
        .map_err(|err| write_error(err.error))?;

    info!("Combat state saved to {}", destination.display());
    Ok(())
}

/// Permissions the saved file should end up with: those of the file being
/// replaced, or 0644 for a new file.
fn target_permissions(destination: &Path) -> Option<std::fs::Permissions> {
    match std::fs::metadata(destination) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<std::fs::Permissions> {
    None
}

/// Reads and decodes the encounter stored at `source`.
///
/// The loaded encounter auto-saves back to `source`.
pub fn load_from_target(source: &Path) -> TrackerResult<Encounter> {
    let payload = std::fs::read_to_string(source).map_err(|err| TrackerError::Read {
        path: source.to_path_buf(),
        source: err,
    })?;
    let state = deserialize(&payload).map_err(|err| match err {
        TrackerError::Serde(err) => TrackerError::Decode {
            path: source.to_path_buf(),
            source: err,
        },
        other => other,
    })?;

    info!("Loaded save from: {}", state.saved_at);
    let mut encounter = state.encounter;
    encounter.save_target = Some(source.to_path_buf());
    Ok(encounter)
}

/// Saves the encounter to its configured target.
///
/// Returns the path written, or `None` when no target is configured.
pub fn autosave(encounter: &Encounter, store: &mut dyn EncounterStore) -> TrackerResult<Option<PathBuf>> {
    let Some(target) = encounter.save_target.as_deref() else {
        return Ok(None);
    };
    store.write(encounter, target)?;
    Ok(Some(target.to_path_buf()))
}

/// Current local time (UTC if the offset is unknown) in RFC 3339.
fn timestamp() -> TrackerResult<String> {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .format(&Rfc3339)
        .map_err(|err| TrackerError::Timestamp(err.to_string()))
}

/// Builds the default file name for a manual save.
///
/// # Examples
///
/// ```
/// use skirmish::{default_save_file_name, Encounter};
///
/// let name = default_save_file_name(&Encounter::new());
/// assert!(name.starts_with("combat_Default_Campaign_Unknown_Encounter_"));
/// assert!(name.ends_with(".json"));
/// ```
pub fn default_save_file_name(encounter: &Encounter) -> String {
    let stamp = OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .format(time::macros::format_description!(
            "[year]-[month]-[day]_[hour]-[minute]-[second]"
        ))
        .unwrap_or_default();
    format!(
        "{}_{}_{}_{}{}",
        config::SAVE_FILE_PREFIX,
        encounter.campaign_name.replace(' ', "_"),
        encounter.encounter_name.replace(' ', "_"),
        stamp,
        config::SAVE_FILE_EXTENSION
    )
}

/// Appends the save file extension unless already present.
pub fn with_save_extension(name: &str) -> PathBuf {
    if name.ends_with(config::SAVE_FILE_EXTENSION) {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{name}{}", config::SAVE_FILE_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_encounter() -> Encounter {
        let mut encounter = Encounter::new();
        encounter.add_combatant("Hero", 10, 20, true).unwrap();
        encounter.add_combatant("Wolf", 15, 10, false).unwrap();
        encounter.add_status_effect(0, "Blessed").unwrap();
        encounter.set_temporary_hp(1, 3).unwrap();
        encounter.start_combat().unwrap();
        encounter
    }

    #[test]
    fn test_payload_shape() {
        let json = serialize(&sample_encounter()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["formatVersion"], "1.0.0");
        assert!(value["savedAt"].is_string());
        let encounter = &value["encounter"];
        assert_eq!(encounter["round"], 1);
        assert_eq!(encounter["currentTurnIdx"], 0);
        assert_eq!(encounter["isActive"], true);
        assert_eq!(encounter["combatants"][0]["name"], "Wolf");
        assert_eq!(encounter["combatants"][0]["temporaryHP"], 3);
        assert_eq!(encounter["availableStatusEffects"].as_array().unwrap().len(), 14);
        assert!(encounter.get("saveTarget").is_none());
        assert!(json.contains("\n  "), "payload should be indented");
    }

    #[test]
    fn test_payload_round_trip() {
        let encounter = sample_encounter();
        let state = deserialize(&serialize(&encounter).unwrap()).unwrap();
        assert_eq!(state.encounter, encounter);
    }

    #[test]
    fn test_empty_catalog_reseeded() {
        let payload = r#"{
            "encounter": { "combatants": [], "availableStatusEffects": [] },
            "savedAt": "2024-01-01T00:00:00Z",
            "formatVersion": "1.0.0"
        }"#;
        let state = deserialize(payload).unwrap();
        assert_eq!(state.encounter.available_status_effects, default_status_effects());
    }

    #[test]
    fn test_legacy_field_names() {
        let payload = r#"{
            "combatTracker": {
                "combatants": [{
                    "name": "Orc", "initiative": 8, "maxHP": 15, "currentHP": 4,
                    "isPlayer": false, "isConscious": true, "temporaryHP": 0,
                    "statusEffects": ["Prone"]
                }],
                "round": 3, "currentTurnIdx": 0, "isActive": true,
                "campaignName": "Old", "encounterName": "Camp",
                "statusEffects": ["Hexed"]
            },
            "saveTime": "2023-05-01T12:00:00Z",
            "version": "0.9.0"
        }"#;
        let state = deserialize(payload).unwrap();
        assert_eq!(state.saved_at, "2023-05-01T12:00:00Z");
        assert_eq!(state.format_version, "0.9.0");
        assert_eq!(state.encounter.round, 3);
        assert_eq!(state.encounter.combatants[0].status_effects, ["Prone"]);
        assert_eq!(state.encounter.available_status_effects, ["Hexed"]);
    }

    #[test]
    fn test_custom_entry_dropped_from_catalog() {
        let payload = r#"{
            "encounter": { "availableStatusEffects": ["Prone", "Custom Status Effect", "Hexed"] },
            "savedAt": "2024-01-01T00:00:00Z",
            "formatVersion": "1.0.0"
        }"#;
        let state = deserialize(payload).unwrap();
        assert_eq!(state.encounter.available_status_effects, ["Prone", "Hexed"]);

        let only_custom = r#"{
            "encounter": { "availableStatusEffects": ["Custom Status Effect"] },
            "savedAt": "2024-01-01T00:00:00Z",
            "formatVersion": "1.0.0"
        }"#;
        let state = deserialize(only_custom).unwrap();
        assert_eq!(state.encounter.available_status_effects, default_status_effects());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_to_target(&serialize(&Encounter::new()).unwrap(), &path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_save_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh.json");
        write_to_target("{}", &path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_write_and_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("encounter.json");
        let encounter = sample_encounter();

        JsonFileStore::new().write(&encounter, &path).unwrap();
        let loaded = load_from_target(&path).unwrap();

        assert_eq!(loaded.save_target.as_deref(), Some(path.as_path()));
        assert_eq!(
            Encounter {
                save_target: None,
                ..loaded
            },
            encounter
        );
    }

    #[test]
    fn test_write_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("encounter.json");
        std::fs::write(&path, "x".repeat(100_000)).unwrap();

        write_to_target("{}", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("encounter.json");
        let err = write_to_target("{}", &path).unwrap_err();
        assert!(matches!(err, TrackerError::Write { .. }));
        assert!(err.is_persistence());
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(load_from_target(&missing), Err(TrackerError::Read { .. })));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        assert!(matches!(load_from_target(&garbage), Err(TrackerError::Decode { .. })));
    }

    #[test]
    fn test_autosave_without_target() {
        let mut store = JsonFileStore::new();
        assert_eq!(autosave(&Encounter::new(), &mut store).unwrap(), None);
    }

    #[test]
    fn test_autosave_with_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auto.json");
        let encounter = Encounter::with_save_target(&path);

        let written = autosave(&encounter, &mut JsonFileStore::new()).unwrap();
        assert_eq!(written, Some(path.clone()));
        assert!(path.exists());
    }

    #[test]
    fn test_save_extension() {
        assert_eq!(with_save_extension("fight"), PathBuf::from("fight.json"));
        assert_eq!(with_save_extension("fight.json"), PathBuf::from("fight.json"));
    }
}
