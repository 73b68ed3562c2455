//! The on-disk save document.

use chrono::{DateTime, Utc};
use estate_types::{GameState, STATE_VERSION};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// One saved game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    /// Save format version; must equal [`STATE_VERSION`] to load.
    pub version: u32,
    /// Simulated instant the save was taken.
    pub saved_at: DateTime<Utc>,
    /// Slot key.
    pub slot: String,
    /// The full game state.
    pub state: GameState,
}

impl SaveFile {
    /// Capture `state` for `slot` at the state's current simulated time.
    pub fn capture(slot: impl Into<String>, state: &GameState) -> Self {
        Self {
            version: STATE_VERSION,
            saved_at: state.time.now(),
            slot: slot.into(),
            state: state.clone(),
        }
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a save read from `slot`, rejecting other format versions.
    pub fn from_json(slot: &str, json: &str) -> Result<Self, StoreError> {
        let file: Self = serde_json::from_str(json)?;
        if file.version != STATE_VERSION || file.state.version != STATE_VERSION {
            return Err(StoreError::VersionMismatch {
                slot: slot.to_owned(),
                found: if file.version == STATE_VERSION {
                    file.state.version
                } else {
                    file.version
                },
                expected: STATE_VERSION,
            });
        }
        Ok(file)
    }
}

/// Check that `slot` is usable as a key and a file name.
pub fn validate_slot(slot: &str) -> Result<(), StoreError> {
    let valid = !slot.is_empty()
        && slot.len() <= 64
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidSlot(slot.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use estate_types::{GameSettings, GameTime, PlayerProfile};

    use super::*;

    fn state() -> GameState {
        GameState::new(PlayerProfile::new("Robin"), GameTime::default(), GameSettings::default())
    }

    #[test]
    fn newer_version_is_rejected() {
        let mut file = SaveFile::capture("slot-1", &state());
        file.version = STATE_VERSION + 1;
        let json = file.to_json().unwrap();
        let err = SaveFile::from_json("slot-1", &json).unwrap_err();
        assert!(matches!(err, StoreError::VersionMismatch { found, .. } if found == STATE_VERSION + 1));
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let err = SaveFile::from_json("slot-1", "{ not json").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn slot_names() {
        assert!(validate_slot("autosave").is_ok());
        assert!(validate_slot("manual_02-b").is_ok());
        assert!(validate_slot("").is_err());
        assert!(validate_slot("../etc/passwd").is_err());
        assert!(validate_slot("with space").is_err());
    }
}
