// crates/mcp-authz-demo-cli/src/preferences.rs
// ============================================================================
// Module: File Preference Store
// Description: JSON file persistence for the sound preference.
// Purpose: Remember the sound toggle across CLI invocations.
// Dependencies: mcp-authz-demo-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The preference file is a small JSON object with a single `sound_enabled`
//! flag. A missing file means nothing is stored. Reads are size-bounded and
//! a malformed file is reported, never silently overwritten.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use mcp_authz_demo_core::PreferenceError;
use mcp_authz_demo_core::PreferenceStore;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default preference file name, relative to the working directory.
pub const DEFAULT_PREFERENCE_FILE: &str = ".mcp-authz-demo-prefs.json";
/// Maximum preference file size in bytes.
pub const MAX_PREFERENCE_FILE_BYTES: u64 = 4 * 1024;

// ============================================================================
// SECTION: Store
// ============================================================================

/// Serialized preference document.
#[derive(Debug, Serialize, Deserialize)]
struct PreferenceFile {
    /// Persisted sound toggle.
    sound_enabled: bool,
}

/// Preference store backed by one JSON file.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    /// Location of the preference file.
    path: PathBuf,
}

impl FilePreferenceStore {
    /// Creates a store at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Creates a store at the configured path, or the default file name.
    #[must_use]
    pub fn from_config(path: Option<&str>) -> Self {
        Self::new(path.unwrap_or(DEFAULT_PREFERENCE_FILE))
    }

    /// Returns the preference file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load_sound_enabled(&self) -> Result<Option<bool>, PreferenceError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(PreferenceError::Io(err.to_string())),
        };
        if metadata.len() > MAX_PREFERENCE_FILE_BYTES {
            return Err(PreferenceError::Invalid("preference file exceeds size limit".to_string()));
        }
        let bytes = fs::read(&self.path).map_err(|err| PreferenceError::Io(err.to_string()))?;
        let file: PreferenceFile = serde_json::from_slice(&bytes)
            .map_err(|err| PreferenceError::Invalid(err.to_string()))?;
        Ok(Some(file.sound_enabled))
    }

    fn save_sound_enabled(&self, enabled: bool) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| PreferenceError::Io(err.to_string()))?;
        }
        let payload = serde_json::to_vec(&PreferenceFile {
            sound_enabled: enabled,
        })
        .map_err(|err| PreferenceError::Invalid(err.to_string()))?;
        fs::write(&self.path, payload).map_err(|err| PreferenceError::Io(err.to_string()))
    }
}
