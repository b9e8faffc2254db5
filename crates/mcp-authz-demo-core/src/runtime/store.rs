// crates/mcp-authz-demo-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Preference Store
// Description: Process-local sound preference storage for tests and embedding.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryPreferenceStore`] keeps the sound preference for the lifetime of
//! the process. [`resolve_sound_enabled`] reads any store and falls back to a
//! default when nothing is stored or the store fails.

use std::sync::Arc;
use std::sync::Mutex;

use crate::interfaces::PreferenceError;
use crate::interfaces::PreferenceStore;

/// In-memory sound preference store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPreferenceStore {
    /// Stored preference protected by a mutex.
    value: Arc<Mutex<Option<bool>>>,
}

impl InMemoryPreferenceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn load_sound_enabled(&self) -> Result<Option<bool>, PreferenceError> {
        let guard = self
            .value
            .lock()
            .map_err(|_| PreferenceError::Io("preference store mutex poisoned".to_string()))?;
        Ok(*guard)
    }

    fn save_sound_enabled(&self, enabled: bool) -> Result<(), PreferenceError> {
        *self
            .value
            .lock()
            .map_err(|_| PreferenceError::Io("preference store mutex poisoned".to_string()))? =
            Some(enabled);
        Ok(())
    }
}

/// Returns the stored preference, or `default` when absent or unreadable.
#[must_use]
pub fn resolve_sound_enabled(store: &dyn PreferenceStore, default: bool) -> bool {
    match store.load_sound_enabled() {
        Ok(Some(enabled)) => enabled,
        Ok(None) | Err(_) => default,
    }
}
