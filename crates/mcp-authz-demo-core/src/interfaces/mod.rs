// crates/mcp-authz-demo-core/src/interfaces/mod.rs
// ============================================================================
// Module: Playback Interfaces
// Description: Host-facing seams for events, tones, and preferences.
// Purpose: Keep audio, analytics, and persistence outside the playback engine.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The playback engine never touches audio devices or storage directly. Hosts
//! inject implementations of these traits; every failure they report is
//! swallowed by the caller so playback correctness never depends on them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::script::ScriptKey;
use crate::core::script::Tag;

// ============================================================================
// SECTION: Playback Events
// ============================================================================

/// Observable playback milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Playback started from the first line.
    Started,
    /// A gate header was revealed.
    GateStarted {
        /// Gate number.
        stage: u8,
    },
    /// A decision tag was revealed.
    TagRevealed {
        /// Revealed tag.
        tag: Tag,
        /// Gate the tag belongs to, if any.
        stage: Option<u8>,
    },
    /// Playback reached the terminal state.
    Completed {
        /// True when completion came from skip or quick run.
        skipped: bool,
    },
    /// Playback returned to idle.
    Reset,
}

impl PlaybackEvent {
    /// Returns the stable event label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::GateStarted {
                ..
            } => "gate_started",
            Self::TagRevealed {
                ..
            } => "tag_revealed",
            Self::Completed {
                ..
            } => "completed",
            Self::Reset => "reset",
        }
    }
}

/// Receiver for playback events.
pub trait PlaybackEventSink: Send + Sync {
    /// Records one event. Implementations must not fail the caller.
    fn record(&self, event: &PlaybackEvent);

    /// Called when the engine switches to a new selection, before any event
    /// for that selection is recorded.
    fn selection_changed(&self, _key: &ScriptKey) {}
}

/// Event sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl PlaybackEventSink for NoopEventSink {
    fn record(&self, _event: &PlaybackEvent) {}
}

impl<S: PlaybackEventSink + ?Sized> PlaybackEventSink for std::sync::Arc<S> {
    fn record(&self, event: &PlaybackEvent) {
        (**self).record(event);
    }

    fn selection_changed(&self, key: &ScriptKey) {
        (**self).selection_changed(key);
    }
}

// ============================================================================
// SECTION: Tones
// ============================================================================

/// Short audible cue keyed to a playback event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// A gate begins evaluating.
    GateStart,
    /// A gate permitted.
    Pass,
    /// A gate denied.
    Deny,
    /// Fields were masked.
    MaskBurst,
    /// Playback completed.
    Chime,
}

impl Tone {
    /// Selects the tone for an event, if one applies.
    #[must_use]
    pub const fn for_event(event: &PlaybackEvent) -> Option<Self> {
        match event {
            PlaybackEvent::GateStarted {
                ..
            } => Some(Self::GateStart),
            PlaybackEvent::TagRevealed {
                tag,
                ..
            } => match tag {
                Tag::Pass => Some(Self::Pass),
                Tag::Deny => Some(Self::Deny),
                Tag::Mask => Some(Self::MaskBurst),
                Tag::Skip | Tag::Info | Tag::Done => None,
            },
            PlaybackEvent::Completed {
                ..
            } => Some(Self::Chime),
            PlaybackEvent::Started | PlaybackEvent::Reset => None,
        }
    }
}

/// Tone playback errors.
#[derive(Debug, Error)]
pub enum ToneError {
    /// No audio output is available.
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
}

/// Audio backend.
pub trait ToneService: Send + Sync {
    /// Plays one tone.
    ///
    /// # Errors
    ///
    /// Returns [`ToneError`] when the tone cannot be played.
    fn play(&self, tone: Tone) -> Result<(), ToneError>;
}

/// Tone service that plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToneService;

impl ToneService for NoopToneService {
    fn play(&self, _tone: Tone) -> Result<(), ToneError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Preferences
// ============================================================================

/// Preference persistence errors.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Backend I/O failed.
    #[error("preference io error: {0}")]
    Io(String),
    /// Stored value could not be decoded.
    #[error("invalid stored preference: {0}")]
    Invalid(String),
}

/// Key-value persistence for the sound preference.
pub trait PreferenceStore: Send + Sync {
    /// Loads the stored preference, or `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError`] when the backend fails.
    fn load_sound_enabled(&self) -> Result<Option<bool>, PreferenceError>;

    /// Stores the preference.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError`] when the backend fails.
    fn save_sound_enabled(&self, enabled: bool) -> Result<(), PreferenceError>;
}
