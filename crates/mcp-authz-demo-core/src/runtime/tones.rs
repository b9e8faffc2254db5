// crates/mcp-authz-demo-core/src/runtime/tones.rs
// ============================================================================
// Module: Event Sink Adapters
// Description: Tone playback and fan-out adapters over playback events.
// Purpose: Attach audio and analytics without touching the engine.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`ToneEventSink`] maps events to tones and plays them through an injected
//! [`ToneService`] while enabled. Tone failures are dropped: audio is never
//! allowed to affect playback. [`FanoutEventSink`] forwards one event to
//! several sinks in order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::core::script::ScriptKey;
use crate::interfaces::PlaybackEvent;
use crate::interfaces::PlaybackEventSink;
use crate::interfaces::Tone;
use crate::interfaces::ToneService;

// ============================================================================
// SECTION: Tone Sink
// ============================================================================

/// Event sink that plays tones while sound is enabled.
pub struct ToneEventSink<T> {
    /// Audio backend.
    tones: T,
    /// Sound on/off switch.
    enabled: AtomicBool,
}

impl<T: ToneService> ToneEventSink<T> {
    /// Creates a tone sink.
    #[must_use]
    pub const fn new(tones: T, enabled: bool) -> Self {
        Self {
            tones,
            enabled: AtomicBool::new(enabled),
        }
    }

    /// Returns true when tones are played.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turns tones on or off.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Returns the audio backend.
    #[must_use]
    pub const fn tones(&self) -> &T {
        &self.tones
    }

    /// Consumes the sink and returns the audio backend.
    #[must_use]
    pub fn into_tones(self) -> T {
        self.tones
    }
}

impl<T: ToneService> PlaybackEventSink for ToneEventSink<T> {
    fn record(&self, event: &PlaybackEvent) {
        if !self.is_enabled() {
            return;
        }
        if let Some(tone) = Tone::for_event(event) {
            let _ = self.tones.play(tone);
        }
    }
}

// ============================================================================
// SECTION: Fan-out Sink
// ============================================================================

/// Forwards each event to every inner sink.
#[derive(Default, Clone)]
pub struct FanoutEventSink {
    /// Inner sinks in delivery order.
    sinks: Vec<Arc<dyn PlaybackEventSink>>,
}

impl FanoutEventSink {
    /// Creates an empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn PlaybackEventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Returns the number of inner sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true when no sinks are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl PlaybackEventSink for FanoutEventSink {
    fn record(&self, event: &PlaybackEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }

    fn selection_changed(&self, key: &ScriptKey) {
        for sink in &self.sinks {
            sink.selection_changed(key);
        }
    }
}
