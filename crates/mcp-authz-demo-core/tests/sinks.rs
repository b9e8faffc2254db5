// crates/mcp-authz-demo-core/tests/sinks.rs
// ============================================================================
// Module: Event Sink and Preference Tests
// Description: Tone gating, fan-out delivery, and preference fallback.
// ============================================================================
//! ## Overview
//! Checks that tones follow the sound switch, that failing tone backends and
//! preference stores never surface to the caller, and that fan-out preserves
//! delivery order.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;

use mcp_authz_demo_core::FanoutEventSink;
use mcp_authz_demo_core::InMemoryPreferenceStore;
use mcp_authz_demo_core::OutputMode;
use mcp_authz_demo_core::PlaybackEngine;
use mcp_authz_demo_core::PlaybackEvent;
use mcp_authz_demo_core::PlaybackEventSink;
use mcp_authz_demo_core::PlaybackTiming;
use mcp_authz_demo_core::PreferenceError;
use mcp_authz_demo_core::PreferenceStore;
use mcp_authz_demo_core::ScenarioTable;
use mcp_authz_demo_core::ScriptKey;
use mcp_authz_demo_core::Tag;
use mcp_authz_demo_core::Tone;
use mcp_authz_demo_core::ToneError;
use mcp_authz_demo_core::ToneEventSink;
use mcp_authz_demo_core::ToneService;
use mcp_authz_demo_core::resolve_sound_enabled;

// ============================================================================
// SECTION: Helpers
// ============================================================================

#[derive(Default)]
struct RecordingTones {
    played: Mutex<Vec<Tone>>,
}

impl ToneService for RecordingTones {
    fn play(&self, tone: Tone) -> Result<(), ToneError> {
        self.played.lock().unwrap().push(tone);
        Ok(())
    }
}

struct BrokenTones;

impl ToneService for BrokenTones {
    fn play(&self, _tone: Tone) -> Result<(), ToneError> {
        Err(ToneError::Unavailable("no audio device".to_string()))
    }
}

struct BrokenStore;

impl PreferenceStore for BrokenStore {
    fn load_sound_enabled(&self) -> Result<Option<bool>, PreferenceError> {
        Err(PreferenceError::Io("storage disabled".to_string()))
    }

    fn save_sound_enabled(&self, _enabled: bool) -> Result<(), PreferenceError> {
        Err(PreferenceError::Io("storage disabled".to_string()))
    }
}

struct LabelSink {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl PlaybackEventSink for LabelSink {
    fn record(&self, event: &PlaybackEvent) {
        self.log.lock().unwrap().push(format!("{}:{}", self.name, event.label()));
    }

    fn selection_changed(&self, key: &ScriptKey) {
        self.log.lock().unwrap().push(format!("{}:select:{}/{}", self.name, key.role, key.scenario));
    }
}

fn session() -> Vec<PlaybackEvent> {
    vec![
        PlaybackEvent::Started,
        PlaybackEvent::GateStarted {
            stage: 1,
        },
        PlaybackEvent::TagRevealed {
            tag: Tag::Pass,
            stage: Some(1),
        },
        PlaybackEvent::TagRevealed {
            tag: Tag::Skip,
            stage: Some(3),
        },
        PlaybackEvent::TagRevealed {
            tag: Tag::Mask,
            stage: Some(3),
        },
        PlaybackEvent::Completed {
            skipped: false,
        },
    ]
}

// ============================================================================
// SECTION: Tones
// ============================================================================

#[test]
fn tones_follow_events_while_enabled() {
    let sink = ToneEventSink::new(RecordingTones::default(), true);
    for event in session() {
        sink.record(&event);
    }
    let played = sink.tones().played.lock().unwrap().clone();
    assert_eq!(played, vec![Tone::GateStart, Tone::Pass, Tone::MaskBurst, Tone::Chime]);
}

#[test]
fn disabling_sound_silences_tones() {
    let sink = ToneEventSink::new(RecordingTones::default(), true);
    sink.set_enabled(false);
    assert!(!sink.is_enabled());
    for event in session() {
        sink.record(&event);
    }
    assert!(sink.tones().played.lock().unwrap().is_empty());
}

#[test]
fn tone_failures_are_swallowed() {
    let sink = ToneEventSink::new(BrokenTones, true);
    for event in session() {
        sink.record(&event);
    }
}

// ============================================================================
// SECTION: Fan-out
// ============================================================================

#[test]
fn fanout_delivers_to_every_sink_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let fanout = FanoutEventSink::new()
        .with(Arc::new(LabelSink {
            name: "audit",
            log: Arc::clone(&log),
        }))
        .with(Arc::new(LabelSink {
            name: "tones",
            log: Arc::clone(&log),
        }));
    assert_eq!(fanout.len(), 2);
    fanout.record(&PlaybackEvent::Reset);
    assert_eq!(*log.lock().unwrap(), vec!["audit:reset".to_string(), "tones:reset".to_string()]);
    assert!(FanoutEventSink::new().is_empty());
}

#[test]
fn selection_changes_reach_every_sink_before_events() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let fanout = FanoutEventSink::new()
        .with(Arc::new(LabelSink {
            name: "audit",
            log: Arc::clone(&log),
        }))
        .with(Arc::new(LabelSink {
            name: "tones",
            log: Arc::clone(&log),
        }));
    let mut engine =
        PlaybackEngine::new(Arc::new(ScenarioTable::builtin()), PlaybackTiming::default(), fanout);
    assert!(engine.configure(ScriptKey::new("teller", "cross_branch", OutputMode::Readable)));
    engine.quick_run().unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "audit:select:teller/cross_branch".to_string(),
            "tones:select:teller/cross_branch".to_string(),
            "audit:started".to_string(),
            "tones:started".to_string(),
            "audit:completed".to_string(),
            "tones:completed".to_string(),
        ]
    );
}

// ============================================================================
// SECTION: Preferences
// ============================================================================

#[test]
fn stored_preference_overrides_default() {
    let store = InMemoryPreferenceStore::new();
    assert!(resolve_sound_enabled(&store, true));
    store.save_sound_enabled(false).unwrap();
    assert!(!resolve_sound_enabled(&store, true));
    assert_eq!(store.load_sound_enabled().unwrap(), Some(false));
}

#[test]
fn unavailable_store_falls_back_to_default() {
    assert!(resolve_sound_enabled(&BrokenStore, true));
    assert!(!resolve_sound_enabled(&BrokenStore, false));
}
