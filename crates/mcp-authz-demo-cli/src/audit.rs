// crates/mcp-authz-demo-cli/src/audit.rs
// ============================================================================
// Module: Playback Audit Logging
// Description: Structured audit events for playback milestones.
// Purpose: Emit JSON-line audit logs without hard dependencies.
// Dependencies: mcp-authz-demo-core, mcp-authz-demo-config, serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the audit event payload and sinks for playback
//! logging. [`AuditEventSink`] adapts an [`AuditSink`] to the engine's event
//! sink seam, stamping each event with the selection it belongs to.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use mcp_authz_demo_config::AuditConfig;
use mcp_authz_demo_config::AuditSinkKind;
use mcp_authz_demo_core::OutputMode;
use mcp_authz_demo_core::PlaybackEvent;
use mcp_authz_demo_core::PlaybackEventSink;
use mcp_authz_demo_core::RoleId;
use mcp_authz_demo_core::ScenarioId;
use mcp_authz_demo_core::ScriptKey;
use mcp_authz_demo_core::Tag;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Playback audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Selected role.
    pub role: RoleId,
    /// Selected scenario.
    pub scenario: ScenarioId,
    /// Selected output mode.
    pub mode: OutputMode,
    /// Playback milestone label.
    pub kind: &'static str,
    /// Revealed tag for tag events.
    pub tag: Option<Tag>,
    /// Gate number when the milestone belongs to one.
    pub stage: Option<u8>,
}

impl PlaybackAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(key: &ScriptKey, event: &PlaybackEvent) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        let (tag, stage) = match *event {
            PlaybackEvent::GateStarted {
                stage,
            } => (None, Some(stage)),
            PlaybackEvent::TagRevealed {
                tag,
                stage,
            } => (Some(tag), stage),
            PlaybackEvent::Started
            | PlaybackEvent::Completed {
                ..
            }
            | PlaybackEvent::Reset => (None, None),
        };
        Self {
            event: "playback",
            timestamp_ms,
            role: key.role.clone(),
            scenario: key.scenario.clone(),
            mode: key.mode,
            kind: event.label(),
            tag,
            stage,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for playback events.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &PlaybackAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &PlaybackAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &PlaybackAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &PlaybackAuditEvent) {}
}

/// Builds the sink selected by `[audit]`.
///
/// # Errors
///
/// Returns an error when the file sink cannot be opened.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn AuditSink>> {
    match (config.sink, config.path.as_deref()) {
        (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
        (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
        (AuditSinkKind::File, Some(path)) => Ok(Arc::new(FileAuditSink::new(Path::new(path))?)),
        (AuditSinkKind::File, None) => {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "audit.path is not set"))
        }
    }
}

// ============================================================================
// SECTION: Engine Adapter
// ============================================================================

/// Routes engine events to an [`AuditSink`], stamped with the engine's
/// current selection.
pub struct AuditEventSink {
    /// Destination sink.
    sink: Arc<dyn AuditSink>,
    /// Selection stamped on every event; follows engine reconfiguration.
    key: RwLock<ScriptKey>,
}

impl AuditEventSink {
    /// Creates an adapter stamping `key` until the engine selects another.
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>, key: ScriptKey) -> Self {
        Self {
            sink,
            key: RwLock::new(key),
        }
    }
}

impl PlaybackEventSink for AuditEventSink {
    fn record(&self, event: &PlaybackEvent) {
        if let Ok(key) = self.key.read() {
            self.sink.record(&PlaybackAuditEvent::new(&key, event));
        }
    }

    fn selection_changed(&self, key: &ScriptKey) {
        if let Ok(mut current) = self.key.write() {
            *current = key.clone();
        }
    }
}
