// crates/mcp-authz-demo-cli/src/tests/audit.rs
// ============================================================================
// Module: Audit Sink Tests
// Description: Unit tests for playback audit events and sinks.
// Purpose: Ensure engine milestones become well-formed JSON lines.
// Dependencies: mcp-authz-demo-cli audit module, tempfile
// ============================================================================

//! ## Overview
//! Drives real playback through [`AuditEventSink`] and checks the recorded
//! events, the file sink's JSON-line output, and sink selection from config.

use std::fs;
use std::sync::Arc;
use std::sync::Mutex;

use mcp_authz_demo_config::AuditConfig;
use mcp_authz_demo_config::AuditSinkKind;
use mcp_authz_demo_core::OutputMode;
use mcp_authz_demo_core::PlaybackEvent;
use mcp_authz_demo_core::PlaybackEventSink;
use mcp_authz_demo_core::ScriptKey;
use mcp_authz_demo_core::Tag;
use serde_json::Value;
use tempfile::TempDir;

use super::support::configured_engine;
use super::support::run_to_end;
use super::support::teller_lookup;
use crate::audit::AuditEventSink;
use crate::audit::AuditSink;
use crate::audit::FileAuditSink;
use crate::audit::PlaybackAuditEvent;
use crate::audit::audit_sink_from_config;

#[derive(Default)]
struct RecordingAuditSink {
    events: Mutex<Vec<PlaybackAuditEvent>>,
}

impl RecordingAuditSink {
    fn events(&self) -> Vec<PlaybackAuditEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &PlaybackAuditEvent) {
        self.events.lock().expect("events lock").push(event.clone());
    }
}

#[test]
fn natural_playback_is_audited_in_order() {
    let recorder = Arc::new(RecordingAuditSink::default());
    let key = teller_lookup(OutputMode::Readable);
    let sink = AuditEventSink::new(recorder.clone(), key);
    let mut engine = configured_engine(teller_lookup(OutputMode::Readable), sink);
    run_to_end(&mut engine);

    let events = recorder.events();
    let kinds: Vec<&str> = events.iter().map(|event| event.kind).collect();
    assert_eq!(kinds.first(), Some(&"started"));
    assert_eq!(kinds.last(), Some(&"completed"));
    let gates: Vec<u8> =
        events.iter().filter(|event| event.kind == "gate_started").filter_map(|event| event.stage).collect();
    assert_eq!(gates, vec![1, 2, 3]);
    assert!(
        events.iter().any(|event| event.tag == Some(Tag::Mask) && event.stage == Some(3)),
        "masking decision should be audited"
    );
    assert!(events.iter().all(|event| event.event == "playback"));
    assert!(events.iter().all(|event| event.role.as_str() == "teller"));
    assert!(events.iter().all(|event| event.scenario.as_str() == "account_lookup"));
}

#[test]
fn skip_audits_only_start_and_completion() {
    let recorder = Arc::new(RecordingAuditSink::default());
    let key = ScriptKey::new("teller", "cross_branch", OutputMode::Raw);
    let sink = AuditEventSink::new(recorder.clone(), key.clone());
    let mut engine = configured_engine(key, sink);
    engine.quick_run().expect("quick run");

    let kinds: Vec<&str> = recorder.events().iter().map(|event| event.kind).collect();
    assert_eq!(kinds, vec!["started", "completed"]);
    assert!(recorder.events().iter().all(|event| event.mode == OutputMode::Raw));
}

#[test]
fn reconfigured_engine_stamps_new_selection() {
    let recorder = Arc::new(RecordingAuditSink::default());
    let first = teller_lookup(OutputMode::Readable);
    let sink = AuditEventSink::new(recorder.clone(), first.clone());
    let mut engine = configured_engine(first, sink);
    engine.quick_run().expect("first quick run");

    let second = ScriptKey::new("branch_manager", "loan_status", OutputMode::Raw);
    assert!(engine.configure(second));
    engine.quick_run().expect("second quick run");

    let events = recorder.events();
    let stamped: Vec<(&str, &str, &str)> = events
        .iter()
        .map(|event| (event.kind, event.role.as_str(), event.scenario.as_str()))
        .collect();
    assert_eq!(
        stamped,
        vec![
            ("started", "teller", "account_lookup"),
            ("completed", "teller", "account_lookup"),
            ("reset", "teller", "account_lookup"),
            ("started", "branch_manager", "loan_status"),
            ("completed", "branch_manager", "loan_status"),
        ]
    );
    assert_eq!(events.last().map(|event| event.mode), Some(OutputMode::Raw));
}

#[test]
fn file_sink_appends_json_lines() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("audit.jsonl");
    let key = teller_lookup(OutputMode::Readable);
    {
        let file = Arc::new(FileAuditSink::new(&path).expect("open audit file"));
        let sink = AuditEventSink::new(file, key);
        sink.record(&PlaybackEvent::Started);
        sink.record(&PlaybackEvent::TagRevealed {
            tag: Tag::Deny,
            stage: Some(2),
        });
    }

    let content = fs::read_to_string(&path).expect("read audit file");
    let lines: Vec<Value> =
        content.lines().map(|line| serde_json::from_str(line).expect("json line")).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["kind"], "started");
    assert_eq!(lines[0]["tag"], Value::Null);
    assert_eq!(lines[1]["kind"], "tag_revealed");
    assert_eq!(lines[1]["tag"], "DENY");
    assert_eq!(lines[1]["stage"], 2);
    assert_eq!(lines[1]["role"], "teller");
    assert_eq!(lines[1]["mode"], "readable");
    assert!(lines[1]["timestamp_ms"].is_u64());
}

#[test]
fn sink_selection_follows_config() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("selected.jsonl");
    let config = AuditConfig {
        sink: AuditSinkKind::File,
        path: Some(path.to_string_lossy().into_owned()),
    };
    let sink = audit_sink_from_config(&config).expect("file sink");
    sink.record(&PlaybackAuditEvent::new(&teller_lookup(OutputMode::Raw), &PlaybackEvent::Reset));
    assert!(fs::read_to_string(&path).expect("read").contains("\"kind\":\"reset\""));

    let missing = AuditConfig {
        sink: AuditSinkKind::File,
        path: None,
    };
    assert!(audit_sink_from_config(&missing).is_err());
    assert!(audit_sink_from_config(&AuditConfig::default()).is_ok());
}
