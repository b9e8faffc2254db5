//! Async driver tests for mcp-authz-demo-cli.
// crates/mcp-authz-demo-cli/tests/driver.rs
// =============================================================================
// Module: Playback Driver Tests
// Description: Drive the engine on a real tokio runtime.
// Purpose: Ensure timers complete playback and interrupts skip to the end.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io;
use std::sync::Arc;
use std::time::Duration;

use mcp_authz_demo_cli::driver::drive;
use mcp_authz_demo_core::NoopEventSink;
use mcp_authz_demo_core::OutputMode;
use mcp_authz_demo_core::Phase;
use mcp_authz_demo_core::PlaybackEngine;
use mcp_authz_demo_core::PlaybackTiming;
use mcp_authz_demo_core::ScenarioTable;
use mcp_authz_demo_core::ScriptKey;

fn instant_timing() -> PlaybackTiming {
    PlaybackTiming {
        char_delay: Duration::ZERO,
        slow_char_delay: Duration::ZERO,
        highlight_char_delay: Duration::ZERO,
        line_pause: Duration::ZERO,
        blank_pause: Duration::ZERO,
        decisive_tag_pause: Duration::ZERO,
        info_tag_pause: Duration::ZERO,
        skip_affordance_delay: Duration::ZERO,
    }
}

fn engine(timing: PlaybackTiming) -> PlaybackEngine<NoopEventSink> {
    let table = Arc::new(ScenarioTable::builtin());
    let mut engine = PlaybackEngine::new(table, timing, NoopEventSink);
    assert!(engine.configure(ScriptKey::new("loan_officer", "approve_loan", OutputMode::Readable)));
    engine
}

#[tokio::test]
async fn timers_run_playback_to_completion() {
    let mut engine = engine(instant_timing());
    let first = engine.start().expect("start");
    let mut calls = 0_usize;
    let summary = drive(&mut engine, first, std::future::pending::<()>(), |_| {
        calls += 1;
        Ok(())
    })
    .await
    .expect("drive");

    assert!(!summary.interrupted);
    assert!(summary.fired > 0);
    assert_eq!(calls, summary.fired + 1);
    assert_eq!(engine.phase(), Phase::Complete);
    let script_len = engine.script().map_or(0, |script| script.len());
    assert_eq!(engine.revealed_lines().len(), script_len);
}

#[tokio::test]
async fn ready_interrupt_skips_before_any_timer() {
    let mut engine = engine(PlaybackTiming::default());
    let first = engine.start().expect("start");
    let summary = drive(&mut engine, first, async {}, |_| Ok(())).await.expect("drive");

    assert!(summary.interrupted);
    assert_eq!(summary.fired, 0);
    assert_eq!(engine.phase(), Phase::Complete);
    assert!(engine.pending().is_none());
    assert!(engine.revealed_lines().iter().all(|line| line.complete));
}

#[tokio::test]
async fn late_interrupt_skips_mid_playback() {
    let mut engine = engine(PlaybackTiming::default());
    let first = engine.start().expect("start");
    let interrupt = tokio::time::sleep(Duration::from_millis(5));
    let summary = drive(&mut engine, first, interrupt, |_| Ok(())).await.expect("drive");

    assert!(summary.interrupted);
    assert_eq!(engine.phase(), Phase::Complete);
    let script_len = engine.script().map_or(0, |script| script.len());
    assert_eq!(engine.revealed_lines().len(), script_len);
}

#[tokio::test]
async fn progress_errors_stop_the_driver() {
    let mut engine = engine(instant_timing());
    let first = engine.start().expect("start");
    let mut calls = 0_usize;
    let result = drive(&mut engine, first, std::future::pending::<()>(), |_| {
        calls += 1;
        if calls > 2 { Err(io::Error::other("closed")) } else { Ok(()) }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(calls, 3);
    assert!(engine.phase().is_running());
}
