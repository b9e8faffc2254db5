// crates/mcp-authz-demo-cli/src/tests/support.rs
// ============================================================================
// Module: CLI Test Support
// Description: Shared fixtures for CLI unit tests.
// Purpose: Build engines with instant timing over the built-in table.
// Dependencies: mcp-authz-demo-core
// ============================================================================

//! ## Overview
//! Fixtures shared by the CLI unit tests.

use std::sync::Arc;
use std::time::Duration;

use mcp_authz_demo_core::OutputMode;
use mcp_authz_demo_core::PlaybackEngine;
use mcp_authz_demo_core::PlaybackEventSink;
use mcp_authz_demo_core::PlaybackTiming;
use mcp_authz_demo_core::ScenarioTable;
use mcp_authz_demo_core::ScriptKey;

/// Timing with every delay set to zero.
pub const fn instant_timing() -> PlaybackTiming {
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

/// Key for the teller account lookup.
pub fn teller_lookup(mode: OutputMode) -> ScriptKey {
    ScriptKey::new("teller", "account_lookup", mode)
}

/// Engine configured for `key` with instant timing.
pub fn configured_engine<S: PlaybackEventSink>(key: ScriptKey, sink: S) -> PlaybackEngine<S> {
    let table = Arc::new(ScenarioTable::builtin());
    let mut engine = PlaybackEngine::new(table, instant_timing(), sink);
    assert!(engine.configure(key), "built-in selection should configure");
    engine
}

/// Fires every scheduled step until playback completes.
pub fn run_to_end<S: PlaybackEventSink>(engine: &mut PlaybackEngine<S>) {
    let mut next = engine.start().expect("start");
    while let Some(scheduled) = next {
        next = engine.fire(scheduled.token);
    }
}
