// crates/mcp-authz-demo-cli/src/driver.rs
// ============================================================================
// Module: Async Playback Driver
// Description: Tokio timer loop for the synchronous playback engine.
// Purpose: Sleep on each scheduled delay and route interrupts to skip.
// Dependencies: mcp-authz-demo-core, tokio
// ============================================================================

//! ## Overview
//! The engine owns no timers. [`drive`] sleeps on the single pending delay,
//! fires its token, and reports progress after every step. An interrupt
//! future (Ctrl-C in the binary) races each sleep; when it wins, playback is
//! skipped to completion and the pending token is left to go stale.
//!
//! ## Invariants
//! - At most one sleep is outstanding at any time.
//! - The interrupt is polled before the timer so a ready interrupt always wins.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::io;

use mcp_authz_demo_core::PlaybackEngine;
use mcp_authz_demo_core::PlaybackEventSink;
use mcp_authz_demo_core::Scheduled;

// ============================================================================
// SECTION: Driver
// ============================================================================

/// Result of one driven playback.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DriveSummary {
    /// Number of timer tokens fired.
    pub fired: usize,
    /// True when the interrupt ended playback early.
    pub interrupted: bool,
}

/// Runs scheduled steps until playback stops scheduling.
///
/// `on_progress` runs once before the first sleep and after every step.
///
/// # Errors
///
/// Returns the first error raised by `on_progress`.
pub async fn drive<S, I, F>(
    engine: &mut PlaybackEngine<S>,
    first: Option<Scheduled>,
    interrupt: I,
    mut on_progress: F,
) -> io::Result<DriveSummary>
where
    S: PlaybackEventSink,
    I: Future<Output = ()>,
    F: FnMut(&PlaybackEngine<S>) -> io::Result<()>,
{
    let mut summary = DriveSummary::default();
    let mut next = first;
    tokio::pin!(interrupt);
    on_progress(engine)?;
    while let Some(scheduled) = next {
        tokio::select! {
            biased;
            () = &mut interrupt => {
                engine.skip();
                summary.interrupted = true;
                next = None;
            }
            () = tokio::time::sleep(scheduled.delay) => {
                next = engine.fire(scheduled.token);
                summary.fired += 1;
            }
        }
        on_progress(engine)?;
    }
    Ok(summary)
}

/// Resolves on Ctrl-C. Never resolves when the handler cannot be installed.
pub async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
