// crates/mcp-authz-demo-core/src/runtime/mod.rs
// ============================================================================
// Module: Demo Runtime
// Description: Script compiler, playback engine, and host adapters.
// Purpose: Turn table outcomes into deterministic, interruptible playback.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules compile outcomes into scripts and drive them through the
//! playback state machine. Every front end goes through the same compiler and
//! engine so every view of an outcome stays consistent.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod compiler;
pub mod gates;
pub mod playback;
pub mod render;
pub mod store;
pub mod tones;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compiler::compile;
pub use compiler::compile_outcome;
pub use gates::DiscoveryReport;
pub use gates::ExecutionDecision;
pub use gates::MaskingReport;
pub use gates::evaluate_execution;
pub use gates::evaluate_response_masking;
pub use gates::evaluate_tool_discovery;
pub use gates::format_dollars;
pub use playback::Phase;
pub use playback::PlaybackEngine;
pub use playback::PlaybackError;
pub use playback::PlaybackSnapshot;
pub use playback::PlaybackTiming;
pub use playback::RevealedLine;
pub use playback::RunningState;
pub use playback::Scheduled;
pub use playback::TimerToken;
pub use render::RenderedLine;
pub use render::render;
pub use store::InMemoryPreferenceStore;
pub use store::resolve_sound_enabled;
pub use tones::FanoutEventSink;
pub use tones::ToneEventSink;
