// crates/mcp-authz-demo-core/src/lib.rs
// ============================================================================
// Module: MCP Authorization Demo Core Library
// Description: Public API surface for the demo playback core.
// Purpose: Expose the outcome table, script compiler, and playback engine.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The demo narrates how an authorization proxy filters, authorizes, and masks
//! MCP tool calls made by an AI agent. Every decision is a precomputed table
//! entry; this crate compiles those entries into scripts and replays them
//! deterministically through a cancellable, timer-token driven state machine.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::NoopEventSink;
pub use interfaces::NoopToneService;
pub use interfaces::PlaybackEvent;
pub use interfaces::PlaybackEventSink;
pub use interfaces::PreferenceError;
pub use interfaces::PreferenceStore;
pub use interfaces::Tone;
pub use interfaces::ToneError;
pub use interfaces::ToneService;
pub use runtime::DiscoveryReport;
pub use runtime::ExecutionDecision;
pub use runtime::FanoutEventSink;
pub use runtime::InMemoryPreferenceStore;
pub use runtime::MaskingReport;
pub use runtime::Phase;
pub use runtime::PlaybackEngine;
pub use runtime::PlaybackError;
pub use runtime::PlaybackSnapshot;
pub use runtime::PlaybackTiming;
pub use runtime::RenderedLine;
pub use runtime::RevealedLine;
pub use runtime::RunningState;
pub use runtime::Scheduled;
pub use runtime::TimerToken;
pub use runtime::ToneEventSink;
pub use runtime::compile;
pub use runtime::compile_outcome;
pub use runtime::evaluate_execution;
pub use runtime::evaluate_response_masking;
pub use runtime::evaluate_tool_discovery;
pub use runtime::format_dollars;
pub use runtime::render;
pub use runtime::resolve_sound_enabled;
