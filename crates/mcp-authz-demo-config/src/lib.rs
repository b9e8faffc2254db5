// crates/mcp-authz-demo-config/src/lib.rs
// ============================================================================
// Module: MCP Authorization Demo Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for mcp-authz-demo.toml semantics.
// Dependencies: mcp-authz-demo-core, serde, toml
// ============================================================================

//! ## Overview
//! `mcp-authz-demo-config` defines the configuration model for the demo CLI:
//! playback delays, output defaults, sound defaults, and audit routing. It
//! validates fail-closed and converts delays into engine timing.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
