// crates/mcp-authz-demo-cli/src/lib.rs
// ============================================================================
// Module: MCP Authorization Demo CLI Library
// Description: Shared helpers for the demo command-line interface.
// Purpose: Provide reusable components for the CLI binary and tests.
// Dependencies: mcp-authz-demo-core, mcp-authz-demo-config, serde, tokio
// ============================================================================

//! ## Overview
//! This library houses the terminal host for the playback engine: the
//! message catalog, JSON-line audit sinks, the terminal bell, the file
//! preference store, the incremental terminal view, and the async timer
//! driver. The binary entry point (`src/main.rs`) wires them together.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Playback audit events and sinks.
pub mod audit;
/// Terminal bell tone service.
pub mod bell;
/// Tokio driver for scheduled playback steps.
pub mod driver;
/// Internationalization helpers and message catalog.
pub mod i18n;
/// File-backed sound preference.
pub mod preferences;
/// Incremental terminal writer.
pub mod view;

#[cfg(test)]
mod tests;
