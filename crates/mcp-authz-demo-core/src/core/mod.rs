// crates/mcp-authz-demo-core/src/core/mod.rs
// ============================================================================
// Module: Demo Core Types
// Description: Catalog, outcomes, scripts, and canonical hashing.
// Purpose: Provide the immutable data every playback is derived from.
// Dependencies: serde, serde_json, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Core types describe the static demo world and the scripts compiled from it.
//! Nothing in this module holds mutable state; the runtime module owns the
//! playback state machine.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod hashing;
pub mod identifiers;
pub mod masking;
pub mod outcome;
pub mod script;
pub mod table;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::Agent;
pub use catalog::Catalog;
pub use catalog::Clearance;
pub use catalog::Incident;
pub use catalog::McpServer;
pub use catalog::Permission;
pub use catalog::PermissionLimit;
pub use catalog::PermissionScope;
pub use catalog::Policy;
pub use catalog::Role;
pub use catalog::Severity;
pub use catalog::Tool;
pub use catalog::ToolRef;
pub use hashing::HashError;
pub use hashing::ScriptDigest;
pub use identifiers::IncidentId;
pub use identifiers::PolicyId;
pub use identifiers::RoleId;
pub use identifiers::ScenarioId;
pub use identifiers::ServerId;
pub use identifiers::ToolName;
pub use masking::SensitiveField;
pub use outcome::Denial;
pub use outcome::DiscoveryVerdict;
pub use outcome::ExecutionVerdict;
pub use outcome::FinalResult;
pub use outcome::MaskingVerdict;
pub use outcome::Outcome;
pub use outcome::OutcomeError;
pub use outcome::ResponsePayload;
pub use outcome::Scenario;
pub use outcome::ScenarioParams;
pub use script::Line;
pub use script::LineKind;
pub use script::OutputMode;
pub use script::Script;
pub use script::ScriptKey;
pub use script::Tag;
pub use script::UnknownOutputMode;
pub use table::ScenarioTable;
pub use table::TableError;
