// crates/mcp-authz-demo-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for future localization support.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The demo CLI stores user-facing strings in a small translation catalog to
//! enforce consistent messaging. All runtime output other than script text
//! should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself to avoid panics.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"role"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries loaded into the message bundle.
const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "mcp-authz-demo {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("config.validate.source", "Source: {path}"),
    ("config.validate.defaults", "Source: built-in defaults"),
    ("selection.unknown_role", "Unknown role {role}. Run `roles` to list roles."),
    (
        "selection.unknown_scenario",
        "Unknown scenario {scenario}. Run `scenarios` to list scenarios.",
    ),
    ("selection.no_script", "No script is available for {role} / {scenario}."),
    ("roles.line", "{id}  {name} ({branch}, {clearance})  tools {visible}/{total} visible"),
    ("scenarios.line", "{id}  {name}: {query}"),
    ("scenarios.outcome.success", "  {role}: success"),
    ("scenarios.outcome.denied", "  {role}: denied at gate {gate}"),
    ("incidents.line", "{id}  {name} ({company}, {date}, {severity}) -> gate {gate}"),
    ("incidents.cve", "  CVE: {cve}"),
    ("incidents.without", "  Without proxy: {text}"),
    ("incidents.with", "  With proxy: {text}"),
    ("outcome.serialize_failed", "Failed to serialize outcome: {error}"),
    ("script.digest", "digest: {digest}"),
    ("script.digest_failed", "Failed to hash script: {error}"),
    ("play.header", "{role} / {scenario} ({mode})"),
    ("play.skip_hint", "Press Ctrl-C to skip to the end."),
    ("play.skipped", "Skipped to the end."),
    ("play.start_failed", "Failed to start playback: {error}"),
    ("audit.open_failed", "Failed to open audit log at {path}: {error}"),
    ("sound.status", "Sound: {state} ({source})"),
    ("sound.state.on", "on"),
    ("sound.state.off", "off"),
    ("sound.source.stored", "stored at {path}"),
    ("sound.source.default", "default"),
    ("sound.saved", "Sound {state}."),
    ("sound.save_failed", "Failed to save sound preference: {error}"),
    ("sound.load_failed", "Failed to load sound preference: {error}"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the English catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns true when `key` exists in the catalog.
#[must_use]
pub fn has_key(key: &str) -> bool {
    catalog().contains_key(key)
}

/// Returns the static English catalog used by the CLI.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A localized [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
