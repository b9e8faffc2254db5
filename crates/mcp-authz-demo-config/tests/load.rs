//! File loading tests for mcp-authz-demo-config.
// crates/mcp-authz-demo-config/tests/load.rs
// =============================================================================
// Module: Config Loading Tests
// Description: Validate reading config files from disk.
// Purpose: Ensure size, encoding, and existence rules fail closed.
// =============================================================================

#![allow(clippy::use_debug, reason = "Test-only diagnostics may use debug formatting.")]

use std::fs;

use mcp_authz_demo_config::AuditSinkKind;
use mcp_authz_demo_config::ConfigError;
use mcp_authz_demo_config::DemoConfig;
use tempfile::TempDir;

mod common;

use common::TestResult;

#[test]
fn explicit_file_loads_and_records_source() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("demo.toml");
    fs::write(
        &path,
        "[sound]\ndefault_enabled = true\n\n[audit]\nsink = \"stderr\"\n",
    )
    .map_err(|err| err.to_string())?;

    let config = DemoConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if !config.sound.default_enabled {
        return Err("sound.default_enabled should be true".to_string());
    }
    if config.audit.sink != AuditSinkKind::Stderr {
        return Err("audit.sink should be stderr".to_string());
    }
    if config.source.as_deref() != Some(path.as_path()) {
        return Err("source path should be recorded".to_string());
    }
    Ok(())
}

#[test]
fn explicit_missing_file_is_an_error() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    match DemoConfig::load(Some(&path)) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn oversized_file_rejected() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("big.toml");
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    fs::write(&path, padding).map_err(|err| err.to_string())?;
    match DemoConfig::load_file(&path) {
        Err(ConfigError::Invalid(message)) if message.contains("size limit") => Ok(()),
        other => Err(format!("expected size limit error, got {other:?}")),
    }
}

#[test]
fn non_utf8_file_rejected() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("bad.toml");
    fs::write(&path, [0xff, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    match DemoConfig::load_file(&path) {
        Err(ConfigError::Invalid(message)) if message.contains("utf-8") => Ok(()),
        other => Err(format!("expected utf-8 error, got {other:?}")),
    }
}

#[test]
fn malformed_toml_is_a_parse_error() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[playback\nchar_delay_ms = ").map_err(|err| err.to_string())?;
    match DemoConfig::load_file(&path) {
        Err(ConfigError::Parse(_)) => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn invalid_values_fail_on_load() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("invalid.toml");
    fs::write(&path, "[playback]\nblank_pause_ms = 20000\n").map_err(|err| err.to_string())?;
    match DemoConfig::load_file(&path) {
        Err(ConfigError::Invalid(message)) if message.contains("blank_pause_ms") => Ok(()),
        other => Err(format!("expected invalid error, got {other:?}")),
    }
}
