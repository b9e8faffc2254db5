//! Config defaults and core validation tests for mcp-authz-demo-config.
// crates/mcp-authz-demo-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults and Core Validation Tests
// Description: Validate default behavior and cross-field invariants.
// Purpose: Ensure an empty config is valid and bad values fail closed.
// =============================================================================

#![allow(clippy::use_debug, reason = "Test-only diagnostics may use debug formatting.")]

use std::time::Duration;

use mcp_authz_demo_config::AuditSinkKind;
use mcp_authz_demo_core::OutputMode;
use mcp_authz_demo_core::PlaybackTiming;

mod common;

use common::TestResult;
use common::assert_invalid;

#[test]
fn default_config_validates() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn defaults_match_engine_defaults() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    if config.playback.to_timing() != PlaybackTiming::default() {
        return Err("default playback config should map to default engine timing".to_string());
    }
    if config.output.default_mode != OutputMode::Readable {
        return Err("output.default_mode should default to readable".to_string());
    }
    if config.sound.default_enabled {
        return Err("sound.default_enabled should default to false".to_string());
    }
    if config.audit.sink != AuditSinkKind::None {
        return Err("audit.sink should default to none".to_string());
    }
    Ok(())
}

#[test]
fn playback_overrides_convert_to_timing() -> TestResult {
    let config = common::config_from_toml(
        r#"
        [playback]
        char_delay_ms = 5
        slow_char_delay_ms = 10
        highlight_char_delay_ms = 1
        skip_affordance_delay_ms = 0

        [output]
        default_mode = "raw"
        "#,
    )
    .map_err(|err| err.to_string())?;
    let timing = config.playback.to_timing();
    if timing.char_delay != Duration::from_millis(5)
        || timing.slow_char_delay != Duration::from_millis(10)
        || timing.highlight_char_delay != Duration::from_millis(1)
        || timing.skip_affordance_delay != Duration::ZERO
    {
        return Err(format!("unexpected timing {timing:?}"));
    }
    if timing.line_pause != Duration::from_millis(220) {
        return Err("unset fields should keep defaults".to_string());
    }
    if config.output.default_mode != OutputMode::Raw {
        return Err("output.default_mode should parse raw".to_string());
    }
    Ok(())
}

#[test]
fn delay_above_limit_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.playback.line_pause_ms = 10_001;
    assert_invalid(config.validate(), "playback.line_pause_ms must be between 0 and 10000")
}

#[test]
fn slow_delay_below_normal_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.playback.slow_char_delay_ms = 10;
    assert_invalid(config.validate(), "slow_char_delay_ms must be >= playback.char_delay_ms")
}

#[test]
fn highlight_delay_above_normal_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.playback.highlight_char_delay_ms = 30;
    assert_invalid(config.validate(), "char_delay_ms must be >= playback.highlight_char_delay_ms")
}

#[test]
fn info_pause_above_decisive_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.playback.info_tag_pause_ms = 900;
    assert_invalid(config.validate(), "decisive_tag_pause_ms must be >= playback.info_tag_pause_ms")
}

#[test]
fn file_audit_sink_requires_path() -> TestResult {
    let mut config = common::config_from_toml("[audit]\nsink = \"file\"\n").map_err(|err| err.to_string())?;
    assert_invalid(config.validate(), "audit.path is required")?;
    config.audit.path = Some("audit.jsonl".to_string());
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn blank_paths_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.sound.preference_path = Some("   ".to_string());
    assert_invalid(config.validate(), "sound.preference_path must be non-empty")?;

    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.audit.path = Some(String::new());
    assert_invalid(config.validate(), "audit.path must be non-empty")
}

#[test]
fn overlong_path_component_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.sound.preference_path = Some(format!("prefs/{}", "a".repeat(300)));
    assert_invalid(config.validate(), "sound.preference_path path component too long")
}

#[test]
fn unknown_output_mode_fails_to_parse() -> TestResult {
    match common::config_from_toml("[output]\ndefault_mode = \"verbose\"\n") {
        Ok(_) => Err("unknown output mode should not parse".to_string()),
        Err(_) => Ok(()),
    }
}
