// crates/mcp-authz-demo-config/src/config.rs
// ============================================================================
// Module: Demo Configuration
// Description: Configuration loading and validation for the demo CLI.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: mcp-authz-demo-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicit path (CLI flag or environment variable) must exist; only the
//! implicit default file may be absent, in which case defaults apply. Every
//! loaded config is validated before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use mcp_authz_demo_core::OutputMode;
use mcp_authz_demo_core::PlaybackTiming;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "mcp-authz-demo.toml";
/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "MCP_AUTHZ_DEMO_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for any playback delay in milliseconds.
pub(crate) const MAX_DELAY_MS: u64 = 10_000;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Complete demo configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Playback delays.
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Output defaults.
    #[serde(default)]
    pub output: OutputConfig,
    /// Sound defaults.
    #[serde(default)]
    pub sound: SoundConfig,
    /// Audit event routing.
    #[serde(default)]
    pub audit: AuditConfig,
    /// File the config was loaded from (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl DemoConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// Resolution order: `path`, then [`CONFIG_ENV_VAR`], then
    /// [`DEFAULT_CONFIG_NAME`] in the working directory. Only the last may be
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        if !explicit && !resolved.exists() {
            let mut config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        Self::load_file(&resolved)
    }

    /// Loads and validates one configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, too large, not
    /// UTF-8, malformed, or invalid.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.source = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.playback.validate()?;
        self.sound.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Playback
// ============================================================================

/// Playback delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Per-character delay on normal lines.
    #[serde(default = "default_char_delay_ms")]
    pub char_delay_ms: u64,
    /// Per-character delay on slow lines.
    #[serde(default = "default_slow_char_delay_ms")]
    pub slow_char_delay_ms: u64,
    /// Per-character delay inside highlights.
    #[serde(default = "default_highlight_char_delay_ms")]
    pub highlight_char_delay_ms: u64,
    /// Pause after each typed line.
    #[serde(default = "default_line_pause_ms")]
    pub line_pause_ms: u64,
    /// Pause on blank lines.
    #[serde(default = "default_blank_pause_ms")]
    pub blank_pause_ms: u64,
    /// Pause after PASS, DENY, MASK, and DONE.
    #[serde(default = "default_decisive_tag_pause_ms")]
    pub decisive_tag_pause_ms: u64,
    /// Pause after SKIP and INFO.
    #[serde(default = "default_info_tag_pause_ms")]
    pub info_tag_pause_ms: u64,
    /// Elapsed time before skipping is offered.
    #[serde(default = "default_skip_affordance_delay_ms")]
    pub skip_affordance_delay_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            char_delay_ms: default_char_delay_ms(),
            slow_char_delay_ms: default_slow_char_delay_ms(),
            highlight_char_delay_ms: default_highlight_char_delay_ms(),
            line_pause_ms: default_line_pause_ms(),
            blank_pause_ms: default_blank_pause_ms(),
            decisive_tag_pause_ms: default_decisive_tag_pause_ms(),
            info_tag_pause_ms: default_info_tag_pause_ms(),
            skip_affordance_delay_ms: default_skip_affordance_delay_ms(),
        }
    }
}

impl PlaybackConfig {
    /// Validates delay bounds and ordering.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a delay is out of range or the
    /// speed ordering is inverted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("playback.char_delay_ms", self.char_delay_ms),
            ("playback.slow_char_delay_ms", self.slow_char_delay_ms),
            ("playback.highlight_char_delay_ms", self.highlight_char_delay_ms),
            ("playback.line_pause_ms", self.line_pause_ms),
            ("playback.blank_pause_ms", self.blank_pause_ms),
            ("playback.decisive_tag_pause_ms", self.decisive_tag_pause_ms),
            ("playback.info_tag_pause_ms", self.info_tag_pause_ms),
            ("playback.skip_affordance_delay_ms", self.skip_affordance_delay_ms),
        ];
        for (field, value) in fields {
            if value > MAX_DELAY_MS {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be between 0 and {MAX_DELAY_MS}"
                )));
            }
        }
        if self.slow_char_delay_ms < self.char_delay_ms {
            return Err(ConfigError::Invalid(
                "playback.slow_char_delay_ms must be >= playback.char_delay_ms".to_string(),
            ));
        }
        if self.char_delay_ms < self.highlight_char_delay_ms {
            return Err(ConfigError::Invalid(
                "playback.char_delay_ms must be >= playback.highlight_char_delay_ms".to_string(),
            ));
        }
        if self.decisive_tag_pause_ms < self.info_tag_pause_ms {
            return Err(ConfigError::Invalid(
                "playback.decisive_tag_pause_ms must be >= playback.info_tag_pause_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Converts the delays into engine timing.
    #[must_use]
    pub const fn to_timing(&self) -> PlaybackTiming {
        PlaybackTiming {
            char_delay: Duration::from_millis(self.char_delay_ms),
            slow_char_delay: Duration::from_millis(self.slow_char_delay_ms),
            highlight_char_delay: Duration::from_millis(self.highlight_char_delay_ms),
            line_pause: Duration::from_millis(self.line_pause_ms),
            blank_pause: Duration::from_millis(self.blank_pause_ms),
            decisive_tag_pause: Duration::from_millis(self.decisive_tag_pause_ms),
            info_tag_pause: Duration::from_millis(self.info_tag_pause_ms),
            skip_affordance_delay: Duration::from_millis(self.skip_affordance_delay_ms),
        }
    }
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Output defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Mode used when `--mode` is not given.
    #[serde(default)]
    pub default_mode: OutputMode,
}

// ============================================================================
// SECTION: Sound
// ============================================================================

/// Sound defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Sound state when no preference is stored.
    #[serde(default)]
    pub default_enabled: bool,
    /// File holding the persisted preference.
    #[serde(default)]
    pub preference_path: Option<String>,
}

impl SoundConfig {
    /// Validates the preference path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the path is empty or too long.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.preference_path {
            validate_path_string("sound.preference_path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit event destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Drop audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
}

/// Audit event routing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Destination.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Target file for [`AuditSinkKind::File`].
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates sink and path pairing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a file sink has no usable path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required when audit.sink = \"file\"".to_string()))
            }
            (_, Some(path)) => validate_path_string("audit.path", path),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag reports whether it was given explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default per-character delay.
pub(crate) const fn default_char_delay_ms() -> u64 {
    18
}

/// Default slow per-character delay.
pub(crate) const fn default_slow_char_delay_ms() -> u64 {
    45
}

/// Default highlight per-character delay.
pub(crate) const fn default_highlight_char_delay_ms() -> u64 {
    8
}

/// Default pause after a line.
pub(crate) const fn default_line_pause_ms() -> u64 {
    220
}

/// Default pause on blank lines.
pub(crate) const fn default_blank_pause_ms() -> u64 {
    30
}

/// Default pause after decisive tags.
pub(crate) const fn default_decisive_tag_pause_ms() -> u64 {
    650
}

/// Default pause after informational tags.
pub(crate) const fn default_info_tag_pause_ms() -> u64 {
    250
}

/// Default skip affordance delay.
pub(crate) const fn default_skip_affordance_delay_ms() -> u64 {
    2_000
}
