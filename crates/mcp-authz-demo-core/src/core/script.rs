// crates/mcp-authz-demo-core/src/core/script.rs
// ============================================================================
// Module: Playback Scripts
// Description: Ordered display lines compiled from one outcome.
// Purpose: Define the renderable unit the playback engine reveals.
// Dependencies: crate::core::{hashing, identifiers, masking}, serde
// ============================================================================

//! ## Overview
//! A [`Script`] is fully determined by its [`ScriptKey`]. Lines carry a kind,
//! display text, an optional tag label and stage number, an optional
//! highlighted substring, and a typing-speed hint. Character positions are
//! counted in Unicode scalar values so partial reveals never split a code
//! point.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashError;
use crate::core::hashing::ScriptDigest;
use crate::core::hashing::digest_canonical_json;
use crate::core::identifiers::RoleId;
use crate::core::identifiers::ScenarioId;
use crate::core::masking::SensitiveField;

// ============================================================================
// SECTION: Output Mode
// ============================================================================

/// Presentation of a compiled script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Annotated narration with tags.
    #[default]
    Readable,
    /// One structured JSON record per pipeline event.
    Raw,
}

impl OutputMode {
    /// Returns the mode label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Readable => "readable",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown output mode label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown output mode: {0}")]
pub struct UnknownOutputMode(pub String);

impl FromStr for OutputMode {
    type Err = UnknownOutputMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "readable" => Ok(Self::Readable),
            "raw" => Ok(Self::Raw),
            other => Err(UnknownOutputMode(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Line Parts
// ============================================================================

/// Kind of a script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Request context.
    Context,
    /// Visual spacer.
    Blank,
    /// Start of a gate.
    GateStart,
    /// Gate decision.
    Decision,
    /// Supporting detail.
    Detail,
    /// Masked field.
    Mask,
    /// Denial reason.
    Deny,
    /// Response field delivered to the agent.
    Response,
    /// Final result.
    Result,
}

/// Short decision label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tag {
    /// Gate permitted.
    Pass,
    /// Gate denied.
    Deny,
    /// Fields masked.
    Mask,
    /// Gate not evaluated.
    Skip,
    /// Informational note.
    Info,
    /// Pipeline finished.
    Done,
}

impl Tag {
    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Deny => "DENY",
            Self::Mask => "MASK",
            Self::Skip => "SKIP",
            Self::Info => "INFO",
            Self::Done => "DONE",
        }
    }

    /// Returns true for tags followed by the longer post-tag pause.
    #[must_use]
    pub const fn is_decisive(self) -> bool {
        matches!(self, Self::Pass | Self::Deny | Self::Mask | Self::Done)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Masked value shown in place of a sensitive field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskTransform {
    /// Field that was masked.
    pub field: SensitiveField,
    /// Masked display value.
    pub masked: String,
}

// ============================================================================
// SECTION: Line
// ============================================================================

/// One renderable script line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Line kind.
    pub kind: LineKind,
    /// Display text.
    pub text: String,
    /// Optional decision label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
    /// Gate number (1-3) the line belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<u8>,
    /// Substring of `text` typed at the highlight speed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    /// Masked value carried by mask lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<MaskTransform>,
    /// Typed at the slow speed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub slow: bool,
}

impl Line {
    /// Creates an untagged line.
    #[must_use]
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            tag: None,
            stage: None,
            highlight: None,
            mask: None,
            slow: false,
        }
    }

    /// Creates a blank spacer line.
    #[must_use]
    pub fn blank() -> Self {
        Self::new(LineKind::Blank, "")
    }

    /// Attaches a tag.
    #[must_use]
    pub const fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Attaches a gate number.
    #[must_use]
    pub const fn with_stage(mut self, stage: u8) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Marks a substring as highlighted.
    #[must_use]
    pub fn with_highlight(mut self, highlight: impl Into<String>) -> Self {
        self.highlight = Some(highlight.into());
        self
    }

    /// Attaches a masked-value transform.
    #[must_use]
    pub fn with_mask(mut self, field: SensitiveField, masked: impl Into<String>) -> Self {
        self.mask = Some(MaskTransform {
            field,
            masked: masked.into(),
        });
        self
    }

    /// Marks the line as slow-typed.
    #[must_use]
    pub const fn slow(mut self) -> Self {
        self.slow = true;
        self
    }

    /// Returns true for blank spacer lines.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.kind == LineKind::Blank
    }

    /// Returns true for lines revealed atomically as a decision label.
    #[must_use]
    pub fn is_tag_only(&self) -> bool {
        self.tag.is_some() && matches!(self.kind, LineKind::Decision | LineKind::Result)
    }

    /// Returns the line length in characters.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns the visible prefix after `chars` characters.
    #[must_use]
    pub fn prefix(&self, chars: usize) -> &str {
        match self.text.char_indices().nth(chars) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }

    /// Returns the character range of the highlighted substring, if present.
    #[must_use]
    pub fn highlight_range(&self) -> Option<Range<usize>> {
        let highlight = self.highlight.as_deref().filter(|text| !text.is_empty())?;
        let byte = self.text.find(highlight)?;
        let start = self.text[..byte].chars().count();
        Some(start..start + highlight.chars().count())
    }
}

// ============================================================================
// SECTION: Script
// ============================================================================

/// Selection that fully determines a script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptKey {
    /// Selected role.
    pub role: RoleId,
    /// Selected scenario.
    pub scenario: ScenarioId,
    /// Selected output mode.
    pub mode: OutputMode,
}

impl ScriptKey {
    /// Creates a script key.
    #[must_use]
    pub fn new(role: impl Into<RoleId>, scenario: impl Into<ScenarioId>, mode: OutputMode) -> Self {
        Self {
            role: role.into(),
            scenario: scenario.into(),
            mode,
        }
    }
}

/// Compiled ordered line list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Selection the script was compiled for.
    pub key: ScriptKey,
    /// Lines in reveal order.
    pub lines: Vec<Line>,
}

impl Script {
    /// Returns the number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true when the script has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the `(tag, stage)` sequence in reveal order.
    #[must_use]
    pub fn tag_sequence(&self) -> Vec<(Tag, Option<u8>)> {
        self.lines.iter().filter_map(|line| line.tag.map(|tag| (tag, line.stage))).collect()
    }

    /// Returns the full text of every line, joined with newlines.
    #[must_use]
    pub fn full_text(&self) -> String {
        self.lines.iter().map(|line| line.text.as_str()).collect::<Vec<_>>().join("\n")
    }

    /// Computes the canonical digest of the script.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonicalization fails.
    pub fn digest(&self) -> Result<ScriptDigest, HashError> {
        digest_canonical_json(self)
    }
}
