// crates/mcp-authz-demo-core/src/runtime/render.rs
// ============================================================================
// Module: Snapshot Rendering
// Description: Pure projection of a playback snapshot to display lines.
// Purpose: Keep presentation decisions out of the state machine.
// Dependencies: crate::core::script, crate::runtime::playback, serde
// ============================================================================

//! ## Overview
//! Only revealed lines are rendered; lines not yet reached are omitted rather
//! than shown as placeholders. Tag-only lines are prefixed with their label.

use std::fmt;

use serde::Serialize;

use crate::core::script::LineKind;
use crate::core::script::Tag;
use crate::runtime::playback::PlaybackSnapshot;
use crate::runtime::playback::RevealedLine;

/// One display line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedLine {
    /// Line kind, for styling.
    pub kind: LineKind,
    /// Gate number, for styling.
    pub stage: Option<u8>,
    /// Tag label, when the line carries one.
    pub tag: Option<Tag>,
    /// Display text including any tag prefix.
    pub text: String,
    /// True while the line is still being typed.
    pub partial: bool,
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Renders every revealed line of a snapshot.
#[must_use]
pub fn render(snapshot: &PlaybackSnapshot) -> Vec<RenderedLine> {
    snapshot.revealed_lines.iter().map(render_line).collect()
}

/// Renders one revealed line.
#[must_use]
pub fn render_line(line: &RevealedLine) -> RenderedLine {
    let text = match line.tag {
        Some(tag) if matches!(line.kind, LineKind::Decision | LineKind::Result) => {
            format!("[{tag}] {}", line.text)
        }
        _ => line.text.clone(),
    };
    RenderedLine {
        kind: line.kind,
        stage: line.stage,
        tag: line.tag,
        text,
        partial: !line.complete,
    }
}
