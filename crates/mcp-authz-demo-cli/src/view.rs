// crates/mcp-authz-demo-cli/src/view.rs
// ============================================================================
// Module: Terminal View
// Description: Incremental writer for rendered playback lines.
// Purpose: Append only newly revealed characters to a terminal stream.
// Dependencies: mcp-authz-demo-core
// ============================================================================

//! ## Overview
//! A terminal cannot redraw cheaply, so [`TerminalView`] remembers how much
//! of the rendered output it already wrote and emits only the suffix. This
//! relies on revealed text growing monotonically between resets.

use std::io;
use std::io::Write;

use mcp_authz_demo_core::RenderedLine;

/// Incremental terminal writer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TerminalView {
    /// Lines written in full, newline included.
    lines_done: usize,
    /// Characters already written of the line in progress.
    chars_written: usize,
}

impl TerminalView {
    /// Creates a view with nothing written.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the cursor sits at the start of a line.
    #[must_use]
    pub const fn at_line_start(&self) -> bool {
        self.chars_written == 0
    }

    /// Returns the number of lines written in full.
    #[must_use]
    pub const fn lines_done(&self) -> usize {
        self.lines_done
    }

    /// Writes whatever `lines` reveals beyond the previous call.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the stream rejects the write.
    pub fn update<W: Write>(&mut self, lines: &[RenderedLine], out: &mut W) -> io::Result<()> {
        for line in lines.iter().skip(self.lines_done) {
            let fresh: String = line.text.chars().skip(self.chars_written).collect();
            out.write_all(fresh.as_bytes())?;
            if line.partial {
                self.chars_written += fresh.chars().count();
                break;
            }
            writeln!(out)?;
            self.lines_done += 1;
            self.chars_written = 0;
        }
        out.flush()
    }
}
