// crates/mcp-authz-demo-cli/src/bell.rs
// ============================================================================
// Module: Terminal Bell Tones
// Description: Tone service backed by the terminal bell character.
// Purpose: Give playback audible cues without an audio stack.
// Dependencies: mcp-authz-demo-core
// ============================================================================

//! ## Overview
//! A terminal can only ring, so each [`Tone`] maps to a ring count. Bells go
//! to stderr to keep stdout byte-identical to the script text.

use std::io;
use std::io::Write;
use std::sync::Mutex;

use mcp_authz_demo_core::Tone;
use mcp_authz_demo_core::ToneError;
use mcp_authz_demo_core::ToneService;

/// ASCII BEL.
const BEL: u8 = 0x07;

/// Number of bells rung for a tone.
#[must_use]
pub const fn rings(tone: Tone) -> usize {
    match tone {
        Tone::GateStart | Tone::Pass | Tone::MaskBurst => 1,
        Tone::Deny | Tone::Chime => 2,
    }
}

/// Tone service writing BEL bytes to a terminal stream.
pub struct TerminalBell<W> {
    /// Output stream.
    out: Mutex<W>,
}

impl TerminalBell<io::Stderr> {
    /// Rings on stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> TerminalBell<W> {
    /// Wraps an output stream.
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the stream, consuming the bell.
    ///
    /// # Errors
    ///
    /// Returns [`ToneError::Unavailable`] when the stream lock was poisoned.
    pub fn into_inner(self) -> Result<W, ToneError> {
        self.out.into_inner().map_err(|err| ToneError::Unavailable(err.to_string()))
    }
}

impl<W: Write + Send> ToneService for TerminalBell<W> {
    fn play(&self, tone: Tone) -> Result<(), ToneError> {
        let mut out = self.out.lock().map_err(|err| ToneError::Unavailable(err.to_string()))?;
        let bytes = vec![BEL; rings(tone)];
        out.write_all(&bytes).map_err(|err| ToneError::Unavailable(err.to_string()))?;
        out.flush().map_err(|err| ToneError::Unavailable(err.to_string()))
    }
}
