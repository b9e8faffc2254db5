// crates/mcp-authz-demo-core/src/runtime/playback.rs
// ============================================================================
// Module: Playback Engine
// Description: Deterministic, cancellable state machine revealing a script.
// Purpose: Drive typed-out narration with skip, quick run, reset, and replay.
// Dependencies: crate::{core, interfaces, runtime::compiler}, serde, thiserror
// ============================================================================

//! ## Overview
//! The engine owns no clock and no timers. Every transition that needs a delay
//! returns a [`Scheduled`] value holding a [`TimerToken`]; the host sleeps for
//! the delay and hands the token back through [`PlaybackEngine::fire`].
//!
//! At most one token is pending. Every cancelling transition bumps the
//! generation before mutating state, so a token issued earlier can never match
//! again and a late timer cannot apply a stale update.
//!
//! Elapsed time is logical: it advances by the delay of each fired token, which
//! is what the skip affordance is measured against.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::script::Line;
use crate::core::script::LineKind;
use crate::core::script::Script;
use crate::core::script::ScriptKey;
use crate::core::script::Tag;
use crate::core::table::ScenarioTable;
use crate::interfaces::PlaybackEvent;
use crate::interfaces::PlaybackEventSink;
use crate::runtime::compiler::compile;

// ============================================================================
// SECTION: Timing
// ============================================================================

/// Delays applied between reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackTiming {
    /// Per-character delay on normal lines.
    pub char_delay: Duration,
    /// Per-character delay on slow lines.
    pub slow_char_delay: Duration,
    /// Per-character delay inside a highlighted substring.
    pub highlight_char_delay: Duration,
    /// Pause after a fully typed line.
    pub line_pause: Duration,
    /// Pause on blank spacer lines.
    pub blank_pause: Duration,
    /// Pause after PASS, DENY, MASK, and DONE tags.
    pub decisive_tag_pause: Duration,
    /// Pause after SKIP and INFO tags.
    pub info_tag_pause: Duration,
    /// Elapsed time after start before skipping is offered.
    pub skip_affordance_delay: Duration,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            char_delay: Duration::from_millis(18),
            slow_char_delay: Duration::from_millis(45),
            highlight_char_delay: Duration::from_millis(8),
            line_pause: Duration::from_millis(220),
            blank_pause: Duration::from_millis(30),
            decisive_tag_pause: Duration::from_millis(650),
            info_tag_pause: Duration::from_millis(250),
            skip_affordance_delay: Duration::from_secs(2),
        }
    }
}

impl PlaybackTiming {
    /// Returns the delay before revealing character `index` of `line`.
    #[must_use]
    pub fn char_delay_for(&self, line: &Line, index: usize) -> Duration {
        if line.highlight_range().is_some_and(|range| range.contains(&index)) {
            self.highlight_char_delay
        } else if line.slow {
            self.slow_char_delay
        } else {
            self.char_delay
        }
    }

    /// Returns the pause after revealing `tag`.
    #[must_use]
    pub const fn tag_pause(&self, tag: Tag) -> Duration {
        if tag.is_decisive() { self.decisive_tag_pause } else { self.info_tag_pause }
    }
}

// ============================================================================
// SECTION: Timer Tokens
// ============================================================================

/// Identity of one scheduled delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken {
    /// Cancellation generation the token was issued in.
    generation: u64,
    /// Issue order within the engine.
    seq: u64,
}

impl TimerToken {
    /// Returns the cancellation generation.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }

    /// Returns the issue sequence number.
    #[must_use]
    pub const fn seq(self) -> u64 {
        self.seq
    }
}

/// Delay the host must wait before firing `token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduled {
    /// Token to hand back to [`PlaybackEngine::fire`].
    pub token: TimerToken,
    /// Delay before firing.
    pub delay: Duration,
}

// ============================================================================
// SECTION: Phases
// ============================================================================

/// Sub-state while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningState {
    /// Revealing characters of the current line.
    Typing,
    /// Waiting between lines.
    LinePause,
    /// Waiting after a revealed tag.
    TagPause,
}

/// Playback phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "state", rename_all = "snake_case")]
pub enum Phase {
    /// Initial state; nothing revealed.
    Idle,
    /// Auto-advancing.
    Running(RunningState),
    /// Whole script revealed.
    Complete,
}

impl Phase {
    /// Returns true while auto-advancing.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running(_))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Refused playback transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The selection has no script.
    #[error("no script is configured for the current selection")]
    NoScript,
    /// Playback is already running.
    #[error("playback is already running")]
    AlreadyRunning,
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Line revealed so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedLine {
    /// Line position in the script.
    pub index: usize,
    /// Line kind.
    pub kind: LineKind,
    /// Decision tag.
    pub tag: Option<Tag>,
    /// Gate number.
    pub stage: Option<u8>,
    /// Visible text.
    pub text: String,
    /// False while the line is still being typed.
    pub complete: bool,
}

impl RevealedLine {
    /// Builds a revealed line showing the first `chars` characters.
    fn from_line(index: usize, line: &Line, chars: usize) -> Self {
        Self {
            index,
            kind: line.kind,
            tag: line.tag,
            stage: line.stage,
            text: line.prefix(chars).to_string(),
            complete: chars >= line.char_count(),
        }
    }
}

/// Read-only view of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Current selection.
    pub key: Option<ScriptKey>,
    /// Current phase.
    pub phase: Phase,
    /// Lines revealed so far, in order.
    pub revealed_lines: Vec<RevealedLine>,
    /// True while characters are being typed.
    pub is_typing: bool,
    /// True once the whole script is revealed.
    pub is_complete: bool,
    /// True when the skip control should be offered.
    pub can_skip: bool,
    /// True after at least one start or quick run since configuration.
    pub has_run: bool,
    /// False when the selection has no script.
    pub script_available: bool,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Scripted playback state machine.
pub struct PlaybackEngine<S> {
    /// Outcome table scripts are compiled from.
    table: Arc<ScenarioTable>,
    /// Reveal delays.
    timing: PlaybackTiming,
    /// Event receiver.
    sink: S,
    /// Current selection.
    key: Option<ScriptKey>,
    /// Script for the current selection.
    script: Option<Script>,
    /// Current phase.
    phase: Phase,
    /// Current line, `None` before the first line.
    line_index: Option<usize>,
    /// Characters of the current line revealed.
    char_index: usize,
    /// Set by start and quick run; cleared by configure.
    has_run: bool,
    /// Logical time since start.
    elapsed: Duration,
    /// Cancellation generation.
    generation: u64,
    /// Last issued token sequence number.
    seq: u64,
    /// The single pending delay.
    pending: Option<Scheduled>,
}

impl<S: PlaybackEventSink> PlaybackEngine<S> {
    /// Creates an idle engine with no selection.
    #[must_use]
    pub const fn new(table: Arc<ScenarioTable>, timing: PlaybackTiming, sink: S) -> Self {
        Self {
            table,
            timing,
            sink,
            key: None,
            script: None,
            phase: Phase::Idle,
            line_index: None,
            char_index: 0,
            has_run: false,
            elapsed: Duration::ZERO,
            generation: 0,
            seq: 0,
            pending: None,
        }
    }

    /// Selects a (role, scenario, mode) triple, resetting any playback.
    ///
    /// Returns false when the selection has no script; the engine then stays
    /// idle in its empty state and refuses to start.
    pub fn configure(&mut self, key: ScriptKey) -> bool {
        if self.phase != Phase::Idle {
            self.reset();
        } else {
            self.cancel();
        }
        self.script = compile(&self.table, &key);
        self.sink.selection_changed(&key);
        self.key = Some(key);
        self.has_run = false;
        self.script.is_some()
    }

    /// Starts playback from the first line.
    ///
    /// Returns the first delay to wait on, or `None` for an empty script that
    /// completes immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::NoScript`] without a script and
    /// [`PlaybackError::AlreadyRunning`] while running.
    pub fn start(&mut self) -> Result<Option<Scheduled>, PlaybackError> {
        let Some(script) = &self.script else {
            return Err(PlaybackError::NoScript);
        };
        if self.phase.is_running() {
            return Err(PlaybackError::AlreadyRunning);
        }
        let empty = script.is_empty();
        self.cancel();
        self.line_index = None;
        self.char_index = 0;
        self.elapsed = Duration::ZERO;
        self.has_run = true;
        self.sink.record(&PlaybackEvent::Started);
        if empty {
            self.complete(false);
            return Ok(None);
        }
        self.phase = Phase::Running(RunningState::LinePause);
        Ok(Some(self.schedule(Duration::ZERO)))
    }

    /// Plays to the terminal state without animation.
    ///
    /// While already running this behaves like [`Self::skip`].
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::NoScript`] without a script.
    pub fn quick_run(&mut self) -> Result<(), PlaybackError> {
        if !self.phase.is_running() {
            self.start()?;
        }
        self.has_run = true;
        self.skip();
        Ok(())
    }

    /// Jumps from running to complete with every line revealed.
    ///
    /// Returns false (and does nothing) outside the running phase.
    pub fn skip(&mut self) -> bool {
        if !self.phase.is_running() {
            return false;
        }
        self.cancel();
        self.complete(true);
        true
    }

    /// Returns to idle, cancelling any pending delay and clearing reveals.
    pub fn reset(&mut self) {
        self.cancel();
        self.phase = Phase::Idle;
        self.line_index = None;
        self.char_index = 0;
        self.elapsed = Duration::ZERO;
        self.sink.record(&PlaybackEvent::Reset);
    }

    /// Applies a fired delay and returns the next one.
    ///
    /// Tokens other than the pending one are stale and ignored.
    pub fn fire(&mut self, token: TimerToken) -> Option<Scheduled> {
        let pending = self.pending.filter(|scheduled| scheduled.token == token)?;
        self.pending = None;
        self.elapsed = self.elapsed.saturating_add(pending.delay);
        match self.phase {
            Phase::Running(RunningState::Typing) => self.type_next(),
            Phase::Running(RunningState::LinePause | RunningState::TagPause) => self.advance(),
            Phase::Idle | Phase::Complete => None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the pending delay, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<Scheduled> {
        self.pending
    }

    /// Returns the current selection.
    #[must_use]
    pub const fn key(&self) -> Option<&ScriptKey> {
        self.key.as_ref()
    }

    /// Returns the compiled script for the current selection.
    #[must_use]
    pub const fn script(&self) -> Option<&Script> {
        self.script.as_ref()
    }

    /// Returns the reveal delays.
    #[must_use]
    pub const fn timing(&self) -> &PlaybackTiming {
        &self.timing
    }

    /// Returns the event sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns true once playback has been started since configuration.
    #[must_use]
    pub const fn has_run(&self) -> bool {
        self.has_run
    }

    /// Returns true when the skip control should be offered.
    #[must_use]
    pub fn can_skip(&self) -> bool {
        self.phase.is_running() && self.elapsed >= self.timing.skip_affordance_delay
    }

    /// Returns the lines revealed so far.
    #[must_use]
    pub fn revealed_lines(&self) -> Vec<RevealedLine> {
        let Some(script) = &self.script else {
            return Vec::new();
        };
        let lines = &script.lines;
        match (self.phase, self.line_index) {
            (Phase::Idle, _) | (Phase::Running(_), None) => Vec::new(),
            (Phase::Complete, _) => lines
                .iter()
                .enumerate()
                .map(|(index, line)| RevealedLine::from_line(index, line, line.char_count()))
                .collect(),
            (Phase::Running(_), Some(current)) => {
                let mut revealed: Vec<RevealedLine> = lines
                    .iter()
                    .take(current)
                    .enumerate()
                    .map(|(index, line)| RevealedLine::from_line(index, line, line.char_count()))
                    .collect();
                if let Some(line) = lines.get(current) {
                    revealed.push(RevealedLine::from_line(current, line, self.char_index));
                }
                revealed
            }
        }
    }

    /// Returns a read-only snapshot.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            key: self.key.clone(),
            phase: self.phase,
            revealed_lines: self.revealed_lines(),
            is_typing: self.phase == Phase::Running(RunningState::Typing),
            is_complete: self.phase == Phase::Complete,
            can_skip: self.can_skip(),
            has_run: self.has_run,
            script_available: self.script.is_some(),
        }
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Invalidates every issued token.
    fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
    }

    /// Issues the single pending token.
    fn schedule(&mut self, delay: Duration) -> Scheduled {
        self.seq = self.seq.wrapping_add(1);
        let scheduled = Scheduled {
            token: TimerToken {
                generation: self.generation,
                seq: self.seq,
            },
            delay,
        };
        self.pending = Some(scheduled);
        scheduled
    }

    /// Reveals one more character of the current line.
    fn type_next(&mut self) -> Option<Scheduled> {
        let line = self.current_line()?;
        let count = line.char_count();
        let next = self.char_index.saturating_add(1).min(count);
        let delay = self.timing.char_delay_for(line, next);
        self.char_index = next;
        if next >= count {
            self.phase = Phase::Running(RunningState::LinePause);
            return Some(self.schedule(self.timing.line_pause));
        }
        Some(self.schedule(delay))
    }

    /// Moves to the next line, or completes after the last one.
    fn advance(&mut self) -> Option<Scheduled> {
        let next = self.line_index.map_or(0, |index| index.saturating_add(1));
        let len = self.script.as_ref().map_or(0, Script::len);
        if next >= len {
            self.complete(false);
            return None;
        }
        self.enter_line(next)
    }

    /// Starts revealing line `index`.
    fn enter_line(&mut self, index: usize) -> Option<Scheduled> {
        self.line_index = Some(index);
        self.char_index = 0;
        let script = self.script.as_ref()?;
        let line = script.lines.get(index)?;

        if line.kind == LineKind::GateStart
            && let Some(stage) = line.stage
        {
            self.sink.record(&PlaybackEvent::GateStarted {
                stage,
            });
        }

        if line.is_blank() {
            self.phase = Phase::Running(RunningState::LinePause);
            return Some(self.schedule(self.timing.blank_pause));
        }

        if line.is_tag_only()
            && let Some(tag) = line.tag
        {
            let stage = line.stage;
            self.char_index = line.char_count();
            self.phase = Phase::Running(RunningState::TagPause);
            self.sink.record(&PlaybackEvent::TagRevealed {
                tag,
                stage,
            });
            return Some(self.schedule(self.timing.tag_pause(tag)));
        }

        if line.char_count() == 0 {
            self.phase = Phase::Running(RunningState::LinePause);
            return Some(self.schedule(self.timing.line_pause));
        }

        let delay = self.timing.char_delay_for(line, 0);
        self.phase = Phase::Running(RunningState::Typing);
        Some(self.schedule(delay))
    }

    /// Enters the terminal state with every line revealed.
    fn complete(&mut self, skipped: bool) {
        self.pending = None;
        self.phase = Phase::Complete;
        self.line_index = Some(self.script.as_ref().map_or(0, Script::len));
        self.char_index = 0;
        self.sink.record(&PlaybackEvent::Completed {
            skipped,
        });
    }

    /// Returns the line being revealed.
    fn current_line(&self) -> Option<&Line> {
        self.script.as_ref()?.lines.get(self.line_index?)
    }
}
