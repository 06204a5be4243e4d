//! Time-travel debugging over a single engine
//!
//! A [`Debugger`] records a [`Snapshot`] after every executed instruction and
//! every value the user feeds in. Stepping backward restores an earlier
//! snapshot; stepping forward replays recorded history first and only
//! executes new instructions once the cursor is back at the head.
//!
//! Input can only be provided at the head of history, while the live engine
//! is waiting for it. History is therefore never rewritten.

use crate::interpreter::engine::{Engine, RunState};
use crate::interpreter::errors::EngineError;
use crate::memory::{Address, Word};
use crate::snapshot::{Snapshot, SnapshotError, SnapshotManager};
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

/// Why a debugger operation could not be performed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebuggerError {
    #[error("already at the beginning of execution")]
    AtStart,

    #[error("program has terminated")]
    Finished,

    #[error("program is waiting for input")]
    AwaitingInput,

    #[error("input can only be provided while the program waits for it")]
    NotAwaitingInput,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// How a forward step was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved to a snapshot already in history
    Replayed,
    /// Executed a new instruction and recorded it
    Executed(RunState),
}

/// Engine plus navigable execution history
#[derive(Debug)]
pub struct Debugger {
    /// Engine state at the cursor
    engine: Engine,

    /// Every output value up to the cursor
    transcript: Vec<Word>,

    history: SnapshotManager,

    /// Cursor into history
    position: usize,

    /// Error raised by the most recent attempt to execute past the head
    last_error: Option<EngineError>,
}

impl Debugger {
    /// Start debugging `engine`, recording its initial state
    pub fn new(engine: Engine, snapshot_limit: usize) -> Result<Self, DebuggerError> {
        let mut history = SnapshotManager::new(snapshot_limit);
        history.push(Snapshot::new(engine.clone(), Vec::new()))?;

        Ok(Debugger {
            engine,
            transcript: Vec::new(),
            history,
            position: 0,
            last_error: None,
        })
    }

    /// Advance one step, replaying history when possible
    pub fn step_forward(&mut self) -> Result<StepOutcome, DebuggerError> {
        if self.position + 1 < self.history.len() {
            self.position += 1;
            self.restore(self.position);
            return Ok(StepOutcome::Replayed);
        }

        if self.engine.is_terminated() {
            return Err(DebuggerError::Finished);
        }
        if self.engine.is_awaiting_input() && self.engine.input().is_empty() {
            return Err(DebuggerError::AwaitingInput);
        }

        let mut next = self.engine.clone();
        let state = match next.step() {
            Ok(state) => state,
            Err(e) => {
                self.last_error = Some(e.clone());
                return Err(e.into());
            }
        };

        let mut transcript = self.transcript.clone();
        transcript.extend(next.drain_outputs());
        self.commit(next, transcript)?;

        Ok(StepOutcome::Executed(state))
    }

    /// Move one snapshot back
    pub fn step_backward(&mut self) -> Result<(), DebuggerError> {
        if self.position == 0 {
            return Err(DebuggerError::AtStart);
        }
        self.position -= 1;
        self.restore(self.position);
        Ok(())
    }

    /// Return to the initial state
    pub fn rewind_to_start(&mut self) {
        self.position = 0;
        self.restore(0);
    }

    /// Step forward until the engine suspends, terminates or fails
    ///
    /// Stops early once `max_steps` new instructions have run, if given.
    /// Returns how many snapshots the cursor moved.
    pub fn run_to_end(&mut self, max_steps: Option<u64>) -> Result<usize, DebuggerError> {
        let mut moved = 0;
        let mut executed = 0u64;

        loop {
            if max_steps.is_some_and(|max| executed >= max) {
                return Ok(moved);
            }

            match self.step_forward() {
                Ok(StepOutcome::Replayed) => moved += 1,
                Ok(StepOutcome::Executed(state)) => {
                    moved += 1;
                    executed += 1;
                    if state != RunState::Running {
                        return Ok(moved);
                    }
                }
                Err(DebuggerError::AwaitingInput | DebuggerError::Finished) => return Ok(moved),
                Err(e) => {
                    debug!(error = %e, moved, "run stopped");
                    return Err(e);
                }
            }
        }
    }

    /// Feed a value to the engine waiting at the head of history
    pub fn provide_input(&mut self, value: Word) -> Result<(), DebuggerError> {
        if !self.is_at_head() || !self.engine.is_awaiting_input() {
            return Err(DebuggerError::NotAwaitingInput);
        }

        let mut next = self.engine.clone();
        next.feed_input(value);
        self.commit(next, self.transcript.clone())
    }

    /// Record `engine` as the new head and move the cursor onto it
    fn commit(&mut self, engine: Engine, transcript: Vec<Word>) -> Result<(), DebuggerError> {
        self.history
            .push(Snapshot::new(engine.clone(), transcript.clone()))?;
        self.engine = engine;
        self.transcript = transcript;
        self.position = self.history.len() - 1;
        self.last_error = None;
        Ok(())
    }

    fn restore(&mut self, index: usize) {
        if let Some(snapshot) = self.history.get(index) {
            self.engine = snapshot.engine.clone();
            self.transcript = snapshot.transcript.clone();
        }
        self.last_error = None;
    }

    // ========== Getter methods for UI ==========

    /// Engine state at the cursor
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Output values produced up to the cursor
    pub fn transcript(&self) -> &[Word] {
        &self.transcript
    }

    /// Addresses changed by the step that led to the cursor
    pub fn changed_cells(&self) -> FxHashSet<Address> {
        match (
            self.position.checked_sub(1).and_then(|i| self.history.get(i)),
            self.history.get(self.position),
        ) {
            (Some(previous), Some(current)) => current.changed_cells(previous),
            _ => FxHashSet::default(),
        }
    }

    pub fn history_position(&self) -> usize {
        self.position
    }

    pub fn total_snapshots(&self) -> usize {
        self.history.len()
    }

    pub fn is_at_head(&self) -> bool {
        self.position + 1 == self.history.len()
    }

    /// Whether the user needs to type a value before execution can continue
    pub fn needs_input(&self) -> bool {
        self.is_at_head() && self.engine.is_awaiting_input() && self.engine.input().is_empty()
    }

    pub fn last_error(&self) -> Option<&EngineError> {
        self.last_error.as_ref()
    }

    pub fn history_memory_usage(&self) -> usize {
        self.history.memory_usage()
    }

    pub fn history_memory_limit(&self) -> usize {
        self.history.memory_limit()
    }
}
