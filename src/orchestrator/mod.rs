//! Multi-instance orchestration
//!
//! An [`Orchestrator`] wires several engines together so that each one's
//! Output becomes the next one's Input:
//!
//! ```text
//! Pipeline:      seed → [0] → [1] → ... → [n-1] → result
//! FeedbackRing:  seed → [0] → [1] → ... → [n-1] ─┐
//!                        ▲                        │
//!                        └────────────────────────┘
//! ```
//!
//! # Scheduling
//!
//! Engines are driven cooperatively on the calling thread, round-robin: an
//! engine only runs after every value its predecessor produced has been
//! forwarded to it, and it runs until it suspends or terminates. No two
//! engines ever execute at the same time, so the result is deterministic.
//!
//! The ring finishes when the last engine terminates. If a whole round passes
//! without any engine executing an instruction while the last engine is still
//! alive, the topology is stuck and [`OrchestratorError::Stalled`] is raised
//! instead of spinning forever.

use crate::interpreter::engine::{Engine, RunState};
use crate::interpreter::errors::EngineError;
use crate::memory::Word;
use thiserror::Error;
use tracing::{debug, warn};

/// How engine outputs are routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Instance `i` feeds instance `i + 1`; one pass
    Pipeline,
    /// As `Pipeline`, plus the last instance feeds the first until it terminates
    FeedbackRing,
}

/// Errors raised while driving a topology
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("no engines to run")]
    NoEngines,

    #[error("engine {index} failed: {source}")]
    Engine { index: usize, source: EngineError },

    #[error("no engine made progress in round {round}")]
    Stalled { round: usize },

    #[error("last engine produced no output")]
    NoOutput,
}

/// A fixed topology of engines
#[derive(Debug, Clone)]
pub struct Orchestrator {
    engines: Vec<Engine>,
    topology: Topology,

    /// Most recent value emitted by the last engine
    last_output: Option<Word>,

    /// Full round-robin passes completed
    rounds: usize,
}

impl Orchestrator {
    /// Load `program` into one engine per phase, seeding each with its phase
    pub fn new(program: &[Word], phases: &[Word], topology: Topology) -> Self {
        let engines = phases
            .iter()
            .map(|&phase| {
                let mut engine = Engine::new(program);
                engine.feed_input(phase);
                engine
            })
            .collect();
        Self::from_engines(engines, topology)
    }

    /// Wrap engines that have already been prepared
    pub fn from_engines(engines: Vec<Engine>, topology: Topology) -> Self {
        Orchestrator {
            engines,
            topology,
            last_output: None,
            rounds: 0,
        }
    }

    /// Feed `seed` to the first engine and drive the topology to its result
    ///
    /// The result is the final value the last engine emitted.
    pub fn run(&mut self, seed: Word) -> Result<Word, OrchestratorError> {
        if self.engines.is_empty() {
            return Err(OrchestratorError::NoEngines);
        }

        let last = self.engines.len() - 1;
        let mut carry = vec![seed];

        loop {
            let mut progressed = false;

            for (index, engine) in self.engines.iter_mut().enumerate() {
                engine.feed_inputs(carry.drain(..));

                let before = engine.steps();
                let state = engine
                    .run_to_suspension()
                    .map_err(|source| OrchestratorError::Engine { index, source })?;
                progressed |= engine.steps() != before;

                carry = engine.drain_outputs();
                if index == last {
                    if let Some(&value) = carry.last() {
                        self.last_output = Some(value);
                    }
                }

                debug!(
                    round = self.rounds,
                    index,
                    %state,
                    forwarded = carry.len(),
                    "engine suspended"
                );
            }

            self.rounds += 1;

            let finished = match self.topology {
                Topology::Pipeline => true,
                Topology::FeedbackRing => self.engines[last].state() == RunState::Terminated,
            };
            if finished {
                return self.last_output.ok_or(OrchestratorError::NoOutput);
            }

            if !progressed && carry.is_empty() {
                warn!(round = self.rounds, "feedback ring stalled");
                return Err(OrchestratorError::Stalled { round: self.rounds });
            }
        }
    }

    pub fn engines(&self) -> &[Engine] {
        &self.engines
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn last_output(&self) -> Option<Word> {
        self.last_output
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

/// Run `program` as a pipeline over `phases` and return the final signal
pub fn run_pipeline(program: &[Word], phases: &[Word], seed: Word) -> Result<Word, OrchestratorError> {
    Orchestrator::new(program, phases, Topology::Pipeline).run(seed)
}

/// Run `program` as a feedback ring over `phases` and return the final signal
pub fn run_feedback_ring(program: &[Word], phases: &[Word], seed: Word) -> Result<Word, OrchestratorError> {
    Orchestrator::new(program, phases, Topology::FeedbackRing).run(seed)
}
