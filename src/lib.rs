//! # Introduction
//!
//! intty runs programs for a small integer-tape virtual machine: a program is a
//! sequence of signed integers, loaded into memory and executed by a
//! fetch-decode-execute loop with three addressing modes, growable memory and
//! queue-based input/output. Execution suspends whenever the program asks for
//! input that has not arrived yet, so a host can drive the machine
//! incrementally instead of run-to-completion.
//!
//! ## Execution pipeline
//!
//! ```text
//! Text → Program image → Engine ⇄ Host (feed input / drain output)
//!                          └→ Snapshots → Debugger → TUI
//! ```
//!
//! 1. [`program`]: parses comma-separated program text and applies patches.
//! 2. [`memory`]: the growable [`memory::tape::Memory`] and the FIFO
//!    [`memory::channel::Channel`]s used for I/O.
//! 3. [`interpreter`]: the decoder, the closed opcode table and the
//!    [`interpreter::engine::Engine`] state machine.
//! 4. [`orchestrator`]: several engines chained into a pipeline or a
//!    feedback ring, scheduled cooperatively.
//! 5. [`snapshot`] and [`debugger`]: execution history with a memory limit
//!    and time-travel stepping.
//! 6. [`config`]: limits resolved at startup and logging setup.
//! 7. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Instruction set
//!
//! Add, Mul, Input, Output, JumpIfTrue, JumpIfFalse, LessThan, Equals,
//! AdjustRelativeBase and Halt. Unknown opcodes are errors, never silent halts.

pub mod config;
pub mod debugger;
pub mod interpreter;
pub mod memory;
pub mod orchestrator;
pub mod program;
pub mod snapshot;
pub mod ui;
