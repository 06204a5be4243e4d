//! Virtual machine execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: the fetch-decode-execute state machine
//! - [`decoder`]: opcode and addressing-mode extraction from instruction words
//! - [`opcode`]: the closed instruction table
//! - [`errors`]: runtime error types
//! - [`disasm`]: listings of memory images for the CLI and the TUI
//!
//! # Execution Model
//!
//! The engine executes one instruction per [`engine::Engine::step`]. The only
//! suspension point is an Input instruction that finds the Input queue empty:
//! the program counter stays put, so the same instruction retries once the
//! host feeds a value.
//!
//! ```text
//! Running ──(input queue empty)──▶ AwaitingInput ──(feed_input)──▶ Running
//! Running ──(halt)──▶ Terminated
//! ```

pub mod constants;
pub mod decoder;
pub mod disasm;
pub mod engine;
pub mod errors;
pub mod opcode;
