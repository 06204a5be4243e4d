//! Runtime error types for the virtual machine
//!
//! This module defines [`EngineError`], which represents every way a single
//! [`step`](crate::interpreter::engine::Engine::step) can fail.
//!
//! An empty Input queue is *not* an error: it is the defined suspension point
//! and surfaces as [`RunState::AwaitingInput`](crate::interpreter::engine::RunState).
//!
//! A failed step never moves the program counter and never rolls back writes
//! made by earlier instructions, so the engine can be inspected afterwards.

use crate::interpreter::decoder::DecodeError;
use crate::memory::{Address, Word};
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Negative memory index (directly, via a jump, or via the relative base)
    #[error("negative memory address {address}{}", at_pc(.pc))]
    AddressError { address: Word, pc: Option<Address> },

    /// Opcode outside the instruction table
    #[error("invalid opcode {opcode} at pc {pc}")]
    InvalidOpcode { opcode: Word, pc: Address },

    /// Mode digit other than 0 (position), 1 (immediate) or 2 (relative)
    #[error("invalid parameter mode {mode} at pc {pc}")]
    InvalidMode { mode: Word, pc: Address },

    /// Write destination encoded in immediate mode
    #[error("write target in immediate mode at pc {pc}")]
    ImmediateWrite { pc: Address },

    /// Growing the tape would pass its ceiling
    #[error(
        "memory limit exceeded: address {address} is beyond the limit of {limit} cells{}",
        at_pc(.pc)
    )]
    MemoryLimitExceeded {
        address: Address,
        limit: usize,
        pc: Option<Address>,
    },
}

fn at_pc(pc: &Option<Address>) -> String {
    match pc {
        Some(pc) => format!(" at pc {}", pc),
        None => String::new(),
    }
}

impl EngineError {
    /// Program counter of the faulting instruction, where known
    pub fn pc(&self) -> Option<Address> {
        match self {
            EngineError::AddressError { pc, .. } => *pc,
            EngineError::InvalidOpcode { pc, .. } => Some(*pc),
            EngineError::InvalidMode { pc, .. } => Some(*pc),
            EngineError::ImmediateWrite { pc } => Some(*pc),
            EngineError::MemoryLimitExceeded { pc, .. } => *pc,
        }
    }

    /// Attach the faulting program counter to an error raised by memory
    ///
    /// A program counter that is already set is kept.
    pub fn at(self, pc: Address) -> Self {
        match self {
            EngineError::AddressError { address, pc: None } => EngineError::AddressError {
                address,
                pc: Some(pc),
            },
            EngineError::MemoryLimitExceeded {
                address,
                limit,
                pc: None,
            } => EngineError::MemoryLimitExceeded {
                address,
                limit,
                pc: Some(pc),
            },
            other => other,
        }
    }

    pub(crate) fn from_decode(error: DecodeError, pc: Address) -> Self {
        match error {
            DecodeError::InvalidOpcode(opcode) => EngineError::InvalidOpcode { opcode, pc },
            DecodeError::InvalidMode(mode) => EngineError::InvalidMode { mode, pc },
        }
    }
}
