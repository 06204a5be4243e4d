//! Instruction word decoding
//!
//! An instruction word packs an opcode and a stack of addressing modes:
//! ```text
//!   1002  →  modes "10", opcode 02
//!            param 1: mode 0 (position)
//!            param 2: mode 1 (immediate)
//!            param 3: mode 0 (missing digit defaults to position)
//! ```
//! The least significant mode digit belongs to the first parameter.
//!
//! Decoding is pure: nothing here touches memory. Operands are tagged with
//! their mode as a [`Param`] and turned into an [`Operand`] by [`Param::resolve`],
//! which is the only place addressing modes are interpreted.

use super::constants::{MAX_PARAMS, MODE_RADIX, OPCODE_RADIX};
use super::opcode::Opcode;
use crate::memory::Word;
use std::fmt;
use thiserror::Error;

/// Addressing mode of one parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Operand is an address
    #[default]
    Position,
    /// Operand is the value itself (read-only)
    Immediate,
    /// Operand is an offset from the relative base
    Relative,
}

impl Mode {
    pub fn from_digit(digit: Word) -> Option<Self> {
        match digit {
            0 => Some(Mode::Position),
            1 => Some(Mode::Immediate),
            2 => Some(Mode::Relative),
            _ => None,
        }
    }
}

/// Why an instruction word could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid opcode {0}")]
    InvalidOpcode(Word),
    #[error("invalid parameter mode {0}")]
    InvalidMode(Word),
}

/// Decode the addressing modes of the first `count` parameters of `word`
///
/// Digits past the end of the word default to [`Mode::Position`]; digits past
/// `count` are ignored.
pub fn decode_modes(word: Word, count: usize) -> Result<Vec<Mode>, DecodeError> {
    let mut digits = word / OPCODE_RADIX;
    let mut modes = Vec::with_capacity(count);

    for _ in 0..count {
        let digit = digits % MODE_RADIX;
        modes.push(Mode::from_digit(digit).ok_or(DecodeError::InvalidMode(digit))?);
        digits /= MODE_RADIX;
    }

    Ok(modes)
}

/// A decoded instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    modes: [Mode; MAX_PARAMS],
}

impl Instruction {
    pub fn decode(word: Word) -> Result<Self, DecodeError> {
        let code = word % OPCODE_RADIX;
        if word < 0 {
            return Err(DecodeError::InvalidOpcode(code));
        }
        let opcode = Opcode::from_code(code).ok_or(DecodeError::InvalidOpcode(code))?;

        let mut modes = [Mode::Position; MAX_PARAMS];
        for (slot, mode) in modes
            .iter_mut()
            .zip(decode_modes(word, opcode.param_count())?)
        {
            *slot = mode;
        }

        Ok(Instruction { opcode, modes })
    }

    /// Modes of this instruction's parameters (one per parameter)
    pub fn modes(&self) -> &[Mode] {
        &self.modes[..self.opcode.param_count()]
    }

    /// Mode of parameter `index`
    pub fn mode(&self, index: usize) -> Mode {
        self.modes[index]
    }

    /// Total width in words, including the instruction word itself
    pub fn width(&self) -> usize {
        self.opcode.param_count() + 1
    }
}

/// An operand tagged with its addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Position(Word),
    Immediate(Word),
    Relative(Word),
}

/// What a parameter refers to once the relative base is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// A literal value
    Value(Word),
    /// A memory address (not yet checked for sign)
    Address(Word),
}

impl Param {
    pub fn new(mode: Mode, operand: Word) -> Self {
        match mode {
            Mode::Position => Param::Position(operand),
            Mode::Immediate => Param::Immediate(operand),
            Mode::Relative => Param::Relative(operand),
        }
    }

    pub fn resolve(self, relative_base: Word) -> Operand {
        match self {
            Param::Position(addr) => Operand::Address(addr),
            Param::Immediate(value) => Operand::Value(value),
            Param::Relative(offset) => Operand::Address(relative_base.wrapping_add(offset)),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Position(addr) => write!(f, "[{}]", addr),
            Param::Immediate(value) => write!(f, "#{}", value),
            Param::Relative(offset) if *offset < 0 => write!(f, "rb[{}]", offset),
            Param::Relative(offset) => write!(f, "rb[+{}]", offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_modes_defaults_to_position() {
        assert_eq!(
            decode_modes(1002, 3).unwrap(),
            vec![Mode::Position, Mode::Immediate, Mode::Position]
        );
        assert_eq!(decode_modes(3, 1).unwrap(), vec![Mode::Position]);
    }

    #[test]
    fn test_decode_modes_relative() {
        assert_eq!(
            decode_modes(21101, 3).unwrap(),
            vec![Mode::Immediate, Mode::Immediate, Mode::Relative]
        );
        assert_eq!(decode_modes(204, 1).unwrap(), vec![Mode::Relative]);
    }

    #[test]
    fn test_decode_is_pure() {
        let first = decode_modes(1201, 3).unwrap();
        for _ in 0..10 {
            assert_eq!(decode_modes(1201, 3).unwrap(), first);
        }
        assert_eq!(Instruction::decode(1201), Instruction::decode(1201));
    }

    #[test]
    fn test_invalid_mode_digit() {
        assert_eq!(decode_modes(301, 3), Err(DecodeError::InvalidMode(3)));
        // Digits beyond the parameter count are not inspected
        assert!(Instruction::decode(90104).is_ok());
    }

    #[test]
    fn test_instruction_decode() {
        let instr = Instruction::decode(1105).unwrap();
        assert_eq!(instr.opcode, Opcode::JumpIfTrue);
        assert_eq!(instr.modes(), &[Mode::Immediate, Mode::Immediate]);
        assert_eq!(instr.width(), 3);

        let halt = Instruction::decode(99).unwrap();
        assert_eq!(halt.opcode, Opcode::Halt);
        assert!(halt.modes().is_empty());
    }

    #[test]
    fn test_unknown_opcode_is_rejected() {
        assert_eq!(Instruction::decode(0), Err(DecodeError::InvalidOpcode(0)));
        assert_eq!(Instruction::decode(42), Err(DecodeError::InvalidOpcode(42)));
        assert_eq!(Instruction::decode(-1), Err(DecodeError::InvalidOpcode(-1)));
    }

    #[test]
    fn test_param_resolution() {
        assert_eq!(Param::new(Mode::Position, 7).resolve(100), Operand::Address(7));
        assert_eq!(Param::new(Mode::Immediate, 7).resolve(100), Operand::Value(7));
        assert_eq!(Param::new(Mode::Relative, -3).resolve(100), Operand::Address(97));
    }

    #[test]
    fn test_param_display() {
        assert_eq!(Param::Position(9).to_string(), "[9]");
        assert_eq!(Param::Immediate(-4).to_string(), "#-4");
        assert_eq!(Param::Relative(-1).to_string(), "rb[-1]");
        assert_eq!(Param::Relative(2).to_string(), "rb[+2]");
    }
}
