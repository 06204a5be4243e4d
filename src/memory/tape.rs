//! Growable tape storage
//!
//! [`Memory`] is the single owner of an engine's code and data. It provides:
//! - Zero-filled growth on any read or write past the current end
//! - Rejection of negative addresses
//! - An optional ceiling on growth, so a stray write to address `10^12`
//!   fails instead of exhausting the host
//!
//! Growth is monotonic: the tape never shrinks.

use super::{to_address, Address, Word};
use crate::interpreter::constants::DEFAULT_MEMORY_LIMIT;
use crate::interpreter::errors::EngineError;

/// The tape
///
/// Any non-negative address is valid and grows the tape, up to `limit` cells.
/// The limit is a host safeguard, not part of the machine: a program that
/// legitimately touches address 70 000 000 fails with
/// [`EngineError::MemoryLimitExceeded`] under the default of
/// [`DEFAULT_MEMORY_LIMIT`] cells, and needs a larger ceiling (`--memory-limit`
/// or `INTTY_MEMORY_LIMIT`; `usize::MAX` makes growth unbounded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<Word>,
    limit: usize,
}

impl Memory {
    /// Create a tape initialized with `program`, using the default growth ceiling
    pub fn new(program: &[Word]) -> Self {
        Self::with_limit(program, DEFAULT_MEMORY_LIMIT)
    }

    /// Create a tape with an explicit ceiling (in cells)
    ///
    /// The initial program is always accepted, even if it is longer than
    /// `limit`; the ceiling only applies to growth.
    pub fn with_limit(program: &[Word], limit: usize) -> Self {
        Memory {
            cells: program.to_vec(),
            limit,
        }
    }

    /// Read the word at `address`, growing the tape first if needed
    pub fn read(&mut self, address: Word) -> Result<Word, EngineError> {
        let index = self.ensure(address)?;
        Ok(self.cells[index])
    }

    /// Write `value` at `address`, growing the tape first if needed
    pub fn write(&mut self, address: Word, value: Word) -> Result<(), EngineError> {
        let index = self.ensure(address)?;
        self.cells[index] = value;
        Ok(())
    }

    /// Read without growing; `None` past the end
    pub fn peek(&self, address: Address) -> Option<Word> {
        self.cells.get(address).copied()
    }

    /// Current length in cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Growth ceiling in cells
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// All cells (for display and disassembly)
    pub fn cells(&self) -> &[Word] {
        &self.cells
    }

    fn ensure(&mut self, address: Word) -> Result<Address, EngineError> {
        let index = to_address(address).ok_or(EngineError::AddressError { address, pc: None })?;

        if index >= self.cells.len() {
            if index >= self.limit {
                return Err(EngineError::MemoryLimitExceeded {
                    address: index,
                    limit: self.limit,
                    pc: None,
                });
            }
            self.cells.resize(index + 1, 0);
        }

        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_past_end_grows_with_zeros() {
        let mut memory = Memory::new(&[1, 2, 3]);
        assert_eq!(memory.read(10).unwrap(), 0);
        assert_eq!(memory.len(), 11);
        assert_eq!(memory.cells()[..3], [1, 2, 3]);
        assert!(memory.cells()[3..].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_write_past_end_grows() {
        let mut memory = Memory::new(&[]);
        memory.write(4, 99).unwrap();
        assert_eq!(memory.cells(), &[0, 0, 0, 0, 99]);
    }

    #[test]
    fn test_growth_is_monotonic() {
        let mut memory = Memory::new(&[0; 8]);
        memory.read(2).unwrap();
        memory.write(1, 5).unwrap();
        assert_eq!(memory.len(), 8);
    }

    #[test]
    fn test_negative_address_is_rejected() {
        let mut memory = Memory::new(&[7]);
        assert!(matches!(
            memory.read(-1),
            Err(EngineError::AddressError { address: -1, .. })
        ));
        assert!(memory.write(-3, 1).is_err());
        assert_eq!(memory.cells(), &[7]);
    }

    #[test]
    fn test_limit_blocks_growth() {
        let mut memory = Memory::with_limit(&[1, 2], 4);
        assert!(memory.write(3, 1).is_ok());
        assert!(matches!(
            memory.read(4),
            Err(EngineError::MemoryLimitExceeded {
                address: 4,
                limit: 4,
                pc: None
            })
        ));
        assert_eq!(memory.len(), 4);
    }

    #[test]
    fn test_default_limit_rejects_far_addresses() {
        let mut memory = Memory::new(&[]);
        assert_eq!(memory.limit(), DEFAULT_MEMORY_LIMIT);
        assert!(matches!(
            memory.write(70_000_000, 1),
            Err(EngineError::MemoryLimitExceeded { .. })
        ));
        assert!(memory.is_empty());
    }

    #[test]
    fn test_peek_does_not_grow() {
        let memory = Memory::new(&[5]);
        assert_eq!(memory.peek(0), Some(5));
        assert_eq!(memory.peek(3), None);
        assert_eq!(memory.len(), 1);
    }
}
