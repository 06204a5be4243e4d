//! Memory model for the virtual machine
//!
//! This module provides the storage the engine runs over:
//! - [`tape`]: the growable tape of signed words holding both code and data
//! - [`channel`]: the FIFO queues a host uses to exchange values with an engine
//!
//! # Word Size
//!
//! Every cell is an `i64`. Programs routinely multiply large operands, so a
//! 32-bit word is not wide enough.
//!
//! # Addressing
//!
//! Addresses are produced by the engine as signed words. A negative address is
//! a fatal addressing error; anything else is converted to an [`Address`] and
//! the tape grows to cover it on first touch:
//! ```text
//! read(i) with i >= len  →  len = i + 1, new cells = 0
//! ```
//! Use [`to_address`] to perform that conversion.

pub mod channel;
pub mod tape;

/// A single memory cell / I/O value
pub type Word = i64;

/// Index into the tape
pub type Address = usize;

/// Convert a signed word into a tape address, rejecting negative values
pub fn to_address(word: Word) -> Option<Address> {
    if word < 0 {
        None
    } else {
        Address::try_from(word).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_address() {
        assert_eq!(to_address(0), Some(0));
        assert_eq!(to_address(42), Some(42));
        assert_eq!(to_address(-1), None);
    }
}
