//! Program loading
//!
//! Programs are distributed as a single line of comma-separated integers:
//! ```text
//! 1,9,10,3,2,3,11,0,99,30,40,50
//! ```
//! [`parse`] turns that text into the word image the engine is built from.
//! Whitespace (including the trailing newline most files end with) is
//! ignored around every token.
//!
//! [`Patch`] covers the common host-side tweak of overwriting a few cells
//! before the program starts, e.g. `1=12` and `2=2` to set inputs stored in
//! the image, or `0=2` to flip a mode flag.

use crate::memory::{to_address, Address, Word};
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while loading a program or a patch
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("program is empty")]
    Empty,

    #[error("invalid integer {token:?} at position {index}")]
    InvalidNumber { index: usize, token: String },

    #[error("invalid patch {0:?}: expected ADDR=VALUE with a non-negative address")]
    InvalidPatch(String),

    #[error("patch address {address} is beyond the memory limit of {limit} cells")]
    PatchOutOfRange { address: Address, limit: usize },

    #[error("failed to read program: {0}")]
    Io(#[from] io::Error),
}

/// Parse comma-separated program text
pub fn parse(text: &str) -> Result<Vec<Word>, ProgramError> {
    let mut tokens: Vec<&str> = text.split(',').map(str::trim).collect();

    // "1,2,3," and "1,2,3\n" both end in an empty token
    if tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }

    if tokens.is_empty() {
        return Err(ProgramError::Empty);
    }

    tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            token.parse::<Word>().map_err(|_| ProgramError::InvalidNumber {
                index,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Read and parse a program file
pub fn load(path: &Path) -> Result<Vec<Word>, ProgramError> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

/// A single-cell overwrite applied before execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    pub address: Address,
    pub value: Word,
}

impl Patch {
    /// Apply to an image, growing it with zeros if the address is past the end
    ///
    /// Growth obeys the same ceiling as the tape the image is loaded into.
    pub fn apply(&self, image: &mut Vec<Word>, limit: usize) -> Result<(), ProgramError> {
        if self.address >= image.len() {
            if self.address >= limit {
                return Err(ProgramError::PatchOutOfRange {
                    address: self.address,
                    limit,
                });
            }
            image.resize(self.address + 1, 0);
        }
        image[self.address] = self.value;
        Ok(())
    }
}

impl FromStr for Patch {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProgramError::InvalidPatch(s.to_string());
        let (address, value) = s.split_once('=').ok_or_else(invalid)?;
        let address = address.trim().parse::<Word>().map_err(|_| invalid())?;
        let value = value.trim().parse::<Word>().map_err(|_| invalid())?;
        let address = to_address(address).ok_or_else(invalid)?;
        Ok(Patch { address, value })
    }
}
