//! Disassembler for memory images
//!
//! Programs freely mix code and data, so the listing is a best-effort linear
//! sweep: every word that decodes to a complete instruction is shown as one,
//! everything else as `DATA`. An optional anchor (normally the program
//! counter) forces the sweep to land on that address even if an earlier
//! "instruction" would have straddled it.

use crate::interpreter::decoder::{Instruction, Param};
use crate::memory::{to_address, Address, Word};
use rustc_hash::FxHashSet;

/// One line of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisasmLine {
    pub address: Address,
    /// Words covered by this line
    pub width: usize,
    pub text: String,
    /// Some immediate jump in the image targets this address
    pub is_label: bool,
}

/// Decode the instruction at `address`, if it is complete and valid
pub fn decode_at(cells: &[Word], address: Address) -> Option<(Instruction, Vec<Param>)> {
    let word = *cells.get(address)?;
    let instruction = Instruction::decode(word).ok()?;
    let operands = cells.get(address + 1..address + instruction.width())?;
    let params = instruction
        .modes()
        .iter()
        .zip(operands)
        .map(|(&mode, &operand)| Param::new(mode, operand))
        .collect();
    Some((instruction, params))
}

/// Render a decoded instruction as text
pub fn format_instruction(instruction: &Instruction, params: &[Param]) -> String {
    if params.is_empty() {
        return instruction.opcode.mnemonic().to_string();
    }
    let operands: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    format!("{:<4} {}", instruction.opcode.mnemonic(), operands.join(", "))
}

/// Addresses targeted by jumps with an immediate target operand
pub fn jump_targets(cells: &[Word]) -> FxHashSet<Address> {
    let mut targets = FxHashSet::default();
    let mut address = 0;

    while address < cells.len() {
        match decode_at(cells, address) {
            Some((instruction, params)) => {
                if instruction.opcode.is_jump() {
                    if let Some(Param::Immediate(target)) = params.get(1) {
                        if let Some(target) = to_address(*target) {
                            targets.insert(target);
                        }
                    }
                }
                address += instruction.width();
            }
            None => address += 1,
        }
    }

    targets
}

/// Disassemble the whole image
pub fn disassemble(cells: &[Word]) -> Vec<DisasmLine> {
    disassemble_anchored(cells, None)
}

/// Disassemble the whole image, guaranteeing a line starts at `anchor`
pub fn disassemble_anchored(cells: &[Word], anchor: Option<Address>) -> Vec<DisasmLine> {
    let labels = jump_targets(cells);
    let mut lines = Vec::new();
    let mut address = 0;

    while address < cells.len() {
        let decoded = decode_at(cells, address).filter(|(instruction, _)| match anchor {
            Some(anchor) => !(address < anchor && address + instruction.width() > anchor),
            None => true,
        });

        let (width, text) = match decoded {
            Some((instruction, params)) => {
                (instruction.width(), format_instruction(&instruction, &params))
            }
            None => (1, format!("DATA {}", cells[address])),
        };

        lines.push(DisasmLine {
            address,
            width,
            text,
            is_label: labels.contains(&address),
        });
        address += width;
    }

    lines
}
