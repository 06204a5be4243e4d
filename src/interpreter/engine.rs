// Execution engine for the virtual machine

use crate::interpreter::decoder::{Instruction, Operand, Param};
use crate::interpreter::errors::EngineError;
use crate::interpreter::opcode::Opcode;
use crate::memory::{channel::Channel, tape::Memory, to_address, Address, Word};
use std::fmt;
use tracing::{debug, trace};

/// Run state of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Ready to execute the instruction at the program counter
    Running,
    /// Parked on an Input instruction with an empty Input queue
    AwaitingInput,
    /// Halt executed; terminal
    Terminated,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Running => "running",
            RunState::AwaitingInput => "awaiting input",
            RunState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Result of running under a step budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetOutcome {
    /// Stopped at a suspension point within the budget
    Suspended(RunState),
    /// Budget used up while still running
    Exhausted,
}

/// Where the program counter goes after an instruction
enum Flow {
    Advance,
    Jump(Address),
    Suspend,
    Halt,
}

/// One virtual machine instance
///
/// The engine exclusively owns its memory and both I/O channels. Hosts drive
/// it with [`step`](Engine::step) or [`run_to_suspension`](Engine::run_to_suspension),
/// feed it with [`feed_input`](Engine::feed_input) and collect results with
/// [`drain_output`](Engine::drain_output).
#[derive(Debug, Clone)]
pub struct Engine {
    memory: Memory,
    pc: Address,
    relative_base: Word,
    state: RunState,
    input: Channel,
    output: Channel,

    /// Instructions successfully executed (suspended Input retries excluded)
    steps: u64,
}

impl Engine {
    /// Create an engine with `program` loaded at address 0
    pub fn new(program: &[Word]) -> Self {
        Self::with_memory(Memory::new(program))
    }

    /// Create an engine over a prepared tape
    pub fn with_memory(memory: Memory) -> Self {
        Engine {
            memory,
            pc: 0,
            relative_base: 0,
            state: RunState::Running,
            input: Channel::new(),
            output: Channel::new(),
            steps: 0,
        }
    }

    /// Queue a value on Input, waking the engine if it was waiting
    pub fn feed_input(&mut self, value: Word) {
        self.input.push(value);
        if self.state == RunState::AwaitingInput {
            debug!(pc = self.pc, value, "input provided, resuming");
            self.state = RunState::Running;
        }
    }

    /// Queue several values in order
    pub fn feed_inputs<I: IntoIterator<Item = Word>>(&mut self, values: I) {
        let before = self.input.len();
        self.input.extend(values);
        if self.input.len() > before && self.state == RunState::AwaitingInput {
            debug!(pc = self.pc, queued = self.input.len(), "inputs provided, resuming");
            self.state = RunState::Running;
        }
    }

    /// Remove and return the oldest Output value
    pub fn drain_output(&mut self) -> Option<Word> {
        self.output.pop()
    }

    /// Remove and return every Output value, oldest first
    pub fn drain_outputs(&mut self) -> Vec<Word> {
        self.output.drain()
    }

    /// Execute exactly one instruction
    ///
    /// On error the program counter is unchanged. A terminated engine stays
    /// terminated and does nothing.
    pub fn step(&mut self) -> Result<RunState, EngineError> {
        if self.state == RunState::Terminated {
            return Ok(self.state);
        }

        let pc = self.pc;
        let word = self.memory.read(pc as Word).map_err(|e| e.at(pc))?;
        let instruction = Instruction::decode(word).map_err(|e| EngineError::from_decode(e, pc))?;

        trace!(pc, word, op = %instruction.opcode, rb = self.relative_base, "execute");

        let flow = self.execute(&instruction)?;

        match flow {
            Flow::Advance => {
                self.pc = pc + instruction.width();
                self.steps += 1;
            }
            Flow::Jump(target) => {
                self.pc = target;
                self.steps += 1;
            }
            Flow::Suspend => {
                if self.state != RunState::AwaitingInput {
                    debug!(pc, "input queue empty, suspending");
                }
                self.state = RunState::AwaitingInput;
            }
            Flow::Halt => {
                debug!(pc, steps = self.steps + 1, "halted");
                self.steps += 1;
                self.state = RunState::Terminated;
            }
        }

        Ok(self.state)
    }

    /// Step until the engine waits for input or terminates
    ///
    /// A program that neither halts nor reads input never returns; use
    /// [`run_with_budget`](Engine::run_with_budget) to bound it.
    pub fn run_to_suspension(&mut self) -> Result<RunState, EngineError> {
        loop {
            match self.step()? {
                RunState::Running => continue,
                state => return Ok(state),
            }
        }
    }

    /// Like [`run_to_suspension`](Engine::run_to_suspension), but give up after
    /// `max_steps` instructions
    pub fn run_with_budget(&mut self, max_steps: u64) -> Result<BudgetOutcome, EngineError> {
        if self.state == RunState::Terminated {
            return Ok(BudgetOutcome::Suspended(self.state));
        }

        for _ in 0..max_steps {
            match self.step()? {
                RunState::Running => {}
                state => return Ok(BudgetOutcome::Suspended(state)),
            }
        }

        Ok(BudgetOutcome::Exhausted)
    }

    fn execute(&mut self, instruction: &Instruction) -> Result<Flow, EngineError> {
        let flow = match instruction.opcode {
            Opcode::Add => {
                let a = self.load(instruction, 0)?;
                let b = self.load(instruction, 1)?;
                self.store(instruction, 2, a.wrapping_add(b))?;
                Flow::Advance
            }
            Opcode::Mul => {
                let a = self.load(instruction, 0)?;
                let b = self.load(instruction, 1)?;
                self.store(instruction, 2, a.wrapping_mul(b))?;
                Flow::Advance
            }
            Opcode::Input => {
                // Resolve the target before touching the queue so a bad
                // target never consumes a value
                let dest = self.target(instruction, 0)?;
                match self.input.front() {
                    Some(value) => {
                        self.memory.write(dest, value).map_err(|e| e.at(self.pc))?;
                        self.input.pop();
                        Flow::Advance
                    }
                    None => Flow::Suspend,
                }
            }
            Opcode::Output => {
                let value = self.load(instruction, 0)?;
                self.output.push(value);
                Flow::Advance
            }
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => {
                let cond = self.load(instruction, 0)?;
                let target = self.load(instruction, 1)?;
                let taken = match instruction.opcode {
                    Opcode::JumpIfTrue => cond != 0,
                    _ => cond == 0,
                };
                if taken {
                    let address = to_address(target).ok_or(EngineError::AddressError {
                        address: target,
                        pc: Some(self.pc),
                    })?;
                    Flow::Jump(address)
                } else {
                    Flow::Advance
                }
            }
            Opcode::LessThan => {
                let a = self.load(instruction, 0)?;
                let b = self.load(instruction, 1)?;
                self.store(instruction, 2, Word::from(a < b))?;
                Flow::Advance
            }
            Opcode::Equals => {
                let a = self.load(instruction, 0)?;
                let b = self.load(instruction, 1)?;
                self.store(instruction, 2, Word::from(a == b))?;
                Flow::Advance
            }
            Opcode::AdjustRelativeBase => {
                let delta = self.load(instruction, 0)?;
                self.relative_base = self.relative_base.wrapping_add(delta);
                Flow::Advance
            }
            Opcode::Halt => Flow::Halt,
        };

        Ok(flow)
    }

    /// Fetch the tagged operand for parameter `index`
    fn param(&mut self, instruction: &Instruction, index: usize) -> Result<Param, EngineError> {
        let pc = self.pc;
        let operand = self
            .memory
            .read((pc + 1 + index) as Word)
            .map_err(|e| e.at(pc))?;
        Ok(Param::new(instruction.mode(index), operand))
    }

    /// Value of parameter `index`
    fn load(&mut self, instruction: &Instruction, index: usize) -> Result<Word, EngineError> {
        let param = self.param(instruction, index)?;
        match param.resolve(self.relative_base) {
            Operand::Value(value) => Ok(value),
            Operand::Address(address) => {
                let pc = self.pc;
                self.memory.read(address).map_err(|e| e.at(pc))
            }
        }
    }

    /// Destination address of write parameter `index`
    fn target(&mut self, instruction: &Instruction, index: usize) -> Result<Word, EngineError> {
        let param = self.param(instruction, index)?;
        match param.resolve(self.relative_base) {
            Operand::Address(address) if address < 0 => Err(EngineError::AddressError {
                address,
                pc: Some(self.pc),
            }),
            Operand::Address(address) => Ok(address),
            Operand::Value(_) => Err(EngineError::ImmediateWrite { pc: self.pc }),
        }
    }

    fn store(&mut self, instruction: &Instruction, index: usize, value: Word) -> Result<(), EngineError> {
        let dest = self.target(instruction, index)?;
        let pc = self.pc;
        self.memory.write(dest, value).map_err(|e| e.at(pc))
    }

    // ========== Getter methods for hosts and the UI ==========

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == RunState::Terminated
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.state == RunState::AwaitingInput
    }

    /// Current program counter
    pub fn pc(&self) -> Address {
        self.pc
    }

    /// Current relative base
    pub fn relative_base(&self) -> Word {
        self.relative_base
    }

    /// Number of instructions executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Values queued but not yet consumed
    pub fn input(&self) -> &Channel {
        &self.input
    }

    /// Values produced but not yet drained
    pub fn output(&self) -> &Channel {
        &self.output
    }
}
