// Constants for the virtual machine

/// Instruction words are `modes * OPCODE_RADIX + opcode`
pub const OPCODE_RADIX: i64 = 100;

/// Each mode digit is one base-10 digit
pub const MODE_RADIX: i64 = 10;

/// Widest instruction (Add, Mul, LessThan, Equals) takes three parameters
pub const MAX_PARAMS: usize = 3;

/// Default growth ceiling for a tape, in cells (512 MiB of words)
pub const DEFAULT_MEMORY_LIMIT: usize = 64 * 1024 * 1024;

/// Default byte budget for the debugger's snapshot history (1 GiB)
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 1024 * 1024 * 1024;
