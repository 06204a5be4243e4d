//! Runtime configuration and logging setup
//!
//! [`RunConfig`] is resolved once at startup from command-line flags (each of
//! which falls back to an `INTTY_*` environment variable) and then handed to
//! whatever drives the engines.

use crate::interpreter::constants::{DEFAULT_MEMORY_LIMIT, DEFAULT_SNAPSHOT_LIMIT};
use crate::interpreter::engine::Engine;
use crate::memory::{tape::Memory, Word};
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "intty=info";

/// Limits applied to every engine the binary creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Instruction budget per run; `None` runs until suspension
    pub max_steps: Option<u64>,

    /// Growth ceiling for each engine's tape, in cells
    pub memory_limit: usize,

    /// Byte budget for the debugger's snapshot history
    pub snapshot_limit: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            max_steps: None,
            memory_limit: DEFAULT_MEMORY_LIMIT,
            snapshot_limit: DEFAULT_SNAPSHOT_LIMIT,
        }
    }
}

impl RunConfig {
    /// Build an engine over `image` honouring the configured memory ceiling
    pub fn engine(&self, image: &[Word]) -> Engine {
        Engine::with_memory(Memory::with_limit(image, self.memory_limit))
    }
}

/// Where log records are written
#[derive(Debug)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    /// Discard everything (the TUI owns the terminal)
    Silent,
}

/// Initialize logging with a default filter
///
/// Use the `RUST_LOG` environment variable to override the default filter.
pub fn init_logging(target: LogTarget<'_>) -> io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (writer, ansi) = match target {
        LogTarget::Stderr => (BoxMakeWriter::new(io::stderr), true),
        LogTarget::File(path) => (BoxMakeWriter::new(Mutex::new(File::create(path)?)), false),
        LogTarget::Silent => (BoxMakeWriter::new(io::sink), false),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .init();

    Ok(())
}
