//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`code`]: disassembly around the program counter
//! - [`memory`]: the tape as a grid, with the pc, relative base and freshly
//!   written cells highlighted
//! - [`registers`]: program counter, relative base, run state, pending input
//! - [`output`]: every value the program has emitted so far
//! - [`status`]: status bar with keybindings and execution state
//!
//! Each pane module exports a `render_*` function that draws from borrowed
//! engine state and a scroll offset owned by [`App`](crate::ui::App).

mod utils;

pub mod code;
pub mod memory;
pub mod output;
pub mod registers;
pub mod status;

pub use code::render_code_pane;
pub use memory::{render_memory_pane, MemoryRenderData};
pub use output::render_output_pane;
pub use registers::render_registers_pane;
pub use status::{render_status_bar, StatusRenderData};
