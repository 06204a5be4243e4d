//! Main TUI application state and logic

use crate::debugger::{Debugger, DebuggerError, StepOutcome};
use crate::interpreter::disasm::{disassemble_anchored, DisasmLine};
use crate::interpreter::engine::RunState;
use crate::memory::Address;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use rustc_hash::FxHashSet;
use std::io;
use std::time::{Duration, Instant};

use super::panes::{self, MemoryRenderData, StatusRenderData};

/// Delay between steps in play mode
const PLAY_INTERVAL: Duration = Duration::from_millis(100);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Code,
    Output,
    Registers,
    Memory,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: code -> output -> registers -> memory)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Code => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Registers,
            FocusedPane::Registers => FocusedPane::Memory,
            FocusedPane::Memory => FocusedPane::Code,
        }
    }
}

/// Listing and changed cells for one history position
///
/// A position always maps to the same engine state, so both only need
/// rebuilding when the cursor moves.
#[derive(Debug)]
struct ViewCache {
    position: usize,
    lines: Vec<DisasmLine>,
    changed: FxHashSet<Address>,
}

impl ViewCache {
    fn build(debugger: &Debugger) -> Self {
        let engine = debugger.engine();
        ViewCache {
            position: debugger.history_position(),
            lines: disassemble_anchored(engine.memory().cells(), Some(engine.pc())),
            changed: debugger.changed_cells(),
        }
    }
}

/// The main application state
pub struct App {
    pub debugger: Debugger,

    /// Step budget for "run to end"
    pub max_steps: Option<u64>,

    pub focused_pane: FocusedPane,

    /// Visual row the current instruction is pinned to (None = center on first render)
    pub code_target_row: Option<usize>,
    pub memory_scroll: usize,
    pub output_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,

    pub is_playing: bool,
    pub last_play_time: Instant,

    /// Text being typed while in input mode
    pub input_buffer: Option<String>,

    view: ViewCache,
}

impl App {
    pub fn new(debugger: Debugger, max_steps: Option<u64>) -> Self {
        let view = ViewCache::build(&debugger);
        App {
            view,
            debugger,
            max_steps,
            focused_pane: FocusedPane::Code,
            code_target_row: None,
            memory_scroll: 0,
            output_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: Instant::now(),
            input_buffer: None,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                self.step_forward();
                if self.debugger.needs_input() || self.debugger.engine().is_terminated() {
                    self.is_playing = false;
                }
                self.last_play_time = Instant::now();
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(20))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Rebuild the cached view if the history cursor moved
    fn refresh_view(&mut self) {
        if self.view.position != self.debugger.history_position() {
            self.view = ViewCache::build(&self.debugger);
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        self.refresh_view();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(main_chunks[0]);

        // Left column: Code (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Registers (top) | Memory (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(0)])
            .split(columns[1]);

        let engine = self.debugger.engine();
        let is_error = self.debugger.last_error().is_some();

        panes::render_code_pane(
            frame,
            left_rows[0],
            &self.view.lines,
            engine.pc(),
            is_error,
            self.focused_pane == FocusedPane::Code,
            &mut self.code_target_row,
        );

        panes::render_output_pane(
            frame,
            left_rows[1],
            self.debugger.transcript(),
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        panes::render_registers_pane(
            frame,
            right_rows[0],
            engine,
            (
                self.debugger.history_memory_usage(),
                self.debugger.history_memory_limit(),
            ),
            self.focused_pane == FocusedPane::Registers,
        );

        panes::render_memory_pane(
            frame,
            right_rows[1],
            MemoryRenderData {
                cells: engine.memory().cells(),
                pc: engine.pc(),
                relative_base: engine.relative_base(),
                changed: &self.view.changed,
            },
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message: &self.status_message,
                current_step: self.debugger.history_position(),
                total_steps: self.debugger.total_snapshots(),
                is_error,
                is_playing: self.is_playing,
                is_terminated: engine.state() == RunState::Terminated,
                needs_input: self.debugger.needs_input(),
                input_buffer: self.input_buffer.as_deref(),
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.input_buffer.is_some() {
            self.handle_input_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let mut stepped = 0;
                for _ in 0..n {
                    if self.debugger.step_forward().is_err() {
                        break;
                    }
                    stepped += 1;
                }
                self.status_message = format!("Stepped forward {} step(s)", stepped);
                self.output_scroll = usize::MAX;
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                if self.debugger.needs_input() {
                    self.is_playing = false;
                    self.input_buffer = Some(String::new());
                } else {
                    self.status_message = "Program is not waiting for input".to_string();
                }
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Code => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.code_target_row {
                        self.code_target_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Memory => {
                    self.memory_scroll = self.memory_scroll.saturating_sub(1);
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_sub(1);
                }
                FocusedPane::Registers => {}
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Code => {
                    if let Some(row) = self.code_target_row {
                        self.code_target_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Memory => {
                    self.memory_scroll = self.memory_scroll.saturating_add(1);
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_add(1);
                }
                FocusedPane::Registers => {}
            },
            KeyCode::Char(' ') => {
                self.is_playing = !self.is_playing;
                self.status_message = if self.is_playing {
                    "Playing...".to_string()
                } else {
                    "Paused".to_string()
                };
            }
            KeyCode::Enter => {
                self.is_playing = false;
                match self.debugger.run_to_end(self.max_steps) {
                    Ok(moved) => {
                        self.status_message = if self.debugger.needs_input() {
                            format!("Ran {} step(s), waiting for input", moved)
                        } else {
                            format!("Ran {} step(s)", moved)
                        };
                    }
                    Err(e) => self.status_message = format!("Stopped: {}", e),
                }
                self.output_scroll = usize::MAX;
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.debugger.rewind_to_start();
                self.status_message = "Jumped to start".to_string();
                self.output_scroll = usize::MAX;
            }
            _ => {}
        }
    }

    /// Keys while typing an input value
    fn handle_input_key(&mut self, key: KeyEvent) {
        let Some(buffer) = self.input_buffer.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => buffer.push(c),
            KeyCode::Char('-') if buffer.is_empty() => buffer.push('-'),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Esc => {
                self.input_buffer = None;
                self.status_message = "Input cancelled".to_string();
            }
            KeyCode::Enter => match buffer.parse::<i64>() {
                Ok(value) => {
                    self.input_buffer = None;
                    self.status_message = match self.debugger.provide_input(value) {
                        Ok(()) => format!("Fed input {}", value),
                        Err(e) => format!("Error: {}", e),
                    };
                }
                Err(_) => {
                    self.status_message = format!("Not a number: {:?}", buffer);
                }
            },
            _ => {}
        }
    }

    /// Step forward in execution
    fn step_forward(&mut self) {
        match self.debugger.step_forward() {
            Ok(StepOutcome::Replayed) => {
                self.status_message = "Stepped forward".to_string();
            }
            Ok(StepOutcome::Executed(RunState::AwaitingInput)) => {
                self.status_message = "Waiting for input, press i".to_string();
            }
            Ok(StepOutcome::Executed(RunState::Terminated)) => {
                self.status_message = "Program halted".to_string();
            }
            Ok(StepOutcome::Executed(RunState::Running)) => {
                self.status_message = "Stepped forward".to_string();
            }
            Err(DebuggerError::AwaitingInput) => {
                self.status_message = "Waiting for input, press i".to_string();
            }
            Err(e) => {
                self.status_message = format!("Cannot step forward: {}", e);
            }
        }
        // Auto-scroll output to bottom
        self.output_scroll = usize::MAX;
    }

    /// Step backward in execution
    fn step_backward(&mut self) {
        match self.debugger.step_backward() {
            Ok(()) => {
                self.status_message = "Stepped backward".to_string();
                self.output_scroll = usize::MAX;
            }
            Err(e) => {
                self.status_message = format!("Cannot step backward: {}", e);
            }
        }
    }
}
