//! Registers pane: program counter, relative base, run state and queues

use super::utils::pane_block;
use crate::interpreter::engine::{Engine, RunState};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

fn row<'a>(name: &'a str, value: String, value_style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!(" {:<10}", name), Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(value, value_style),
    ])
}

/// Render the registers pane
///
/// `history` is the snapshot history's (used, limit) in bytes.
pub fn render_registers_pane(
    frame: &mut Frame,
    area: Rect,
    engine: &Engine,
    history: (usize, usize),
    is_focused: bool,
) {
    let block = pane_block(" Registers ", is_focused);
    let number = Style::default().fg(DEFAULT_THEME.number);

    let state_style = match engine.state() {
        RunState::Running => Style::default().fg(DEFAULT_THEME.success),
        RunState::AwaitingInput => Style::default().fg(DEFAULT_THEME.secondary),
        RunState::Terminated => Style::default().fg(DEFAULT_THEME.error),
    }
    .add_modifier(Modifier::BOLD);

    let pending: Vec<String> = engine.input().iter().map(|v| v.to_string()).collect();
    let pending = if pending.is_empty() {
        "(empty)".to_string()
    } else {
        pending.join(", ")
    };

    let lines = vec![
        row("pc", engine.pc().to_string(), number),
        row("rb", engine.relative_base().to_string(), number),
        row("state", engine.state().to_string(), state_style),
        row("steps", engine.steps().to_string(), number),
        row(
            "memory",
            format!("{} / {} cells", engine.memory().len(), engine.memory().limit()),
            number,
        ),
        row(
            "history",
            format!("{} / {} KiB", history.0 / 1024, history.1 / 1024),
            number,
        ),
        row("input", pending, Style::default().fg(DEFAULT_THEME.fg)),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
