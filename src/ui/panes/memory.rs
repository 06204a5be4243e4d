//! Memory pane rendering
//!
//! The tape is laid out as rows of fixed width, each prefixed with the
//! address of its first cell. Highlights:
//! - the cell at the program counter
//! - the cell the relative base points at
//! - cells whose value changed in the step that led here

use super::utils::{clamp_scroll, pane_block, visible_rows};
use crate::memory::{Address, Word};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use rustc_hash::FxHashSet;

/// Width of one rendered cell including its separator
const CELL_WIDTH: usize = 8;

/// Data needed to render the memory pane
pub struct MemoryRenderData<'a> {
    pub cells: &'a [Word],
    pub pc: Address,
    pub relative_base: Word,
    pub changed: &'a FxHashSet<Address>,
}

fn format_cell(value: Word) -> String {
    let text = value.to_string();
    if text.len() >= CELL_WIDTH {
        // Large products do not fit; keep the sign and the magnitude hint
        format!("{:>width$}", if value < 0 { "-big" } else { "big" }, width = CELL_WIDTH - 1)
    } else {
        format!("{:>width$}", text, width = CELL_WIDTH - 1)
    }
}

/// Render the memory pane
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    data: MemoryRenderData,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Memory ({} cells) ", data.cells.len());
    let block = pane_block(&title, is_focused);

    let content_width = area.width.saturating_sub(2) as usize;
    // 7 columns for the address gutter
    let per_row = (content_width.saturating_sub(7) / CELL_WIDTH).max(1);
    let total_rows = data.cells.len().div_ceil(per_row);
    let visible_height = visible_rows(area.height);
    clamp_scroll(scroll_offset, total_rows, visible_height);

    let rb_cell = usize::try_from(data.relative_base).ok();

    let rows: Vec<Line> = data
        .cells
        .chunks(per_row)
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(row, chunk)| {
            let base = row * per_row;
            let mut spans = vec![Span::styled(
                format!("{:>6} ", base),
                Style::default().fg(DEFAULT_THEME.comment),
            )];

            for (i, &value) in chunk.iter().enumerate() {
                let address = base + i;
                let style = if address == data.pc {
                    Style::default()
                        .bg(DEFAULT_THEME.secondary)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD)
                } else if data.changed.contains(&address) {
                    Style::default()
                        .fg(DEFAULT_THEME.changed)
                        .add_modifier(Modifier::BOLD)
                } else if Some(address) == rb_cell {
                    Style::default().fg(DEFAULT_THEME.relative_base)
                } else if value == 0 {
                    Style::default().fg(DEFAULT_THEME.comment)
                } else {
                    Style::default().fg(DEFAULT_THEME.fg)
                };
                spans.push(Span::raw(" "));
                spans.push(Span::styled(format_cell(value), style));
            }

            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(rows).block(block), area);
}
