//! Code pane rendering
//!
//! Shows a disassembly of the whole tape, anchored so that a line always
//! starts at the program counter. The current instruction is kept at a fixed
//! visual row while stepping; Up/Down move that row.
//!
//! The listing is built by the caller and reused across frames.

use super::utils::{pane_block, visible_rows};
use crate::interpreter::disasm::DisasmLine;
use crate::memory::Address;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

fn highlight_instruction(line: &DisasmLine) -> Vec<Span<'static>> {
    let (head, rest) = line.text.split_once(' ').unwrap_or((line.text.as_str(), ""));
    let head_style = if head == "DATA" {
        Style::default().fg(DEFAULT_THEME.comment)
    } else {
        Style::default()
            .fg(DEFAULT_THEME.mnemonic)
            .add_modifier(Modifier::BOLD)
    };

    vec![
        Span::styled(head.to_string(), head_style),
        Span::raw(" "),
        Span::styled(rest.to_string(), Style::default().fg(DEFAULT_THEME.number)),
    ]
}

/// Render the code pane
pub fn render_code_pane(
    frame: &mut Frame,
    area: Rect,
    lines: &[DisasmLine],
    pc: Address,
    is_error: bool,
    is_focused: bool,
    target_row: &mut Option<usize>,
) {
    let block = pane_block(" Code ", is_focused);
    let visible_height = visible_rows(area.height);

    // Initialize target row to center if not set
    let row = target_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    *target_row = Some(row);

    let current = lines.iter().position(|l| l.address == pc);
    let mut offset = current.map_or(0, |idx| idx.saturating_sub(row));
    if lines.len() > visible_height {
        offset = offset.min(lines.len() - visible_height);
    } else {
        offset = 0;
    }

    let rendered: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let is_current = Some(idx) == current;

            let (marker, addr_style) = if is_current && is_error {
                (
                    "✗ ",
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                )
            } else if is_current {
                (
                    "▶ ",
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("  ", Style::default().fg(DEFAULT_THEME.comment))
            };

            let label = if line.is_label {
                Span::styled("◆ ", Style::default().fg(DEFAULT_THEME.label))
            } else {
                Span::raw("  ")
            };

            let mut spans = vec![
                Span::styled(marker, addr_style),
                Span::styled(format!("{:6} ", line.address), addr_style),
                label,
            ];
            spans.extend(highlight_instruction(line));

            if is_current {
                let bg = if is_error {
                    Style::default().bg(DEFAULT_THEME.error).fg(Color::White)
                } else {
                    Style::default().bg(DEFAULT_THEME.current_line_bg)
                };
                for span in &mut spans {
                    span.style = span.style.patch(bg);
                }
            }

            Line::from(spans)
        })
        .collect();

    let paragraph = if rendered.is_empty() {
        Paragraph::new("(empty program)").style(Style::default().fg(DEFAULT_THEME.comment))
    } else {
        Paragraph::new(rendered)
    };
    frame.render_widget(paragraph.block(block), area);
}
