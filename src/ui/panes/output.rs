//! Output pane rendering

use super::utils::{clamp_scroll, pane_block, visible_rows};
use crate::memory::Word;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render every value emitted so far, newest at the bottom
pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    transcript: &[Word],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Output ", is_focused);

    if transcript.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let visible_height = visible_rows(area.height);
    clamp_scroll(scroll_offset, transcript.len(), visible_height);

    let items: Vec<ListItem> = transcript
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(i, value)| {
            // Printable ASCII is shown alongside, many programs emit text
            let text = match u8::try_from(*value) {
                Ok(b) if b.is_ascii_graphic() || b == b' ' => {
                    format!("{:>4}  {:<12} '{}'", i, value, b as char)
                }
                _ => format!("{:>4}  {}", i, value),
            };
            ListItem::new(text).style(Style::default().fg(DEFAULT_THEME.fg))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
