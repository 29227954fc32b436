pub mod header;
pub mod popups;
pub mod status_row;
pub mod task_list;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;

use crate::model::checklist::ChecklistFields;

use super::app::{App, Mode};

/// Main render function: dispatches to sub-renderers
pub fn render<E: ChecklistFields>(frame: &mut Frame, app: &mut App<E>) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (4 rows) | task list | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);
    task_list::render_task_list(frame, app, chunks[1]);
    status_row::render_status_row(frame, app, chunks[2]);

    // Overlays
    if app.mode == Mode::Picker {
        popups::render_picker(frame, app, area);
    }
    if app.mode == Mode::Confirm {
        popups::render_confirm(frame, app, area);
    }
    if app.show_help {
        popups::render_help(frame, app, area);
    }
}

/// Push spans for `text`, styling the chars at `matched` (char indices)
/// with `highlight_style`.
pub(super) fn push_matched_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    matched: &[usize],
    base_style: Style,
    highlight_style: Style,
) {
    if matched.is_empty() {
        spans.push(Span::styled(text.to_string(), base_style));
        return;
    }
    let mut run = String::new();
    let mut run_is_match = false;
    for (i, ch) in text.chars().enumerate() {
        let is_match = matched.contains(&i);
        if is_match != run_is_match && !run.is_empty() {
            let style = if run_is_match { highlight_style } else { base_style };
            spans.push(Span::styled(std::mem::take(&mut run), style));
        }
        run_is_match = is_match;
        run.push(ch);
    }
    if !run.is_empty() {
        let style = if run_is_match { highlight_style } else { base_style };
        spans.push(Span::styled(run, style));
    }
}

/// A `width` × `height` rect centered in `area`
pub(super) fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}
