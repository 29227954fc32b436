use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::checklist::ChecklistFields;
use crate::tui::app::{App, EditTarget, Mode};
use crate::util::unicode::{display_width, truncate_to_width};

const NAVIGATE_HINT: &str = "n/p record  a add  space toggle  s save  / find  ? help";

/// Render the status row (bottom of screen)
pub fn render_status_row<E: ChecklistFields>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = match app.mode {
        Mode::Edit => edit_line(app, width),
        Mode::Confirm => Line::from(Span::styled(
            " unsaved changes: s save  d discard  Esc stay",
            Style::default().fg(app.theme.yellow).bg(bg),
        )),
        Mode::Picker => with_hint(app, Vec::new(), "Enter open  Esc cancel", width),
        Mode::Navigate => navigate_line(app, width),
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn navigate_line<E: ChecklistFields>(app: &App<E>, width: usize) -> Line<'static> {
    let bg = app.theme.background;
    let message = if let Some(status) = &app.status {
        let color = if status.is_error {
            app.theme.red
        } else {
            app.theme.text
        };
        Some((status.text.clone(), color))
    } else if let Some(err) = app.controller.error() {
        Some((err, app.theme.red))
    } else if app.stale_on_disk {
        Some((
            "data changed on disk; r reloads after save or discard".to_string(),
            app.theme.yellow,
        ))
    } else {
        None
    };

    match message {
        Some((text, color)) => Line::from(Span::styled(
            format!(" {}", truncate_to_width(&text, width.saturating_sub(1))),
            Style::default().fg(color).bg(bg),
        )),
        None => with_hint(app, Vec::new(), NAVIGATE_HINT, width),
    }
}

/// Edit prompt with the cursor drawn at its byte offset
fn edit_line<E: ChecklistFields>(app: &App<E>, width: usize) -> Line<'static> {
    let bg = app.theme.background;
    let Some((target, input)) = &app.edit else {
        return Line::default();
    };
    let prompt = match target {
        EditTarget::Task(id) => format!(" task {}> ", id),
        EditTarget::Name => " name> ".to_string(),
        EditTarget::Field(field) => format!(" {}> ", field),
    };
    let (before, after) = input.buffer.split_at(input.cursor.min(input.buffer.len()));
    let spans = vec![
        Span::styled(prompt, Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(
            before.to_string(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ),
        Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)), // ▌ cursor
        Span::styled(
            after.to_string(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ),
    ];
    with_hint(app, spans, "Enter save  Esc cancel", width)
}

/// Right-align a dim hint after `spans` if it fits
fn with_hint<E: ChecklistFields>(
    app: &App<E>,
    mut spans: Vec<Span<'static>>,
    hint: &'static str,
    width: usize,
) -> Line<'static> {
    let bg = app.theme.background;
    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tui::app::TextInput;
    use crate::tui::input::test_support::*;
    use crate::tui::render::test_helpers::*;

    fn app() -> App<crate::model::OnboardingFields> {
        app_with(
            vec![record("A", "IT", &[("Laptop", false)])],
            Arc::new(RecordingService::default()),
        )
    }

    #[test]
    fn idle_row_shows_hints() {
        let app = app();
        let out = render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, &app, area));
        assert!(out.ends_with(NAVIGATE_HINT));
    }

    #[test]
    fn error_status_replaces_hints() {
        let mut app = app();
        app.set_error("save failed: backend unreachable");
        let out = render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, &app, area));
        assert_eq!(out, " save failed: backend unreachable");
    }

    #[test]
    fn edit_prompt_draws_cursor_mid_text() {
        let mut app = app();
        let mut input = TextInput::new("Laptop");
        input.left();
        input.left();
        app.edit = Some((EditTarget::Task(1.into()), input));
        app.mode = Mode::Edit;
        let out = render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, &app, area));
        assert!(out.starts_with(" task 1> Lapt\u{258C}op"));
        assert!(out.ends_with("Enter save  Esc cancel"));
    }
}
