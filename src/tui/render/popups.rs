use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::checklist::ChecklistFields;
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

use super::{centered_rect_fixed, push_matched_spans};

// ---------------------------------------------------------------------------
// Record picker
// ---------------------------------------------------------------------------

/// Record picker: query line plus matching record labels
pub fn render_picker<E: ChecklistFields>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let Some(picker) = &app.picker else {
        return;
    };
    let bg = app.theme.background;
    let records = app.controller.records();

    let popup_w: u16 = 56.min(area.width.saturating_sub(2));
    let visible = (area.height.saturating_sub(6) as usize).clamp(1, 12);
    let popup_h = (visible as u16 + 4).min(area.height);
    let popup = centered_rect_fixed(popup_w, popup_h, area);
    let inner_w = popup_w.saturating_sub(2) as usize;

    frame.render_widget(Clear, popup);

    let mut lines: Vec<Line> = Vec::new();
    let (before, after) = picker
        .query
        .buffer
        .split_at(picker.query.cursor.min(picker.query.buffer.len()));
    lines.push(Line::from(vec![
        Span::styled(" / ", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(before.to_string(), Style::default().fg(app.theme.text_bright).bg(bg)),
        Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(after.to_string(), Style::default().fg(app.theme.text_bright).bg(bg)),
    ]));
    lines.push(Line::from(Span::styled(
        "\u{2500}".repeat(inner_w),
        Style::default().fg(app.theme.dim).bg(bg),
    )));

    if picker.hits.is_empty() {
        lines.push(Line::from(Span::styled(
            " no matches",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }

    let offset = picker.cursor.saturating_sub(visible.saturating_sub(1));
    for (row, hit) in picker.hits.iter().enumerate().skip(offset).take(visible) {
        let Some(record) = records.get(hit.index) else {
            continue;
        };
        let is_cursor = row == picker.cursor;
        let row_bg = if is_cursor { app.theme.selection_bg } else { bg };
        let base = Style::default().fg(app.theme.text).bg(row_bg);
        let matched = Style::default()
            .fg(app.theme.match_fg)
            .bg(row_bg)
            .add_modifier(Modifier::BOLD);

        let number = format!(" {:>3} ", hit.index + 1);
        let dept = format!("  {}", record.department.trim());
        let label_w = inner_w.saturating_sub(display_width(&number) + display_width(&dept));
        let label = record.label();

        let mut spans = vec![Span::styled(number, Style::default().fg(app.theme.dim).bg(row_bg))];
        if display_width(label) <= label_w {
            push_matched_spans(&mut spans, label, &hit.matched, base, matched);
            let pad = label_w - display_width(label);
            spans.push(Span::styled(" ".repeat(pad), Style::default().bg(row_bg)));
        } else {
            let cut = truncate_to_width(label, label_w);
            spans.push(Span::styled(cut, base));
        }
        spans.push(Span::styled(dept, Style::default().fg(app.theme.dim).bg(row_bg)));
        lines.push(Line::from(spans));
    }

    let title = format!(" {} ({}/{}) ", app.controller.kind().title(), picker.hits.len(), records.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .title(Span::styled(title, Style::default().fg(app.theme.text_bright).bg(bg)))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

// ---------------------------------------------------------------------------
// Unsaved-changes prompt
// ---------------------------------------------------------------------------

/// Prompt shown while a navigation waits on unsaved edits
pub fn render_confirm<E: ChecklistFields>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let bg = app.theme.background;
    let popup = centered_rect_fixed(48, 7, area);
    frame.render_widget(Clear, popup);

    let label = app
        .controller
        .current()
        .map(|r| r.label().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "this checklist".to_string());
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(app.theme.text).bg(bg);

    let lines = vec![
        Line::from(Span::styled(
            format!(" {} has unsaved changes.", truncate_to_width(&label, 24)),
            Style::default().fg(app.theme.text_bright).bg(bg),
        )),
        Line::from(""),
        Line::from(vec![Span::styled(" s", key_style), Span::styled("  save, then continue", text_style)]),
        Line::from(vec![Span::styled(" d", key_style), Span::styled("  discard, then continue", text_style)]),
        Line::from(vec![Span::styled(" Esc", key_style), Span::styled(" stay here", text_style)]),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.yellow).bg(bg))
        .title(Span::styled(" Unsaved changes ", Style::default().fg(app.theme.yellow).bg(bg)))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

// ---------------------------------------------------------------------------
// Help
// ---------------------------------------------------------------------------

const BINDINGS: &[(&str, &str)] = &[
    ("n / p", "Next / previous checklist"),
    ("/", "Find a checklist by name"),
    ("r", "Reload from the backend"),
    ("j / k", "Move task cursor"),
    ("space / x", "Toggle task done"),
    ("a", "Add a task"),
    ("e / Enter", "Edit task text"),
    ("d", "Remove task"),
    ("N", "Edit checklist name"),
    ("F", "Edit date field"),
    ("D / P", "Cycle department / position"),
    ("s", "Save"),
    ("u", "Discard unsaved changes"),
    ("q / Esc", "Quit"),
];

/// Key binding overlay (toggled with ?)
pub fn render_help<E: ChecklistFields>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let bg = app.theme.background;
    let popup = centered_rect_fixed(50, BINDINGS.len() as u16 + 4, area);
    frame.render_widget(Clear, popup);

    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);

    let mut lines: Vec<Line> = Vec::with_capacity(BINDINGS.len() + 2);
    for (key, desc) in BINDINGS {
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<12}", key), key_style),
            Span::styled(*desc, desc_style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " any key closes",
        Style::default().fg(app.theme.dim).bg(bg),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .title(Span::styled(" Keys ", Style::default().fg(app.theme.text_bright).bg(bg)))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyCode;

    use crate::tui::input::handle_key;
    use crate::tui::input::test_support::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn picker_lists_matches_with_numbers() {
        let mut app = app_with(
            vec![
                record("Desk setup", "IT", &[]),
                record("Studio starter", "Studio", &[]),
            ],
            Arc::new(RecordingService::default()),
        );
        handle_key(&mut app, key(KeyCode::Char('/')));
        handle_key(&mut app, key(KeyCode::Char('s')));
        handle_key(&mut app, key(KeyCode::Char('t')));
        let out = render_app(&mut app);
        assert!(out.contains("/ st\u{258C}"));
        assert!(out.contains("Onboarding (2/2)"));
        assert!(out.contains("2 Studio starter"));
    }

    #[test]
    fn confirm_prompt_names_the_record() {
        let mut app = app_with(
            vec![record("Desk setup", "IT", &[("Laptop", false)]), record("B", "IT", &[])],
            Arc::new(RecordingService::default()),
        );
        handle_key(&mut app, key(KeyCode::Char('x')));
        handle_key(&mut app, key(KeyCode::Char('n')));
        let out = render_app(&mut app);
        assert!(out.contains("Desk setup has unsaved changes."));
        assert!(out.contains("discard, then continue"));
        assert!(out.contains("unsaved changes: s save"));
    }

    #[test]
    fn help_overlay_lists_bindings() {
        let mut app = app_with(vec![record("A", "IT", &[])], Arc::new(RecordingService::default()));
        handle_key(&mut app, key(KeyCode::Char('?')));
        let out = render_app(&mut app);
        assert!(out.contains("Toggle task done"));
        assert!(out.contains("any key closes"));
    }
}
