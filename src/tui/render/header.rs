use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};

use crate::model::checklist::ChecklistFields;
use crate::ops::task_ops;
use crate::tui::app::App;
use crate::util::unicode::truncate_to_width;

/// Title line, field line, completion gauge and a separator
pub fn render_header<E: ChecklistFields>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let bg = app.theme.background;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let controller = &app.controller;
    let width = area.width as usize;

    // Title
    let mut title = vec![Span::styled(
        format!(" {} ", controller.kind().title()),
        Style::default()
            .fg(app.theme.background)
            .bg(app.theme.highlight)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(record) = controller.current() {
        let position = if controller.is_placeholder() {
            "new".to_string()
        } else {
            format!("{}/{}", controller.current_index() + 1, controller.records().len())
        };
        let name = if record.name.trim().is_empty() {
            "(untitled)"
        } else {
            record.name.as_str()
        };
        title.push(Span::styled(
            format!(" {} ", truncate_to_width(name, width.saturating_sub(30))),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ));
        title.push(Span::styled(position, Style::default().fg(app.theme.dim).bg(bg)));
    }
    if controller.is_dirty() {
        title.push(Span::styled(
            "  \u{25CF} unsaved",
            Style::default().fg(app.theme.yellow).bg(bg),
        ));
    }
    if controller.is_loading() {
        title.push(Span::styled(
            "  loading\u{2026}",
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(title)), rows[0]);

    let Some(record) = controller.current() else {
        return;
    };

    // Department and extra fields
    let label = Style::default().fg(app.theme.dim).bg(bg);
    let value = Style::default().fg(app.theme.text).bg(bg);
    let dept = match controller.selected_department_id() {
        Some(id) => format!("{} (#{})", record.department, id),
        None if record.department.trim().is_empty() => "-".to_string(),
        None => format!("{} (unknown)", record.department),
    };
    let mut fields = vec![
        Span::styled(" department: ", label),
        Span::styled(dept, value),
    ];
    for name in E::field_names() {
        let v = record.extra.field(name).unwrap_or("");
        fields.push(Span::styled(format!("  {}: ", name), label));
        fields.push(Span::styled(
            if v.is_empty() { "-".to_string() } else { v.to_string() },
            value,
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(fields)), rows[1]);

    // Completion
    let percent = controller.completion_percentage();
    let (done, total) = task_ops::completion_counts(controller.tasks());
    let gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(app.theme.progress_color(percent))
                .bg(app.theme.selection_bg),
        )
        .percent(u16::from(percent))
        .label(format!("{}% ({}/{})", percent, done, total));
    let gauge_area = Rect {
        x: rows[2].x + 1,
        width: rows[2].width.saturating_sub(2),
        ..rows[2]
    };
    frame.render_widget(gauge, gauge_area);

    let sep = "\u{2500}".repeat(width);
    frame.render_widget(
        Paragraph::new(Span::styled(sep, Style::default().fg(app.theme.dim).bg(bg))),
        rows[3],
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tui::input::test_support::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn header_shows_position_fields_and_progress() {
        let mut app = app_with(
            vec![
                record("Studio starter", "Studio", &[("Tablet", true), ("Account", false)]),
                record("Desk", "IT", &[]),
            ],
            Arc::new(RecordingService::default()),
        );
        app.controller.set_extra_field("position", "Animator").unwrap();
        let out = render_to_string(TERM_W, 4, |frame, area| render_header(frame, &app, area));
        assert!(out.contains("Onboarding"));
        assert!(out.contains("Studio starter"));
        assert!(out.contains("1/2"));
        assert!(out.contains("unsaved"));
        assert!(out.contains("department: Studio (#2)"));
        assert!(out.contains("position: Animator"));
        assert!(out.contains("start_date: -"));
        assert!(out.contains("50% (1/2)"));
    }

    #[test]
    fn placeholder_header() {
        let app = app_with(vec![], Arc::new(RecordingService::default()));
        let out = render_to_string(TERM_W, 4, |frame, area| render_header(frame, &app, area));
        assert!(out.contains("(untitled)"));
        assert!(out.contains("new"));
        assert!(out.contains("department: IT (#1)"));
        assert!(out.contains("0% (0/0)"));
    }
}
