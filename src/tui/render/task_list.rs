use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::checklist::ChecklistFields;
use crate::tui::app::{App, EditTarget, Mode};
use crate::util::unicode::{display_width, truncate_to_width};

/// Render the working copy's tasks, one per row, keeping the cursor in view
pub fn render_task_list<E: ChecklistFields>(frame: &mut Frame, app: &mut App<E>, area: Rect) {
    let bg = app.theme.background;
    let height = area.height as usize;
    let width = area.width as usize;
    if height == 0 {
        return;
    }

    let controller = &app.controller;
    if controller.current().is_none() {
        let text = if controller.is_loading() {
            " Loading checklists\u{2026}"
        } else {
            " Nothing to show. No checklists and no departments to start one."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(app.theme.dim).bg(bg))),
            area,
        );
        return;
    }

    let tasks = controller.tasks();
    if tasks.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                " No tasks yet. Press a to add one.",
                Style::default().fg(app.theme.dim).bg(bg),
            )),
            area,
        );
        return;
    }

    // Scroll so the cursor stays visible
    let cursor = app.task_cursor.min(tasks.len() - 1);
    if cursor < app.task_scroll {
        app.task_scroll = cursor;
    } else if cursor >= app.task_scroll + height {
        app.task_scroll = cursor + 1 - height;
    }
    let scroll = app.task_scroll;

    let id_width = tasks
        .iter()
        .map(|t| display_width(&t.id.to_string()))
        .max()
        .unwrap_or(1);

    let editing_id = match (&app.mode, &app.edit) {
        (Mode::Edit, Some((EditTarget::Task(id), _))) => Some(id),
        _ => None,
    };

    let mut lines: Vec<Line> = Vec::with_capacity(height);
    for (i, task) in tasks.iter().enumerate().skip(scroll).take(height) {
        let is_cursor = i == cursor;
        let row_bg = if is_cursor { app.theme.selection_bg } else { bg };
        let check_color = if task.is_done() {
            app.theme.green
        } else {
            app.theme.text
        };
        let text_style = if task.is_done() {
            Style::default().fg(app.theme.dim).bg(row_bg)
        } else {
            Style::default().fg(app.theme.text_bright).bg(row_bg)
        };

        let marker = if is_cursor { "\u{25B6}" } else { " " };
        let mut spans = vec![
            Span::styled(
                marker.to_string(),
                Style::default().fg(app.theme.highlight).bg(row_bg),
            ),
            Span::styled(
                format!("[{}] ", task.status.checkbox_char()),
                Style::default().fg(check_color).bg(row_bg),
            ),
            Span::styled(
                format!("{:>w$}  ", task.id.to_string(), w = id_width),
                Style::default().fg(app.theme.dim).bg(row_bg),
            ),
        ];
        let used = 1 + 4 + id_width + 2;
        let avail = width.saturating_sub(used);

        if editing_id.is_some_and(|id| id.matches(&task.id)) {
            spans.push(Span::styled(
                "(editing below)",
                Style::default()
                    .fg(app.theme.highlight)
                    .bg(row_bg)
                    .add_modifier(Modifier::ITALIC),
            ));
        } else if task.task.is_empty() {
            spans.push(Span::styled(
                "(empty)",
                Style::default().fg(app.theme.dim).bg(row_bg),
            ));
        } else {
            spans.push(Span::styled(truncate_to_width(&task.task, avail), text_style));
        }

        // Pad the cursor row so the selection background spans the width
        if is_cursor {
            let content: usize = spans.iter().map(|s| display_width(&s.content)).sum();
            if content < width {
                spans.push(Span::styled(
                    " ".repeat(width - content),
                    Style::default().bg(row_bg),
                ));
            }
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tui::input::test_support::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn tasks_render_with_checkboxes() {
        let mut app = app_with(
            vec![record("A", "IT", &[("Laptop", true), ("Badge", false)])],
            Arc::new(RecordingService::default()),
        );
        let out = render_to_string(TERM_W, 5, |frame, area| {
            render_task_list(frame, &mut app, area)
        });
        assert!(out.contains("[x] 1  Laptop"));
        assert!(out.contains("[ ] 2  Badge"));
        assert!(out.starts_with("\u{25B6}[x]"));
    }

    #[test]
    fn empty_task_list_hint() {
        let mut app = app_with(vec![record("A", "IT", &[])], Arc::new(RecordingService::default()));
        let out = render_to_string(TERM_W, 3, |frame, area| {
            render_task_list(frame, &mut app, area)
        });
        assert!(out.contains("No tasks yet. Press a to add one."));
    }

    #[test]
    fn scroll_follows_cursor() {
        let names: Vec<String> = (1..=10).map(|i| format!("Task {}", i)).collect();
        let tasks: Vec<(&str, bool)> = names.iter().map(|n| (n.as_str(), false)).collect();
        let mut app = app_with(vec![record("A", "IT", &tasks)], Arc::new(RecordingService::default()));
        app.task_cursor = 8;
        let out = render_to_string(TERM_W, 4, |frame, area| {
            render_task_list(frame, &mut app, area)
        });
        assert_eq!(app.task_scroll, 5);
        assert!(out.contains("Task 9"));
        assert!(!out.contains("Task 5"));
    }
}
