use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::checklist::ChecklistFields;
use crate::ops::search::filter_records;
use crate::sync::NavIntent;
use crate::tui::app::{App, EditTarget, Mode, PickerState};

pub(super) fn handle_navigate<E: ChecklistFields>(app: &mut App<E>, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Leave (guarded)
        (KeyModifiers::NONE, KeyCode::Char('q')) | (_, KeyCode::Esc) => {
            app.navigate(NavIntent::Leave)
        }
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => app.navigate(NavIntent::Leave),

        // Records
        (KeyModifiers::NONE, KeyCode::Char('n') | KeyCode::Char('l') | KeyCode::Right) => {
            app.navigate(NavIntent::Next)
        }
        (KeyModifiers::NONE, KeyCode::Char('p') | KeyCode::Char('h') | KeyCode::Left) => {
            app.navigate(NavIntent::Previous)
        }
        (KeyModifiers::NONE, KeyCode::Char('/')) => open_picker(app),
        (KeyModifiers::NONE, KeyCode::Char('r')) => app.navigate(NavIntent::Reload),

        // Task cursor
        (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
            if app.task_cursor + 1 < app.controller.tasks().len() {
                app.task_cursor += 1;
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
            app.task_cursor = app.task_cursor.saturating_sub(1);
        }
        (KeyModifiers::NONE, KeyCode::Char('g') | KeyCode::Home) => app.task_cursor = 0,
        (_, KeyCode::Char('G')) | (KeyModifiers::NONE, KeyCode::End) => {
            app.task_cursor = app.controller.tasks().len().saturating_sub(1);
        }

        // Task edits
        (KeyModifiers::NONE, KeyCode::Char(' ') | KeyCode::Char('x')) => toggle_selected(app),
        (KeyModifiers::NONE, KeyCode::Char('a')) => add_task(app),
        (KeyModifiers::NONE, KeyCode::Char('e') | KeyCode::Enter) => edit_selected(app),
        (KeyModifiers::NONE, KeyCode::Char('d')) => delete_selected(app),

        // Record fields
        (_, KeyCode::Char('N')) => {
            let name = app
                .controller
                .working_copy()
                .map(|r| r.name)
                .unwrap_or_default();
            if app.controller.current().is_some() {
                app.begin_edit(EditTarget::Name, &name);
            }
        }
        (_, KeyCode::Char('F')) => edit_date_field(app),
        (_, KeyCode::Char('D')) => cycle_department(app),
        (_, KeyCode::Char('P')) => cycle_position(app),

        // Save / revert
        (KeyModifiers::NONE, KeyCode::Char('s')) | (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            app.save()
        }
        (KeyModifiers::NONE, KeyCode::Char('u')) => {
            if app.controller.is_dirty() {
                app.controller.discard_changes();
                app.clamp_task_cursor();
                app.set_status("changes discarded");
            }
        }

        (_, KeyCode::Char('?')) => app.show_help = true,
        _ => {}
    }
}

fn open_picker<E: ChecklistFields>(app: &mut App<E>) {
    if app.controller.records().is_empty() {
        app.set_status("no records to pick from");
        return;
    }
    let hits = filter_records(app.controller.records(), "");
    app.picker = Some(PickerState {
        hits,
        ..PickerState::default()
    });
    app.mode = Mode::Picker;
}

fn toggle_selected<E: ChecklistFields>(app: &mut App<E>) {
    let Some(task) = app.controller.tasks().get(app.task_cursor).cloned() else {
        return;
    };
    if let Err(e) = app.controller.toggle_task_status(&task.id, !task.is_done()) {
        app.set_error(e.to_string());
    }
}

fn add_task<E: ChecklistFields>(app: &mut App<E>) {
    match app.controller.add_task() {
        Ok(id) => {
            app.task_cursor = app.controller.tasks().len().saturating_sub(1);
            app.begin_edit(EditTarget::Task(id), "");
        }
        Err(e) => app.set_error(e.to_string()),
    }
}

fn edit_selected<E: ChecklistFields>(app: &mut App<E>) {
    let Some(task) = app.controller.tasks().get(app.task_cursor).cloned() else {
        return;
    };
    app.begin_edit(EditTarget::Task(task.id), &task.task);
}

fn delete_selected<E: ChecklistFields>(app: &mut App<E>) {
    let Some(id) = app.selected_task_id() else {
        return;
    };
    match app.controller.remove_task(&id) {
        Ok(task) => {
            app.clamp_task_cursor();
            app.set_status(format!("removed task {}", task.id));
        }
        Err(e) => app.set_error(e.to_string()),
    }
}

fn edit_date_field<E: ChecklistFields>(app: &mut App<E>) {
    let Some(field) = E::date_fields().first().copied() else {
        return;
    };
    let Some(record) = app.controller.current() else {
        return;
    };
    let value = record.extra.field(field).unwrap_or("").to_string();
    app.begin_edit(EditTarget::Field(field), &value);
}

fn cycle_department<E: ChecklistFields>(app: &mut App<E>) {
    match app.controller.cycle_department(1) {
        Ok(Some(name)) => app.set_status(format!("department: {}", name)),
        Ok(None) => app.set_status("no department options loaded"),
        Err(e) => app.set_error(e.to_string()),
    }
}

fn cycle_position<E: ChecklistFields>(app: &mut App<E>) {
    match app.controller.cycle_position(1) {
        Ok(Some(name)) => app.set_status(format!("position: {}", name)),
        Ok(None) => app.set_status("no position options loaded"),
        Err(e) => app.set_error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyCode;

    use crate::sync::NavIntent;
    use crate::tui::app::Mode;
    use crate::tui::input::handle_key;
    use crate::tui::input::test_support::*;

    #[test]
    fn space_toggles_selected_task() {
        let mut app = app_with(
            vec![record("Desk", "IT", &[("Laptop", false), ("Badge", false)])],
            Arc::new(RecordingService::default()),
        );
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Char(' ')));
        assert!(app.controller.tasks()[1].is_done());
        assert!(app.controller.is_dirty());
        assert_eq!(app.controller.completion_percentage(), 50);
    }

    #[test]
    fn dirty_next_opens_confirm() {
        let mut app = app_with(
            vec![
                record("A", "IT", &[("Laptop", false)]),
                record("B", "Studio", &[]),
            ],
            Arc::new(RecordingService::default()),
        );
        handle_key(&mut app, key(KeyCode::Char('x')));
        handle_key(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.mode, Mode::Confirm);
        assert_eq!(app.controller.pending_navigation(), Some(&NavIntent::Next));
        assert_eq!(app.controller.current_index(), 0);
    }

    #[test]
    fn add_opens_edit_line_for_new_task() {
        let mut app = app_with(
            vec![record("A", "IT", &[("Laptop", false)])],
            Arc::new(RecordingService::default()),
        );
        handle_key(&mut app, key(KeyCode::Char('a')));
        assert_eq!(app.mode, Mode::Edit);
        assert_eq!(app.controller.tasks().len(), 2);
        assert_eq!(app.task_cursor, 1);
    }

    #[test]
    fn clean_quit_leaves_immediately() {
        let mut app = app_with(vec![record("A", "IT", &[])], Arc::new(RecordingService::default()));
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
