use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::checklist::ChecklistFields;
use crate::tui::app::{App, EditTarget, Mode};

pub(super) fn handle_edit<E: ChecklistFields>(app: &mut App<E>, key: KeyEvent) {
    let Some((_, input)) = app.edit.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };

    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => commit(app),
        (_, KeyCode::Esc) => {
            app.edit = None;
            app.mode = Mode::Navigate;
        }
        (_, KeyCode::Backspace) => input.backspace(),
        (_, KeyCode::Delete) => input.delete(),
        (_, KeyCode::Left) => input.left(),
        (_, KeyCode::Right) => input.right(),
        (_, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => input.home(),
        (_, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => input.end(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
            input.buffer.clear();
            input.cursor = 0;
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => input.insert(c),
        _ => {}
    }
}

/// Write the edit line back through the controller
fn commit<E: ChecklistFields>(app: &mut App<E>) {
    app.mode = Mode::Navigate;
    let Some((target, input)) = app.edit.take() else {
        return;
    };
    let result = match &target {
        EditTarget::Task(id) => app.controller.update_task_text(id, &input.buffer),
        EditTarget::Name => app.controller.set_name(input.buffer.trim()),
        EditTarget::Field(field) => app.controller.set_extra_field(field, input.buffer.trim()),
    };
    if let Err(e) = result {
        app.set_error(e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyCode;

    use crate::tui::app::Mode;
    use crate::tui::input::handle_key;
    use crate::tui::input::test_support::*;

    fn type_str(app: &mut crate::tui::app::App<crate::model::OnboardingFields>, s: &str) {
        for c in s.chars() {
            handle_key(app, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typed_text_lands_in_new_task() {
        let mut app = app_with(vec![record("A", "IT", &[])], Arc::new(RecordingService::default()));
        handle_key(&mut app, key(KeyCode::Char('a')));
        type_str(&mut app, "Parking pass");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.controller.tasks()[0].task, "Parking pass");
    }

    #[test]
    fn escape_keeps_original_text() {
        let mut app = app_with(
            vec![record("A", "IT", &[("Laptop", false)])],
            Arc::new(RecordingService::default()),
        );
        handle_key(&mut app, key(KeyCode::Char('e')));
        handle_key(&mut app, key(KeyCode::Backspace));
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.controller.tasks()[0].task, "Laptop");
        assert!(!app.controller.is_dirty());
    }

    #[test]
    fn bad_date_is_accepted_until_save() {
        let service = Arc::new(RecordingService::default());
        let mut app = app_with(vec![record("A", "IT", &[])], service.clone());
        handle_key(&mut app, key(KeyCode::Char('F')));
        type_str(&mut app, "soon");
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.controller.is_dirty());

        handle_key(&mut app, key(KeyCode::Char('s')));
        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("start_date"));
        assert!(service.saved.lock().unwrap().is_empty());
    }
}
