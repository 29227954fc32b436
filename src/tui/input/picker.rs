use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::checklist::ChecklistFields;
use crate::ops::search::filter_records;
use crate::sync::NavIntent;
use crate::tui::app::{App, Mode};

pub(super) fn handle_picker<E: ChecklistFields>(app: &mut App<E>, key: KeyEvent) {
    let Some(picker) = app.picker.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };

    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => close(app),
        (_, KeyCode::Enter) => {
            let chosen = picker.hits.get(picker.cursor).map(|h| h.index);
            close(app);
            if let Some(index) = chosen {
                app.navigate(NavIntent::Select(index));
            }
        }
        (_, KeyCode::Down) | (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
            if picker.cursor + 1 < picker.hits.len() {
                picker.cursor += 1;
            }
        }
        (_, KeyCode::Up) | (KeyModifiers::CONTROL, KeyCode::Char('p')) => {
            picker.cursor = picker.cursor.saturating_sub(1);
        }
        (_, KeyCode::Backspace) => {
            picker.query.backspace();
            refilter(app);
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => {
            picker.query.insert(c);
            refilter(app);
        }
        _ => {}
    }
}

fn close<E: ChecklistFields>(app: &mut App<E>) {
    app.picker = None;
    app.mode = Mode::Navigate;
}

fn refilter<E: ChecklistFields>(app: &mut App<E>) {
    let records = app.controller.records();
    if let Some(picker) = app.picker.as_mut() {
        picker.hits = filter_records(records, &picker.query.buffer);
        picker.cursor = 0;
    }
}
