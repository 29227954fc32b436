use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::checklist::ChecklistFields;
use crate::sync::Resolution;
use crate::tui::app::App;

/// Unsaved-changes prompt: s saves, d discards, Esc stays
pub(super) fn handle_confirm<E: ChecklistFields>(app: &mut App<E>, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('s') | KeyCode::Char('y')) => {
            app.resolve(Resolution::SaveThenProceed)
        }
        (KeyModifiers::NONE, KeyCode::Char('d')) => app.resolve(Resolution::Discard),
        (KeyModifiers::NONE, KeyCode::Char('c') | KeyCode::Char('n')) | (_, KeyCode::Esc) => {
            app.resolve(Resolution::Stay)
        }
        _ => {}
    }
}
