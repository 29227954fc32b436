mod confirm;
mod edit;
mod navigate;
mod picker;

use crossterm::event::{KeyCode, KeyEvent};

use crate::model::checklist::ChecklistFields;

use super::app::{App, Mode};

use confirm::handle_confirm;
use edit::handle_edit;
use navigate::handle_navigate;
use picker::handle_picker;

/// Handle a key event in the current mode
pub fn handle_key<E: ChecklistFields>(app: &mut App<E>, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // Help overlay swallows the next key
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Messages and errors last until the next key
    if app.mode != Mode::Edit {
        app.status = None;
        app.controller.clear_action_error();
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Edit => handle_edit(app, key),
        Mode::Picker => handle_picker(app, key),
        Mode::Confirm => handle_confirm(app, key),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use serde_json::Value;

    use crate::io::service::{ChecklistService, Envelope, PositionRow, RecordKey, ServiceError};
    use crate::model::checklist::{ChecklistKind, ChecklistRecord, OnboardingFields};
    use crate::model::options::DepartmentOption;
    use crate::model::task::{Task, TaskStatus};
    use crate::sync::{ChecklistController, OptionsLoad, TemplatesLoad};
    use crate::tui::app::App;

    /// Records every save; can be told to reject them
    #[derive(Default)]
    pub struct RecordingService {
        pub saved: Mutex<Vec<Value>>,
        pub reject: bool,
    }

    impl ChecklistService for RecordingService {
        fn fetch_templates(&self, _: ChecklistKind) -> Result<Envelope<Vec<Value>>, ServiceError> {
            Ok(Envelope::ok(Vec::new()))
        }
        fn fetch_positions(&self) -> Result<Envelope<Vec<PositionRow>>, ServiceError> {
            Ok(Envelope::ok(Vec::new()))
        }
        fn fetch_departments(&self) -> Result<Envelope<Vec<DepartmentOption>>, ServiceError> {
            Ok(Envelope::ok(Vec::new()))
        }
        fn save_record(
            &self,
            _: ChecklistKind,
            record: &Value,
            _: Option<&RecordKey>,
        ) -> Result<Envelope<Value>, ServiceError> {
            if self.reject {
                return Err(ServiceError::Rejected("read-only".into()));
            }
            if let Ok(mut saved) = self.saved.lock() {
                saved.push(record.clone());
            }
            Ok(Envelope::ok(Value::Null))
        }
        fn describe(&self) -> String {
            "recording".into()
        }
    }

    pub fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub fn record(name: &str, dept: &str, tasks: &[(&str, bool)]) -> ChecklistRecord<OnboardingFields> {
        ChecklistRecord {
            name: name.into(),
            department: dept.into(),
            tasks: tasks
                .iter()
                .enumerate()
                .map(|(i, (text, done))| {
                    Task::new(i as u64 + 1, *text, TaskStatus::from_done(*done))
                })
                .collect(),
            extra: OnboardingFields::default(),
        }
    }

    /// An app with `records` already loaded and a couple of departments
    pub fn app_with(
        records: Vec<ChecklistRecord<OnboardingFields>>,
        service: Arc<RecordingService>,
    ) -> App<OnboardingFields> {
        let mut controller = ChecklistController::new(ChecklistKind::Onboarding, None);
        let ticket = controller.begin_load();
        controller.apply_templates(
            ticket,
            TemplatesLoad {
                records,
                error: None,
            },
        );
        let mut options = OptionsLoad::default();
        options.options.departments = vec![
            DepartmentOption {
                id: 1,
                name: "IT".into(),
            },
            DepartmentOption {
                id: 2,
                name: "Studio".into(),
            },
        ];
        options.options.position_names = vec!["Animator".into(), "Editor".into()];
        controller.apply_options(ticket, options);
        App::new(controller, service)
    }
}
