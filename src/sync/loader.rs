//! Option and template loaders.
//!
//! Loaders never fail: every problem is folded into an error string next
//! to whatever data could be salvaged. The threaded variant posts results
//! to the UI loop over a channel; the blocking variant is used by the CLI.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use indexmap::IndexSet;
use tracing::{debug, info, warn};

use crate::io::service::{ChecklistService, PositionRow, ServiceError};
use crate::model::checklist::{ChecklistFields, ChecklistKind, ChecklistRecord};
use crate::model::options::{DepartmentOption, OptionSet};
use crate::sync::controller::{ChecklistController, LoadTicket};

/// Result of the Option Loader
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsLoad {
    pub options: OptionSet,
    pub error: Option<String>,
}

impl OptionsLoad {
    pub fn failed(error: impl Into<String>) -> Self {
        OptionsLoad {
            options: OptionSet::default(),
            error: Some(error.into()),
        }
    }
}

/// Result of the Template Loader
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatesLoad<E> {
    pub records: Vec<ChecklistRecord<E>>,
    pub error: Option<String>,
}

impl<E> TemplatesLoad<E> {
    pub fn failed(error: impl Into<String>) -> Self {
        TemplatesLoad {
            records: Vec::new(),
            error: Some(error.into()),
        }
    }
}

impl<E> Default for TemplatesLoad<E> {
    fn default() -> Self {
        TemplatesLoad {
            records: Vec::new(),
            error: None,
        }
    }
}

/// Message from a loader thread to the UI loop
#[derive(Debug)]
pub enum LoadEvent<E> {
    Options(LoadTicket, OptionsLoad),
    Templates(LoadTicket, TemplatesLoad<E>),
}

// ---------------------------------------------------------------------------
// Option Loader
// ---------------------------------------------------------------------------

/// Fetch positions and departments concurrently. A failure of one list
/// keeps the other.
pub fn load_options(service: &dyn ChecklistService) -> OptionsLoad {
    let (positions, departments) = thread::scope(|s| {
        let positions = s.spawn(|| service.fetch_positions().and_then(|e| e.into_result()));
        let departments = service
            .fetch_departments()
            .and_then(|e| e.into_result());
        let positions = positions
            .join()
            .unwrap_or_else(|_| Err(panicked("positions")));
        (positions, departments)
    });

    let mut errors = Vec::new();
    let positions = positions.unwrap_or_else(|e| {
        warn!(error = %e, "position load failed");
        errors.push(format!("positions: {}", e));
        Vec::new()
    });
    let departments = departments.unwrap_or_else(|e| {
        warn!(error = %e, "department load failed");
        errors.push(format!("departments: {}", e));
        Vec::new()
    });

    let options = build_option_set(positions, departments);
    info!(
        positions = options.position_names.len(),
        departments = options.departments.len(),
        "options loaded"
    );
    OptionsLoad {
        options,
        error: join_errors(errors),
    }
}

/// Dedupe position names (first seen wins, blanks dropped) and sort
/// departments by name.
pub fn build_option_set(
    positions: Vec<PositionRow>,
    mut departments: Vec<DepartmentOption>,
) -> OptionSet {
    let names: IndexSet<String> = positions
        .into_iter()
        .map(|p| p.name.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();

    departments.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    OptionSet {
        position_names: names.into_iter().collect(),
        departments,
    }
}

// ---------------------------------------------------------------------------
// Template Loader
// ---------------------------------------------------------------------------

/// Fetch and normalize the checklist records of one kind
pub fn load_templates<E: ChecklistFields>(
    service: &dyn ChecklistService,
    kind: ChecklistKind,
) -> TemplatesLoad<E> {
    let rows = match service.fetch_templates(kind).and_then(|e| e.into_result()) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(%kind, error = %e, "template load failed");
            return TemplatesLoad::failed(format!("templates: {}", e));
        }
    };

    let (records, skipped) = normalize_rows(rows);
    info!(%kind, records = records.len(), skipped, "templates loaded");
    TemplatesLoad {
        records,
        error: (skipped > 0).then(|| format!("skipped {} malformed record(s)", skipped)),
    }
}

/// Turn raw rows into typed records. Rows that do not fit are skipped and
/// counted.
pub fn normalize_rows<E: ChecklistFields>(
    rows: Vec<serde_json::Value>,
) -> (Vec<ChecklistRecord<E>>, usize) {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for (i, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<ChecklistRecord<E>>(row) {
            Ok(rec) => records.push(rec),
            Err(e) => {
                debug!(row = i, error = %e, "skipping malformed template row");
                skipped += 1;
            }
        }
    }
    (records, skipped)
}

// ---------------------------------------------------------------------------
// Drivers
// ---------------------------------------------------------------------------

/// Run both loaders on worker threads, posting results tagged with `ticket`.
/// Send errors mean the receiver is gone and are ignored.
pub fn spawn_load<E: ChecklistFields>(
    service: Arc<dyn ChecklistService>,
    kind: ChecklistKind,
    ticket: LoadTicket,
    tx: Sender<LoadEvent<E>>,
) {
    let options_service = Arc::clone(&service);
    let options_tx = tx.clone();
    thread::spawn(move || {
        let load = load_options(options_service.as_ref());
        let _ = options_tx.send(LoadEvent::Options(ticket, load));
    });

    thread::spawn(move || {
        let load = load_templates::<E>(service.as_ref(), kind);
        let _ = tx.send(LoadEvent::Templates(ticket, load));
    });
}

/// Run both loaders concurrently and apply them to `controller`.
///
/// Templates are applied first so the result does not depend on which
/// request finished first.
pub fn load_blocking<E: ChecklistFields>(
    controller: &mut ChecklistController<E>,
    service: &dyn ChecklistService,
) {
    let ticket = controller.begin_load();
    let kind = controller.kind();
    let (options, templates) = thread::scope(|s| {
        let options = s.spawn(|| load_options(service));
        let templates = load_templates::<E>(service, kind);
        let options = options
            .join()
            .unwrap_or_else(|_| OptionsLoad::failed("options loader panicked"));
        (options, templates)
    });
    controller.apply_templates(ticket, templates);
    controller.apply_options(ticket, options);
}

fn panicked(what: &str) -> ServiceError {
    ServiceError::Transport(format!("{} loader panicked", what))
}

fn join_errors(errors: Vec<String>) -> Option<String> {
    if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::checklist::OnboardingFields;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pos(name: &str) -> PositionRow {
        PositionRow { name: name.into() }
    }

    fn dept(id: u64, name: &str) -> DepartmentOption {
        DepartmentOption {
            id,
            name: name.into(),
        }
    }

    #[test]
    fn positions_deduped_in_first_seen_order() {
        let set = build_option_set(
            vec![pos("Editor"), pos("Animator"), pos("Editor"), pos("  "), pos("Rigger")],
            vec![],
        );
        assert_eq!(set.position_names, vec!["Editor", "Animator", "Rigger"]);
    }

    #[test]
    fn departments_sorted_by_name() {
        let set = build_option_set(
            vec![],
            vec![dept(3, "Studio"), dept(1, "finance"), dept(2, "IT")],
        );
        let names: Vec<&str> = set.departments.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["finance", "IT", "Studio"]);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let rows = vec![
            json!({"name": "A", "department": "IT"}),
            json!("not a record"),
            json!({"name": "B", "department": "HR", "tasks": [{"id": 1, "task": "x"}]}),
            json!({"name": "C", "tasks": "oops"}),
        ];
        let (records, skipped) = normalize_rows::<OnboardingFields>(rows);
        assert_eq!(skipped, 2);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(records[1].tasks.len(), 1);
    }
}
