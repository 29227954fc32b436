use indexmap::IndexMap;
use serde::Serialize;

use crate::model::checklist::{ChecklistFields, ChecklistKind, ChecklistRecord};
use crate::model::options::{DepartmentOption, OptionSet};
use crate::model::task::Task;
use crate::ops::search::PickerHit;
use crate::ops::task_ops;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct RecordSummaryJson {
    pub index: usize,
    pub name: String,
    pub department: String,
    pub done: usize,
    pub total: usize,
    pub percent: u8,
}

#[derive(Serialize)]
pub struct RecordListJson {
    pub kind: ChecklistKind,
    pub records: Vec<RecordSummaryJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct RecordJson {
    pub kind: ChecklistKind,
    /// Position in the record list; None for an unsaved placeholder
    pub index: Option<usize>,
    pub placeholder: bool,
    pub name: String,
    pub department: String,
    pub department_id: Option<u64>,
    pub fields: IndexMap<String, String>,
    pub tasks: Vec<Task>,
    pub percent: u8,
}

#[derive(Serialize)]
pub struct OptionsJson<'a> {
    pub positions: &'a [String],
    pub departments: &'a [DepartmentOption],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct FindHitJson {
    pub index: usize,
    pub label: String,
    pub matched: Vec<usize>,
}

pub fn summary_to_json<E: ChecklistFields>(
    index: usize,
    record: &ChecklistRecord<E>,
) -> RecordSummaryJson {
    let (done, total) = task_ops::completion_counts(&record.tasks);
    RecordSummaryJson {
        index,
        name: record.name.clone(),
        department: record.department.clone(),
        done,
        total,
        percent: task_ops::completion_percentage(&record.tasks),
    }
}

pub fn record_to_json<E: ChecklistFields>(
    kind: ChecklistKind,
    index: Option<usize>,
    department_id: Option<u64>,
    record: &ChecklistRecord<E>,
) -> RecordJson {
    RecordJson {
        kind,
        index,
        placeholder: index.is_none(),
        name: record.name.clone(),
        department: record.department.clone(),
        department_id,
        fields: extra_fields(record),
        tasks: record.tasks.clone(),
        percent: task_ops::completion_percentage(&record.tasks),
    }
}

fn extra_fields<E: ChecklistFields>(record: &ChecklistRecord<E>) -> IndexMap<String, String> {
    E::field_names()
        .iter()
        .map(|name| {
            (
                (*name).to_string(),
                record.extra.field(name).unwrap_or("").to_string(),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn display_name<E: ChecklistFields>(record: &ChecklistRecord<E>) -> &str {
    if record.name.trim().is_empty() {
        "(untitled)"
    } else {
        record.name.trim()
    }
}

/// One-line summary: `#1 Studio starter [Studio] 1/2 done (50%)`
pub fn format_record_line<E: ChecklistFields>(index: usize, record: &ChecklistRecord<E>) -> String {
    let (done, total) = task_ops::completion_counts(&record.tasks);
    format!(
        "#{} {} [{}] {}/{} done ({}%)",
        index + 1,
        display_name(record),
        record.department,
        done,
        total,
        task_ops::completion_percentage(&record.tasks)
    )
}

pub fn format_record_listing<E: ChecklistFields>(
    kind: ChecklistKind,
    records: &[ChecklistRecord<E>],
) -> Vec<String> {
    let mut lines = vec![format!("{} checklists ({})", kind.title(), records.len())];
    lines.extend(
        records
            .iter()
            .enumerate()
            .map(|(i, r)| format_record_line(i, r)),
    );
    lines
}

/// A task line: `[x] 1 Tablet`
pub fn format_task_line(task: &Task) -> String {
    format!("[{}] {} {}", task.status.checkbox_char(), task.id, task.task)
}

/// Detailed record view. `position` is `(index, len)` for a listed record,
/// None for a placeholder.
pub fn format_record_detail<E: ChecklistFields>(
    record: &ChecklistRecord<E>,
    position: Option<(usize, usize)>,
    department_id: Option<u64>,
) -> Vec<String> {
    let mut lines = Vec::new();
    match position {
        Some((i, len)) => lines.push(format!("{} ({}/{})", display_name(record), i + 1, len)),
        None => lines.push(format!("{} (new, not saved)", display_name(record))),
    }

    let dept = match department_id {
        Some(id) => format!("department: {} (#{})", record.department, id),
        None => format!("department: {}", record.department),
    };
    lines.push(dept);
    for name in E::field_names() {
        let value = record.extra.field(name).unwrap_or("");
        if !value.is_empty() {
            lines.push(format!("{}: {}", name, value));
        }
    }
    let (done, total) = task_ops::completion_counts(&record.tasks);
    lines.push(format!(
        "progress: {}/{} ({}%)",
        done,
        total,
        task_ops::completion_percentage(&record.tasks)
    ));

    if !record.tasks.is_empty() {
        lines.push(String::new());
        lines.extend(record.tasks.iter().map(format_task_line));
    }
    lines
}

pub fn format_options(options: &OptionSet) -> Vec<String> {
    let mut lines = vec![format!("positions ({})", options.position_names.len())];
    lines.extend(options.position_names.iter().cloned());
    lines.push(String::new());
    lines.push(format!("departments ({})", options.departments.len()));
    lines.extend(
        options
            .departments
            .iter()
            .map(|d| format!("{} {}", d.id, d.name)),
    );
    lines
}

pub fn format_find_hits<E: ChecklistFields>(
    records: &[ChecklistRecord<E>],
    hits: &[PickerHit],
) -> Vec<String> {
    if hits.is_empty() {
        return vec!["no matches".to_string()];
    }
    hits.iter()
        .filter_map(|h| records.get(h.index).map(|r| (h.index, r)))
        .map(|(i, r)| format!("#{} {} [{}]", i + 1, display_name(r), r.department))
        .collect()
}
