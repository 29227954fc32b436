use chrono::NaiveDate;

use crate::model::checklist::{ChecklistFields, ChecklistRecord};

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_TASK_LEN: usize = 500;

/// A shape problem that blocks saving
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("department is required")]
    MissingDepartment,
    #[error("{field} is longer than {max} characters")]
    TooLong { field: String, max: usize },
    #[error("task id {id} is used more than once")]
    DuplicateTaskId { id: String },
    #[error("{field} must be a date like 2025-01-31, got '{value}'")]
    BadDate { field: String, value: String },
}

/// Check a record before it is sent to the backend. Returns every problem
/// found, in field order.
pub fn validate_record<E: ChecklistFields>(record: &ChecklistRecord<E>) -> Vec<ValidationError> {
    let mut problems = Vec::new();

    if record.department.trim().is_empty() {
        problems.push(ValidationError::MissingDepartment);
    }
    if record.name.chars().count() > MAX_NAME_LEN {
        problems.push(ValidationError::TooLong {
            field: "name".into(),
            max: MAX_NAME_LEN,
        });
    }

    for field in E::date_fields() {
        let value = record.extra.field(field).unwrap_or("").trim();
        if !value.is_empty() && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
            problems.push(ValidationError::BadDate {
                field: (*field).to_string(),
                value: value.to_string(),
            });
        }
    }

    for (i, task) in record.tasks.iter().enumerate() {
        if record.tasks[..i].iter().any(|t| t.id.matches(&task.id)) {
            problems.push(ValidationError::DuplicateTaskId {
                id: task.id.to_string(),
            });
        }
        if task.task.chars().count() > MAX_TASK_LEN {
            problems.push(ValidationError::TooLong {
                field: format!("task {}", task.id),
                max: MAX_TASK_LEN,
            });
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::checklist::OnboardingFields;
    use crate::model::task::{Task, TaskStatus};
    use pretty_assertions::assert_eq;

    fn valid() -> ChecklistRecord<OnboardingFields> {
        ChecklistRecord {
            name: "Studio starter".into(),
            department: "Studio".into(),
            tasks: vec![Task::new(1, "Tablet", TaskStatus::Pending)],
            extra: OnboardingFields {
                position: "Animator".into(),
                start_date: "2025-03-01".into(),
            },
        }
    }

    #[test]
    fn valid_record_passes() {
        assert!(validate_record(&valid()).is_empty());
    }

    #[test]
    fn blank_start_date_is_allowed() {
        let mut rec = valid();
        rec.extra.start_date.clear();
        assert!(validate_record(&rec).is_empty());
    }

    #[test]
    fn collects_all_problems() {
        let mut rec = valid();
        rec.department = " ".into();
        rec.extra.start_date = "03/01/2025".into();
        rec.tasks.push(Task::new(1, "", TaskStatus::Pending));
        assert_eq!(
            validate_record(&rec),
            vec![
                ValidationError::MissingDepartment,
                ValidationError::BadDate {
                    field: "start_date".into(),
                    value: "03/01/2025".into(),
                },
                ValidationError::DuplicateTaskId { id: "1".into() },
            ]
        );
    }

    #[test]
    fn long_name_rejected() {
        let mut rec = valid();
        rec.name = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            validate_record(&rec),
            vec![ValidationError::TooLong {
                field: "name".into(),
                max: MAX_NAME_LEN
            }]
        );
    }
}
