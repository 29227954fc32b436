//! Pure reconciliation decisions.
//!
//! The controller owns the state; these functions only decide which record
//! to show given what has arrived so far.

use crate::model::checklist::{ChecklistFields, ChecklistRecord, same_label};
use crate::model::options::DepartmentOption;

/// Why a record was chosen for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Matched the target hint on name or department
    Target(usize),
    /// Genuine record that supersedes the displayed placeholder
    PlaceholderMatch(usize),
    /// Nothing better: first record
    First,
}

impl Selection {
    pub fn index(self) -> usize {
        match self {
            Selection::Target(i) | Selection::PlaceholderMatch(i) => i,
            Selection::First => 0,
        }
    }
}

/// First record whose name or department equals `target`, ignoring case.
pub fn find_target<E: ChecklistFields>(
    records: &[ChecklistRecord<E>],
    target: &str,
) -> Option<usize> {
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    records
        .iter()
        .position(|r| same_label(&r.name, target) || same_label(&r.department, target))
}

/// First genuine record that should replace a placeholder for
/// `placeholder_department`: same department and at least one task.
pub fn placeholder_replacement<E: ChecklistFields>(
    records: &[ChecklistRecord<E>],
    placeholder_department: &str,
) -> Option<usize> {
    records
        .iter()
        .position(|r| !r.tasks.is_empty() && same_label(&r.department, placeholder_department))
}

/// Pick the record to display once templates arrive.
///
/// `placeholder_department` is set when a clean placeholder is currently
/// displayed. Order: target hint, then placeholder replacement, then the
/// first record. Returns None for an empty list.
pub fn choose_selection<E: ChecklistFields>(
    records: &[ChecklistRecord<E>],
    target: Option<&str>,
    placeholder_department: Option<&str>,
) -> Option<Selection> {
    if records.is_empty() {
        return None;
    }
    if let Some(i) = target.and_then(|t| find_target(records, t)) {
        return Some(Selection::Target(i));
    }
    if let Some(i) = placeholder_department.and_then(|d| placeholder_replacement(records, d)) {
        return Some(Selection::PlaceholderMatch(i));
    }
    Some(Selection::First)
}

/// Placeholder for the first department option, if there is one
pub fn synthesize_placeholder<E: ChecklistFields>(
    departments: &[DepartmentOption],
) -> Option<ChecklistRecord<E>> {
    departments
        .first()
        .map(|d| ChecklistRecord::placeholder(d.name.clone()))
}

/// Exact-name department lookup
pub fn department_id(departments: &[DepartmentOption], name: &str) -> Option<u64> {
    departments.iter().find(|d| d.name == name).map(|d| d.id)
}

/// Clamp an index into `[0, len - 1]`; 0 for an empty list
pub fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::checklist::OnboardingFields;
    use crate::model::task::{Task, TaskStatus};

    type Rec = ChecklistRecord<OnboardingFields>;

    fn rec(name: &str, department: &str, tasks: usize) -> Rec {
        ChecklistRecord {
            name: name.into(),
            department: department.into(),
            tasks: (1..=tasks as u64)
                .map(|i| Task::new(i, format!("task {}", i), TaskStatus::Pending))
                .collect(),
            ..Default::default()
        }
    }

    fn dept(id: u64, name: &str) -> DepartmentOption {
        DepartmentOption {
            id,
            name: name.into(),
        }
    }

    #[test]
    fn no_target_selects_first() {
        let records = vec![rec("a", "X", 1), rec("b", "Y", 1)];
        assert_eq!(choose_selection(&records, None, None), Some(Selection::First));
    }

    #[test]
    fn target_matches_name_or_department() {
        let records = vec![rec("Alpha", "Ops", 0), rec("Beta", "Studio", 0), rec("studio", "HR", 0)];
        assert_eq!(find_target(&records, "BETA"), Some(1));
        // department of #1 and name of #2 both match; first wins
        assert_eq!(
            choose_selection(&records, Some("Studio"), None),
            Some(Selection::Target(1))
        );
        assert_eq!(
            choose_selection(&records, Some("nobody"), None),
            Some(Selection::First)
        );
        assert_eq!(find_target(&records, "  "), None);
    }

    #[test]
    fn placeholder_replacement_needs_tasks() {
        let records = vec![rec("empty", "IT", 0), rec("full", "it ", 3)];
        assert_eq!(placeholder_replacement(&records, "IT"), Some(1));
        assert_eq!(placeholder_replacement(&records, "HR"), None);
    }

    #[test]
    fn selection_order() {
        let records = vec![rec("a", "HR", 2), rec("b", "IT", 3)];
        assert_eq!(
            choose_selection(&records, Some("a"), Some("IT")),
            Some(Selection::Target(0))
        );
        assert_eq!(
            choose_selection(&records, None, Some("IT")),
            Some(Selection::PlaceholderMatch(1))
        );
        assert_eq!(choose_selection::<OnboardingFields>(&[], None, None), None);
    }

    #[test]
    fn placeholder_uses_first_department() {
        let p: Option<Rec> = synthesize_placeholder(&[dept(1, "Studio"), dept(2, "Finance")]);
        let p = p.unwrap();
        assert_eq!(p.department, "Studio");
        assert!(p.tasks.is_empty());
        assert!(p.name.is_empty());
        assert!(synthesize_placeholder::<OnboardingFields>(&[]).is_none());
    }

    #[test]
    fn department_lookup_is_exact() {
        let depts = vec![dept(4, "Finance")];
        assert_eq!(department_id(&depts, "Finance"), Some(4));
        assert_eq!(department_id(&depts, "finance"), None);
    }

    #[test]
    fn clamp() {
        assert_eq!(clamp_index(5, 3), 2);
        assert_eq!(clamp_index(1, 3), 1);
        assert_eq!(clamp_index(1, 0), 0);
    }
}
