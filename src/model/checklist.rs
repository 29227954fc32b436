use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::task::Task;

/// Category of checklist template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChecklistKind {
    #[serde(alias = "onboarding")]
    Onboarding,
    #[serde(alias = "clearance")]
    Clearance,
}

impl ChecklistKind {
    /// Value sent to the backend (`ONBOARDING` / `CLEARANCE`)
    pub fn as_wire(self) -> &'static str {
        match self {
            ChecklistKind::Onboarding => "ONBOARDING",
            ChecklistKind::Clearance => "CLEARANCE",
        }
    }

    /// Lowercase slug, used for file names and CLI values
    pub fn slug(self) -> &'static str {
        match self {
            ChecklistKind::Onboarding => "onboarding",
            ChecklistKind::Clearance => "clearance",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChecklistKind::Onboarding => "Onboarding",
            ChecklistKind::Clearance => "Clearance",
        }
    }
}

impl fmt::Display for ChecklistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ChecklistKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "onboarding" | "onboard" => Ok(ChecklistKind::Onboarding),
            "clearance" | "clear" | "offboarding" => Ok(ChecklistKind::Clearance),
            other => Err(format!(
                "unknown checklist kind '{}' (expected onboarding or clearance)",
                other
            )),
        }
    }
}

/// Checklist-specific fields carried next to name/department/tasks.
///
/// Implementors are flattened into the record's JSON, so every field
/// should be `#[serde(default)]` to tolerate sparse backend rows.
pub trait ChecklistFields:
    Clone + Default + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + 'static
{
    /// Editable field names, in display order
    fn field_names() -> &'static [&'static str];

    fn field(&self, name: &str) -> Option<&str>;

    /// Set a field by name. Returns false for unknown names.
    fn set_field(&mut self, name: &str, value: String) -> bool;

    /// Fields that must hold a `YYYY-MM-DD` date when non-empty
    fn date_fields() -> &'static [&'static str] {
        &[]
    }

    /// Field that is filled from the position option list, if any
    fn position_field() -> Option<&'static str> {
        None
    }
}

/// Extra fields of an onboarding checklist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingFields {
    #[serde(alias = "position_name")]
    pub position: String,
    #[serde(alias = "startDate")]
    pub start_date: String,
}

impl ChecklistFields for OnboardingFields {
    fn field_names() -> &'static [&'static str] {
        &["position", "start_date"]
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "position" => Some(&self.position),
            "start_date" => Some(&self.start_date),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: String) -> bool {
        match name {
            "position" => self.position = value,
            "start_date" => self.start_date = value,
            _ => return false,
        }
        true
    }

    fn date_fields() -> &'static [&'static str] {
        &["start_date"]
    }

    fn position_field() -> Option<&'static str> {
        Some("position")
    }
}

/// Extra fields of a clearance (exit) checklist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearanceFields {
    #[serde(alias = "position_name")]
    pub position: String,
    #[serde(alias = "lastWorkingDay", alias = "last_day")]
    pub last_working_day: String,
}

impl ChecklistFields for ClearanceFields {
    fn field_names() -> &'static [&'static str] {
        &["position", "last_working_day"]
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "position" => Some(&self.position),
            "last_working_day" => Some(&self.last_working_day),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: String) -> bool {
        match name {
            "position" => self.position = value,
            "last_working_day" => self.last_working_day = value,
            _ => return false,
        }
        true
    }

    fn date_fields() -> &'static [&'static str] {
        &["last_working_day"]
    }

    fn position_field() -> Option<&'static str> {
        Some("position")
    }
}

/// A department checklist: identity fields, ordered tasks, and the
/// checklist-specific extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistRecord<E> {
    #[serde(default, alias = "checklist_name", alias = "template_name")]
    pub name: String,
    #[serde(default, alias = "department_name")]
    pub department: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(flatten)]
    pub extra: E,
}

impl<E: ChecklistFields> ChecklistRecord<E> {
    /// Blank record for a department, with no tasks
    pub fn placeholder(department: impl Into<String>) -> Self {
        ChecklistRecord {
            name: String::new(),
            department: department.into(),
            tasks: Vec::new(),
            extra: E::default(),
        }
    }

    /// Label used by pickers and headers: the name, or the department
    /// when the record has no name yet.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            self.department.trim()
        } else {
            self.name.trim()
        }
    }
}

impl<E: Default> Default for ChecklistRecord<E> {
    fn default() -> Self {
        ChecklistRecord {
            name: String::new(),
            department: String::new(),
            tasks: Vec::new(),
            extra: E::default(),
        }
    }
}

/// Case-insensitive, whitespace-trimmed label comparison
pub fn same_label(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskStatus;

    #[test]
    fn record_flattens_extra_fields() {
        let json = r#"{
            "name": "Studio starter",
            "department": "Studio",
            "position": "Animator",
            "start_date": "2025-03-01",
            "tasks": [{"id": 1, "task": "Tablet", "status": "DONE"}]
        }"#;
        let rec: ChecklistRecord<OnboardingFields> = serde_json::from_str(json).unwrap();
        assert_eq!(rec.extra.position, "Animator");
        assert_eq!(rec.extra.start_date, "2025-03-01");
        assert_eq!(rec.tasks[0].status, TaskStatus::Done);
    }

    #[test]
    fn sparse_row_normalizes_to_defaults() {
        let rec: ChecklistRecord<ClearanceFields> =
            serde_json::from_str(r#"{"department_name": "IT"}"#).unwrap();
        assert_eq!(rec.department, "IT");
        assert!(rec.name.is_empty());
        assert!(rec.tasks.is_empty());
        assert_eq!(rec.extra, ClearanceFields::default());
    }

    #[test]
    fn label_falls_back_to_department() {
        let rec = ChecklistRecord::<OnboardingFields>::placeholder("Finance");
        assert_eq!(rec.label(), "Finance");
    }

    #[test]
    fn kind_parses_cli_values() {
        assert_eq!("Onboarding".parse::<ChecklistKind>(), Ok(ChecklistKind::Onboarding));
        assert_eq!("clearance".parse::<ChecklistKind>(), Ok(ChecklistKind::Clearance));
        assert!("payroll".parse::<ChecklistKind>().is_err());
    }

    #[test]
    fn same_label_ignores_case_and_padding() {
        assert!(same_label(" IT ", "it"));
        assert!(!same_label("IT", "HR"));
    }
}
