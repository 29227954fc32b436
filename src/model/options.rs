use serde::{Deserialize, Serialize};

/// A department reference entry from the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentOption {
    pub id: u64,
    #[serde(alias = "department_name")]
    pub name: String,
}

/// Reference lists used by selection widgets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    /// Distinct position names, first-seen order
    pub position_names: Vec<String>,
    /// Departments sorted by name
    pub departments: Vec<DepartmentOption>,
}
