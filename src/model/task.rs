use std::fmt;

use serde::{Deserialize, Serialize};

/// Completion state of a checklist task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "DONE", alias = "done", alias = "Done")]
    Done,
    #[default]
    #[serde(rename = "PENDING", alias = "pending", alias = "Pending")]
    Pending,
}

impl TaskStatus {
    /// Status for a checkbox value
    pub fn from_done(done: bool) -> Self {
        if done {
            TaskStatus::Done
        } else {
            TaskStatus::Pending
        }
    }

    pub fn is_done(self) -> bool {
        self == TaskStatus::Done
    }

    /// The character shown inside the checkbox `[ ]`
    pub fn checkbox_char(self) -> char {
        match self {
            TaskStatus::Done => 'x',
            TaskStatus::Pending => ' ',
        }
    }

    /// Wire name (`DONE` / `PENDING`)
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Done => "DONE",
            TaskStatus::Pending => "PENDING",
        }
    }
}

/// Task identifier. The backend hands out numbers, older rows carry strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Num(u64),
    Text(String),
}

impl TaskId {
    /// Numeric value of the id, if it has one (`"7"` counts)
    pub fn as_number(&self) -> Option<u64> {
        match self {
            TaskId::Num(n) => Some(*n),
            TaskId::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Parse user input: plain integers become numeric ids
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<u64>() {
            Ok(n) => TaskId::Num(n),
            Err(_) => TaskId::Text(s.trim().to_string()),
        }
    }

    /// Loose equality used for lookups: `7` matches `"7"`
    pub fn matches(&self, other: &TaskId) -> bool {
        if self == other {
            return true;
        }
        matches!((self.as_number(), other.as_number()), (Some(a), Some(b)) if a == b)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Num(n) => write!(f, "{}", n),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        TaskId::Num(n)
    }
}

/// One line item of a checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Label text
    #[serde(default, alias = "label", alias = "title")]
    pub task: String,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// Task with a numeric id
    pub fn new(id: u64, task: impl Into<String>, status: TaskStatus) -> Self {
        Task::with_id(TaskId::Num(id), task, status)
    }

    pub fn with_id(id: TaskId, task: impl Into<String>, status: TaskStatus) -> Self {
        Task {
            id,
            task: task.into(),
            status,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_lowercase_on_load() {
        let t: Task = serde_json::from_str(r#"{"id":1,"task":"Laptop","status":"done"}"#).unwrap();
        assert_eq!(t.status, TaskStatus::Done);
        let out = serde_json::to_string(&t).unwrap();
        assert!(out.contains(r#""status":"DONE""#));
    }

    #[test]
    fn missing_status_defaults_to_pending() {
        let t: Task = serde_json::from_str(r#"{"id":"a1","task":"Badge"}"#).unwrap();
        assert_eq!(t.status, TaskStatus::Pending);
        assert_eq!(t.id, TaskId::Text("a1".into()));
    }

    #[test]
    fn numeric_string_ids_match_numbers() {
        assert!(TaskId::Num(7).matches(&TaskId::Text("7".into())));
        assert!(!TaskId::Num(7).matches(&TaskId::Text("x7".into())));
        assert_eq!(TaskId::parse(" 12 "), TaskId::Num(12));
        assert_eq!(TaskId::parse("k-3"), TaskId::Text("k-3".into()));
    }
}
