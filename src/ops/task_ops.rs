use std::collections::BTreeSet;

use crate::model::task::{Task, TaskId, TaskStatus};

/// Error type for task operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Next id for a new task: one past the highest numeric id in the list.
/// String ids that parse as integers count toward the maximum. When the
/// maximum is `u64::MAX` the lowest unused number is taken instead.
pub fn next_task_id(tasks: &[Task]) -> TaskId {
    let used: BTreeSet<u64> = tasks.iter().filter_map(|t| t.id.as_number()).collect();
    let max = used.last().copied().unwrap_or(0);
    match max.checked_add(1) {
        Some(n) => TaskId::Num(n),
        None => TaskId::Num((1..).find(|n| !used.contains(n)).unwrap_or(0)),
    }
}

fn position_of(tasks: &[Task], id: &TaskId) -> Result<usize, TaskError> {
    tasks
        .iter()
        .position(|t| t.id.matches(id))
        .ok_or_else(|| TaskError::NotFound(id.clone()))
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

/// Append an empty pending task. Returns the new id.
pub fn add_task(tasks: &mut Vec<Task>) -> TaskId {
    let id = next_task_id(tasks);
    tasks.push(Task::with_id(id.clone(), String::new(), TaskStatus::Pending));
    id
}

/// Remove the task with `id`, returning it
pub fn remove_task(tasks: &mut Vec<Task>, id: &TaskId) -> Result<Task, TaskError> {
    let idx = position_of(tasks, id)?;
    Ok(tasks.remove(idx))
}

/// Replace a task's label. Empty text is allowed while editing.
pub fn update_task_text(tasks: &mut [Task], id: &TaskId, text: &str) -> Result<(), TaskError> {
    let idx = position_of(tasks, id)?;
    tasks[idx].task = text.to_string();
    Ok(())
}

/// Set a task to DONE (`done == true`) or PENDING
pub fn toggle_task_status(tasks: &mut [Task], id: &TaskId, done: bool) -> Result<(), TaskError> {
    let idx = position_of(tasks, id)?;
    tasks[idx].status = TaskStatus::from_done(done);
    Ok(())
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Percentage of tasks that are done, rounded half up. 0 for an empty list.
pub fn completion_percentage(tasks: &[Task]) -> u8 {
    let total = tasks.len();
    if total == 0 {
        return 0;
    }
    let done = tasks.iter().filter(|t| t.is_done()).count();
    ((done as f64 * 100.0) / total as f64).round() as u8
}

/// (done, total) counts
pub fn completion_counts(tasks: &[Task]) -> (usize, usize) {
    (tasks.iter().filter(|t| t.is_done()).count(), tasks.len())
}
