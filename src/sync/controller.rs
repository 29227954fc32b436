use tracing::{debug, info, warn};

use crate::io::service::{ChecklistService, RecordKey, ServiceError};
use crate::model::checklist::{ChecklistFields, ChecklistKind, ChecklistRecord, same_label};
use crate::model::options::{DepartmentOption, OptionSet};
use crate::model::task::{Task, TaskId};
use crate::ops::reconcile::{self, Selection};
use crate::ops::task_ops::{self, TaskError};
use crate::ops::validate::{ValidationError, validate_record};
use crate::sync::guard::{Gate, GuardState, NavIntent, Resolution, UnsavedGuard};
use crate::sync::loader::{OptionsLoad, TemplatesLoad};

/// Identifies one round of loads; results carrying an older generation
/// are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// What happened to a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// The record at this index is now displayed
    Moved(usize),
    /// Nothing to move to; state unchanged
    AtBoundary,
    /// Unsaved edits; waiting for `resolve`
    Suspended,
    /// The user chose to stay; edits kept
    Stayed,
    /// Loads were started; the host must run them for this ticket
    Reload(LoadTicket),
    /// The host may close the view
    Leave,
}

/// Error type for controller actions
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("nothing to save: no record is displayed")]
    NothingToSave,
    #[error("no record is displayed")]
    NoRecord,
    #[error("cannot save: {}", describe_problems(.0))]
    Invalid(Vec<ValidationError>),
    #[error("save failed: {0}")]
    Save(#[from] ServiceError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("no navigation is waiting for a decision")]
    NoPendingNavigation,
}

fn describe_problems(problems: &[ValidationError]) -> String {
    problems
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Owns the state of one checklist view: loaded records, the displayed
/// record with its task edit buffer, option lists and the unsaved-changes
/// guard. All mutation is synchronous; loads are applied through tickets.
#[derive(Debug)]
pub struct ChecklistController<E: ChecklistFields> {
    kind: ChecklistKind,
    target: Option<String>,

    records: Vec<ChecklistRecord<E>>,
    current_index: usize,
    /// Displayed record. Its `tasks` field is stale while editing; the
    /// buffer is authoritative until flushed.
    current: Option<ChecklistRecord<E>>,
    tasks: Vec<Task>,
    /// Last loaded or saved version of `current`
    snapshot: Option<ChecklistRecord<E>>,
    /// The displayed record has no slot in `records`: either synthesized
    /// from the department options, or edited while a reload dropped it.
    /// Saving appends it.
    placeholder: bool,
    selected_department_id: Option<u64>,
    options: OptionSet,

    generation: u64,
    options_pending: bool,
    templates_pending: bool,
    options_error: Option<String>,
    templates_error: Option<String>,
    action_error: Option<String>,

    guard: UnsavedGuard,
}

impl<E: ChecklistFields> ChecklistController<E> {
    pub fn new(kind: ChecklistKind, target: Option<String>) -> Self {
        ChecklistController {
            kind,
            target: target.filter(|t| !t.trim().is_empty()),
            records: Vec::new(),
            current_index: 0,
            current: None,
            tasks: Vec::new(),
            snapshot: None,
            placeholder: false,
            selected_department_id: None,
            options: OptionSet::default(),
            generation: 0,
            options_pending: false,
            templates_pending: false,
            options_error: None,
            templates_error: None,
            action_error: None,
            guard: UnsavedGuard::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn kind(&self) -> ChecklistKind {
        self.kind
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn records(&self) -> &[ChecklistRecord<E>] {
        &self.records
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The displayed record as last loaded, before buffered task edits.
    /// Use `tasks()` or `working_copy()` for the edited state.
    pub fn current(&self) -> Option<&ChecklistRecord<E>> {
        self.current.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The displayed record with the task buffer folded in
    pub fn working_copy(&self) -> Option<ChecklistRecord<E>> {
        self.current.as_ref().map(|c| {
            let mut rec = c.clone();
            rec.tasks = self.tasks.clone();
            rec
        })
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder && self.current.is_some()
    }

    pub fn selected_department_id(&self) -> Option<u64> {
        self.selected_department_id
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn position_options(&self) -> &[String] {
        &self.options.position_names
    }

    pub fn department_options(&self) -> &[DepartmentOption] {
        &self.options.departments
    }

    pub fn is_loading(&self) -> bool {
        self.options_pending || self.templates_pending
    }

    /// One human-readable line covering every outstanding problem
    pub fn error(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.action_error, &self.templates_error, &self.options_error]
            .into_iter()
            .filter_map(|e| e.as_deref())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }

    pub fn clear_action_error(&mut self) {
        self.action_error = None;
    }

    pub fn is_dirty(&self) -> bool {
        self.guard.is_dirty()
    }

    pub fn guard_state(&self) -> GuardState {
        self.guard.state()
    }

    pub fn pending_navigation(&self) -> Option<&NavIntent> {
        self.guard.pending()
    }

    pub fn completion_percentage(&self) -> u8 {
        task_ops::completion_percentage(&self.tasks)
    }

    // -----------------------------------------------------------------------
    // Loading and reconciliation
    // -----------------------------------------------------------------------

    /// Start a new round of loads. Results from earlier rounds become stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.options_pending = true;
        self.templates_pending = true;
        debug!(generation = self.generation, kind = %self.kind, "load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Ignore whatever is still in flight
    pub fn cancel_loads(&mut self) {
        self.generation += 1;
        self.options_pending = false;
        self.templates_pending = false;
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply an Option Loader result. Returns false for stale tickets.
    pub fn apply_options(&mut self, ticket: LoadTicket, load: OptionsLoad) -> bool {
        if !self.is_current(ticket) {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "ignoring stale options"
            );
            return false;
        }
        self.options_pending = false;
        self.options = load.options;
        self.options_error = load.error;

        self.ensure_placeholder();
        self.rederive_department();
        true
    }

    /// Apply a Template Loader result. Returns false for stale tickets.
    pub fn apply_templates(&mut self, ticket: LoadTicket, load: TemplatesLoad<E>) -> bool {
        if !self.is_current(ticket) {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "ignoring stale templates"
            );
            return false;
        }
        self.templates_pending = false;
        self.records = load.records;
        self.templates_error = load.error;

        self.reconcile_records();
        self.ensure_placeholder();
        self.rederive_department();
        true
    }

    fn reconcile_records(&mut self) {
        if self.guard.is_dirty() && self.current.is_some() {
            // Unsaved work stays on screen. Re-find it by the identity it was
            // loaded under, since edits may have renamed it.
            if !self.placeholder {
                match self.persisted_key().and_then(|key| self.find_record(&key)) {
                    Some(i) => self.current_index = i,
                    None => {
                        info!("edited record is gone from the reloaded list; it will be saved as new");
                        self.placeholder = true;
                    }
                }
            }
            self.current_index = reconcile::clamp_index(self.current_index, self.records.len());
            info!("records replaced under unsaved edits; keeping displayed record");
            return;
        }

        let placeholder_department = if self.is_placeholder() {
            self.current.as_ref().map(|c| c.department.clone())
        } else {
            None
        };

        match reconcile::choose_selection(
            &self.records,
            self.target.as_deref(),
            placeholder_department.as_deref(),
        ) {
            Some(selection) => {
                match selection {
                    Selection::Target(i) => debug!(index = i, "selected target record"),
                    Selection::PlaceholderMatch(i) => {
                        info!(index = i, "placeholder replaced by loaded record")
                    }
                    Selection::First => debug!("selected first record"),
                }
                self.show(selection.index());
            }
            None if self.placeholder => {
                self.current_index = 0;
            }
            None => {
                self.clear_current();
            }
        }
    }

    /// Synthesize a placeholder when there is nothing else to show
    fn ensure_placeholder(&mut self) {
        if self.current.is_some() || !self.records.is_empty() {
            return;
        }
        if let Some(rec) = reconcile::synthesize_placeholder::<E>(&self.options.departments) {
            info!(department = %rec.department, "showing placeholder record");
            self.tasks = Vec::new();
            self.snapshot = Some(rec.clone());
            self.current = Some(rec);
            self.current_index = 0;
            self.placeholder = true;
            self.guard.set_dirty(false);
        }
    }

    /// Identity of the displayed record in the backend, if it has one
    fn persisted_key(&self) -> Option<RecordKey> {
        if self.placeholder {
            return None;
        }
        self.snapshot.as_ref().map(|snap| RecordKey {
            name: snap.name.clone(),
            department: snap.department.clone(),
        })
    }

    fn find_record(&self, key: &RecordKey) -> Option<usize> {
        self.records
            .iter()
            .position(|r| same_label(&r.name, &key.name) && same_label(&r.department, &key.department))
    }

    fn rederive_department(&mut self) {
        self.selected_department_id = self
            .current
            .as_ref()
            .and_then(|c| reconcile::department_id(&self.options.departments, &c.department));
    }

    fn show(&mut self, index: usize) {
        let Some(rec) = self.records.get(index).cloned() else {
            return;
        };
        self.current_index = index;
        self.tasks = rec.tasks.clone();
        self.snapshot = Some(rec.clone());
        self.current = Some(rec);
        self.placeholder = false;
        self.guard.set_dirty(false);
        self.rederive_department();
    }

    fn clear_current(&mut self) {
        self.current = None;
        self.snapshot = None;
        self.tasks.clear();
        self.current_index = 0;
        self.placeholder = false;
        self.selected_department_id = None;
        self.guard.set_dirty(false);
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn can_go_next(&self) -> bool {
        self.target_index(&NavIntent::Next).is_some()
    }

    pub fn can_go_previous(&self) -> bool {
        self.target_index(&NavIntent::Previous).is_some()
    }

    pub fn next(&mut self) -> NavOutcome {
        self.request(NavIntent::Next)
    }

    pub fn previous(&mut self) -> NavOutcome {
        self.request(NavIntent::Previous)
    }

    pub fn select(&mut self, index: usize) -> NavOutcome {
        self.request(NavIntent::Select(index))
    }

    /// Run a navigation intent through the guard
    pub fn request(&mut self, intent: NavIntent) -> NavOutcome {
        if matches!(
            intent,
            NavIntent::Next | NavIntent::Previous | NavIntent::Select(_)
        ) {
            match self.target_index(&intent) {
                None => {
                    debug!(?intent, "navigation at boundary");
                    return NavOutcome::AtBoundary;
                }
                Some(i) if i == self.current_index && !self.placeholder && self.current.is_some() => {
                    return NavOutcome::Moved(i);
                }
                Some(_) => {}
            }
        }
        match self.guard.intercept(intent) {
            Gate::Proceed(intent) => self.perform(intent),
            Gate::Suspended => NavOutcome::Suspended,
        }
    }

    /// Settle a suspended navigation
    pub fn resolve(
        &mut self,
        resolution: Resolution,
        service: &dyn ChecklistService,
    ) -> Result<NavOutcome, SyncError> {
        let Some(intent) = self.guard.pending().cloned() else {
            return Err(SyncError::NoPendingNavigation);
        };
        match resolution {
            Resolution::Stay => {
                self.guard.stay();
                debug!(?intent, "navigation cancelled; keeping edits");
                Ok(NavOutcome::Stayed)
            }
            Resolution::Discard => {
                self.guard.take_pending();
                self.discard_changes();
                Ok(self.perform(intent))
            }
            Resolution::SaveThenProceed => {
                self.guard.take_pending();
                // Saving a placeholder appends it and moves the index, so
                // pick the destination first.
                let target = self.target_index(&intent);
                self.save(service)?;
                Ok(match intent {
                    NavIntent::Next | NavIntent::Previous | NavIntent::Select(_) => match target {
                        Some(i) => {
                            self.show(i);
                            NavOutcome::Moved(i)
                        }
                        None => NavOutcome::AtBoundary,
                    },
                    _ => self.perform(intent),
                })
            }
        }
    }

    fn target_index(&self, intent: &NavIntent) -> Option<usize> {
        let len = self.records.len();
        if len == 0 {
            return None;
        }
        if self.is_placeholder() {
            // The placeholder sits outside the list
            return match intent {
                NavIntent::Next => Some(0),
                NavIntent::Select(i) if *i < len => Some(*i),
                _ => None,
            };
        }
        match intent {
            NavIntent::Next => (self.current_index + 1 < len).then_some(self.current_index + 1),
            NavIntent::Previous => self.current_index.checked_sub(1),
            NavIntent::Select(i) => (*i < len).then_some(*i),
            NavIntent::Reload | NavIntent::Leave => None,
        }
    }

    fn perform(&mut self, intent: NavIntent) -> NavOutcome {
        match intent {
            NavIntent::Next | NavIntent::Previous | NavIntent::Select(_) => {
                match self.target_index(&intent) {
                    Some(i) => {
                        self.show(i);
                        NavOutcome::Moved(i)
                    }
                    None => NavOutcome::AtBoundary,
                }
            }
            NavIntent::Reload => NavOutcome::Reload(self.begin_load()),
            NavIntent::Leave => {
                self.cancel_loads();
                NavOutcome::Leave
            }
        }
    }

    // -----------------------------------------------------------------------
    // Save / discard
    // -----------------------------------------------------------------------

    /// Restore the displayed record from its snapshot
    pub fn discard_changes(&mut self) {
        if let Some(snapshot) = self.snapshot.clone() {
            self.tasks = snapshot.tasks.clone();
            self.current = Some(snapshot);
            self.rederive_department();
        }
        self.guard.set_dirty(false);
        info!("edits discarded");
    }

    /// Validate and persist the working copy
    pub fn save(&mut self, service: &dyn ChecklistService) -> Result<(), SyncError> {
        let result = self.try_save(service);
        match &result {
            Ok(()) => self.action_error = None,
            Err(e) => {
                warn!(error = %e, "save failed");
                self.action_error = Some(e.to_string());
            }
        }
        result
    }

    fn try_save(&mut self, service: &dyn ChecklistService) -> Result<(), SyncError> {
        let record = self.working_copy().ok_or(SyncError::NothingToSave)?;
        let problems = validate_record(&record);
        if !problems.is_empty() {
            return Err(SyncError::Invalid(problems));
        }

        let body = serde_json::to_value(&record).map_err(ServiceError::from)?;
        let previous = self.persisted_key();
        service
            .save_record(self.kind, &body, previous.as_ref())?
            .into_result()?;

        if self.placeholder {
            self.records.push(record.clone());
            self.current_index = self.records.len() - 1;
            self.placeholder = false;
        } else if let Some(slot) = self.records.get_mut(self.current_index) {
            *slot = record.clone();
        }
        info!(
            record = %record.label(),
            tasks = record.tasks.len(),
            backend = %service.describe(),
            "record saved"
        );
        self.snapshot = Some(record.clone());
        self.current = Some(record);
        self.guard.set_dirty(false);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Task List Editor
    // -----------------------------------------------------------------------

    /// Append a blank pending task and return its id
    pub fn add_task(&mut self) -> Result<TaskId, SyncError> {
        self.require_record()?;
        let id = task_ops::add_task(&mut self.tasks);
        self.touched();
        Ok(id)
    }

    pub fn remove_task(&mut self, id: &TaskId) -> Result<Task, SyncError> {
        self.require_record()?;
        let removed = task_ops::remove_task(&mut self.tasks, id);
        let removed = self.report(removed.map_err(SyncError::from))?;
        self.touched();
        Ok(removed)
    }

    pub fn update_task_text(&mut self, id: &TaskId, text: &str) -> Result<(), SyncError> {
        self.require_record()?;
        let result = task_ops::update_task_text(&mut self.tasks, id, text);
        self.report(result.map_err(SyncError::from))?;
        self.touched();
        Ok(())
    }

    pub fn toggle_task_status(&mut self, id: &TaskId, done: bool) -> Result<(), SyncError> {
        self.require_record()?;
        let result = task_ops::toggle_task_status(&mut self.tasks, id, done);
        self.report(result.map_err(SyncError::from))?;
        self.touched();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Field edits
    // -----------------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), SyncError> {
        self.current_mut()?.name = name.into();
        self.touched();
        Ok(())
    }

    pub fn set_department(&mut self, department: impl Into<String>) -> Result<(), SyncError> {
        self.current_mut()?.department = department.into();
        self.rederive_department();
        self.touched();
        Ok(())
    }

    pub fn set_extra_field(&mut self, field: &str, value: impl Into<String>) -> Result<(), SyncError> {
        let value = value.into();
        if !self.current_mut()?.extra.set_field(field, value) {
            return self.report(Err(SyncError::UnknownField(field.to_string())));
        }
        self.touched();
        Ok(())
    }

    /// Step through the department options. Returns the new department.
    pub fn cycle_department(&mut self, delta: isize) -> Result<Option<String>, SyncError> {
        let current = self.current_mut()?.department.clone();
        let names: Vec<&str> = self
            .options
            .departments
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        let Some(next) = cycle(&names, &current, delta) else {
            return Ok(None);
        };
        self.set_department(next.clone())?;
        Ok(Some(next))
    }

    /// Step through the position options. Returns the new position, or
    /// None when this checklist has no position field or no options.
    pub fn cycle_position(&mut self, delta: isize) -> Result<Option<String>, SyncError> {
        let Some(field) = E::position_field() else {
            return Ok(None);
        };
        let current = self
            .current_mut()?
            .extra
            .field(field)
            .unwrap_or("")
            .to_string();
        let names: Vec<&str> = self
            .options
            .position_names
            .iter()
            .map(String::as_str)
            .collect();
        let Some(next) = cycle(&names, &current, delta) else {
            return Ok(None);
        };
        self.set_extra_field(field, next.clone())?;
        Ok(Some(next))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn require_record(&self) -> Result<(), SyncError> {
        if self.current.is_some() {
            Ok(())
        } else {
            Err(SyncError::NoRecord)
        }
    }

    fn current_mut(&mut self) -> Result<&mut ChecklistRecord<E>, SyncError> {
        self.current.as_mut().ok_or(SyncError::NoRecord)
    }

    fn report<T>(&mut self, result: Result<T, SyncError>) -> Result<T, SyncError> {
        if let Err(e) = &result {
            debug!(error = %e, "edit rejected");
            self.action_error = Some(e.to_string());
        }
        result
    }

    /// Recompute the dirty flag after an edit
    fn touched(&mut self) {
        let dirty = match (&self.current, &self.snapshot) {
            (Some(cur), Some(snap)) => {
                cur.name != snap.name
                    || cur.department != snap.department
                    || cur.extra != snap.extra
                    || self.tasks != snap.tasks
            }
            _ => false,
        };
        self.guard.set_dirty(dirty);
        self.action_error = None;
    }
}

/// Next entry after `current` in `names`, wrapping. An unknown current
/// value starts at the first (or last, going backwards) entry.
fn cycle(names: &[&str], current: &str, delta: isize) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    let len = names.len() as isize;
    let next = match names.iter().position(|n| *n == current) {
        Some(pos) => (pos as isize + delta).rem_euclid(len),
        None if delta >= 0 => 0,
        None => len - 1,
    };
    Some(names[next as usize].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::checklist::OnboardingFields;
    use crate::model::task::TaskStatus;

    type Controller = ChecklistController<OnboardingFields>;

    fn record(name: &str, dept: &str, tasks: usize) -> ChecklistRecord<OnboardingFields> {
        ChecklistRecord {
            name: name.into(),
            department: dept.into(),
            tasks: (1..=tasks as u64)
                .map(|i| Task::new(i, format!("task {}", i), TaskStatus::Pending))
                .collect(),
            extra: OnboardingFields::default(),
        }
    }

    fn loaded(records: Vec<ChecklistRecord<OnboardingFields>>) -> Controller {
        let mut c = Controller::new(ChecklistKind::Onboarding, None);
        let t = c.begin_load();
        c.apply_templates(
            t,
            TemplatesLoad {
                records,
                error: None,
            },
        );
        c
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut c = Controller::new(ChecklistKind::Onboarding, None);
        let old = c.begin_load();
        let new = c.begin_load();
        assert!(!c.apply_templates(
            old,
            TemplatesLoad {
                records: vec![record("Old", "IT", 1)],
                error: None
            }
        ));
        assert!(c.records().is_empty());
        assert!(c.apply_templates(
            new,
            TemplatesLoad {
                records: vec![record("New", "IT", 1)],
                error: None
            }
        ));
        assert_eq!(c.records()[0].name, "New");
    }

    #[test]
    fn loading_flags_track_both_loaders() {
        let mut c = Controller::new(ChecklistKind::Onboarding, None);
        let t = c.begin_load();
        assert!(c.is_loading());
        c.apply_templates(t, TemplatesLoad::default());
        assert!(c.is_loading());
        c.apply_options(t, OptionsLoad::default());
        assert!(!c.is_loading());
    }

    #[test]
    fn editing_back_to_snapshot_is_clean() {
        let mut c = loaded(vec![record("A", "IT", 1)]);
        c.set_name("B").unwrap();
        assert!(c.is_dirty());
        c.set_name("A").unwrap();
        assert!(!c.is_dirty());
    }

    #[test]
    fn select_same_index_keeps_edits() {
        let mut c = loaded(vec![record("A", "IT", 1), record("B", "HR", 1)]);
        c.set_name("edited").unwrap();
        assert_eq!(c.select(0), NavOutcome::Moved(0));
        assert!(c.is_dirty());
        assert_eq!(c.working_copy().unwrap().name, "edited");
    }

    #[test]
    fn unknown_field_is_reported() {
        let mut c = loaded(vec![record("A", "IT", 0)]);
        let err = c.set_extra_field("salary", "1").unwrap_err();
        assert!(matches!(err, SyncError::UnknownField(_)));
        assert_eq!(c.error().as_deref(), Some("unknown field 'salary'"));
        assert!(!c.is_dirty());
    }

    #[test]
    fn cycle_wraps_both_ways() {
        let names = ["a", "b", "c"];
        assert_eq!(cycle(&names, "c", 1).as_deref(), Some("a"));
        assert_eq!(cycle(&names, "a", -1).as_deref(), Some("c"));
        assert_eq!(cycle(&names, "zzz", -1).as_deref(), Some("c"));
        assert_eq!(cycle(&[], "a", 1), None);
    }

    #[test]
    fn edits_without_record_fail() {
        let mut c = Controller::new(ChecklistKind::Onboarding, None);
        assert!(matches!(c.add_task(), Err(SyncError::NoRecord)));
        assert!(matches!(c.set_name("x"), Err(SyncError::NoRecord)));
    }
}
