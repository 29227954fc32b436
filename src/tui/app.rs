use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use crate::io::config_io::{self, LoadedConfig};
use crate::io::service::ChecklistService;
use crate::io::watcher::DataWatcher;
use crate::logging;
use crate::model::checklist::{ChecklistFields, ChecklistKind, ClearanceFields, OnboardingFields};
use crate::model::config::Backend;
use crate::model::task::TaskId;
use crate::ops::search::PickerHit;
use crate::sync::{
    ChecklistController, LoadEvent, LoadTicket, NavIntent, NavOutcome, Resolution, spawn_load,
};
use crate::util::unicode::{next_boundary, prev_boundary};

use super::input;
use super::render;
use super::theme::Theme;

/// Our own saves touch the data directory; ignore watcher events this long
const OWN_WRITE_GRACE: Duration = Duration::from_millis(1500);

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into the edit line
    Edit,
    /// Record picker popup
    Picker,
    /// Unsaved-changes prompt
    Confirm,
}

/// What the edit line writes to on Enter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Task(TaskId),
    Name,
    Field(&'static str),
}

/// Single-line text input with a byte-offset cursor on grapheme boundaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub buffer: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new(initial: &str) -> Self {
        TextInput {
            buffer: initial.to_string(),
            cursor: initial.len(),
        }
    }

    pub fn insert(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = prev_boundary(&self.buffer, self.cursor) {
            self.buffer.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = next_boundary(&self.buffer, self.cursor) {
            self.buffer.replace_range(self.cursor..next, "");
        }
    }

    pub fn left(&mut self) {
        if let Some(prev) = prev_boundary(&self.buffer, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = next_boundary(&self.buffer, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.len();
    }
}

/// Picker popup state
#[derive(Debug, Clone, Default)]
pub struct PickerState {
    pub query: TextInput,
    pub hits: Vec<PickerHit>,
    pub cursor: usize,
}

/// Message shown in the status row until the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Main application state
pub struct App<E: ChecklistFields> {
    pub controller: ChecklistController<E>,
    pub service: Arc<dyn ChecklistService>,
    pub theme: Theme,
    pub mode: Mode,
    pub should_quit: bool,
    pub show_help: bool,
    /// Cursor into the task buffer
    pub task_cursor: usize,
    /// First visible task row
    pub task_scroll: usize,
    pub edit: Option<(EditTarget, TextInput)>,
    pub picker: Option<PickerState>,
    pub status: Option<StatusMessage>,
    /// Backend data changed while edits were pending
    pub stale_on_disk: bool,
    last_save: Option<Instant>,
    load_tx: Sender<LoadEvent<E>>,
    load_rx: Receiver<LoadEvent<E>>,
}

impl<E: ChecklistFields> App<E> {
    pub fn new(controller: ChecklistController<E>, service: Arc<dyn ChecklistService>) -> Self {
        let (load_tx, load_rx) = mpsc::channel();
        App {
            controller,
            service,
            theme: Theme::default(),
            mode: Mode::Navigate,
            should_quit: false,
            show_help: false,
            task_cursor: 0,
            task_scroll: 0,
            edit: None,
            picker: None,
            status: None,
            stale_on_disk: false,
            last_save: None,
            load_tx,
            load_rx,
        }
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Kick off both loaders in the background
    pub fn start_load(&mut self) {
        let ticket = self.controller.begin_load();
        self.spawn(ticket);
    }

    fn spawn(&self, ticket: LoadTicket) {
        spawn_load(
            Arc::clone(&self.service),
            self.controller.kind(),
            ticket,
            self.load_tx.clone(),
        );
    }

    /// Apply whatever the loaders have posted. Returns true if anything
    /// was applied.
    pub fn poll_loads(&mut self) -> bool {
        let mut applied = false;
        while let Ok(event) = self.load_rx.try_recv() {
            applied |= match event {
                LoadEvent::Options(ticket, load) => self.controller.apply_options(ticket, load),
                LoadEvent::Templates(ticket, load) => {
                    self.controller.apply_templates(ticket, load)
                }
            };
        }
        if applied {
            self.clamp_task_cursor();
        }
        applied
    }

    /// The watcher saw the data directory change
    pub fn on_data_changed(&mut self) {
        if self.last_save.is_some_and(|t| t.elapsed() < OWN_WRITE_GRACE) {
            return;
        }
        if self.controller.is_dirty() {
            self.stale_on_disk = true;
            self.set_status("data changed on disk; save or discard, then r to reload");
        } else {
            info!("data changed on disk; reloading");
            self.navigate(NavIntent::Reload);
        }
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn navigate(&mut self, intent: NavIntent) {
        let outcome = self.controller.request(intent);
        self.handle_outcome(outcome);
    }

    /// Settle the unsaved-changes prompt
    pub fn resolve(&mut self, resolution: Resolution) {
        self.mode = Mode::Navigate;
        match self.controller.resolve(resolution, self.service.as_ref()) {
            Ok(outcome) => {
                if resolution == Resolution::SaveThenProceed {
                    self.last_save = Some(Instant::now());
                }
                self.handle_outcome(outcome);
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    fn handle_outcome(&mut self, outcome: NavOutcome) {
        match outcome {
            NavOutcome::Moved(_) => {
                self.task_cursor = 0;
                self.task_scroll = 0;
            }
            NavOutcome::AtBoundary => self.set_status("no more records that way"),
            NavOutcome::Suspended => self.mode = Mode::Confirm,
            NavOutcome::Stayed => {}
            NavOutcome::Reload(ticket) => {
                self.stale_on_disk = false;
                self.set_status("reloading…");
                self.spawn(ticket);
            }
            NavOutcome::Leave => self.should_quit = true,
        }
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    pub fn save(&mut self) {
        if !self.controller.is_dirty() {
            self.set_status("nothing to save");
            return;
        }
        match self.controller.save(self.service.as_ref()) {
            Ok(()) => {
                self.last_save = Some(Instant::now());
                self.set_status("saved");
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.controller
            .tasks()
            .get(self.task_cursor)
            .map(|t| t.id.clone())
    }

    pub fn clamp_task_cursor(&mut self) {
        let len = self.controller.tasks().len();
        self.task_cursor = if len == 0 {
            0
        } else {
            self.task_cursor.min(len - 1)
        };
    }

    pub fn begin_edit(&mut self, target: EditTarget, initial: &str) {
        self.edit = Some((target, TextInput::new(initial)));
        self.mode = Mode::Edit;
    }

    // -----------------------------------------------------------------------
    // Status line
    // -----------------------------------------------------------------------

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the TUI for the configured (or given) checklist kind
pub fn run(
    loaded: LoadedConfig,
    kind: Option<ChecklistKind>,
    target: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = loaded.log_file() {
        logging::init_file(&path, loaded.config.log.level.as_deref())?;
    }
    let service = config_io::open_service(&loaded)?;
    let kind = kind.unwrap_or(loaded.config.ui.default_kind);
    match kind {
        ChecklistKind::Onboarding => run_kind::<OnboardingFields>(&loaded, service, kind, target),
        ChecklistKind::Clearance => run_kind::<ClearanceFields>(&loaded, service, kind, target),
    }
}

fn run_kind<E: ChecklistFields>(
    loaded: &LoadedConfig,
    service: Arc<dyn ChecklistService>,
    kind: ChecklistKind,
    target: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let controller = ChecklistController::<E>::new(kind, target);
    let mut app = App::new(controller, service);
    info!(%kind, backend = %app.service.describe(), "tui started");
    app.start_load();

    let watcher = if loaded.config.service.backend == Backend::File && loaded.config.ui.watch {
        match DataWatcher::start(&loaded.data_dir()) {
            Ok(w) => Some(w),
            Err(e) => {
                warn!(error = %e, "could not watch data directory");
                None
            }
        }
    } else {
        None
    };
    let tick = Duration::from_millis(loaded.config.ui.tick_rate_ms.max(10));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal if anything panics
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref(), tick);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop<E: ChecklistFields>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<E>,
    watcher: Option<&DataWatcher>,
    tick: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.poll_loads();
        if let Some(w) = watcher
            && w.poll().affects(app.controller.kind())
        {
            app.on_data_changed();
        }

        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(tick)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_input_edits_on_grapheme_boundaries() {
        let mut input = TextInput::new("cafe\u{0301}");
        input.backspace();
        assert_eq!(input.buffer, "caf");
        input.home();
        input.insert('>');
        assert_eq!(input.buffer, ">caf");
        input.right();
        input.delete();
        assert_eq!(input.buffer, ">cf");
        input.end();
        assert_eq!(input.cursor, 3);
    }
}
