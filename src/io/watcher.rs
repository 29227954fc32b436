use std::path::{Path, PathBuf};
use std::sync::mpsc;

use indexmap::IndexSet;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::model::checklist::ChecklistKind;

/// Backend files that changed since the last poll, deduplicated
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DataChange {
    pub paths: IndexSet<PathBuf>,
}

impl DataChange {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// True if the change matters to a view of `kind`: its own template
    /// file, or any option file. Other kinds' templates are ignored.
    pub fn affects(&self, kind: ChecklistKind) -> bool {
        let own = format!("{}.json", kind.slug());
        self.paths.iter().any(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
            let in_templates = p
                .parent()
                .and_then(|d| d.file_name())
                .is_some_and(|d| d == "templates");
            if in_templates { name == own } else { true }
        })
    }
}

/// Watches the file backend's data directory for outside edits
pub struct DataWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<PathBuf>,
}

impl DataWatcher {
    pub fn start(data_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else {
                    return;
                };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                for path in event.paths.into_iter().filter(|p| is_data_file(p)) {
                    let _ = tx.send(path);
                }
            },
            Config::default(),
        )?;

        watcher.watch(data_dir, RecursiveMode::Recursive)?;
        Ok(DataWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain queued events without blocking. An atomic save shows up as
    /// several events for one file; they collapse into one path.
    pub fn poll(&self) -> DataChange {
        let mut change = DataChange::default();
        while let Ok(path) = self.rx.try_recv() {
            change.paths.insert(path);
        }
        change
    }
}

/// Only `.json` files count; atomic-write temp files are skipped.
fn is_data_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'));
    !hidden && path.extension().and_then(|e| e.to_str()) == Some("json")
}
