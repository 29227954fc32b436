use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::io::service::{ChecklistService, Envelope, PositionRow, RecordKey, ServiceError};
use crate::model::checklist::{ChecklistKind, same_label};
use crate::model::options::DepartmentOption;

/// Backend that reads and writes envelope JSON files in a directory:
///
/// ```text
/// <dir>/templates/onboarding.json
/// <dir>/templates/clearance.json
/// <dir>/positions.json
/// <dir>/departments.json
/// ```
#[derive(Debug, Clone)]
pub struct FileService {
    dir: PathBuf,
}

impl FileService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileService { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn templates_path(&self, kind: ChecklistKind) -> PathBuf {
        self.dir
            .join("templates")
            .join(format!("{}.json", kind.slug()))
    }

    fn read_envelope<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<Envelope<T>, ServiceError> {
        debug!(path = %path.display(), "reading");
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl ChecklistService for FileService {
    fn fetch_templates(
        &self,
        kind: ChecklistKind,
    ) -> Result<Envelope<Vec<serde_json::Value>>, ServiceError> {
        let path = self.templates_path(kind);
        if !path.exists() {
            // No file yet means no persisted checklists, not a failure
            return Ok(Envelope::ok(Vec::new()));
        }
        self.read_envelope(&path)
    }

    fn fetch_positions(&self) -> Result<Envelope<Vec<PositionRow>>, ServiceError> {
        self.read_envelope(&self.dir.join("positions.json"))
    }

    fn fetch_departments(&self) -> Result<Envelope<Vec<DepartmentOption>>, ServiceError> {
        self.read_envelope(&self.dir.join("departments.json"))
    }

    fn save_record(
        &self,
        kind: ChecklistKind,
        record: &serde_json::Value,
        previous: Option<&RecordKey>,
    ) -> Result<Envelope<serde_json::Value>, ServiceError> {
        let path = self.templates_path(kind);
        let mut rows: Vec<serde_json::Value> = if path.exists() {
            self.read_envelope::<Vec<serde_json::Value>>(&path)?
                .into_result()?
        } else {
            Vec::new()
        };

        upsert_row(&mut rows, record.clone(), previous);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(&Envelope::ok(rows))?;
        atomic_write(&path, &body)?;
        Ok(Envelope::ok(record.clone()))
    }

    fn describe(&self) -> String {
        format!("files in {}", self.dir.display())
    }
}

/// Replace the row stored under `previous` (or, failing that, under the
/// record's own name and department, ignoring case). Append otherwise.
fn upsert_row(
    rows: &mut Vec<serde_json::Value>,
    record: serde_json::Value,
    previous: Option<&RecordKey>,
) {
    let field = |v: &serde_json::Value, name: &str| {
        v.get(name)
            .and_then(|f| f.as_str())
            .unwrap_or("")
            .to_string()
    };
    let own = RecordKey {
        name: field(&record, "name"),
        department: field(&record, "department"),
    };
    let find = |key: &RecordKey| {
        rows.iter().position(|row| {
            same_label(&field(row, "name"), &key.name)
                && same_label(&field(row, "department"), &key.department)
        })
    };

    match previous.and_then(|key| find(key)).or_else(|| find(&own)) {
        Some(idx) => rows[idx] = record,
        None => rows.push(record),
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
