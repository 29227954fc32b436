use serde::{Deserialize, Serialize};

use crate::model::checklist::ChecklistKind;
use crate::model::options::DepartmentOption;

/// Error type for backend calls
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not parse response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Response wrapper used by every backend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope {
            success: true,
            data,
            message: None,
        }
    }

    /// Unwrap the payload, turning `success: false` into an error
    pub fn into_result(self) -> Result<T, ServiceError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ServiceError::Rejected(
                self.message
                    .unwrap_or_else(|| "success flag was false".to_string()),
            ))
        }
    }
}

/// A position row; only the name is used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRow {
    #[serde(alias = "position_name")]
    pub name: String,
}

/// The name and department a record was last persisted under. A save
/// passes it so a renamed record replaces its old row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub name: String,
    pub department: String,
}

/// The remote template/option service.
///
/// Templates and saved records travel as raw JSON so one service serves
/// every checklist variant; the loaders normalize rows into typed records.
pub trait ChecklistService: Send + Sync {
    fn fetch_templates(
        &self,
        kind: ChecklistKind,
    ) -> Result<Envelope<Vec<serde_json::Value>>, ServiceError>;

    fn fetch_positions(&self) -> Result<Envelope<Vec<PositionRow>>, ServiceError>;

    fn fetch_departments(&self) -> Result<Envelope<Vec<DepartmentOption>>, ServiceError>;

    /// Create or update one record. `previous` is `None` for records that
    /// were never persisted.
    fn save_record(
        &self,
        kind: ChecklistKind,
        record: &serde_json::Value,
        previous: Option<&RecordKey>,
    ) -> Result<Envelope<serde_json::Value>, ServiceError>;

    /// Short human-readable description for status lines and logs
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_without_data_uses_default() {
        let env: Envelope<Vec<PositionRow>> = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(env.data.is_empty());
        let err = env.into_result().unwrap_err();
        assert_eq!(err.to_string(), "backend rejected the request: success flag was false");
    }

    #[test]
    fn envelope_message_is_reported() {
        let env: Envelope<Vec<PositionRow>> =
            serde_json::from_str(r#"{"success": false, "data": [], "message": "session expired"}"#)
                .unwrap();
        assert_eq!(
            env.into_result().unwrap_err().to_string(),
            "backend rejected the request: session expired"
        );
    }
}
