use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One structured log entry awaiting delivery to the index backend.
///
/// Records are immutable once handed to a processor; validating the
/// contents is the producing pipeline's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub module_path: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub fields: BTreeMap<String, serde_json::Value>,
    pub message: Option<String>,
    pub service_name: Option<String>,
}

impl LogRecord {
    /// Build a record stamped with the current time and no source location.
    pub fn new(level: impl Into<String>, target: impl Into<String>) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            level: level.into(),
            target: target.into(),
            module_path: None,
            file: None,
            line: None,
            fields: BTreeMap::new(),
            message: None,
            service_name: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
