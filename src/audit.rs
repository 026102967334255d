//! Audit trail for store mutations.
//!
//! One JSON line per change in `.thesis/audit.jsonl`, newest last.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::Result;
use crate::model::ProjectId;
use crate::storage::Storage;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    pub action: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl AuditEntry {
    pub fn new(action: impl Into<String>, project_id: Option<ProjectId>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            timestamp: Utc::now(),
            project_id,
            action: action.into(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

pub fn append(storage: &Storage, entry: &AuditEntry) -> Result<()> {
    storage.append_jsonl(&storage.audit_file(), entry)
}

/// Most recent entries first, optionally limited to one project.
pub fn recent(
    storage: &Storage,
    project_id: Option<ProjectId>,
    limit: Option<usize>,
) -> Result<Vec<AuditEntry>> {
    let mut entries: Vec<AuditEntry> = storage.read_jsonl(&storage.audit_file())?;
    if let Some(project_id) = project_id {
        entries.retain(|entry| entry.project_id == Some(project_id));
    }
    entries.reverse();
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_filters_and_limits() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        storage.init().unwrap();

        append(&storage, &AuditEntry::new("project.create", Some(1))).unwrap();
        append(&storage, &AuditEntry::new("project.create", Some(2))).unwrap();
        append(
            &storage,
            &AuditEntry::new("task.status", Some(1))
                .with_payload(serde_json::json!({"task_id": 3, "status": "done"})),
        )
        .unwrap();

        let all = recent(&storage, None, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].action, "task.status");
        assert_eq!(all[0].payload["status"], "done");

        let first = recent(&storage, Some(1), Some(1)).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].action, "task.status");
    }

    #[test]
    fn null_payload_is_omitted() {
        let entry = AuditEntry::new("init", None);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("payload"));
        assert!(!json.contains("project_id"));
        let back: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
