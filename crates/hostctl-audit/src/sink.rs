use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::entry::AuditEntry;
use crate::error::{AuditError, Result};

/// Destination for finalized audit rows.
///
/// Synchronous, append-only; implementations must not reorder entries. The
/// relational store of the full panel sits behind this same boundary.
pub trait AuditSink: Send + Sync {
    /// Persist one finalized entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be encoded or written.
    fn append(&self, entry: &AuditEntry) -> Result<()>;
}

/// Append-only JSON-lines file, one entry per line.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AuditSink for JsonlSink {
    fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| AuditError::Sink { source })?;
        file.write_all(line.as_bytes())
            .map_err(|source| AuditError::Sink { source })?;
        file.flush().map_err(|source| AuditError::Sink { source })
    }
}

/// In-memory sink for tests. Clones share the same storage, so a test can
/// keep one handle and hand another to the recorder.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("memory sink mutex").clone()
    }
}

impl AuditSink for MemorySink {
    fn append(&self, entry: &AuditEntry) -> Result<()> {
        self.entries
            .lock()
            .expect("memory sink mutex")
            .push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use hostctl_core::{Actor, ResourceKind, ResourceRef};

    use super::*;
    use crate::entry::{OperationId, OperationKind, Outcome};

    fn entry(id: &str) -> AuditEntry {
        AuditEntry {
            operation_id: Some(OperationId::new(id)),
            actor: Actor::new("admin"),
            kind: OperationKind::Create,
            resource: ResourceRef::new(ResourceKind::Domain, "example.org"),
            description: "create domain".to_string(),
            old_value: None,
            new_value: None,
            metadata: None,
            outcome: Outcome::Success,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn jsonl_sink_appends_one_line_per_entry() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("audit.jsonl");
        let sink = JsonlSink::new(&path);

        sink.append(&entry("op-1"))?;
        sink.append(&entry("op-2"))?;

        let content = std::fs::read_to_string(&path)?;
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: AuditEntry = serde_json::from_str(lines[0])?;
        assert_eq!(first.operation_id, Some(OperationId::new("op-1")));
        Ok(())
    }

    #[test]
    fn jsonl_sink_reports_unwritable_path() {
        let sink = JsonlSink::new("/nonexistent-dir-xyzzy/audit.jsonl");

        let err = sink.append(&entry("op-1")).expect_err("write should fail");

        assert!(matches!(err, AuditError::Sink { .. }));
    }

    #[test]
    fn memory_sink_preserves_order() -> anyhow::Result<()> {
        let sink = MemorySink::new();

        sink.append(&entry("op-1"))?;
        sink.append(&entry("op-2"))?;

        let ids: Vec<_> = sink
            .entries()
            .into_iter()
            .filter_map(|e| e.operation_id)
            .collect();
        assert_eq!(ids, vec![OperationId::new("op-1"), OperationId::new("op-2")]);
        Ok(())
    }
}
