use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use chrono::Utc;
use hostctl_core::{Actor, ResourceRef};
use tracing::{debug, warn};

use crate::entry::{AuditEntry, OperationDraft, OperationId, OperationKind, Outcome};
use crate::error::{AuditError, Result};
use crate::sink::AuditSink;

/// Records the start and outcome of provisioning operations.
///
/// Pending operations are tracked in a map owned by this instance, not in
/// ambient global state, so independent recorders can coexist (one per test,
/// one per process).
pub struct AuditRecorder {
    actor: Actor,
    pending: Mutex<HashMap<OperationId, OperationDraft>>,
    sink: Box<dyn AuditSink>,
}

impl AuditRecorder {
    #[must_use]
    pub fn new(actor: Actor, sink: impl AuditSink + 'static) -> Self {
        Self {
            actor,
            pending: Mutex::new(HashMap::new()),
            sink: Box::new(sink),
        }
    }

    /// Record that `id` is now pending. Writes no audit row yet.
    ///
    /// # Errors
    ///
    /// `AlreadyStarted` if `id` is already pending.
    pub fn start_operation(&self, id: OperationId, draft: OperationDraft) -> Result<()> {
        let mut pending = self.pending.lock().expect("audit pending mutex poisoned");
        if pending.contains_key(&id) {
            return Err(AuditError::AlreadyStarted { id });
        }
        debug!(operation = %id, resource = %draft.resource, "operation pending");
        pending.insert(id, draft);
        Ok(())
    }

    /// Start `id` and return a guard that guarantees a terminal write.
    ///
    /// Dropping the guard without calling
    /// [`complete`](OperationGuard::complete) or
    /// [`fail`](OperationGuard::fail) writes a failure row marking the
    /// operation abandoned, so early returns cannot leave a dangling start.
    ///
    /// # Errors
    ///
    /// `AlreadyStarted` if `id` is already pending.
    pub fn begin(&self, id: OperationId, draft: OperationDraft) -> Result<OperationGuard<'_>> {
        self.start_operation(id.clone(), draft)?;
        Ok(OperationGuard {
            recorder: self,
            id,
            finished: false,
        })
    }

    /// Amend the pending draft for `id`, e.g. to attach the new-value
    /// snapshot once the forward steps have produced it.
    ///
    /// # Errors
    ///
    /// `UnknownOperation` if `id` is not pending.
    pub fn annotate(&self, id: &OperationId, amend: impl FnOnce(&mut OperationDraft)) -> Result<()> {
        let mut pending = self.pending.lock().expect("audit pending mutex poisoned");
        let draft = pending
            .get_mut(id)
            .ok_or_else(|| AuditError::UnknownOperation { id: id.clone() })?;
        amend(draft);
        Ok(())
    }

    /// Write the single success row for `id`.
    ///
    /// # Errors
    ///
    /// `UnknownOperation` if `id` is not pending (never started, or a
    /// terminal row was already written); sink errors if persisting fails.
    pub fn log_operation_complete(&self, id: &OperationId) -> Result<()> {
        self.finalize(id, Outcome::Success)
    }

    /// Write the single failure row for `id`, carrying the error text.
    ///
    /// # Errors
    ///
    /// `UnknownOperation` if `id` is not pending; sink errors if persisting
    /// fails.
    pub fn log_operation_failed(&self, id: &OperationId, error: &dyn fmt::Display) -> Result<()> {
        self.finalize(
            id,
            Outcome::Failure {
                error: error.to_string(),
            },
        )
    }

    /// Record a sensitive action (password change, key installation) as a
    /// single immediate row with no start/finish bracket.
    ///
    /// # Errors
    ///
    /// Sink errors if persisting fails.
    pub fn log_security_event(
        &self,
        resource: ResourceRef,
        description: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Result<()> {
        let entry = AuditEntry {
            operation_id: None,
            actor: self.actor.clone(),
            kind: OperationKind::SecurityEvent,
            resource,
            description: description.into(),
            old_value: None,
            new_value: None,
            metadata,
            outcome: Outcome::Success,
            recorded_at: Utc::now(),
        };
        self.sink.append(&entry)
    }

    fn finalize(&self, id: &OperationId, outcome: Outcome) -> Result<()> {
        let draft = self
            .pending
            .lock()
            .expect("audit pending mutex poisoned")
            .remove(id)
            .ok_or_else(|| AuditError::UnknownOperation { id: id.clone() })?;

        let entry = AuditEntry {
            operation_id: Some(id.clone()),
            actor: self.actor.clone(),
            kind: draft.kind,
            resource: draft.resource,
            description: draft.description,
            old_value: draft.old_value,
            new_value: draft.new_value,
            metadata: draft.metadata,
            outcome,
            recorded_at: Utc::now(),
        };
        debug!(operation = %id, failed = entry.is_failure(), "operation finalized");
        self.sink.append(&entry)
    }
}

/// Scoped handle for one pending operation.
///
/// Obtained from [`AuditRecorder::begin`]; consumed by `complete` or `fail`.
#[must_use = "dropping the guard records the operation as abandoned"]
pub struct OperationGuard<'a> {
    recorder: &'a AuditRecorder,
    id: OperationId,
    finished: bool,
}

impl OperationGuard<'_> {
    #[must_use]
    pub fn id(&self) -> &OperationId {
        &self.id
    }

    /// Amend the pending draft, e.g. with the final new-value snapshot.
    ///
    /// # Errors
    ///
    /// `UnknownOperation` if the operation is no longer pending.
    pub fn annotate(&self, amend: impl FnOnce(&mut OperationDraft)) -> Result<()> {
        self.recorder.annotate(&self.id, amend)
    }

    /// Write the success row and consume the guard.
    ///
    /// # Errors
    ///
    /// Sink errors if persisting fails; the terminal write is still consumed
    /// (no second row will be attempted on drop).
    pub fn complete(mut self) -> Result<()> {
        self.finished = true;
        self.recorder.log_operation_complete(&self.id)
    }

    /// Write the failure row and consume the guard.
    ///
    /// # Errors
    ///
    /// Sink errors if persisting fails; the terminal write is still consumed
    /// (no second row will be attempted on drop).
    pub fn fail(mut self, error: &dyn fmt::Display) -> Result<()> {
        self.finished = true;
        self.recorder.log_operation_failed(&self.id, error)
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // Reached only when the workflow exited without a terminal call.
        let result = self
            .recorder
            .log_operation_failed(&self.id, &"operation abandoned without a terminal audit write");
        if let Err(error) = result {
            warn!(operation = %self.id, %error, "failed to record abandoned operation");
        }
    }
}
