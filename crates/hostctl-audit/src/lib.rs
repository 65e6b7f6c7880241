//! Durable audit trail for provisioning operations.
//!
//! Every multi-step operation is bracketed: recorded as pending when it
//! starts and finalized with exactly one terminal row — success or failure —
//! when it ends, on every exit path. The [`OperationGuard`] makes the
//! bracket hard to get wrong: acquire it on entry, and a guard dropped
//! without an explicit terminal call writes an "abandoned" failure row.
//!
//! The recorder knows nothing about rollback. A failed operation is audited
//! as failed after compensations have run, so the trail reflects the final
//! state of the host, not the first error seen.

mod entry;
mod error;
mod recorder;
mod sink;

pub use entry::{AuditEntry, OperationDraft, OperationId, OperationKind, Outcome};
pub use error::{AuditError, Result};
pub use recorder::{AuditRecorder, OperationGuard};
pub use sink::{AuditSink, JsonlSink, MemorySink};
