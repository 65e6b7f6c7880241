//! Integration tests for the start/terminal bracket.
//!
//! Every started operation must end with exactly one terminal row on every
//! exit path: success, expected failure, or an early return that never
//! reaches an explicit terminal call.

use hostctl_audit::{
    AuditEntry, AuditRecorder, JsonlSink, MemorySink, OperationDraft, OperationId, OperationKind,
    Outcome,
};
use hostctl_core::{Actor, ResourceKind, ResourceRef};

fn recorder() -> (AuditRecorder, MemorySink) {
    let sink = MemorySink::new();
    let recorder = AuditRecorder::new(Actor::new("admin"), sink.clone());
    (recorder, sink)
}

fn draft() -> OperationDraft {
    OperationDraft::new(
        OperationKind::Create,
        ResourceRef::new(ResourceKind::Domain, "example.org"),
        "create domain",
    )
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct WorkError(String);

// A workflow shaped like the real ones: guard on entry, `?` in the middle.
fn fallible_workflow(recorder: &AuditRecorder, should_fail: bool) -> Result<(), WorkError> {
    let op = recorder
        .begin(OperationId::new("op-1"), draft())
        .map_err(|e| WorkError(e.to_string()))?;

    if should_fail {
        let error = WorkError("apachectl configtest failed".to_string());
        if let Err(audit_error) = op.fail(&error) {
            // Audit bookkeeping failure is secondary; never mask the
            // workflow error with it.
            eprintln!("audit write failed: {audit_error}");
        }
        return Err(error);
    }

    op.complete().map_err(|e| WorkError(e.to_string()))?;
    Ok(())
}

#[test]
fn success_path_writes_exactly_one_terminal_row() -> anyhow::Result<()> {
    let (recorder, sink) = recorder();

    fallible_workflow(&recorder, false)?;

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].outcome, Outcome::Success);
    Ok(())
}

#[test]
fn failure_path_writes_exactly_one_row_with_the_error_message() {
    let (recorder, sink) = recorder();

    let err = fallible_workflow(&recorder, true).expect_err("workflow should fail");
    assert_eq!(err.to_string(), "apachectl configtest failed");

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].operation_id, Some(OperationId::new("op-1")));
    match &entries[0].outcome {
        Outcome::Failure { error } => {
            assert!(error.contains("apachectl configtest failed"));
        }
        Outcome::Success => unreachable!("row must be a failure"),
    }
}

#[test]
fn early_return_path_still_gets_its_terminal_row() -> anyhow::Result<()> {
    let (recorder, sink) = recorder();

    fn early_return(recorder: &AuditRecorder) -> Result<(), WorkError> {
        let _op = recorder
            .begin(OperationId::new("op-1"), draft())
            .map_err(|e| WorkError(e.to_string()))?;
        // A `?` fires before any terminal call is reached.
        Err(WorkError("precondition failed".to_string()))
    }

    let err = early_return(&recorder).expect_err("workflow should fail");
    assert_eq!(err.to_string(), "precondition failed");

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_failure());
    Ok(())
}

#[test]
fn independent_recorders_do_not_share_pending_state() -> anyhow::Result<()> {
    let (first, _first_sink) = recorder();
    let (second, second_sink) = recorder();

    first.start_operation(OperationId::new("op-1"), draft())?;

    // The same id is free on the other recorder instance.
    second.start_operation(OperationId::new("op-1"), draft())?;
    second.log_operation_complete(&OperationId::new("op-1"))?;

    assert_eq!(second_sink.entries().len(), 1);
    Ok(())
}

#[test]
fn jsonl_sink_round_trips_through_the_recorder() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("audit.jsonl");
    let recorder = AuditRecorder::new(Actor::new("admin"), JsonlSink::new(&path));

    recorder.start_operation(OperationId::new("op-1"), draft())?;
    recorder.log_operation_failed(&OperationId::new("op-1"), &"mkdir exited 1")?;

    let content = std::fs::read_to_string(&path)?;
    let entry: AuditEntry = serde_json::from_str(content.trim())?;
    assert!(entry.is_failure());
    assert_eq!(entry.resource, ResourceRef::new(ResourceKind::Domain, "example.org"));
    Ok(())
}
