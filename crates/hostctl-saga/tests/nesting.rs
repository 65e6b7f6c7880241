//! Integration tests for nested sagas.
//!
//! A multi-resource workflow (domain creation provisioning its system user
//! as one step) opens an inner saga on the same engine. Inner and outer
//! sagas are independent: an inner failure rolls back only inner steps, then
//! the error unwinds into the outer saga which rolls back its own.

use std::sync::{Arc, Mutex};

use hostctl_saga::SagaEngine;

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
struct WorkError(String);

type Log = Arc<Mutex<Vec<String>>>;

fn push(log: &Log, entry: &str) {
    log.lock().expect("test log mutex").push(entry.to_string());
}

#[test]
fn inner_failure_unwinds_through_outer_compensations() {
    let engine = SagaEngine::new();
    let log: Log = Arc::default();

    let result: Result<(), WorkError> = engine.with_transaction(|outer| {
        let outer_one = Arc::clone(&log);
        engine.add_rollback_action(outer, "undo outer step 1", move || {
            push(&outer_one, "outer 1");
            Ok(())
        });

        engine.with_transaction(|inner| {
            let inner_one = Arc::clone(&log);
            engine.add_rollback_action(inner, "undo inner step 1", move || {
                push(&inner_one, "inner 1");
                Ok(())
            });
            let inner_two = Arc::clone(&log);
            engine.add_rollback_action(inner, "undo inner step 2", move || {
                push(&inner_two, "inner 2");
                Ok(())
            });
            Err::<(), _>(WorkError("inner step 3 failed".to_string()))
        })?;

        let outer_two = Arc::clone(&log);
        engine.add_rollback_action(outer, "undo outer step 2", move || {
            push(&outer_two, "outer 2");
            Ok(())
        });
        Ok(())
    });

    assert_eq!(
        result.expect_err("outer should fail"),
        WorkError("inner step 3 failed".to_string())
    );
    // Inner saga rolled back first (LIFO within itself), then the outer one;
    // "outer 2" was never registered because the inner failure unwound first.
    assert_eq!(
        *log.lock().expect("test log mutex"),
        vec!["inner 2", "inner 1", "outer 1"]
    );
    assert_eq!(engine.open_sagas(), 0);
}

#[test]
fn inner_success_leaves_inner_rollbacks_discarded() {
    let engine = SagaEngine::new();
    let log: Log = Arc::default();

    let result: Result<(), WorkError> = engine.with_transaction(|outer| {
        engine.with_transaction(|inner| {
            let inner_log = Arc::clone(&log);
            engine.add_rollback_action(inner, "undo inner", move || {
                push(&inner_log, "inner");
                Ok(())
            });
            Ok::<(), WorkError>(())
        })?;

        let outer_log = Arc::clone(&log);
        engine.add_rollback_action(outer, "undo outer", move || {
            push(&outer_log, "outer");
            Ok(())
        });
        Err(WorkError("outer failed after inner committed".to_string()))
    });

    assert!(result.is_err());
    // The committed inner saga's rollback is gone for good; a failure at the
    // outer level does not resurrect it.
    assert_eq!(*log.lock().expect("test log mutex"), vec!["outer"]);
}

#[test]
fn sibling_sagas_do_not_observe_each_other() {
    let engine = SagaEngine::new();
    let log: Log = Arc::default();

    let first: Result<(), WorkError> = engine.with_transaction(|tx| {
        let log = Arc::clone(&log);
        engine.add_rollback_action(tx, "undo first saga", move || {
            push(&log, "first");
            Ok(())
        });
        Err(WorkError("first fails".to_string()))
    });
    assert!(first.is_err());

    let second: Result<(), WorkError> = engine.with_transaction(|tx| {
        let log = Arc::clone(&log);
        engine.add_rollback_action(tx, "undo second saga", move || {
            push(&log, "second");
            Ok(())
        });
        Ok(())
    });
    assert!(second.is_ok());

    // Only the first saga's rollback ever ran.
    assert_eq!(*log.lock().expect("test log mutex"), vec!["first"]);
}
