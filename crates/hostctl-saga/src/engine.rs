use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{CompensationFailure, RollbackError};
use crate::report::{CompensationOutcome, CompensationRecord, SagaReport, SagaStatus};

/// Opaque identifier of one open saga.
///
/// Handed to the unit of work so it can register rollback actions; distinct
/// from any audit operation identifier (the workflow correlates the two).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SagaId(Uuid);

impl SagaId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SagaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type RollbackFn = Box<dyn FnOnce() -> Result<(), RollbackError> + Send>;

struct RegisteredRollback {
    description: String,
    action: RollbackFn,
}

#[derive(Default)]
struct OpenSaga {
    rollbacks: Vec<RegisteredRollback>,
}

/// Executes units of work with best-effort rollback.
///
/// The engine owns the map of open sagas, so independent engines can coexist
/// (one per test, one per process). It introduces no parallelism of its own:
/// the unit of work runs on the calling thread, and compensations run
/// sequentially in strict reverse registration order.
///
/// The engine takes no locks over the host resources being mutated. It
/// assumes at most one in-flight workflow per distinct resource identity
/// (no two concurrent "create domain example.org" calls) and does not detect
/// violations of that assumption.
pub struct SagaEngine {
    open: Mutex<HashMap<SagaId, OpenSaga>>,
}

impl SagaEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            open: Mutex::new(HashMap::new()),
        }
    }

    /// Run `work` inside a fresh saga.
    ///
    /// The unit of work receives the saga's id and may call
    /// [`add_rollback_action`](Self::add_rollback_action) with it after each
    /// forward step succeeds. On `Ok` the registered rollbacks are discarded
    /// and the value is returned unchanged. On `Err` the rollbacks run last
    /// registered first, each attempted exactly once; a failing rollback is
    /// logged and never stops the remaining ones. The unit of work's own
    /// error is what the caller sees either way.
    ///
    /// A unit of work that panics leaves its saga abandoned: no compensations
    /// run, matching the crash behavior of the surrounding process.
    ///
    /// # Errors
    ///
    /// Returns the error of the unit of work, unchanged, after all
    /// registered compensations have been attempted.
    pub fn with_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&SagaId) -> Result<T, E>,
        E: fmt::Display,
    {
        let (result, _report) = self.with_transaction_reported(work);
        result
    }

    /// Like [`with_transaction`](Self::with_transaction), additionally
    /// returning the engine's [`SagaReport`] for logging and tests.
    pub fn with_transaction_reported<T, E, F>(&self, work: F) -> (Result<T, E>, SagaReport)
    where
        F: FnOnce(&SagaId) -> Result<T, E>,
        E: fmt::Display,
    {
        let id = SagaId::new();
        self.open
            .lock()
            .expect("saga engine mutex poisoned")
            .insert(id.clone(), OpenSaga::default());
        debug!(saga = %id, "saga opened");

        let result = work(&id);

        let saga = self
            .open
            .lock()
            .expect("saga engine mutex poisoned")
            .remove(&id)
            .expect("open saga present until its unit of work returns");

        match result {
            Ok(value) => {
                debug!(saga = %id, discarded = saga.rollbacks.len(), "saga committed");
                let records = saga
                    .rollbacks
                    .into_iter()
                    .map(|rollback| CompensationRecord {
                        description: rollback.description,
                        outcome: CompensationOutcome::Discarded,
                    })
                    .collect();
                (
                    Ok(value),
                    SagaReport::new(id, SagaStatus::Committed, records, Vec::new()),
                )
            }
            Err(step_error) => {
                error!(
                    saga = %id,
                    error = %step_error,
                    pending = saga.rollbacks.len(),
                    "unit of work failed, rolling back"
                );
                let (records, failures) = Self::run_compensations(&id, saga.rollbacks);
                let report = SagaReport::new(id, SagaStatus::RolledBack, records, failures);
                (Err(step_error), report)
            }
        }
    }

    /// Register a compensating action with the open saga `id`.
    ///
    /// Call this only after the forward step it compensates for has durably
    /// succeeded. The action must be safe to run even if the forward step's
    /// effect was only partially observed ("delete user if exists", not
    /// "delete user").
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name an open saga. Registering a rollback
    /// outside its saga's lifetime is a bug in the calling workflow, not a
    /// recoverable condition.
    pub fn add_rollback_action<F>(&self, id: &SagaId, description: impl Into<String>, action: F)
    where
        F: FnOnce() -> Result<(), RollbackError> + Send + 'static,
    {
        let description = description.into();
        let mut open = self.open.lock().expect("saga engine mutex poisoned");
        let Some(saga) = open.get_mut(id) else {
            panic!("no open saga '{id}': rollback '{description}' registered outside its saga");
        };
        debug!(saga = %id, compensation = %description, "rollback action registered");
        saga.rollbacks.push(RegisteredRollback {
            description,
            action: Box::new(action),
        });
    }

    /// Number of sagas currently open. Zero whenever no unit of work is on
    /// the stack.
    #[must_use]
    pub fn open_sagas(&self) -> usize {
        self.open.lock().expect("saga engine mutex poisoned").len()
    }

    fn run_compensations(
        id: &SagaId,
        mut rollbacks: Vec<RegisteredRollback>,
    ) -> (Vec<CompensationRecord>, Vec<CompensationFailure>) {
        let mut records = Vec::with_capacity(rollbacks.len());
        let mut failures = Vec::new();

        while let Some(rollback) = rollbacks.pop() {
            debug!(saga = %id, compensation = %rollback.description, "running compensation");
            let outcome = match (rollback.action)() {
                Ok(()) => CompensationOutcome::Ran,
                Err(source) => {
                    error!(
                        saga = %id,
                        compensation = %rollback.description,
                        error = %source,
                        "compensation failed"
                    );
                    failures.push(CompensationFailure {
                        description: rollback.description.clone(),
                        source,
                    });
                    CompensationOutcome::Failed
                }
            };
            records.push(CompensationRecord {
                description: rollback.description,
                outcome,
            });
        }

        records.reverse();
        (records, failures)
    }
}

impl Default for SagaEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("{0}")]
    struct TestError(String);

    fn push(log: &Arc<Mutex<Vec<String>>>, entry: &str) {
        log.lock().expect("test log mutex").push(entry.to_string());
    }

    #[test]
    fn successful_work_returns_value_and_discards_rollbacks() {
        let engine = SagaEngine::new();
        let log: Arc<Mutex<Vec<String>>> = Arc::default();

        let result: Result<i32, TestError> = engine.with_transaction(|tx| {
            let log = Arc::clone(&log);
            engine.add_rollback_action(tx, "undo step", move || {
                push(&log, "rollback ran");
                Ok(())
            });
            Ok(42)
        });

        assert_eq!(result.expect("work should succeed"), 42);
        assert!(log.lock().expect("test log mutex").is_empty());
        assert_eq!(engine.open_sagas(), 0);
    }

    #[test]
    fn failure_runs_rollbacks_in_reverse_order() {
        let engine = SagaEngine::new();
        let log: Arc<Mutex<Vec<String>>> = Arc::default();

        let result: Result<(), TestError> = engine.with_transaction(|tx| {
            for step in ["first", "second", "third"] {
                let log = Arc::clone(&log);
                engine.add_rollback_action(tx, format!("undo {step}"), move || {
                    push(&log, step);
                    Ok(())
                });
            }
            Err(TestError("step four failed".to_string()))
        });

        assert_eq!(
            result.expect_err("work should fail"),
            TestError("step four failed".to_string())
        );
        assert_eq!(
            *log.lock().expect("test log mutex"),
            vec!["third", "second", "first"]
        );
    }

    #[test]
    fn report_records_discarded_rollbacks_on_commit() {
        let engine = SagaEngine::new();

        let (result, report) = engine.with_transaction_reported(|tx| {
            engine.add_rollback_action(tx, "undo step", || Ok(()));
            Ok::<_, TestError>(())
        });

        assert!(result.is_ok());
        assert_eq!(report.status(), SagaStatus::Committed);
        assert_eq!(report.compensations().len(), 1);
        assert_eq!(
            report.compensations()[0].outcome,
            CompensationOutcome::Discarded
        );
    }

    #[test]
    fn nested_sagas_are_independent() {
        let engine = SagaEngine::new();
        let log: Arc<Mutex<Vec<String>>> = Arc::default();

        let result: Result<(), TestError> = engine.with_transaction(|outer| {
            let outer_log = Arc::clone(&log);
            engine.add_rollback_action(outer, "undo outer step", move || {
                push(&outer_log, "outer");
                Ok(())
            });

            let inner_result: Result<(), TestError> = engine.with_transaction(|inner| {
                let inner_log = Arc::clone(&log);
                engine.add_rollback_action(inner, "undo inner step", move || {
                    push(&inner_log, "inner");
                    Ok(())
                });
                Err(TestError("inner failed".to_string()))
            });

            inner_result
        });

        assert!(result.is_err());
        // Inner compensations run while the error unwinds, outer ones after.
        assert_eq!(*log.lock().expect("test log mutex"), vec!["inner", "outer"]);
        assert_eq!(engine.open_sagas(), 0);
    }

    #[test]
    #[should_panic(expected = "registered outside its saga")]
    fn rollback_for_expired_saga_panics() {
        let engine = SagaEngine::new();

        let leaked = engine
            .with_transaction(|tx| Ok::<_, TestError>(tx.clone()))
            .expect("work should succeed");

        engine.add_rollback_action(&leaked, "too late", || Ok(()));
    }
}
