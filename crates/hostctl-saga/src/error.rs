use thiserror::Error;

/// Error type compensating closures may return.
///
/// Compensations are arbitrary host mutations (command spawns, file removals),
/// so the engine accepts any error and only logs it; a boxed trait object
/// keeps registration free of generic plumbing.
pub type RollbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Record of one compensating action that failed during rollback.
///
/// Compensation failures never propagate to the caller; they are collected
/// into the saga report and logged.
#[derive(Debug, Error)]
#[error("compensation '{description}' failed")]
pub struct CompensationFailure {
    /// Description the rollback was registered with.
    pub description: String,
    /// The underlying error.
    #[source]
    pub source: RollbackError,
}
