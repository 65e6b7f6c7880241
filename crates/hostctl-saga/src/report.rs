use crate::engine::SagaId;
use crate::error::CompensationFailure;

/// Lifecycle state of a saga.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SagaStatus {
    /// Unit of work still running.
    Open,
    /// Unit of work returned successfully; compensations were discarded.
    Committed,
    /// Unit of work failed; compensations were run.
    RolledBack,
}

/// Outcome of one compensating action during rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompensationOutcome {
    /// Discarded without running because the saga committed.
    Discarded,
    /// Ran and returned `Ok`.
    Ran,
    /// Ran and returned an error (logged, not propagated).
    Failed,
}

/// Record of one registered compensating action.
#[derive(Debug)]
pub struct CompensationRecord {
    /// Description the rollback was registered with.
    pub description: String,
    /// What happened to it when the saga ended.
    pub outcome: CompensationOutcome,
}

/// Summary of one finished saga, for logging and tests.
///
/// This is the engine's own view of what it did; the durable audit trail is
/// written by the caller, not by the engine.
#[derive(Debug)]
pub struct SagaReport {
    id: SagaId,
    status: SagaStatus,
    compensations: Vec<CompensationRecord>,
    failures: Vec<CompensationFailure>,
}

impl SagaReport {
    pub(crate) fn new(
        id: SagaId,
        status: SagaStatus,
        compensations: Vec<CompensationRecord>,
        failures: Vec<CompensationFailure>,
    ) -> Self {
        Self {
            id,
            status,
            compensations,
            failures,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SagaId {
        &self.id
    }

    #[must_use]
    pub fn status(&self) -> SagaStatus {
        self.status
    }

    /// Compensation records in registration order (first registered first).
    #[must_use]
    pub fn compensations(&self) -> &[CompensationRecord] {
        &self.compensations
    }

    /// Errors from compensating actions that failed during rollback, in the
    /// order the rollback attempted them (reverse registration order).
    #[must_use]
    pub fn compensation_failures(&self) -> &[CompensationFailure] {
        &self.failures
    }

    /// True if any compensating action returned an error during rollback.
    #[must_use]
    pub fn had_compensation_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One line per compensating action, for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.compensations {
            let status = match record.outcome {
                CompensationOutcome::Discarded => "·",
                CompensationOutcome::Ran => "↩",
                CompensationOutcome::Failed => "⚠",
            };
            lines.push(format!("{status} {}", record.description));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: &[(&str, CompensationOutcome)]) -> SagaReport {
        let failures = outcomes
            .iter()
            .filter(|(_, o)| *o == CompensationOutcome::Failed)
            .map(|(d, _)| CompensationFailure {
                description: (*d).to_string(),
                source: "boom".into(),
            })
            .collect();
        SagaReport::new(
            SagaId::new(),
            SagaStatus::RolledBack,
            outcomes
                .iter()
                .map(|(d, o)| CompensationRecord {
                    description: (*d).to_string(),
                    outcome: *o,
                })
                .collect(),
            failures,
        )
    }

    #[test]
    fn no_failures_when_all_compensations_ran() {
        let report = report(&[
            ("remove vhost", CompensationOutcome::Ran),
            ("delete user", CompensationOutcome::Ran),
        ]);

        assert!(!report.had_compensation_failures());
    }

    #[test]
    fn failure_is_detected() {
        let report = report(&[
            ("remove vhost", CompensationOutcome::Ran),
            ("delete user", CompensationOutcome::Failed),
        ]);

        assert!(report.had_compensation_failures());
    }

    #[test]
    fn summary_marks_each_outcome() {
        let report = report(&[
            ("remove vhost", CompensationOutcome::Ran),
            ("delete user", CompensationOutcome::Failed),
        ]);

        let summary = report.summary();

        assert!(summary.contains("↩ remove vhost"));
        assert!(summary.contains("⚠ delete user"));
    }
}
