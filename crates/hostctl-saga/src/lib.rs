//! Best-effort compensation engine for multi-step provisioning.
//!
//! Provisioning a resource means a sequence of non-transactional host
//! mutations (spawned commands, file writes, service reloads). This crate
//! provides the transaction bracket around such a sequence: the unit of work
//! registers a compensating closure after each forward step succeeds, and if
//! a later step fails, the registered compensations run in reverse order
//! before the original error reaches the caller.

mod engine;
mod error;
mod report;

pub use engine::{SagaEngine, SagaId};
pub use error::{CompensationFailure, RollbackError};
pub use report::{CompensationOutcome, CompensationRecord, SagaReport, SagaStatus};
