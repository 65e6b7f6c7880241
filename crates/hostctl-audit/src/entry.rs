use std::fmt;

use chrono::{DateTime, Utc};
use hostctl_core::{Actor, ResourceRef};
use serde::{Deserialize, Serialize};

/// Identifier of one audited operation.
///
/// Chosen by the workflow (e.g. `create-domain-example.org-1723024800`) and
/// deliberately distinct from any saga id; the workflow is the only place
/// the two are correlated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(String);

impl OperationId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an audited operation did to its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    SecurityEvent,
}

/// Terminal outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure { error: String },
}

/// Everything known about an operation before its outcome.
///
/// Supplied at `start_operation` time; snapshots may be amended while the
/// operation is pending (the new state of a resource is often only known
/// once the forward steps have run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDraft {
    pub kind: OperationKind,
    pub resource: ResourceRef,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl OperationDraft {
    #[must_use]
    pub fn new(kind: OperationKind, resource: ResourceRef, description: impl Into<String>) -> Self {
        Self {
            kind,
            resource,
            description: description.into(),
            old_value: None,
            new_value: None,
            metadata: None,
        }
    }

    /// Resource state before the operation, for diffing.
    #[must_use]
    pub fn old_value(mut self, value: serde_json::Value) -> Self {
        self.old_value = Some(value);
        self
    }

    /// Resource state after the operation, for diffing.
    #[must_use]
    pub fn new_value(mut self, value: serde_json::Value) -> Self {
        self.new_value = Some(value);
        self
    }

    #[must_use]
    pub fn metadata(mut self, value: serde_json::Value) -> Self {
        self.metadata = Some(value);
        self
    }
}

/// One finalized audit row. Never mutated after being written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Absent for security events, which have no start/finish bracket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<OperationId>,
    pub actor: Actor,
    pub kind: OperationKind,
    pub resource: ResourceRef,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub outcome: Outcome,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failure { .. })
    }
}
