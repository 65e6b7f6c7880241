use thiserror::Error;

use crate::entry::OperationId;

#[derive(Debug, Error)]
pub enum AuditError {
    /// No pending operation with this id: either it was never started or a
    /// terminal row was already written for it.
    #[error("no pending operation '{id}'")]
    UnknownOperation { id: OperationId },

    /// `start_operation` called twice for the same id without a terminal
    /// write in between.
    #[error("operation '{id}' is already pending")]
    AlreadyStarted { id: OperationId },

    #[error("failed to persist audit entry")]
    Sink {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode audit entry")]
    Encode {
        #[from]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, AuditError>;
