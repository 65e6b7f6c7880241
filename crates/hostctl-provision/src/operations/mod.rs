pub mod certificate;
pub mod domain;
pub mod mailbox;
pub mod user;

pub use certificate::install_certificate;
pub use domain::create_domain;
pub use mailbox::create_mailbox;
pub use user::{change_user_password, create_user};

use std::sync::Arc;

use chrono::Utc;
use hostctl_audit::{OperationGuard, OperationId};
use hostctl_exec::{CommandOutput, CommandRequest, CommandRunner};
use hostctl_saga::RollbackError;
use tracing::warn;

use crate::error::{ProvisionError, Result};

pub(crate) fn operation_id(action: &str, resource: &str) -> OperationId {
    OperationId::new(format!("{action}-{resource}-{}", Utc::now().timestamp()))
}

/// Run a command the workflow cannot proceed without.
pub(crate) fn expect_success<R: CommandRunner>(
    runner: &R,
    request: &CommandRequest,
    context: &str,
) -> Result<CommandOutput> {
    let output = runner.run(request)?;
    if output.success {
        Ok(output)
    } else {
        Err(ProvisionError::CommandFailed {
            context: context.to_string(),
            stderr: output.stderr_trimmed().to_string(),
        })
    }
}

/// Rollback closure that runs one command and treats non-zero exit as a
/// compensation failure. Only for commands that are already idempotent-safe
/// (`rm -f`, `rm -rf`).
pub(crate) fn rollback_command<R>(
    runner: Arc<R>,
    request: CommandRequest,
) -> impl FnOnce() -> std::result::Result<(), RollbackError> + Send
where
    R: CommandRunner + 'static,
{
    move || {
        let output = runner.run(&request)?;
        if output.success {
            Ok(())
        } else {
            Err(output.stderr_trimmed().to_string().into())
        }
    }
}

/// Write the operation's single terminal audit row for `result`.
///
/// Audit bookkeeping failures past this point are secondary: they are logged
/// and never replace the workflow's own outcome.
pub(crate) fn finish<T>(op: OperationGuard<'_>, result: Result<T>) -> Result<T> {
    let id = op.id().clone();
    let audit_result = match &result {
        Ok(_) => op.complete(),
        Err(error) => op.fail(error),
    };
    if let Err(error) = audit_result {
        warn!(operation = %id, %error, "terminal audit write failed");
    }
    result
}
