use std::path::PathBuf;
use std::sync::Arc;

use hostctl_audit::{OperationDraft, OperationKind};
use hostctl_core::{ResourceKind, ResourceRef};
use hostctl_exec::{CommandRequest, CommandRunner};
use hostctl_saga::RollbackError;
use tracing::{debug, warn};

use super::{expect_success, finish, operation_id};
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::types::{UserProvisioned, UserSpec};

const DEFAULT_SHELL: &str = "/usr/sbin/nologin";

/// Create a tenant Unix account: `useradd` with a home directory, then an
/// optional initial password fed to `chpasswd` over stdin.
///
/// # Errors
///
/// `UserExists` if the account is already present; command and gateway
/// errors otherwise.
pub fn create_user<R>(ctx: &ProvisionContext<R>, spec: &UserSpec) -> Result<UserProvisioned>
where
    R: CommandRunner + 'static,
{
    let op = ctx.recorder().begin(
        operation_id("create-user", &spec.name),
        OperationDraft::new(
            OperationKind::Create,
            ResourceRef::new(ResourceKind::SystemUser, &spec.name),
            format!("create system user '{}'", spec.name),
        )
        .new_value(serde_json::json!({
            "name": spec.name,
            "shell": spec.shell.as_deref().unwrap_or(DEFAULT_SHELL),
        })),
    )?;

    let result = provision_account(ctx, spec);
    finish(op, result)
}

/// The saga-wrapped part of user creation, also used as a nested step of
/// domain creation (which audits under its own operation id).
pub(crate) fn provision_account<R>(
    ctx: &ProvisionContext<R>,
    spec: &UserSpec,
) -> Result<UserProvisioned>
where
    R: CommandRunner + 'static,
{
    ctx.engine().with_transaction(|tx| {
        // `id` exits zero iff the account exists.
        let lookup = ctx.runner().run(&CommandRequest::new("id").arg(&spec.name))?;
        if lookup.success {
            return Err(ProvisionError::UserExists {
                user: spec.name.clone(),
            });
        }

        let shell = spec.shell.as_deref().unwrap_or(DEFAULT_SHELL);
        expect_success(
            ctx.runner(),
            &CommandRequest::new("useradd")
                .arg("--create-home")
                .args(["--shell", shell])
                .arg(&spec.name),
            "useradd",
        )?;
        ctx.engine().add_rollback_action(
            tx,
            format!("remove unix account '{}'", spec.name),
            remove_account(ctx.runner_handle(), spec.name.clone()),
        );

        if let Some(password) = &spec.password {
            expect_success(
                ctx.runner(),
                &CommandRequest::new("chpasswd").stdin(format!("{}:{password}\n", spec.name)),
                "chpasswd",
            )?;
        }

        debug!(user = %spec.name, "unix account provisioned");
        Ok(UserProvisioned {
            name: spec.name.clone(),
            home: PathBuf::from(format!("/home/{}", spec.name)),
        })
    })
}

/// Rollback closure deleting the account and its home directory.
pub(crate) fn remove_account<R>(
    runner: Arc<R>,
    name: String,
) -> impl FnOnce() -> std::result::Result<(), RollbackError> + Send
where
    R: CommandRunner + 'static,
{
    move || {
        let output = runner.run(&CommandRequest::new("userdel").arg("--remove").arg(&name))?;
        // A vanished account is already the desired state.
        if output.success || output.stderr.contains("does not exist") {
            Ok(())
        } else {
            Err(output.stderr_trimmed().to_string().into())
        }
    }
}

/// Set a new password for an existing account and record it as a security
/// event (single immediate audit row, no start/finish bracket).
///
/// # Errors
///
/// `NoSuchUser` if the account is missing; command and gateway errors
/// otherwise.
pub fn change_user_password<R>(ctx: &ProvisionContext<R>, user: &str, password: &str) -> Result<()>
where
    R: CommandRunner + 'static,
{
    let lookup = ctx.runner().run(&CommandRequest::new("id").arg(user))?;
    if !lookup.success {
        return Err(ProvisionError::NoSuchUser {
            user: user.to_string(),
        });
    }

    expect_success(
        ctx.runner(),
        &CommandRequest::new("chpasswd").stdin(format!("{user}:{password}\n")),
        "chpasswd",
    )?;

    if let Err(error) = ctx.recorder().log_security_event(
        ResourceRef::new(ResourceKind::SystemUser, user),
        "password changed",
        None,
    ) {
        warn!(user, %error, "failed to record password change");
    }
    Ok(())
}
