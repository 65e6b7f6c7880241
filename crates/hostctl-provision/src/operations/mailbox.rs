use hostctl_audit::{OperationDraft, OperationKind};
use hostctl_core::{ResourceKind, ResourceRef};
use hostctl_exec::{CommandRequest, CommandRunner};
use tracing::info;

use super::{expect_success, finish, operation_id, rollback_command};
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::types::{MailboxProvisioned, MailboxSpec};

/// Account owning every maildir, per the mail server's virtual-mailbox setup.
const MAIL_OWNER: &str = "vmail";

/// Create a mailbox: append it to the mailbox map, rebuild the map database
/// with `postmap`, and create the maildir as the mail user.
///
/// # Errors
///
/// `MailboxExists` if the address is already mapped, `MailAddress` if it has
/// no domain part; command and gateway errors otherwise.
pub fn create_mailbox<R>(ctx: &ProvisionContext<R>, spec: &MailboxSpec) -> Result<MailboxProvisioned>
where
    R: CommandRunner + 'static,
{
    let op = ctx.recorder().begin(
        operation_id("create-mailbox", &spec.address),
        OperationDraft::new(
            OperationKind::Create,
            ResourceRef::new(ResourceKind::Mailbox, &spec.address),
            format!("create mailbox '{}'", spec.address),
        ),
    )?;

    let result = provision_mailbox(ctx, spec);
    finish(op, result)
}

fn provision_mailbox<R>(ctx: &ProvisionContext<R>, spec: &MailboxSpec) -> Result<MailboxProvisioned>
where
    R: CommandRunner + 'static,
{
    let Some((local, domain)) = spec.address.split_once('@') else {
        return Err(ProvisionError::MailAddress {
            address: spec.address.clone(),
        });
    };

    ctx.engine().with_transaction(|tx| {
        let map_path = ctx.paths().mailbox_map.clone();
        let previous = match std::fs::read_to_string(&map_path) {
            Ok(content) => content,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(ProvisionError::MapRead {
                    path: map_path,
                    source,
                });
            }
        };
        if previous
            .lines()
            .any(|line| line.split_whitespace().next() == Some(spec.address.as_str()))
        {
            return Err(ProvisionError::MailboxExists {
                address: spec.address.clone(),
            });
        }

        expect_success(
            ctx.runner(),
            &CommandRequest::new("tee")
                .arg("-a")
                .arg(map_path.display().to_string())
                .stdin(format!("{} {domain}/{local}/\n", spec.address)),
            "tee mailbox map",
        )?;
        // One compensation restores the map file and rebuilds its database,
        // so a later failure cannot leave the two out of sync.
        {
            let runner = ctx.runner_handle();
            let restore_path = map_path.clone();
            let restored = previous.clone();
            ctx.engine().add_rollback_action(
                tx,
                format!("restore mailbox map without '{}'", spec.address),
                move || {
                    let write = runner.run(
                        &CommandRequest::new("tee")
                            .arg(restore_path.display().to_string())
                            .stdin(restored),
                    )?;
                    if !write.success {
                        return Err(write.stderr_trimmed().to_string().into());
                    }
                    let rebuild = runner.run(
                        &CommandRequest::new("postmap").arg(restore_path.display().to_string()),
                    )?;
                    if rebuild.success {
                        Ok(())
                    } else {
                        Err(rebuild.stderr_trimmed().to_string().into())
                    }
                },
            );
        }

        expect_success(
            ctx.runner(),
            &CommandRequest::new("postmap").arg(map_path.display().to_string()),
            "postmap",
        )?;

        let maildir = ctx.paths().maildir(&spec.address);
        expect_success(
            ctx.runner(),
            &CommandRequest::new("mkdir")
                .arg("-p")
                .arg(maildir.join("cur").display().to_string())
                .arg(maildir.join("new").display().to_string())
                .arg(maildir.join("tmp").display().to_string())
                .run_as(MAIL_OWNER),
            "mkdir maildir",
        )?;
        ctx.engine().add_rollback_action(
            tx,
            format!("remove maildir '{}'", maildir.display()),
            rollback_command(
                ctx.runner_handle(),
                CommandRequest::new("rm")
                    .arg("-rf")
                    .arg(maildir.display().to_string()),
            ),
        );

        info!(address = %spec.address, "mailbox provisioned");
        Ok(MailboxProvisioned {
            address: spec.address.clone(),
            maildir,
        })
    })
}
