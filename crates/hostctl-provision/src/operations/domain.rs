use std::path::Path;

use hostctl_audit::{OperationDraft, OperationKind};
use hostctl_core::{ResourceKind, ResourceRef};
use hostctl_exec::{CommandRequest, CommandRunner};
use tracing::{info, warn};

use super::user::{provision_account, remove_account};
use super::{expect_success, finish, operation_id, rollback_command};
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::types::{DomainProvisioned, DomainSpec};

/// Provision a web domain: its owning Unix account (as a nested saga), the
/// web root, the vhost file, and a checked web-server reload.
///
/// # Errors
///
/// `DomainExists` if a vhost file is already present, `ConfigCheck` if the
/// web server rejects the new configuration; command and gateway errors
/// otherwise.
pub fn create_domain<R>(ctx: &ProvisionContext<R>, spec: &DomainSpec) -> Result<DomainProvisioned>
where
    R: CommandRunner + 'static,
{
    let op = ctx.recorder().begin(
        operation_id("create-domain", &spec.name),
        OperationDraft::new(
            OperationKind::Create,
            ResourceRef::new(ResourceKind::Domain, &spec.name),
            format!("create domain '{}'", spec.name),
        )
        .metadata(serde_json::json!({"owner": spec.owner.name})),
    )?;

    let result = provision_domain(ctx, spec);
    if let Ok(provisioned) = &result {
        let snapshot = serde_json::json!({
            "web_root": provisioned.web_root.display().to_string(),
            "vhost_file": provisioned.vhost_file.display().to_string(),
        });
        if let Err(error) = op.annotate(|draft| draft.new_value = Some(snapshot)) {
            warn!(domain = %spec.name, %error, "failed to attach domain snapshot");
        }
    }
    finish(op, result)
}

fn provision_domain<R>(ctx: &ProvisionContext<R>, spec: &DomainSpec) -> Result<DomainProvisioned>
where
    R: CommandRunner + 'static,
{
    ctx.engine().with_transaction(|tx| {
        let vhost_file = ctx.paths().vhost_file(&spec.name);
        if vhost_file.exists() {
            return Err(ProvisionError::DomainExists {
                domain: spec.name.clone(),
            });
        }

        // The owning account is provisioned under its own inner saga; once
        // that commits, undoing it on a later failure is this saga's job.
        provision_account(ctx, &spec.owner)?;
        ctx.engine().add_rollback_action(
            tx,
            format!("remove unix account '{}'", spec.owner.name),
            remove_account(ctx.runner_handle(), spec.owner.name.clone()),
        );

        let web_root = ctx.paths().web_root(&spec.name);
        expect_success(
            ctx.runner(),
            &CommandRequest::new("mkdir")
                .arg("-p")
                .arg(web_root.display().to_string()),
            "mkdir",
        )?;
        ctx.engine().add_rollback_action(
            tx,
            format!("remove web root '{}'", web_root.display()),
            rollback_command(
                ctx.runner_handle(),
                CommandRequest::new("rm")
                    .arg("-rf")
                    .arg(web_root.display().to_string()),
            ),
        );
        expect_success(
            ctx.runner(),
            &CommandRequest::new("chown")
                .arg(format!("{0}:{0}", spec.owner.name))
                .arg(web_root.display().to_string()),
            "chown",
        )?;
        // Document root is created by the tenant account itself, so the
        // files under it never belong to the control plane.
        expect_success(
            ctx.runner(),
            &CommandRequest::new("mkdir")
                .arg("-p")
                .arg(web_root.join("htdocs").display().to_string())
                .run_as(&spec.owner.name),
            "mkdir htdocs",
        )?;

        expect_success(
            ctx.runner(),
            &CommandRequest::new("tee")
                .arg(vhost_file.display().to_string())
                .stdin(render_vhost(&spec.name, &web_root)),
            "tee vhost",
        )?;
        ctx.engine().add_rollback_action(
            tx,
            format!("remove vhost file '{}'", vhost_file.display()),
            rollback_command(
                ctx.runner_handle(),
                CommandRequest::new("rm")
                    .arg("-f")
                    .arg(vhost_file.display().to_string()),
            ),
        );

        let check = ctx.runner().run(&CommandRequest::new("apachectl").arg("-t"))?;
        if !check.success {
            return Err(ProvisionError::ConfigCheck {
                stderr: check.stderr_trimmed().to_string(),
            });
        }

        expect_success(
            ctx.runner(),
            &CommandRequest::new("apachectl").args(["-k", "graceful"]),
            "apachectl graceful",
        )?;

        info!(domain = %spec.name, owner = %spec.owner.name, "domain provisioned");
        Ok(DomainProvisioned {
            domain: spec.name.clone(),
            owner: spec.owner.name.clone(),
            web_root,
            vhost_file,
        })
    })
}

fn render_vhost(domain: &str, web_root: &Path) -> String {
    let root = web_root.display();
    format!(
        "<VirtualHost *:80>\n\
         \x20   ServerName {domain}\n\
         \x20   ServerAlias www.{domain}\n\
         \x20   DocumentRoot {root}/htdocs\n\
         \x20   ErrorLog ${{APACHE_LOG_DIR}}/{domain}.error.log\n\
         \x20   CustomLog ${{APACHE_LOG_DIR}}/{domain}.access.log combined\n\
         </VirtualHost>\n"
    )
}
