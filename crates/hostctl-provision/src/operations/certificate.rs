use hostctl_audit::{OperationDraft, OperationKind};
use hostctl_core::{ResourceKind, ResourceRef};
use hostctl_exec::{CommandRequest, CommandRunner};
use tracing::info;

use super::{expect_success, finish, operation_id, rollback_command};
use crate::context::ProvisionContext;
use crate::error::{ProvisionError, Result};
use crate::types::{CertificateInstalled, CertificateSpec};

/// Install a TLS key and chain for a domain: verify the pair with `openssl`,
/// write both files, and reload the web server.
///
/// # Errors
///
/// `CertificateMismatch` if key and chain do not belong together; command
/// and gateway errors otherwise.
pub fn install_certificate<R>(
    ctx: &ProvisionContext<R>,
    spec: &CertificateSpec,
) -> Result<CertificateInstalled>
where
    R: CommandRunner + 'static,
{
    let op = ctx.recorder().begin(
        operation_id("install-certificate", &spec.domain),
        OperationDraft::new(
            OperationKind::Create,
            ResourceRef::new(ResourceKind::Certificate, &spec.domain),
            format!("install certificate for '{}'", spec.domain),
        ),
    )?;

    let result = install(ctx, spec);
    finish(op, result)
}

fn install<R>(ctx: &ProvisionContext<R>, spec: &CertificateSpec) -> Result<CertificateInstalled>
where
    R: CommandRunner + 'static,
{
    ctx.engine().with_transaction(|tx| {
        // Verify the pair before touching the host: both halves are piped in
        // over stdin, so nothing is written anywhere yet.
        let chain_modulus = expect_success(
            ctx.runner(),
            &CommandRequest::new("openssl")
                .args(["x509", "-noout", "-modulus"])
                .stdin(spec.chain_pem.as_str()),
            "openssl x509",
        )?;
        let key_modulus = expect_success(
            ctx.runner(),
            &CommandRequest::new("openssl")
                .args(["rsa", "-noout", "-modulus"])
                .stdin(spec.key_pem.as_str()),
            "openssl rsa",
        )?;
        if chain_modulus.stdout.trim() != key_modulus.stdout.trim() {
            return Err(ProvisionError::CertificateMismatch {
                domain: spec.domain.clone(),
            });
        }

        expect_success(
            ctx.runner(),
            &CommandRequest::new("mkdir")
                .arg("-p")
                .arg(ctx.paths().tls_dir.display().to_string()),
            "mkdir",
        )?;

        let key_path = ctx.paths().tls_key(&spec.domain);
        expect_success(
            ctx.runner(),
            &CommandRequest::new("tee")
                .arg(key_path.display().to_string())
                .stdin(spec.key_pem.as_str()),
            "tee key",
        )?;
        ctx.engine().add_rollback_action(
            tx,
            format!("remove key file '{}'", key_path.display()),
            rollback_command(
                ctx.runner_handle(),
                CommandRequest::new("rm")
                    .arg("-f")
                    .arg(key_path.display().to_string()),
            ),
        );
        // Private key must never be world-readable.
        expect_success(
            ctx.runner(),
            &CommandRequest::new("chmod")
                .arg("600")
                .arg(key_path.display().to_string()),
            "chmod",
        )?;

        let chain_path = ctx.paths().tls_chain(&spec.domain);
        expect_success(
            ctx.runner(),
            &CommandRequest::new("tee")
                .arg(chain_path.display().to_string())
                .stdin(spec.chain_pem.as_str()),
            "tee chain",
        )?;
        ctx.engine().add_rollback_action(
            tx,
            format!("remove chain file '{}'", chain_path.display()),
            rollback_command(
                ctx.runner_handle(),
                CommandRequest::new("rm")
                    .arg("-f")
                    .arg(chain_path.display().to_string()),
            ),
        );

        expect_success(
            ctx.runner(),
            &CommandRequest::new("apachectl").args(["-k", "graceful"]),
            "apachectl graceful",
        )?;

        info!(domain = %spec.domain, "certificate installed");
        Ok(CertificateInstalled {
            domain: spec.domain.clone(),
            key_path,
            chain_path,
        })
    })
}
