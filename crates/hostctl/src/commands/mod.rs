mod cert;
mod domain;
mod mailbox;
mod user;

use clap::Subcommand;
use hostctl_audit::{AuditRecorder, JsonlSink};
use hostctl_core::Actor;
use hostctl_exec::SystemRunner;
use hostctl_provision::ProvisionContext;

use crate::config::Config;
use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Manage tenant system users
    #[command(subcommand)]
    User(user::UserCommand),
    /// Manage web domains
    #[command(subcommand)]
    Domain(domain::DomainCommand),
    /// Manage mailboxes
    #[command(subcommand)]
    Mailbox(mailbox::MailboxCommand),
    /// Manage TLS certificates
    #[command(subcommand)]
    Cert(cert::CertCommand),
}

impl Commands {
    pub(crate) fn execute(self, config: &Config) -> Result<()> {
        let recorder = AuditRecorder::new(
            Actor::new(config.actor.as_str()),
            JsonlSink::new(&config.audit_log),
        );
        let ctx = ProvisionContext::new(SystemRunner::new(), recorder, config.paths.clone());

        match self {
            Self::User(command) => command.execute(&ctx),
            Self::Domain(command) => command.execute(&ctx),
            Self::Mailbox(command) => command.execute(&ctx),
            Self::Cert(command) => command.execute(&ctx),
        }
    }
}
