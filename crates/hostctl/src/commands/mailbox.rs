use clap::Subcommand;
use hostctl_exec::CommandRunner;
use hostctl_provision::operations::create_mailbox;
use hostctl_provision::{MailboxSpec, ProvisionContext};

use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum MailboxCommand {
    /// Create a mailbox for an existing mail domain
    Add {
        /// Full address, local@domain
        address: String,
    },
}

impl MailboxCommand {
    pub(crate) fn execute<R>(self, ctx: &ProvisionContext<R>) -> Result<()>
    where
        R: CommandRunner + 'static,
    {
        match self {
            Self::Add { address } => {
                let provisioned = create_mailbox(ctx, &MailboxSpec { address })?;
                println!(
                    "created mailbox '{}' (maildir: {})",
                    provisioned.address,
                    provisioned.maildir.display()
                );
                Ok(())
            }
        }
    }
}
