use clap::Subcommand;
use hostctl_exec::CommandRunner;
use hostctl_provision::operations::create_domain;
use hostctl_provision::{DomainSpec, ProvisionContext, UserSpec};

use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum DomainCommand {
    /// Provision a web domain and its owning system user
    Add {
        /// Fully qualified domain name
        name: String,
        /// Owning system user to create
        #[arg(long)]
        owner: String,
        /// Owner's login shell (default: /usr/sbin/nologin)
        #[arg(long)]
        shell: Option<String>,
        /// Owner's initial password
        #[arg(long)]
        password: Option<String>,
    },
}

impl DomainCommand {
    pub(crate) fn execute<R>(self, ctx: &ProvisionContext<R>) -> Result<()>
    where
        R: CommandRunner + 'static,
    {
        match self {
            Self::Add {
                name,
                owner,
                shell,
                password,
            } => {
                let provisioned = create_domain(
                    ctx,
                    &DomainSpec {
                        name,
                        owner: UserSpec {
                            name: owner,
                            shell,
                            password,
                        },
                    },
                )?;
                println!(
                    "created domain '{}' (owner: {}, web root: {})",
                    provisioned.domain,
                    provisioned.owner,
                    provisioned.web_root.display()
                );
                Ok(())
            }
        }
    }
}
