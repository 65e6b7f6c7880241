use clap::Subcommand;
use hostctl_exec::CommandRunner;
use hostctl_provision::operations::{change_user_password, create_user};
use hostctl_provision::{ProvisionContext, UserSpec};

use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum UserCommand {
    /// Create a tenant system user
    Add {
        /// Account name
        name: String,
        /// Login shell (default: /usr/sbin/nologin)
        #[arg(long)]
        shell: Option<String>,
        /// Initial password, set via chpasswd
        #[arg(long)]
        password: Option<String>,
    },
    /// Change an account's password
    Passwd {
        /// Account name
        name: String,
        /// New password
        #[arg(long)]
        password: String,
    },
}

impl UserCommand {
    pub(crate) fn execute<R>(self, ctx: &ProvisionContext<R>) -> Result<()>
    where
        R: CommandRunner + 'static,
    {
        match self {
            Self::Add {
                name,
                shell,
                password,
            } => {
                let provisioned = create_user(
                    ctx,
                    &UserSpec {
                        name,
                        shell,
                        password,
                    },
                )?;
                println!(
                    "created system user '{}' (home: {})",
                    provisioned.name,
                    provisioned.home.display()
                );
                Ok(())
            }
            Self::Passwd { name, password } => {
                change_user_password(ctx, &name, &password)?;
                println!("password changed for '{name}'");
                Ok(())
            }
        }
    }
}
