use std::path::{Path, PathBuf};

use clap::Subcommand;
use hostctl_exec::CommandRunner;
use hostctl_provision::operations::install_certificate;
use hostctl_provision::{CertificateSpec, ProvisionContext};

use crate::error::{CliError, Result};

#[derive(Subcommand)]
pub(crate) enum CertCommand {
    /// Install a TLS key and certificate chain for a domain
    Install {
        /// Domain the certificate belongs to
        domain: String,
        /// PEM file with the private key
        #[arg(long)]
        key: PathBuf,
        /// PEM file with the certificate chain
        #[arg(long)]
        chain: PathBuf,
    },
}

impl CertCommand {
    pub(crate) fn execute<R>(self, ctx: &ProvisionContext<R>) -> Result<()>
    where
        R: CommandRunner + 'static,
    {
        match self {
            Self::Install { domain, key, chain } => {
                let key_pem = read_pem(&key)?;
                let chain_pem = read_pem(&chain)?;
                let installed = install_certificate(
                    ctx,
                    &CertificateSpec {
                        domain,
                        key_pem,
                        chain_pem,
                    },
                )?;
                println!(
                    "installed certificate for '{}' (chain: {})",
                    installed.domain,
                    installed.chain_path.display()
                );
                Ok(())
            }
        }
    }
}

fn read_pem(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
