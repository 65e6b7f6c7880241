use std::path::PathBuf;

/// Request to create a Unix account for a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSpec {
    pub name: String,
    /// Login shell; `/usr/sbin/nologin` when absent.
    pub shell: Option<String>,
    /// Initial password, set via `chpasswd` over stdin. Never audited.
    pub password: Option<String>,
}

impl UserSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shell: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProvisioned {
    pub name: String,
    pub home: PathBuf,
}

/// Request to provision a web domain, including its owning system user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSpec {
    pub name: String,
    pub owner: UserSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainProvisioned {
    pub domain: String,
    pub owner: String,
    pub web_root: PathBuf,
    pub vhost_file: PathBuf,
}

/// Request to create a mailbox for an existing mail domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxSpec {
    /// Full address, `local@domain`.
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxProvisioned {
    pub address: String,
    pub maildir: PathBuf,
}

/// Request to install a TLS key and certificate chain for a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSpec {
    pub domain: String,
    pub key_pem: String,
    pub chain_pem: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInstalled {
    pub domain: String,
    pub key_path: PathBuf,
    pub chain_path: PathBuf,
}
