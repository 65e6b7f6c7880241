use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The gateway could not attempt a command at all.
    #[error(transparent)]
    Exec(#[from] hostctl_exec::ExecError),

    /// A command ran and exited non-zero where the workflow required success.
    #[error("{context}: {stderr}")]
    CommandFailed { context: String, stderr: String },

    #[error("system user '{user}' already exists")]
    UserExists { user: String },

    #[error("system user '{user}' does not exist")]
    NoSuchUser { user: String },

    #[error("domain '{domain}' is already configured")]
    DomainExists { domain: String },

    #[error("mailbox '{address}' is already present")]
    MailboxExists { address: String },

    #[error("mail address '{address}' has no domain part")]
    MailAddress { address: String },

    #[error("certificate chain and key do not match for '{domain}'")]
    CertificateMismatch { domain: String },

    #[error("web server configuration check failed: {stderr}")]
    ConfigCheck { stderr: String },

    #[error("failed to read '{path}'")]
    MapRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Audit bookkeeping failed before any host state was touched. Once a
    /// workflow is under way, audit failures are only logged; they never
    /// replace the primary error.
    #[error("audit bookkeeping failed")]
    Audit(#[from] hostctl_audit::AuditError),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_shows_context_and_stderr() {
        let err = ProvisionError::CommandFailed {
            context: "useradd".to_string(),
            stderr: "UID range exhausted".to_string(),
        };

        assert_eq!(err.to_string(), "useradd: UID range exhausted");
    }

    #[test]
    fn exec_error_converts_via_from() {
        let exec = hostctl_exec::ExecError::UnknownUser {
            user: "alice".to_string(),
        };

        let err: ProvisionError = exec.into();

        assert!(matches!(err, ProvisionError::Exec(_)));
    }

    #[test]
    fn exec_error_is_transparent() {
        let err: ProvisionError = hostctl_exec::ExecError::UnknownUser {
            user: "alice".to_string(),
        }
        .into();

        assert_eq!(err.to_string(), "unknown run-as user 'alice'");
    }
}
