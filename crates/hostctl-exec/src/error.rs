use thiserror::Error;

/// Failure to *attempt* a command, as opposed to a command that ran and
/// exited non-zero (which is reported through
/// [`CommandOutput`](crate::CommandOutput), not here).
#[derive(Debug, Error)]
pub enum ExecError {
    /// The binary could not be spawned at all. Also covers a run-as identity
    /// switch rejected by the OS, which fails the spawn with `EPERM`.
    #[error("failed to spawn '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The run-as user does not exist in the system user database.
    #[error("unknown run-as user '{user}'")]
    UnknownUser { user: String },

    /// The system user database could not be read.
    #[error("failed to read system user database")]
    UserDatabase {
        #[source]
        source: std::io::Error,
    },

    /// The stdin payload could not be delivered to the child.
    #[error("failed to write stdin of '{program}'")]
    StdinPipe {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The child's exit status or output could not be collected.
    #[error("failed to collect output of '{program}'")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_error_names_the_program() {
        let err = ExecError::Spawn {
            program: "useradd".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "test"),
        };

        assert!(err.to_string().contains("useradd"));
    }

    #[test]
    fn spawn_error_has_source_chain() {
        let err = ExecError::Spawn {
            program: "useradd".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "test"),
        };

        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn unknown_user_error_names_the_user() {
        let err = ExecError::UnknownUser {
            user: "alice".to_string(),
        };

        assert!(err.to_string().contains("alice"));
    }
}
