use std::fmt;

/// One external program invocation: program, argument vector, optional stdin
/// payload, optional run-as identity.
///
/// Arguments are always passed as a vector; nothing here goes through a
/// shell, so tenant-supplied values cannot be interpolated into one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    program: String,
    args: Vec<String>,
    stdin: Option<String>,
    run_as: Option<String>,
}

impl CommandRequest {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            run_as: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Text piped to the child's standard input, e.g. a vhost file body fed
    /// to `tee`, or a `user:password` line fed to `chpasswd`.
    #[must_use]
    pub fn stdin(mut self, payload: impl Into<String>) -> Self {
        self.stdin = Some(payload.into());
        self
    }

    /// OS user the command executes under instead of the control-plane's own
    /// identity.
    #[must_use]
    pub fn run_as(mut self, user: impl Into<String>) -> Self {
        self.run_as = Some(user.into());
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn arg_vec(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn stdin_payload(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    #[must_use]
    pub fn run_as_user(&self) -> Option<&str> {
        self.run_as.as_deref()
    }
}

impl fmt::Display for CommandRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a command that actually ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// True iff the exit code was zero.
    pub success: bool,
    /// Exit code, if the process exited normally (rather than by signal).
    pub exit_code: Option<i32>,
    /// Raw captured stdout, not parsed.
    pub stdout: String,
    /// Raw captured stderr, not parsed.
    pub stderr: String,
}

impl CommandOutput {
    /// Stderr with surrounding whitespace removed, for error messages.
    #[must_use]
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}
