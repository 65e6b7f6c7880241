use std::io::Write;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::command::{CommandOutput, CommandRequest};
use crate::error::{ExecError, Result};
use crate::identity;

/// The seam between workflows and the host.
///
/// Workflows are generic over this trait; production code uses
/// [`SystemRunner`], tests substitute a scripted double.
pub trait CommandRunner: Send + Sync {
    /// Run one command to completion and capture its output.
    ///
    /// Blocks until the child exits; no timeout is imposed here, callers
    /// needing bounded latency wrap the call with their own deadline.
    ///
    /// # Errors
    ///
    /// Only attempt failures ([`ExecError`]): spawn failure, unknown run-as
    /// user, stdin delivery failure. A command that runs and exits non-zero
    /// is an `Ok` with `success = false`.
    fn run(&self, request: &CommandRequest) -> Result<CommandOutput>;
}

/// Runs commands on the local host via `std::process`.
///
/// Spawns exactly one OS process per call and never retries. With a run-as
/// identity the child is started under that user's uid/gid, so files it
/// creates belong to the tenant account rather than the control plane.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, request: &CommandRequest) -> Result<CommandOutput> {
        let mut command = Command::new(request.program());
        command
            .args(request.arg_vec())
            .stdin(if request.stdin_payload().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(user) = request.run_as_user() {
            let identity = identity::resolve_user(user)?;
            command.uid(identity.uid).gid(identity.gid);
        }

        debug!(command = %request, run_as = request.run_as_user(), "spawning command");

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            program: request.program().to_string(),
            source,
        })?;

        if let Some(payload) = request.stdin_payload() {
            let mut stdin = child.stdin.take().expect("stdin piped when payload present");
            stdin
                .write_all(payload.as_bytes())
                .map_err(|source| ExecError::StdinPipe {
                    program: request.program().to_string(),
                    source,
                })?;
            // Dropping the handle closes the pipe so the child sees EOF.
        }

        let output = child
            .wait_with_output()
            .map_err(|source| ExecError::Wait {
                program: request.program().to_string(),
                source,
            })?;

        let result = CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if result.success {
            debug!(command = %request, "command succeeded");
        } else {
            warn!(
                command = %request,
                exit_code = result.exit_code,
                stderr = %result.stderr_trimmed(),
                "command exited non-zero"
            );
        }

        Ok(result)
    }
}
