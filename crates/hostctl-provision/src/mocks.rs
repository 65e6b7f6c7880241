//! Test doubles for the command gateway.
//!
//! Workflow tests script how each program responds and assert afterwards on
//! the exact sequence of invocations, including the rollback commands.

use std::sync::Mutex;

use hostctl_exec::{CommandOutput, CommandRequest, CommandRunner, ExecError};

enum Behavior {
    Succeed { stdout: String },
    Fail { exit_code: i32, stderr: String },
    /// Simulate an attempt failure (binary missing).
    Refuse,
}

struct Rule {
    program: String,
    arg_contains: Option<String>,
    behavior: Behavior,
}

impl Rule {
    fn matches(&self, request: &CommandRequest) -> bool {
        if self.program != request.program() {
            return false;
        }
        match &self.arg_contains {
            None => true,
            Some(needle) => request.arg_vec().iter().any(|a| a.contains(needle.as_str())),
        }
    }
}

/// Scripted [`CommandRunner`]: first matching rule wins, anything unmatched
/// succeeds with empty output. Records every invocation in order.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<Rule>>,
    invocations: Mutex<Vec<CommandRequest>>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `program` exit non-zero with the given stderr.
    pub fn fail(&self, program: &str, exit_code: i32, stderr: &str) {
        self.push_rule(program, None, Behavior::Fail {
            exit_code,
            stderr: stderr.to_string(),
        });
    }

    /// Make `program` exit non-zero, but only when an argument contains
    /// `arg_contains` (distinguishes `apachectl -t` from `apachectl -k graceful`).
    pub fn fail_matching(&self, program: &str, arg_contains: &str, exit_code: i32, stderr: &str) {
        self.push_rule(
            program,
            Some(arg_contains.to_string()),
            Behavior::Fail {
                exit_code,
                stderr: stderr.to_string(),
            },
        );
    }

    /// Make `program` succeed with the given stdout.
    pub fn respond(&self, program: &str, stdout: &str) {
        self.push_rule(program, None, Behavior::Succeed {
            stdout: stdout.to_string(),
        });
    }

    /// Like [`respond`](Self::respond), matching on an argument substring.
    pub fn respond_matching(&self, program: &str, arg_contains: &str, stdout: &str) {
        self.push_rule(
            program,
            Some(arg_contains.to_string()),
            Behavior::Succeed {
                stdout: stdout.to_string(),
            },
        );
    }

    /// Make attempts to run `program` fail as if the binary were missing.
    pub fn refuse(&self, program: &str) {
        self.push_rule(program, None, Behavior::Refuse);
    }

    /// Every request seen so far, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<CommandRequest> {
        self.invocations.lock().expect("mock mutex").clone()
    }

    /// Rendered command lines (`program arg arg …`) in invocation order.
    #[must_use]
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .map(std::string::ToString::to_string)
            .collect()
    }

    fn push_rule(&self, program: &str, arg_contains: Option<String>, behavior: Behavior) {
        self.rules.lock().expect("mock mutex").push(Rule {
            program: program.to_string(),
            arg_contains,
            behavior,
        });
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, request: &CommandRequest) -> hostctl_exec::Result<CommandOutput> {
        self.invocations
            .lock()
            .expect("mock mutex")
            .push(request.clone());

        let rules = self.rules.lock().expect("mock mutex");
        match rules.iter().find(|rule| rule.matches(request)) {
            Some(Rule {
                behavior: Behavior::Succeed { stdout },
                ..
            }) => Ok(CommandOutput {
                success: true,
                exit_code: Some(0),
                stdout: stdout.clone(),
                stderr: String::new(),
            }),
            Some(Rule {
                behavior: Behavior::Fail { exit_code, stderr },
                ..
            }) => Ok(CommandOutput {
                success: false,
                exit_code: Some(*exit_code),
                stdout: String::new(),
                stderr: stderr.clone(),
            }),
            Some(Rule {
                behavior: Behavior::Refuse,
                ..
            }) => Err(ExecError::Spawn {
                program: request.program().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted refusal"),
            }),
            None => Ok(CommandOutput {
                success: true,
                exit_code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            }),
        }
    }
}
