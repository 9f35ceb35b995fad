//! Subprocess seam.
//!
//! Every external tool (compiler, archiver, service manager, helper probes)
//! is reached through [`CommandRunner`]. Production code uses
//! [`SystemRunner`]; tests script replies with
//! [`testing::ScriptedRunner`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// A command line waiting to be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Discard stdout/stderr.
    pub quiet: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            quiet: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        if self.quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit status of a finished subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    code: Option<i32>,
}

impl RunStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Terminated without an exit code (killed by a signal).
    pub fn signalled() -> Self {
        Self { code: None }
    }

    pub fn success(self) -> bool {
        self.code == Some(0)
    }

    pub fn code(self) -> Option<i32> {
        self.code
    }
}

impl From<ExitStatus> for RunStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Status plus captured stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub status: RunStatus,
    pub stdout: String,
}

/// Runs subprocesses to completion. Implementations block until the child
/// exits; there is no timeout.
pub trait CommandRunner {
    /// Run with inherited stdio (unless `quiet`) and return the exit status.
    fn status(&self, invocation: &Invocation) -> io::Result<RunStatus>;

    /// Run capturing stdout; stderr is inherited.
    fn capture(&self, invocation: &Invocation) -> io::Result<Captured>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn status(&self, invocation: &Invocation) -> io::Result<RunStatus> {
        tracing::debug!("running: {invocation}");
        Ok(invocation.to_command().status()?.into())
    }

    fn capture(&self, invocation: &Invocation) -> io::Result<Captured> {
        tracing::debug!("capturing: {invocation}");
        let output = invocation
            .to_command()
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()?;
        Ok(Captured {
            status: output.status.into(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    //! Scripted [`CommandRunner`] for tests.

    use std::cell::RefCell;
    use std::io;

    use super::{Captured, CommandRunner, Invocation, RunStatus};

    type Effect = Box<dyn Fn(&Invocation)>;

    struct Rule {
        program: String,
        arg: Option<String>,
        /// `None` simulates a program that cannot be spawned.
        code: Option<i32>,
        stdout: String,
        effect: Option<Effect>,
    }

    impl Rule {
        fn matches(&self, invocation: &Invocation) -> bool {
            self.program == invocation.program
                && self
                    .arg
                    .as_ref()
                    .map_or(true, |arg| invocation.args.iter().any(|a| a == arg))
        }
    }

    /// Records every invocation and answers from a list of rules.
    ///
    /// Rules are checked in the order they were added; the first match wins.
    /// Unmatched invocations succeed with exit code 0 and empty stdout.
    #[derive(Default)]
    pub struct ScriptedRunner {
        rules: Vec<Rule>,
        calls: RefCell<Vec<Invocation>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        fn push(mut self, program: &str, arg: Option<&str>, code: Option<i32>) -> Self {
            self.rules.push(Rule {
                program: program.to_string(),
                arg: arg.map(str::to_string),
                code,
                stdout: String::new(),
                effect: None,
            });
            self
        }

        /// `program` exits with `code`.
        pub fn exit(self, program: &str, code: i32) -> Self {
            self.push(program, None, Some(code))
        }

        /// `program` exits with `code` when `arg` is among its arguments.
        pub fn exit_on(self, program: &str, arg: &str, code: i32) -> Self {
            self.push(program, Some(arg), Some(code))
        }

        /// `program` cannot be spawned (`io::ErrorKind::NotFound`).
        pub fn missing(self, program: &str) -> Self {
            self.push(program, None, None)
        }

        /// `program` succeeds and prints `stdout`.
        pub fn stdout(mut self, program: &str, stdout: &str) -> Self {
            self = self.push(program, None, Some(0));
            if let Some(rule) = self.rules.last_mut() {
                rule.stdout = stdout.to_string();
            }
            self
        }

        /// `program` succeeds after running `effect`, e.g. to create the
        /// file a real tool would have produced.
        pub fn effect(mut self, program: &str, effect: impl Fn(&Invocation) + 'static) -> Self {
            self = self.push(program, None, Some(0));
            if let Some(rule) = self.rules.last_mut() {
                rule.effect = Some(Box::new(effect));
            }
            self
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.borrow().clone()
        }

        /// Each recorded invocation rendered as a single command line.
        pub fn command_lines(&self) -> Vec<String> {
            self.calls.borrow().iter().map(ToString::to_string).collect()
        }

        fn reply(&self, invocation: &Invocation) -> io::Result<Captured> {
            self.calls.borrow_mut().push(invocation.clone());
            let Some(rule) = self.rules.iter().find(|r| r.matches(invocation)) else {
                return Ok(Captured {
                    status: RunStatus::from_code(0),
                    stdout: String::new(),
                });
            };
            let Some(code) = rule.code else {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{}: command not found", invocation.program),
                ));
            };
            if let Some(effect) = &rule.effect {
                effect(invocation);
            }
            Ok(Captured {
                status: RunStatus::from_code(code),
                stdout: rule.stdout.clone(),
            })
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn status(&self, invocation: &Invocation) -> io::Result<RunStatus> {
            self.reply(invocation).map(|c| c.status)
        }

        fn capture(&self, invocation: &Invocation) -> io::Result<Captured> {
            self.reply(invocation)
        }
    }
}
