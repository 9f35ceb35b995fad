//! User-scope systemd control through `systemctl --user`.

use moonwatch_core::{CommandRunner, Invocation, RunStatus};

use crate::error::InstallError;

/// `systemctl` exit status for "unit not loaded".
const UNIT_NOT_LOADED: i32 = 5;

/// Result of asking systemd to stop the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    /// No such unit yet; the normal case on a first install.
    NotLoaded,
    Failed(RunStatus),
}

/// Result of asking systemd to start the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    Failed(RunStatus),
}

/// A user service addressed by name.
pub struct UserService<'a> {
    name: &'a str,
    runner: &'a dyn CommandRunner,
}

impl<'a> UserService<'a> {
    pub fn new(name: &'a str, runner: &'a dyn CommandRunner) -> Self {
        Self { name, runner }
    }

    pub fn stop(&self) -> Result<StopOutcome, InstallError> {
        let status = self.systemctl("stop")?;
        let outcome = if status.success() {
            StopOutcome::Stopped
        } else if status.code() == Some(UNIT_NOT_LOADED) {
            StopOutcome::NotLoaded
        } else {
            StopOutcome::Failed(status)
        };
        Ok(outcome)
    }

    /// Register the unit to start at login. A refusal is fatal.
    pub fn enable(&self) -> Result<(), InstallError> {
        let status = self.systemctl("enable")?;
        if status.success() {
            return Ok(());
        }
        Err(InstallError::Enable {
            service: self.name.to_string(),
            command: self.invocation("enable").to_string(),
            status,
        })
    }

    pub fn start(&self) -> Result<StartOutcome, InstallError> {
        let status = self.systemctl("start")?;
        Ok(if status.success() {
            StartOutcome::Started
        } else {
            StartOutcome::Failed(status)
        })
    }

    fn invocation(&self, verb: &str) -> Invocation {
        Invocation::new("systemctl").args(["--user", verb, self.name])
    }

    fn systemctl(&self, verb: &str) -> Result<RunStatus, InstallError> {
        let invocation = self.invocation(verb);
        tracing::debug!("running `{invocation}`");
        let status = self
            .runner
            .status(&invocation)
            .map_err(|source| InstallError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;
        tracing::info!("`{invocation}` returned {status}");
        Ok(status)
    }
}
