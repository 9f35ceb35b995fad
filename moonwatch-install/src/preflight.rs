//! Host dependency probes, run before anything on the host is touched.

use moonwatch_core::{CommandRunner, Invocation, Probe};

use crate::error::InstallError;

/// Invoke each probe with its harmless argument, output discarded.
///
/// Stops at the first command that cannot be spawned or exits non-zero.
pub fn check_dependencies(probes: &[Probe], runner: &dyn CommandRunner) -> Result<(), InstallError> {
    for probe in probes {
        let invocation = Invocation::new(probe.command).arg(probe.arg).quiet();
        let failure = match runner.status(&invocation) {
            Ok(status) if status.success() => {
                tracing::debug!("found {}", probe.command);
                continue;
            }
            Ok(status) => InstallError::Preflight {
                command: probe.command.to_string(),
                reason: format!("`{probe}` returned {status}"),
                status: Some(status),
            },
            Err(e) => InstallError::Preflight {
                command: probe.command.to_string(),
                reason: e.to_string(),
                status: None,
            },
        };
        tracing::warn!(
            "required command `{}` is not available; install it and re-run",
            probe.command
        );
        return Err(failure);
    }
    Ok(())
}
