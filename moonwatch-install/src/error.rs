use std::path::PathBuf;

use thiserror::Error;

use moonwatch_core::{ConfigError, RunStatus};

/// Error surface for preflight, file installation and service registration.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required helper command is missing or broken. `status` is `None`
    /// when the command could not be spawned at all.
    #[error("missing dependency `{command}`: {reason}")]
    Preflight {
        command: String,
        reason: String,
        status: Option<RunStatus>,
    },

    #[error("bundle is incomplete: {path} not found")]
    MissingBundleFile { path: PathBuf },

    /// The service manager rejected the unit.
    #[error("failed to enable service '{service}': `{command}` returned {status}")]
    Enable {
        service: String,
        command: String,
        status: RunStatus,
    },

    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    /// Process exit code: the failing command's own code where there is
    /// one, 127 for a dependency that cannot be spawned, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            InstallError::Preflight { status: None, .. } => 127,
            InstallError::Preflight {
                status: Some(status),
                ..
            }
            | InstallError::Enable { status, .. } => status.code().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> InstallError {
    InstallError::Io {
        path: path.into(),
        source,
    }
}
