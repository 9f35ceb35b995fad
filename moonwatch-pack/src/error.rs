//! Error types for moonwatch-pack.

use std::path::PathBuf;

use thiserror::Error;

use moonwatch_core::{ConfigError, RunStatus};

/// All errors that can arise while building or packaging a target.
#[derive(Debug, Error)]
pub enum PackError {
    /// Unsupported target or missing share resource.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The compiler front-end exited non-zero.
    #[error("build failed: `{command}` returned {status}")]
    Toolchain { command: String, status: RunStatus },

    /// A tool could not be started at all.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The package identity query failed or printed something unparseable.
    #[error("cannot determine package identity: {0}")]
    Identity(String),

    /// The build finished but the expected binary is not there.
    #[error("build artifact not found at {path}")]
    MissingArtifact { path: PathBuf },

    /// `tar` or `zip` exited non-zero.
    #[error("archiving failed: `{command}` returned {status}")]
    Archiver { command: String, status: RunStatus },

    /// The archiver succeeded but produced no archive.
    #[error("archiver reported success but {path} does not exist")]
    ArchiveMissing { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PackError {
    /// Process exit code for this failure: the failing tool's own code
    /// where there is one, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            PackError::Toolchain { status, .. } | PackError::Archiver { status, .. } => {
                status.code().filter(|c| *c != 0).unwrap_or(1)
            }
            _ => 1,
        }
    }
}

/// Convenience constructor for [`PackError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PackError {
    PackError::Io {
        path: path.into(),
        source,
    }
}
