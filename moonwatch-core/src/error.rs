//! Error types for moonwatch-core.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors: raised before any build, package or install
/// mutation has happened.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested triple has no descriptor.
    #[error("unsupported target '{triple}' (supported: {supported})")]
    UnsupportedTarget { triple: String, supported: String },

    /// No descriptor matches the operating system we are running on.
    #[error("no target descriptor for host operating system '{os}'")]
    UnsupportedHost { os: &'static str },

    /// A resource the target needs is absent from the share directory.
    #[error("missing resource file {path}")]
    MissingResource { path: PathBuf },

    /// `moonwatch-dist.yaml` exists but could not be parsed.
    #[error("failed to parse pipeline config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
