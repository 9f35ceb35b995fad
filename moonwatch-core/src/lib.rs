//! moonwatch-core: target registry, domain types, pipeline config, and the
//! subprocess seam shared by the build, package and install crates.
//!
//! - [`registry`]: supported targets and lookup
//! - [`types`]: descriptors, identity, artifacts, bundles
//! - [`config`]: `moonwatch-dist.yaml` and [`ProjectLayout`]
//! - [`process`]: [`CommandRunner`] and [`SystemRunner`]
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod process;
pub mod registry;
pub mod types;

pub use config::{PipelineConfig, ProjectLayout};
pub use error::ConfigError;
pub use process::{Captured, CommandRunner, Invocation, RunStatus, SystemRunner};
pub use types::{
    ArchiveFormat, BuildArtifact, BundleMode, PackageIdentity, Platform, Probe, StagingBundle,
    TargetDescriptor, Toolchain, BUNDLE_CONFIG_FILE,
};

/// Current user's home directory.
pub fn home_dir() -> Result<std::path::PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
