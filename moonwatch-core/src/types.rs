//! Domain types shared by the build, package and install stages.
//!
//! All path fields use `PathBuf`; descriptor file names are `&'static str`
//! because the target table is compiled in.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// File name the default configuration takes inside every bundle.
pub const BUNDLE_CONFIG_FILE: &str = "config.json";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Operating system family a target runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    /// Label used in archive names (`Linux`, `Windows`).
    pub fn label(self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
        }
    }

    pub fn archive_format(self) -> ArchiveFormat {
        match self {
            Platform::Linux => ArchiveFormat::TarGz,
            Platform::Windows => ArchiveFormat::Zip,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which compiler front-end builds a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
    /// Host `cargo`.
    Native,
    /// Containerised `cross`.
    Cross,
}

impl Toolchain {
    pub fn program(self) -> &'static str {
        match self {
            Toolchain::Native => "cargo",
            Toolchain::Cross => "cross",
        }
    }
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Toolchain::Native => write!(f, "native"),
            Toolchain::Cross => write!(f, "cross"),
        }
    }
}

/// Archive container produced in archived bundle mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::Zip => "zip",
        }
    }
}

/// How a staging bundle is finalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BundleMode {
    /// Leave the staging directory at `<output>/<triple>`.
    #[default]
    Plain,
    /// Stage under the identity-derived name and wrap it into an archive.
    Archived,
}

// ---------------------------------------------------------------------------
// Target descriptor
// ---------------------------------------------------------------------------

/// A helper command and the harmless argument used to probe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub command: &'static str,
    pub arg: &'static str,
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command, self.arg)
    }
}

/// Everything the pipeline needs to know about one supported target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub triple: &'static str,
    pub platform: Platform,
    /// Architecture label used in archive names (`x86-64`).
    pub arch: &'static str,
    pub toolchain: Toolchain,
    pub binary: &'static str,
    /// Default configuration inside the share directory; staged as `config.json`.
    pub default_config: &'static str,
    pub installer: &'static str,
    /// Service-manager unit file. `None` for targets without a service manager.
    pub service: Option<&'static str>,
    /// Helper commands that must be invocable before installing.
    pub required_commands: &'static [Probe],
}

impl TargetDescriptor {
    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    pub fn needs_preflight(&self) -> bool {
        !self.required_commands.is_empty()
    }

    /// `<root>/target/<triple>/release/<binary>`
    pub fn release_binary(&self, root: &Path) -> PathBuf {
        root.join("target")
            .join(self.triple)
            .join("release")
            .join(self.binary)
    }

    /// Share-directory files copied next to the binary, paired with the name
    /// each one takes inside the bundle.
    pub fn share_files(&self) -> Vec<(&'static str, &'static str)> {
        let mut files = vec![
            (self.default_config, BUNDLE_CONFIG_FILE),
            (self.installer, self.installer),
        ];
        if let Some(service) = self.service {
            files.push((service, service));
        }
        files
    }

    /// Names of every file a finished bundle contains, in staging order.
    pub fn bundle_files(&self) -> Vec<&'static str> {
        std::iter::once(self.binary)
            .chain(self.share_files().into_iter().map(|(_, dest)| dest))
            .collect()
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.triple)
    }
}

// ---------------------------------------------------------------------------
// Pipeline values
// ---------------------------------------------------------------------------

/// Name and version of the package being distributed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdentity {
    pub name: String,
    pub version: String,
}

impl PackageIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// `<name>_<version>_<PlatformLabel>-<arch>`
    pub fn archive_stem(&self, target: &TargetDescriptor) -> String {
        format!(
            "{}_{}_{}-{}",
            self.name,
            self.version,
            target.platform.label(),
            target.arch
        )
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// A compiled daemon binary waiting to be packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    pub binary: PathBuf,
    pub target: &'static TargetDescriptor,
}

/// A freshly assembled directory and the files placed into it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingBundle {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
