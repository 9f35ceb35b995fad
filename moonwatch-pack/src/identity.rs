//! Package identity used to name archives.

use std::path::Path;

use moonwatch_core::{CommandRunner, Invocation, PackageIdentity};

use crate::error::PackError;

/// Source of the current package name and version.
pub trait IdentityProvider {
    fn identity(&self) -> Result<PackageIdentity, PackError>;
}

/// A fixed identity.
impl IdentityProvider for PackageIdentity {
    fn identity(&self) -> Result<PackageIdentity, PackError> {
        Ok(self.clone())
    }
}

/// Asks `cargo pkgid` in the project root.
pub struct CargoPkgid<'a> {
    root: &'a Path,
    runner: &'a dyn CommandRunner,
}

impl<'a> CargoPkgid<'a> {
    pub fn new(root: &'a Path, runner: &'a dyn CommandRunner) -> Self {
        Self { root, runner }
    }
}

impl IdentityProvider for CargoPkgid<'_> {
    fn identity(&self) -> Result<PackageIdentity, PackError> {
        let invocation = Invocation::new("cargo").arg("pkgid").current_dir(self.root);
        let output = self
            .runner
            .capture(&invocation)
            .map_err(|source| PackError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(PackError::Identity(format!(
                "`{invocation}` returned {}",
                output.status
            )));
        }
        let line = output
            .stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| PackError::Identity(format!("`{invocation}` printed nothing")))?;
        parse_pkgid(line)
    }
}

/// Parse a package id spec.
///
/// Accepted shapes:
/// - `path+file:///src/moonwatch-rs#moonwatch@1.2.0`
/// - `file:///src/moonwatch-rs#moonwatch:1.2.0`
/// - `path+file:///src/moonwatch#1.2.0` (name taken from the last path segment)
pub fn parse_pkgid(line: &str) -> Result<PackageIdentity, PackError> {
    let invalid = || PackError::Identity(format!("unrecognised package id '{line}'"));

    let (url, fragment) = line.rsplit_once('#').ok_or_else(invalid)?;
    let (name, version) = match fragment.split_once('@').or_else(|| fragment.split_once(':')) {
        Some((name, version)) => (name, version),
        None => {
            let name = url.trim_end_matches('/').rsplit('/').next().unwrap_or("");
            (name, fragment)
        }
    };

    if name.is_empty() || version.is_empty() {
        return Err(invalid());
    }
    Ok(PackageIdentity::new(name, version))
}
