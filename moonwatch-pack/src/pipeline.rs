//! Build-then-package entrypoint used by the CLI.

use moonwatch_core::{
    registry, BuildArtifact, BundleMode, CommandRunner, PackageIdentity, ProjectLayout,
    TargetDescriptor,
};

use crate::build::{build, BuildOptions};
use crate::error::PackError;
use crate::identity::IdentityProvider;
use crate::packager::{package, Packaged};

/// Which targets a pipeline run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetScope {
    /// Every supported target.
    All,
    /// The named triples, in the given order.
    Only(Vec<String>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub build: BuildOptions,
    pub mode: BundleMode,
    /// Package whatever is already under `target/` without compiling.
    pub skip_build: bool,
}

/// Resolve a scope to descriptors; unknown triples fail before anything runs.
pub fn resolve(scope: &TargetScope) -> Result<Vec<&'static TargetDescriptor>, PackError> {
    match scope {
        TargetScope::All => Ok(registry::all().iter().collect()),
        TargetScope::Only(triples) => triples
            .iter()
            .map(|t| registry::lookup(t).map_err(PackError::from))
            .collect(),
    }
}

/// Build and package every target in `scope`, strictly one after another.
///
/// Share resources for all targets are checked, and in archived mode the
/// package identity is resolved once, before the first compiler run. The
/// first fatal error stops the run; targets already packaged stay on disk.
pub fn run(
    layout: &ProjectLayout,
    scope: &TargetScope,
    options: PipelineOptions,
    identity: &dyn IdentityProvider,
    runner: &dyn CommandRunner,
) -> Result<Vec<Packaged>, PackError> {
    let targets = resolve(scope)?;
    for target in &targets {
        layout.check_resources(target)?;
    }

    let resolved: PackageIdentity;
    let identity: &dyn IdentityProvider = match options.mode {
        BundleMode::Archived => {
            resolved = identity.identity()?;
            tracing::debug!("package identity: {resolved}");
            &resolved
        }
        BundleMode::Plain => identity,
    };

    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let artifact = if options.skip_build {
            BuildArtifact {
                binary: target.release_binary(&layout.root),
                target,
            }
        } else {
            build(&layout.root, target, options.build, runner)?
        };
        results.push(package(layout, &artifact, options.mode, identity, runner)?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_scope_resolves_every_registered_target() {
        let targets = resolve(&TargetScope::All).expect("resolve");
        assert_eq!(targets.len(), registry::all().len());
    }

    #[test]
    fn only_scope_keeps_requested_order() {
        let scope = TargetScope::Only(vec![
            "x86_64-pc-windows-gnu".to_string(),
            "x86_64-unknown-linux-gnu".to_string(),
        ]);
        let triples: Vec<_> = resolve(&scope)
            .expect("resolve")
            .into_iter()
            .map(|t| t.triple)
            .collect();
        assert_eq!(triples, vec!["x86_64-pc-windows-gnu", "x86_64-unknown-linux-gnu"]);
    }
}
