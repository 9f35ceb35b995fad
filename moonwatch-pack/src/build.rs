//! Compile the daemon for one target.

use std::path::Path;

use moonwatch_core::{BuildArtifact, CommandRunner, Invocation, TargetDescriptor, Toolchain};

use crate::error::PackError;

/// Knobs for a single build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Pass `--locked` so `Cargo.lock` must already be up to date.
    pub locked: bool,
    /// Force `cargo` or `cross` instead of the target's default.
    pub toolchain: Option<Toolchain>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            locked: true,
            toolchain: None,
        }
    }
}

/// The command line that builds `target` in release mode.
pub fn build_invocation(
    root: &Path,
    target: &TargetDescriptor,
    options: BuildOptions,
) -> Invocation {
    let toolchain = options.toolchain.unwrap_or(target.toolchain);
    let mut invocation = Invocation::new(toolchain.program()).arg("build");
    if options.locked {
        invocation = invocation.arg("--locked");
    }
    invocation
        .args(["--release", "--target", target.triple])
        .current_dir(root)
}

/// Run the toolchain for `target` and return where the binary should be.
///
/// The artifact path is not checked here; the packager verifies it before
/// staging.
pub fn build(
    root: &Path,
    target: &'static TargetDescriptor,
    options: BuildOptions,
    runner: &dyn CommandRunner,
) -> Result<BuildArtifact, PackError> {
    let invocation = build_invocation(root, target, options);
    tracing::info!("building {} with `{}`", target.triple, invocation);

    let status = runner
        .status(&invocation)
        .map_err(|source| PackError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;
    if !status.success() {
        return Err(PackError::Toolchain {
            command: invocation.to_string(),
            status,
        });
    }

    let binary = target.release_binary(root);
    tracing::debug!("build output: {}", binary.display());
    Ok(BuildArtifact { binary, target })
}
