//! Stage a build into a bundle directory and optionally archive it.
//!
//! ## Packaging protocol
//!
//! 1. Verify every source exists (binary, default config, installer,
//!    service descriptor). Nothing under the output tree is touched until
//!    this passes.
//! 2. Pick the bundle name: the target triple (plain) or the
//!    identity-derived archive stem (archived).
//! 3. Remove any previous bundle directory and archive of that name.
//! 4. Create the bundle directory and copy the sources in.
//! 5. Archived mode only: run `tar`/`zip` from the output directory so the
//!    archive's single top-level entry is the bundle directory.

use std::fs;
use std::path::{Path, PathBuf};

use moonwatch_core::{
    ArchiveFormat, BuildArtifact, BundleMode, CommandRunner, Invocation, ProjectLayout,
    StagingBundle, TargetDescriptor,
};

use crate::error::{io_err, PackError};
use crate::identity::IdentityProvider;

/// Outcome of packaging one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packaged {
    pub bundle: StagingBundle,
    /// Set in archived mode.
    pub archive: Option<PathBuf>,
}

impl Packaged {
    /// The archive if one was produced, otherwise the bundle directory.
    pub fn output(&self) -> &Path {
        self.archive.as_deref().unwrap_or(&self.bundle.dir)
    }
}

/// Package `artifact` into `layout.output_dir`.
pub fn package(
    layout: &ProjectLayout,
    artifact: &BuildArtifact,
    mode: BundleMode,
    identity: &dyn IdentityProvider,
    runner: &dyn CommandRunner,
) -> Result<Packaged, PackError> {
    let target = artifact.target;
    let sources = collect_sources(layout, artifact)?;

    let name = match mode {
        BundleMode::Plain => target.triple.to_string(),
        BundleMode::Archived => identity.identity()?.archive_stem(target),
    };
    let bundle_dir = layout.output_dir.join(&name);

    let archive = match mode {
        BundleMode::Plain => None,
        BundleMode::Archived => {
            let format = target.platform.archive_format();
            let path = layout
                .output_dir
                .join(format!("{name}.{}", format.extension()));
            remove_existing(&path)?;
            Some((format, path))
        }
    };

    let bundle = stage(&bundle_dir, &sources)?;

    let archive = match archive {
        Some((format, path)) => {
            archive_bundle(&layout.output_dir, &name, format, &path, runner)?;
            Some(path)
        }
        None => None,
    };

    let packaged = Packaged { bundle, archive };
    tracing::info!("packaged {} -> {}", target.triple, packaged.output().display());
    Ok(packaged)
}

/// `(source, name inside bundle)` for every file, or the first missing one.
fn collect_sources(
    layout: &ProjectLayout,
    artifact: &BuildArtifact,
) -> Result<Vec<(PathBuf, &'static str)>, PackError> {
    let target: &TargetDescriptor = artifact.target;
    if !artifact.binary.is_file() {
        return Err(PackError::MissingArtifact {
            path: artifact.binary.clone(),
        });
    }

    let resources = layout.check_resources(target)?;
    let mut sources = vec![(artifact.binary.clone(), target.binary)];
    sources.extend(
        resources
            .into_iter()
            .zip(target.share_files())
            .map(|(path, (_, dest))| (path, dest)),
    );
    Ok(sources)
}

/// Create `dir` from scratch and copy `sources` into it.
pub fn stage(dir: &Path, sources: &[(PathBuf, &str)]) -> Result<StagingBundle, PackError> {
    remove_existing(dir)?;
    fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let mut files = Vec::with_capacity(sources.len());
    for (src, name) in sources {
        let dest = dir.join(name);
        fs::copy(src, &dest).map_err(|e| io_err(src, e))?;
        tracing::debug!("staged {} -> {}", src.display(), dest.display());
        files.push(dest);
    }

    Ok(StagingBundle {
        dir: dir.to_path_buf(),
        files,
    })
}

/// The archiver command for a bundle named `name` inside `output_dir`.
pub fn archive_invocation(output_dir: &Path, name: &str, format: ArchiveFormat) -> Invocation {
    let archive = format!("{name}.{}", format.extension());
    let invocation = match format {
        ArchiveFormat::TarGz => Invocation::new("tar").args(["-czf", archive.as_str(), name]),
        ArchiveFormat::Zip => Invocation::new("zip").args(["-r", archive.as_str(), name]),
    };
    invocation.current_dir(output_dir)
}

fn archive_bundle(
    output_dir: &Path,
    name: &str,
    format: ArchiveFormat,
    archive: &Path,
    runner: &dyn CommandRunner,
) -> Result<(), PackError> {
    let invocation = archive_invocation(output_dir, name, format);
    tracing::info!("archiving with `{invocation}`");

    let status = runner
        .status(&invocation)
        .map_err(|source| PackError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;
    if !status.success() {
        return Err(PackError::Archiver {
            command: invocation.to_string(),
            status,
        });
    }
    if !archive.is_file() {
        return Err(PackError::ArchiveMissing {
            path: archive.to_path_buf(),
        });
    }
    Ok(())
}

/// Remove a file or directory left over from an earlier run.
fn remove_existing(path: &Path) -> Result<(), PackError> {
    let Ok(meta) = fs::symlink_metadata(path) else {
        return Ok(());
    };
    tracing::debug!("removing previous {}", path.display());
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|e| io_err(path, e))
    } else {
        fs::remove_file(path).map_err(|e| io_err(path, e))
    }
}
