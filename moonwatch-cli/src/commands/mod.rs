pub mod build;
pub mod check_deps;
pub mod install;
pub mod package;
pub mod targets;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use moonwatch_core::{registry, ProjectLayout, TargetDescriptor};
use moonwatch_pack::TargetScope;

/// Where the daemon's source tree and build outputs live.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project root containing Cargo.toml and `share/`.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Override `share_dir` from moonwatch-dist.yaml.
    #[arg(long)]
    pub share_dir: Option<PathBuf>,

    /// Override `output_dir` from moonwatch-dist.yaml.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl ProjectArgs {
    pub fn layout(&self) -> Result<ProjectLayout> {
        let root = self
            .root
            .canonicalize()
            .with_context(|| format!("cannot resolve project root '{}'", self.root.display()))?;
        let mut layout = ProjectLayout::load(&root).context("failed to load pipeline config")?;
        if let Some(dir) = &self.share_dir {
            layout.share_dir = root.join(dir);
        }
        if let Some(dir) = &self.output_dir {
            layout.output_dir = root.join(dir);
        }
        tracing::debug!(
            "project root {}, share {}, output {}",
            layout.root.display(),
            layout.share_dir.display(),
            layout.output_dir.display()
        );
        Ok(layout)
    }
}

/// `--target <triple>...` or `--all`.
#[derive(Args, Debug)]
pub struct TargetSelection {
    /// Target triple to process (repeatable).
    #[arg(long = "target", short = 't', value_name = "TRIPLE", required_unless_present = "all")]
    pub targets: Vec<String>,

    /// Process every supported target.
    #[arg(long, conflicts_with = "targets")]
    pub all: bool,
}

impl TargetSelection {
    pub fn scope(&self) -> TargetScope {
        if self.all {
            TargetScope::All
        } else {
            TargetScope::Only(self.targets.clone())
        }
    }
}

/// The named triple, or the descriptor for this host.
pub fn target_or_host(triple: Option<&str>) -> Result<&'static TargetDescriptor> {
    match triple {
        Some(triple) => registry::lookup(triple).context("invalid --target"),
        None => registry::host().context("cannot pick a default target; pass --target"),
    }
}
