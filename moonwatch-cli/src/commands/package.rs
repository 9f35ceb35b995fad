//! `moonwatch-dist package` — build and stage bundles, optionally archived.

use anyhow::{Context, Result};
use clap::Args;

use moonwatch_core::{BundleMode, SystemRunner};
use moonwatch_pack::{pipeline, CargoPkgid, Packaged, PipelineOptions};

use super::build::CompileFlags;
use super::{ProjectArgs, TargetSelection};

#[derive(Args, Debug)]
pub struct PackageArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub selection: TargetSelection,

    #[command(flatten)]
    pub compile: CompileFlags,

    /// Wrap each bundle in a .tar.gz / .zip named after the package version.
    #[arg(long)]
    pub archive: bool,

    /// Package the existing build output without compiling.
    #[arg(long)]
    pub skip_build: bool,
}

impl PackageArgs {
    pub fn run(self) -> Result<()> {
        let layout = self.project.layout()?;
        let runner = SystemRunner;
        let identity = CargoPkgid::new(&layout.root, &runner);
        let options = PipelineOptions {
            build: self.compile.options(),
            mode: if self.archive {
                BundleMode::Archived
            } else {
                BundleMode::Plain
            },
            skip_build: self.skip_build,
        };

        let results = pipeline::run(&layout, &self.selection.scope(), options, &identity, &runner)
            .context("packaging failed")?;
        for packaged in &results {
            print_result(packaged);
        }
        Ok(())
    }
}

fn print_result(packaged: &Packaged) {
    println!("✓ {}", packaged.output().display());
    for file in &packaged.bundle.files {
        if let Some(name) = file.file_name() {
            println!("  ·  {}", name.to_string_lossy());
        }
    }
}
