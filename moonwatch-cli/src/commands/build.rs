//! `moonwatch-dist build` — compile without packaging.

use anyhow::{Context, Result};
use clap::Args;

use moonwatch_core::SystemRunner;
use moonwatch_pack::{build, pipeline, BuildOptions};

use super::{ProjectArgs, TargetSelection};
use crate::ToolchainArg;

/// Flags shared by `build` and `package`.
#[derive(Args, Debug)]
pub struct CompileFlags {
    /// Allow Cargo.lock to be updated (omit `--locked`).
    #[arg(long)]
    pub unlocked: bool,

    /// Force a toolchain instead of the target's default: native | cross.
    #[arg(long, value_name = "TOOLCHAIN")]
    pub toolchain: Option<ToolchainArg>,
}

impl CompileFlags {
    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            locked: !self.unlocked,
            toolchain: self.toolchain.map(|t| t.0),
        }
    }
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub selection: TargetSelection,

    #[command(flatten)]
    pub compile: CompileFlags,
}

impl BuildArgs {
    pub fn run(self) -> Result<()> {
        let layout = self.project.layout()?;
        let targets = pipeline::resolve(&self.selection.scope())?;
        let runner = SystemRunner;

        for target in targets {
            let artifact = build(&layout.root, target, self.compile.options(), &runner)
                .with_context(|| format!("build step failed for '{target}'"))?;
            println!("✓ built {}: {}", target.triple, artifact.binary.display());
        }
        Ok(())
    }
}
