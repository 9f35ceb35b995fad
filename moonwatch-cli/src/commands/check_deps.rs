//! `moonwatch-dist check-deps` — run the install preflight on its own.

use anyhow::{Context, Result};
use clap::Args;

use moonwatch_core::SystemRunner;
use moonwatch_install::check_dependencies;

use super::target_or_host;

#[derive(Args, Debug)]
pub struct CheckDepsArgs {
    /// Target whose dependency list to check (defaults to this host).
    #[arg(long, short = 't', value_name = "TRIPLE")]
    pub target: Option<String>,
}

impl CheckDepsArgs {
    pub fn run(self) -> Result<()> {
        let target = target_or_host(self.target.as_deref())?;
        if !target.needs_preflight() {
            println!("✓ {} has no external dependencies", target.triple);
            return Ok(());
        }

        check_dependencies(target.required_commands, &SystemRunner)
            .context("dependency check failed")?;
        for probe in target.required_commands {
            println!("✓ {}", probe.command);
        }
        Ok(())
    }
}
