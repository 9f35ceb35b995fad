//! `moonwatch-dist install` — place an unpacked bundle and register the service.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use moonwatch_core::SystemRunner;
use moonwatch_install::{
    install, ConfigAction, InstallLayout, InstallReport, StartOutcome, StopOutcome,
};

use super::target_or_host;

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Directory holding the unpacked bundle.
    #[arg(long, default_value = ".")]
    pub bundle: PathBuf,

    /// Target the bundle was built for (defaults to this host).
    #[arg(long, short = 't', value_name = "TRIPLE")]
    pub target: Option<String>,
}

impl InstallArgs {
    pub fn run(self) -> Result<()> {
        let target = target_or_host(self.target.as_deref())?;
        let layout = InstallLayout::current_user().context("could not determine home directory")?;
        tracing::debug!(
            "installing {} bundle from {}",
            target.triple,
            self.bundle.display()
        );

        let report = install(&self.bundle, target, &layout, &SystemRunner).with_context(|| {
            format!(
                "failed to install '{}' from {}",
                target.triple,
                self.bundle.display()
            )
        })?;
        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &InstallReport) {
    println!("✓ installed {}", report.binary.display());
    match report.config {
        ConfigAction::Seeded => println!("  ✎  default config.json copied"),
        ConfigAction::Preserved => println!("  ·  existing config.json kept"),
    }

    let Some(service) = &report.service else {
        return;
    };
    let stop = match service.stop {
        StopOutcome::Stopped => "stopped previous instance".normal(),
        StopOutcome::NotLoaded => "no previous instance".normal(),
        StopOutcome::Failed(status) => format!("stop failed ({status})").as_str().yellow(),
    };
    println!("  ·  {stop}");
    println!("  ✎  unit {}", service.unit.display());
    match service.start {
        StartOutcome::Started => println!("  {} service enabled and started", "■".green().bold()),
        StartOutcome::Failed(status) => println!(
            "  {} service enabled but not started ({status}); start it manually or log in again",
            "■".yellow().bold()
        ),
    }
}
