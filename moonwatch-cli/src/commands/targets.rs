//! `moonwatch-dist targets` — list the compiled-in target table.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use moonwatch_core::{registry, Platform, TargetDescriptor, Toolchain};

#[derive(Args, Debug)]
pub struct TargetsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TargetJson {
    triple: &'static str,
    platform: Platform,
    arch: &'static str,
    toolchain: Toolchain,
    binary: &'static str,
    default_config: &'static str,
    installer: &'static str,
    service: Option<&'static str>,
    required_commands: Vec<&'static str>,
}

#[derive(Tabled)]
struct TargetRow {
    #[tabled(rename = "triple")]
    triple: &'static str,
    #[tabled(rename = "platform")]
    platform: String,
    #[tabled(rename = "toolchain")]
    toolchain: String,
    #[tabled(rename = "binary")]
    binary: &'static str,
    #[tabled(rename = "service")]
    service: &'static str,
}

impl TargetsArgs {
    pub fn run(self) -> Result<()> {
        let targets = registry::all();
        if self.json {
            let payload: Vec<TargetJson> = targets.iter().map(to_json).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize targets")?
            );
            return Ok(());
        }

        let rows: Vec<TargetRow> = targets
            .iter()
            .map(|t| TargetRow {
                triple: t.triple,
                platform: format!("{}-{}", t.platform, t.arch),
                toolchain: t.toolchain.to_string(),
                binary: t.binary,
                service: t.service.unwrap_or("-"),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

fn to_json(t: &TargetDescriptor) -> TargetJson {
    TargetJson {
        triple: t.triple,
        platform: t.platform,
        arch: t.arch,
        toolchain: t.toolchain,
        binary: t.binary,
        default_config: t.default_config,
        installer: t.installer,
        service: t.service,
        required_commands: t.required_commands.iter().map(|p| p.command).collect(),
    }
}
