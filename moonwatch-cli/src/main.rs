//! moonwatch-dist: build, package and install the moonwatch daemon.
//!
//! # Usage
//!
//! ```text
//! moonwatch-dist targets [--json]
//! moonwatch-dist build   (--target <triple>... | --all) [--unlocked] [--toolchain native|cross]
//! moonwatch-dist package (--target <triple>... | --all) [--archive] [--skip-build]
//! moonwatch-dist check-deps [--target <triple>]
//! moonwatch-dist install [--bundle <dir>] [--target <triple>]
//! ```

mod commands;

use std::fmt;
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{
    build::BuildArgs, check_deps::CheckDepsArgs, install::InstallArgs, package::PackageArgs,
    targets::TargetsArgs,
};
use moonwatch_core::Toolchain;
use moonwatch_install::InstallError;
use moonwatch_pack::PackError;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "moonwatch-dist",
    version,
    about = "Build, package and install the moonwatch daemon",
    long_about = None,
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List supported target triples.
    Targets(TargetsArgs),

    /// Compile the daemon for one or more targets.
    Build(BuildArgs),

    /// Compile and stage distributable bundles.
    Package(PackageArgs),

    /// Verify the helper commands a target needs are installed.
    CheckDeps(CheckDepsArgs),

    /// Install an unpacked bundle on this host.
    Install(InstallArgs),
}

// ---------------------------------------------------------------------------
// Shared Toolchain argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `Toolchain` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct ToolchainArg(pub Toolchain);

impl FromStr for ToolchainArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "cargo" => Ok(Self(Toolchain::Native)),
            "cross" => Ok(Self(Toolchain::Cross)),
            other => Err(format!("unknown toolchain '{other}'; expected: native, cross")),
        }
    }
}

impl fmt::Display for ToolchainArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Targets(args) => args.run(),
        Commands::Build(args) => args.run(),
        Commands::Package(args) => args.run(),
        Commands::CheckDeps(args) => args.run(),
        Commands::Install(args) => args.run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_code(&err))
        }
    }
}

/// The failing tool's exit status when the error carries one, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> u8 {
    let code = if let Some(e) = err.downcast_ref::<PackError>() {
        e.exit_code()
    } else if let Some(e) = err.downcast_ref::<InstallError>() {
        e.exit_code()
    } else {
        1
    };
    u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
