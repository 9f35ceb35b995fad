//! Compiled-in table of supported targets.
//!
//! Every supported triple has exactly one [`TargetDescriptor`]. Lookups are
//! pure: no I/O, no environment.

use crate::error::ConfigError;
use crate::types::{Platform, Probe, TargetDescriptor, Toolchain};

/// Helpers the Linux daemon shells out to, plus the service manager itself.
const LINUX_REQUIRED: &[Probe] = &[
    Probe {
        command: "systemctl",
        arg: "--version",
    },
    Probe {
        command: "xdotool",
        arg: "--version",
    },
    Probe {
        command: "xprintidle",
        arg: "--help",
    },
    Probe {
        command: "gnome-screensaver-command",
        arg: "--help",
    },
];

static TARGETS: [TargetDescriptor; 2] = [
    TargetDescriptor {
        triple: "x86_64-unknown-linux-gnu",
        platform: Platform::Linux,
        arch: "x86-64",
        toolchain: Toolchain::Native,
        binary: "moonwatcher",
        default_config: "default-config-unix.json",
        installer: "install_unix.sh",
        service: Some("moonwatch-rs.service"),
        required_commands: LINUX_REQUIRED,
    },
    TargetDescriptor {
        triple: "x86_64-pc-windows-gnu",
        platform: Platform::Windows,
        arch: "x86-64",
        toolchain: Toolchain::Cross,
        binary: "moonwatcher.exe",
        default_config: "default-config-windows.json",
        installer: "install_windows.bat",
        service: None,
        required_commands: &[],
    },
];

/// All supported targets, in table order.
pub fn all() -> &'static [TargetDescriptor] {
    &TARGETS
}

/// Resolve a target triple to its descriptor.
pub fn lookup(triple: &str) -> Result<&'static TargetDescriptor, ConfigError> {
    TARGETS
        .iter()
        .find(|t| t.triple == triple)
        .ok_or_else(|| ConfigError::UnsupportedTarget {
            triple: triple.to_string(),
            supported: supported_triples(),
        })
}

/// The descriptor matching the operating system this process runs on.
pub fn host() -> Result<&'static TargetDescriptor, ConfigError> {
    let platform = if cfg!(target_os = "linux") {
        Platform::Linux
    } else if cfg!(windows) {
        Platform::Windows
    } else {
        return Err(ConfigError::UnsupportedHost {
            os: std::env::consts::OS,
        });
    };
    for_platform(platform)
}

/// First descriptor for a platform.
pub fn for_platform(platform: Platform) -> Result<&'static TargetDescriptor, ConfigError> {
    TARGETS
        .iter()
        .find(|t| t.platform == platform)
        .ok_or(ConfigError::UnsupportedHost {
            os: std::env::consts::OS,
        })
}

fn supported_triples() -> String {
    TARGETS
        .iter()
        .map(|t| t.triple)
        .collect::<Vec<_>>()
        .join(", ")
}
