//! On-host installation of an unpacked bundle.
//!
//! ## Install sequence
//!
//! 0. Probe required commands and check the bundle is complete. Any failure
//!    here aborts with the host untouched.
//! 1. Stop the running service. Failure is logged only.
//! 2. Create the install directory.
//! 3. Copy the binary, replacing any previous one.
//! 4. Copy `config.json` only when none is installed yet.
//! 5. Copy the unit file into the systemd user directory, replacing any
//!    previous one.
//! 6. Enable the service. Failure is fatal.
//! 7. Start the service. Failure is logged only.
//!
//! Targets without a service descriptor run steps 0, 2, 3 and 4.

use std::fs;
use std::path::{Path, PathBuf};

use moonwatch_core::{CommandRunner, TargetDescriptor, BUNDLE_CONFIG_FILE};

use crate::error::{io_err, InstallError};
use crate::paths::InstallLayout;
use crate::preflight::check_dependencies;
use crate::systemd::{StartOutcome, StopOutcome, UserService};

/// What is already on the host before installing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledState {
    pub install_dir: PathBuf,
    pub config_present: bool,
    pub unit_present: bool,
}

/// Read the host state for `target` under `layout`.
pub fn inspect(layout: &InstallLayout, target: &TargetDescriptor) -> InstalledState {
    InstalledState {
        install_dir: layout.install_dir.clone(),
        config_present: layout.install_dir.join(BUNDLE_CONFIG_FILE).is_file(),
        unit_present: target
            .service
            .is_some_and(|unit| layout.unit_dir.join(unit).is_file()),
    }
}

/// Whether step 4 wrote the default configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    Seeded,
    Preserved,
}

/// Per-step results of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub binary: PathBuf,
    pub config: ConfigAction,
    /// `None` for targets without a service manager.
    pub service: Option<ServiceReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReport {
    pub stop: StopOutcome,
    pub unit: PathBuf,
    pub start: StartOutcome,
}

/// Install the bundle in `bundle_dir` for `target`.
pub fn install(
    bundle_dir: &Path,
    target: &TargetDescriptor,
    layout: &InstallLayout,
    runner: &dyn CommandRunner,
) -> Result<InstallReport, InstallError> {
    check_dependencies(target.required_commands, runner)?;
    let binary_src = bundle_file(bundle_dir, target.binary)?;
    let config_src = bundle_file(bundle_dir, BUNDLE_CONFIG_FILE)?;
    let unit_src = target
        .service
        .map(|unit| bundle_file(bundle_dir, unit).map(|path| (unit, path)))
        .transpose()?;

    let state = inspect(layout, target);
    let service = UserService::new(&layout.service_name, runner);

    let stop = match unit_src {
        Some(_) => Some(stop_service(&service)?),
        None => None,
    };

    tracing::info!("installing into {}", layout.install_dir.display());
    fs::create_dir_all(&layout.install_dir).map_err(|e| io_err(&layout.install_dir, e))?;

    let binary = layout.install_dir.join(target.binary);
    copy(&binary_src, &binary)?;

    let config = if state.config_present {
        tracing::info!("{BUNDLE_CONFIG_FILE} already exists, not copying default");
        ConfigAction::Preserved
    } else {
        tracing::info!("copying default {BUNDLE_CONFIG_FILE}");
        copy(&config_src, &layout.install_dir.join(BUNDLE_CONFIG_FILE))?;
        ConfigAction::Seeded
    };

    let service_report = match (unit_src, stop) {
        (Some((unit_name, unit_src)), Some(stop)) => {
            tracing::info!("setting up systemd user service");
            fs::create_dir_all(&layout.unit_dir).map_err(|e| io_err(&layout.unit_dir, e))?;
            let unit = layout.unit_dir.join(unit_name);
            copy(&unit_src, &unit)?;

            service.enable()?;
            let start = start_service(&service)?;
            Some(ServiceReport { stop, unit, start })
        }
        _ => None,
    };

    Ok(InstallReport {
        binary,
        config,
        service: service_report,
    })
}

fn bundle_file(bundle_dir: &Path, name: &str) -> Result<PathBuf, InstallError> {
    let path = bundle_dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(InstallError::MissingBundleFile { path })
    }
}

fn copy(src: &Path, dest: &Path) -> Result<(), InstallError> {
    fs::copy(src, dest).map_err(|e| io_err(dest, e))?;
    tracing::debug!("copied {} -> {}", src.display(), dest.display());
    Ok(())
}

fn stop_service(service: &UserService<'_>) -> Result<StopOutcome, InstallError> {
    let outcome = service.stop()?;
    match outcome {
        StopOutcome::Stopped => tracing::info!("stopped running service"),
        StopOutcome::NotLoaded => tracing::info!("service not installed yet, nothing to stop"),
        StopOutcome::Failed(status) => {
            tracing::warn!("could not stop service ({status}), continuing")
        }
    }
    Ok(outcome)
}

fn start_service(service: &UserService<'_>) -> Result<StartOutcome, InstallError> {
    let outcome = service.start()?;
    if let StartOutcome::Failed(status) = outcome {
        tracing::warn!("service enabled but failed to start ({status}); start it manually or log in again");
    }
    Ok(outcome)
}
