//! Host-side installation: dependency preflight, file placement and
//! systemd user-service registration.

mod error;
pub mod installer;
pub mod paths;
pub mod preflight;
pub mod systemd;

pub use error::InstallError;
pub use installer::{inspect, install, ConfigAction, InstallReport, InstalledState, ServiceReport};
pub use paths::InstallLayout;
pub use preflight::check_dependencies;
pub use systemd::{StartOutcome, StopOutcome, UserService};
