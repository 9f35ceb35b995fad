use std::path::{Path, PathBuf};

pub const SERVICE_NAME: &str = "moonwatch-rs";
pub const INSTALL_DIR_NAME: &str = ".moonwatch-rs";

pub fn install_dir(home: &Path) -> PathBuf {
    home.join(INSTALL_DIR_NAME)
}

/// `~/.config/systemd/user`
pub fn systemd_user_dir(home: &Path) -> PathBuf {
    home.join(".config").join("systemd").join("user")
}

/// Where the installer puts things on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    pub install_dir: PathBuf,
    pub unit_dir: PathBuf,
    pub service_name: String,
}

impl InstallLayout {
    pub fn for_home(home: &Path) -> Self {
        Self {
            install_dir: install_dir(home),
            unit_dir: systemd_user_dir(home),
            service_name: SERVICE_NAME.to_string(),
        }
    }

    /// Current user's layout, from `dirs::home_dir()`.
    pub fn current_user() -> Result<Self, moonwatch_core::ConfigError> {
        Ok(Self::for_home(&moonwatch_core::home_dir()?))
    }
}
