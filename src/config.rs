use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const APPID: &str = "udisks-notify";

/// Daemon settings, read from `$XDG_CONFIG_HOME/udisks-notify/config.toml`
///
/// Every field is optional; the defaults match a stock desktop setup.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    /// Program invoked as `<notify_command> <title> <body>`
    pub notify_command: String,
    /// Directory the notification text claims devices are mounted under
    pub mount_root: PathBuf,
    /// Object path namespace of the UDisks2 object manager
    pub udisks_path: String,
    /// Stop on the first failed event instead of logging it
    pub fail_fast: bool,
    /// Capacity of the listener to monitor channel
    pub queue_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notify_command: "notify-send".to_string(),
            mount_root: PathBuf::from("/media"),
            udisks_path: "/org/freedesktop/UDisks2".to_string(),
            fail_fast: false,
            queue_size: 64,
        }
    }
}

impl Config {
    /// Default location of the config file, if a config dir is known
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APPID).join("config.toml"))
    }

    /// Load the config file at `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)
                .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(AppError::Config(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| AppError::Config(e.to_string()))?;
        if config.queue_size == 0 {
            return Err(AppError::Config("queue_size must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Conventional mount path shown for a device name
    pub fn mount_path(&self, name: &str) -> String {
        self.mount_root.join(name).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.notify_command, "notify-send");
        assert_eq!(config.mount_path("sdb1"), "/media/sdb1");
        assert!(!config.fail_fast);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::from_toml("mount_root = \"/run/media/me\"\nfail_fast = true\n").unwrap();
        assert_eq!(config.mount_path("sdc2"), "/run/media/me/sdc2");
        assert!(config.fail_fast);
        assert_eq!(config.notify_command, "notify-send");
        assert_eq!(config.queue_size, 64);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        assert!(matches!(Config::from_toml("fail_fast = \"yes\""), Err(AppError::Config(_))));
        assert!(matches!(Config::from_toml("queue_size = 0"), Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("udisks-notify-missing").join("config.toml");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
