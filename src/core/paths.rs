//! Resolution of the configuration, lock, and settings paths.

use crate::constants;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ZimanPaths {
    pub config: PathBuf,
    pub lock: PathBuf,
    pub settings: PathBuf,
}

impl ZimanPaths {
    /// Resolve paths from CLI args, then env vars, then compiled defaults.
    pub fn resolve(config_arg: Option<PathBuf>, settings_arg: Option<PathBuf>) -> Self {
        let config = config_arg
            .or_else(|| env::var_os("ZIMAN_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_CONFIG_PATH));
        let settings = settings_arg
            .or_else(|| env::var_os("ZIMAN_SETTINGS").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_SETTINGS_PATH));
        let mut paths = Self::for_config(config);
        paths.settings = settings;
        paths
    }

    /// Paths for a given config file; the lock sits next to it.
    pub fn for_config(config: PathBuf) -> Self {
        let mut lock = OsString::from(config.as_os_str());
        lock.push(constants::LOCK_SUFFIX);
        let settings = config
            .parent()
            .map(|p| p.join("ziman.toml"))
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_SETTINGS_PATH));
        Self {
            config,
            lock: PathBuf::from(lock),
            settings,
        }
    }
}

impl std::fmt::Display for ZimanPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "config@{}", self.config.display())
    }
}
