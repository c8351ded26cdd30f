use crate::registry::DEFAULT_REGISTRY_FILE;
use log::LevelFilter;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Registry file read and rewritten on every run
    pub registry_path: PathBuf,

    /// Explicit adb binary; searched for when unset
    pub adb_path: Option<PathBuf>,

    /// Explicit scrcpy binary; searched for when unset
    pub scrcpy_path: Option<PathBuf>,

    /// Number of `-v` flags given
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from(DEFAULT_REGISTRY_FILE),
            adb_path: None,
            scrcpy_path: None,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Log level used when RUST_LOG is not set
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.registry_path, PathBuf::from("device_map.json"));
        assert_eq!(config.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_verbosity_raises_log_level() {
        let config = Config {
            verbosity: 2,
            ..Default::default()
        };
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }
}
