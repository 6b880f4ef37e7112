use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration loaded from `$EKDEP_HOME/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub resolve: ResolveConfig,
}

/// Package cache settings from `[cache]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> String {
    "~/.ekdep/cache".to_string()
}

/// Resolution settings from `[resolve]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Maximum number of package metadata fetches in flight at once.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// List accepted and rejected dependencies after every resolve.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            verbose: false,
        }
    }
}

fn default_jobs() -> usize {
    8
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load from an explicit path, or return defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            ekdep_util::errors::EkdepError::Config {
                message: format!("Failed to read {}: {e}", path.display()),
            }
        })?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ekdep_util::errors::EkdepError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            })?;
        if config.resolve.jobs == 0 {
            return Err(ekdep_util::errors::EkdepError::Config {
                message: "[resolve] jobs must be at least 1".to_string(),
            }
            .into());
        }
        Ok(config)
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// The package cache root with `~` expanded.
    pub fn cache_dir(&self) -> PathBuf {
        ekdep_util::fs::expand_home(&self.cache.dir)
    }
}

/// Returns the ekdep data directory: `$EKDEP_HOME`, else `~/.ekdep/`.
pub fn dirs_path() -> PathBuf {
    if let Ok(home) = std::env::var("EKDEP_HOME") {
        return PathBuf::from(home);
    }
    ekdep_util::fs::expand_home("~/.ekdep")
}
