//! Layered configuration.
//!
//! Values are resolved in order, later layers winning:
//! 1. Built-in defaults.
//! 2. A configuration file: an explicit path, or `config.{toml,yaml,json}` in
//!    the platform configuration directory.
//! 3. `DEPOT_`-prefixed environment variables, with `__` separating nested
//!    keys (`DEPOT_INTEGRITY__BATCH_SIZE=500`).

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "DEPOT_";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub integrity: IntegrityConfig,
    pub paging: PagingConfig,
}

/// Settings for blob integrity scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Assets fetched per browse call. Must be greater than zero.
    pub batch_size: usize,
    /// Seconds between progress log lines.
    pub progress_interval_secs: u64,
    /// Only check blobs created in the last this-many days; 0 checks all.
    pub since_days: u32,
    /// Repositories scanned at once. Must be greater than zero.
    pub max_concurrent_repositories: usize,
}
impl IntegrityConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }
}
impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            progress_interval_secs: 60,
            since_days: 0,
            max_concurrent_repositories: 1,
        }
    }
}

/// Settings for paginated search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub default_page_size: usize,
    /// Upper bound on any requested page size.
    pub max_page_size: usize,
}
impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 300,
        }
    }
}

impl Config {
    /// Load and validate configuration.
    ///
    /// With `path`, that file must exist and its extension selects the
    /// format. Without, any `config.*` file in the platform configuration
    /// directory is used if present.
    ///
    /// # Errors
    /// - [`ErrorKind::NotFound`] if `path` does not exist.
    /// - [`ErrorKind::UnsupportedFormat`] if `path` has an unknown extension.
    /// - [`ErrorKind::Parse`] if any layer is malformed.
    /// - [`ErrorKind::Invalid`] if a value is out of range.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(path)?)
    }

    /// The layered [`Figment`] that [`load`](Self::load) extracts from.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        Self::figment_with_env(path, ENV_PREFIX)
    }

    fn figment_with_env(path: Option<&Path>, env_prefix: &str) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
                }
                figment = merge_file(figment, path)?;
            },
            None => {
                for path in default_paths() {
                    if path.is_file() {
                        tracing::debug!(path = %path.display(), "Loading configuration file");
                        figment = merge_file(figment, &path)?;
                    }
                }
            },
        }
        Ok(figment.merge(Env::prefixed(env_prefix).split(ENV_SEPARATOR)))
    }

    /// Extract and validate configuration from `figment`.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// - [`ErrorKind::Invalid`] naming the first out-of-range field.
    pub fn validate(&self) -> Result<()> {
        if self.integrity.batch_size == 0 {
            exn::bail!(ErrorKind::Invalid("integrity.batch_size"));
        }
        if self.integrity.max_concurrent_repositories == 0 {
            exn::bail!(ErrorKind::Invalid("integrity.max_concurrent_repositories"));
        }
        if self.paging.default_page_size == 0 {
            exn::bail!(ErrorKind::Invalid("paging.default_page_size"));
        }
        if self.paging.max_page_size < self.paging.default_page_size {
            exn::bail!(ErrorKind::Invalid("paging.max_page_size"));
        }
        Ok(())
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}

/// Candidate files in the platform configuration directory, lowest
/// precedence first.
fn default_paths() -> Vec<PathBuf> {
    let Some(dirs) = directories::ProjectDirs::from("", "", "depot") else {
        return Vec::new();
    };
    ["config.json", "config.yaml", "config.toml"].iter().map(|name| dirs.config_dir().join(name)).collect()
}
