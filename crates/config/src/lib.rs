//! Layered configuration for the usercss pipeline.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. Built-in defaults.
//! 2. A configuration file (TOML, YAML or JSON, picked by extension). Without
//!    an explicit path, `config.toml` in the platform config directory is
//!    used if it exists.
//! 3. Environment variables prefixed with `UCSS_`, using `__` to nest
//!    (`UCSS_PREFETCH__RETENTION_SECS=90`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "UCSS_";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub prefetch: PrefetchConfig,
    /// Extension-relative URL of the usercss install page.
    pub install_page: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefetch: PrefetchConfig::default(),
            install_page: "/install-usercss.html".to_string(),
        }
    }
}

/// Settings for the prefetched code cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// How long a prefetched entry is kept, in seconds.
    pub retention_secs: u64,
    /// Key prefix for entries in the key-value store; the tab id is appended.
    pub key_prefix: String,
    /// Run the background sweeper for entries whose removal timer was lost.
    pub sweep: bool,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            retention_secs: 60,
            key_prefix: "tempUsercssCode".to_string(),
            sweep: false,
        }
    }
}

impl PrefetchConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

impl Config {
    /// Load and validate the configuration.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(&Self::figment(path)?)
    }

    /// All configuration sources, merged but not yet extracted.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::Load(path.display().to_string()));
                }
                merge_file(figment, path)?
            },
            None => match default_path() {
                Some(path) => merge_file(figment, &path)?,
                None => figment,
            },
        };
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR)))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .or_raise(|| ErrorKind::Load("merged sources".to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.prefetch.retention_secs == 0 {
            exn::bail!(ErrorKind::Invalid("prefetch.retention_secs must be positive"));
        }
        if self.prefetch.key_prefix.is_empty() {
            exn::bail!(ErrorKind::Invalid("prefetch.key_prefix must not be empty"));
        }
        if self.install_page.is_empty() {
            exn::bail!(ErrorKind::Invalid("install_page must not be empty"));
        }
        Ok(())
    }
}

/// `config.toml` in the platform-specific configuration directory.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ucss").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    tracing::debug!(path = %path.display(), "Reading configuration file");
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    Ok(match extension.to_ascii_lowercase().as_str() {
        "toml" => figment.merge(Toml::file(path)),
        "yaml" | "yml" => figment.merge(Yaml::file(path)),
        "json" => figment.merge(Json::file(path)),
        _ => exn::bail!(ErrorKind::Load(path.display().to_string())),
    })
}
