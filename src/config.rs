//! User configuration management
//!
//! Configuration is stored in TOML format at `~/.sdkpack/config.toml`.
//! Every field has a default, so a missing file or a partial file is fine.
//!
//! # Examples
//!
//! ```no_run
//! use sdkpack::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::load()?;
//!
//! println!("Manifest: {}", config.repository.url);
//! println!("Cache: {}", config.cache_dir().display());
//!
//! config.filter.include_preview = true;
//! config.save()?;
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default second-generation manifest
pub const DEFAULT_MANIFEST_URL: &str =
    "https://dl.google.com/android/repository/repository2-1.xml";

/// User configuration file (`~/.sdkpack/config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Manifest locations
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Download and extraction settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// NuGet packaging settings
    #[serde(default)]
    pub packaging: PackagingConfig,

    /// Default selection criteria
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Manifest to load (either schema generation)
    #[serde(default = "default_manifest_url")]
    pub url: String,

    /// Addon manifest merged into a first-generation repository
    #[serde(default)]
    pub addon_url: Option<String>,
}

fn default_manifest_url() -> String {
    DEFAULT_MANIFEST_URL.to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: default_manifest_url(),
            addon_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Where containers are acquired (`~` is expanded)
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// Delete and re-acquire containers that are already present
    #[serde(default)]
    pub overwrite: bool,

    /// HTTP timeout in seconds (0 = no timeout)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_cache_dir() -> String {
    "~/.sdkpack/cache".to_string()
}

fn default_timeout_seconds() -> u64 {
    300
}

fn default_user_agent() -> String {
    crate::http::DEFAULT_USER_AGENT.to_string()
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            overwrite: false,
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingConfig {
    /// Path to the `.nuspec` template
    #[serde(default)]
    pub template: Option<String>,

    /// Appended to every package version (e.g. `-beta1`)
    #[serde(default)]
    pub version_suffix: String,

    /// Where `.nupkg` files are written; defaults to the cache directory
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub include_preview: bool,

    #[serde(default)]
    pub include_obsolete: bool,
}

impl Config {
    /// Get the default config file path
    ///
    /// Uses SDKPACK_CONFIG_DIR if set, otherwise ~/.sdkpack/config.toml
    pub fn default_path() -> Result<PathBuf> {
        // Check for custom config directory (useful for testing)
        if let Ok(config_dir) = std::env::var("SDKPACK_CONFIG_DIR") {
            return Ok(PathBuf::from(config_dir).join("config.toml"));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Other("Could not find home directory".to_string()))?;

        Ok(home.join(".sdkpack").join("config.toml"))
    }

    /// Load config from the default path, or defaults if there is no file
    ///
    /// Environment variable overrides:
    /// - `SDKPACK_MANIFEST_URL`: Overrides `repository.url`
    /// - `SDKPACK_CONFIG_DIR`: Overrides the config directory location
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::default_path()?)?;

        if let Ok(url) = std::env::var("SDKPACK_MANIFEST_URL") {
            if !url.is_empty() {
                config.repository.url = url;
            }
        }

        Ok(config)
    }

    /// Load config from a specific file, without environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Cache directory with `~` expanded
    pub fn cache_dir(&self) -> PathBuf {
        expand(&self.download.cache_dir)
    }

    /// Package output directory with `~` expanded; the cache directory if unset
    pub fn output_dir(&self) -> PathBuf {
        match &self.packaging.output_dir {
            Some(dir) => expand(dir),
            None => self.cache_dir(),
        }
    }

    /// Template path with `~` expanded
    pub fn template_path(&self) -> Option<PathBuf> {
        self.packaging.template.as_deref().map(expand)
    }

    /// Set a value by its dotted key (e.g. `download.overwrite`)
    ///
    /// An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());

        match key {
            "repository.url" => self.repository.url = value.to_string(),
            "repository.addon_url" => self.repository.addon_url = optional(value),
            "download.cache_dir" => self.download.cache_dir = value.to_string(),
            "download.overwrite" => self.download.overwrite = parse_bool(key, value)?,
            "download.timeout_seconds" => {
                self.download.timeout_seconds = value.parse().map_err(|_| {
                    Error::Other(format!("Invalid number for {}: '{}'", key, value))
                })?
            }
            "download.user_agent" => self.download.user_agent = value.to_string(),
            "packaging.template" => self.packaging.template = optional(value),
            "packaging.version_suffix" => self.packaging.version_suffix = value.to_string(),
            "packaging.output_dir" => self.packaging.output_dir = optional(value),
            "filter.include_preview" => self.filter.include_preview = parse_bool(key, value)?,
            "filter.include_obsolete" => self.filter.include_obsolete = parse_bool(key, value)?,
            _ => {
                return Err(Error::Other(format!(
                    "Unknown configuration key '{}'. Available keys: {}",
                    key,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Keys accepted by [`Config::set`]
    pub const KEYS: [&'static str; 11] = [
        "repository.url",
        "repository.addon_url",
        "download.cache_dir",
        "download.overwrite",
        "download.timeout_seconds",
        "download.user_agent",
        "packaging.template",
        "packaging.version_suffix",
        "packaging.output_dir",
        "filter.include_preview",
        "filter.include_obsolete",
    ];
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value.parse::<bool>().map_err(|_| {
        Error::Other(format!(
            "Invalid boolean value for {}: '{}'. Use 'true' or 'false'",
            key, value
        ))
    })
}
