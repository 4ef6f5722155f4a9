//! Configuration management

pub mod commands;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::ExtractArgs;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "texpack";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory tree scanned for loose textures and archives
    #[serde(default = "default_source")]
    pub source: String,

    /// Where numbered packages are written
    #[serde(default = "default_target")]
    pub target: String,

    /// Template merged into every package
    #[serde(default = "default_premade")]
    pub premade: String,

    /// Extra directory collecting a copy of every zip (empty to disable)
    #[serde(default = "default_collection")]
    pub collection: Option<String>,
}

fn default_source() -> String {
    "pack/".to_string()
}

fn default_target() -> String {
    "diamond_sword_trouve/".to_string()
}

fn default_premade() -> String {
    "premade/sword_".to_string()
}

fn default_collection() -> Option<String> {
    Some("pack_folder_sword/".to_string())
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            target: default_target(),
            premade: default_premade(),
            collection: default_collection(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Texture file names to look for
    #[serde(default = "default_target_names")]
    pub target_names: Vec<String>,

    /// Prefix of package folders and zips (`<prefix><n>.zip`)
    #[serde(default = "default_package_prefix")]
    pub package_prefix: String,
}

fn default_target_names() -> Vec<String> {
    vec!["diamond_sword.png".to_string()]
}

fn default_package_prefix() -> String {
    "sword_".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            target_names: default_target_names(),
            package_prefix: default_package_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log file written next to the console output
    #[serde(default = "default_log_file")]
    pub file: String,

    /// Default filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_file() -> String {
    "texpack.log".to_string()
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_NAME))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE_NAME))
    }

    /// Explicit path if given, otherwise the default location
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(p) => Ok(p.to_path_buf()),
            None => Self::config_path().context("Could not determine config path"),
        }
    }

    /// Load config, falling back to defaults when the file does not exist
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(explicit)?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to the resolved location
    pub fn save(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        let path = Self::resolve_path(explicit)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content).context("Failed to write config file")?;

        Ok(path)
    }

    /// Merge command-line overrides into the settings for one run
    pub fn settings(&self, args: &ExtractArgs) -> Settings {
        let collection = if args.no_collection {
            None
        } else {
            args.collection.clone().or_else(|| {
                self.paths
                    .collection
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .map(PathBuf::from)
            })
        };

        let target_names = if args.names.is_empty() {
            self.search.target_names.clone()
        } else {
            args.names.clone()
        };

        Settings {
            source: args
                .source
                .clone()
                .unwrap_or_else(|| PathBuf::from(&self.paths.source)),
            target: args
                .target
                .clone()
                .unwrap_or_else(|| PathBuf::from(&self.paths.target)),
            premade: args
                .premade
                .clone()
                .unwrap_or_else(|| PathBuf::from(&self.paths.premade)),
            collection,
            target_names,
            package_prefix: args
                .prefix
                .clone()
                .unwrap_or_else(|| self.search.package_prefix.clone()),
        }
    }

    /// Log file for this run, command line first
    pub fn log_file(&self, args: &ExtractArgs) -> PathBuf {
        args.log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.logging.file))
    }
}

/// Resolved, immutable inputs of one pipeline run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: PathBuf,
    pub target: PathBuf,
    pub premade: PathBuf,
    pub collection: Option<PathBuf>,
    pub target_names: Vec<String>,
    pub package_prefix: String,
}
