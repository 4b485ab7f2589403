//! Configuration file support for zigdex.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `ZIGDEX_`, e.g., `ZIGDEX_GITHUB_TOKEN`)
//! 3. Config file (~/.config/zigdex/config.toml or ./zigdex.toml)
//! 4. Built-in defaults
//!
//! The GitHub token additionally falls back to the plain `GITHUB_TOKEN`
//! environment variable, since that is what CI schedulers usually provide.
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use ZIGDEX_GITHUB_TOKEN / GITHUB_TOKEN env vars
//!
//! [catalog]
//! root = "zig-catalog/packages"
//! ledger = "zig-catalog/ledger.json"
//!
//! [sync]
//! requests_per_second = 1
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration.
    pub github: GithubConfig,
    /// Catalog output locations.
    pub catalog: CatalogConfig,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// GitHub API token.
    /// Can also be set via ZIGDEX_GITHUB_TOKEN or GITHUB_TOKEN.
    pub token: Option<String>,
}

/// Catalog output locations.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory catalog entries are written under
    /// (`<root>/<owner>/<repo>.json`).
    pub root: Option<PathBuf>,
    /// Path of the reconciliation ledger file.
    pub ledger: Option<PathBuf>,
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Informal request budget (requests per second).
    pub requests_per_second: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            requests_per_second: zigdex::sync::DEFAULT_SYNC_RPS,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/zigdex/config.toml)
    /// 3. Local config file (./zigdex.toml)
    /// 4. Environment variables with ZIGDEX_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "zigdex") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("zigdex.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./zigdex.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("ZIGDEX")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Resolve the GitHub token: config file/env override first, then the
    /// conventional `GITHUB_TOKEN` variable.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()))
    }

    /// Directory catalog entries are written under.
    pub fn catalog_root(&self) -> PathBuf {
        self.catalog
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("zig-catalog/packages"))
    }

    /// Path of the reconciliation ledger.
    pub fn ledger_path(&self) -> PathBuf {
        self.catalog
            .ledger
            .clone()
            .unwrap_or_else(|| PathBuf::from("zig-catalog/ledger.json"))
    }
}
