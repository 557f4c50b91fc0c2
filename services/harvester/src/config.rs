//! Configuration types and loading
//!
//! Config precedence: CLI `--config` > CONFIG_PATH env var > default path.
//! Validation happens entirely at load time so a malformed setup aborts
//! before any credential is touched.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub collect: CollectConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
}

/// Collection engine settings
#[derive(Debug, Deserialize)]
pub struct CollectConfig {
    /// CSV (optionally .gz) with a `twitter_id` column
    pub users_file: PathBuf,
    /// CSV of API credentials; row order defines rotation order
    pub tokens_file: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Optional HTTP(S) proxy for all API traffic
    #[serde(default)]
    pub proxy: Option<String>,
    /// Rate-limit reset window to wait out when the pool is exhausted
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Per-user attempt budget
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Corpus builder settings
#[derive(Debug, Deserialize)]
pub struct CorpusConfig {
    /// A followed id must appear more than this many times across all
    /// users to survive filtering
    #[serde(default = "default_popular_count")]
    pub popular_count: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            popular_count: default_popular_count(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_cooldown_secs() -> u64 {
    900
}

fn default_max_attempts() -> u32 {
    10
}

fn default_popular_count() -> u64 {
    300
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        if config.collect.cooldown_secs == 0 {
            return Err(common::Error::Config(
                "cooldown_secs must be greater than 0".into(),
            ));
        }

        if config.collect.max_attempts == 0 {
            return Err(common::Error::Config(
                "max_attempts must be greater than 0".into(),
            ));
        }

        if let Some(ref proxy) = config.collect.proxy
            && !proxy.starts_with("http://")
            && !proxy.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "proxy must start with http:// or https://, got: {proxy}"
            )));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("harvester.toml")
    }
}
