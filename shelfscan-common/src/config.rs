//! Configuration loading and resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments (applied by the binary after loading)
//! 2. Environment variables (`SHELFSCAN_SEARCH_URL`, `SHELFSCAN_SEARCH_INDEX`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! The TOML file itself is located via the `--config` argument, then the
//! `SHELFSCAN_CONFIG` environment variable, then the platform config directory
//! (`~/.config/shelfscan/shelfscan.toml` on Linux). A missing default file is
//! not an error; a missing file that was asked for explicitly is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SHELFSCAN_CONFIG";

/// Environment variable overriding `search.url`
pub const SEARCH_URL_ENV_VAR: &str = "SHELFSCAN_SEARCH_URL";

/// Environment variable overriding `search.index`
pub const SEARCH_INDEX_ENV_VAR: &str = "SHELFSCAN_SEARCH_INDEX";

const CONFIG_DIR_NAME: &str = "shelfscan";
const CONFIG_FILE_NAME: &str = "shelfscan.toml";

/// Complete configuration loaded from TOML
///
/// Every section and field has a built-in default, so an empty file (or no
/// file at all) yields a working configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Search backend settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Spine extraction settings
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Identification engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the Elasticsearch-compatible backend
    #[serde(default = "default_search_url")]
    pub url: String,

    /// Index holding the book catalogue
    #[serde(default = "default_search_index")]
    pub index: String,

    /// Edit distance tolerance for fuzzy clauses
    #[serde(default = "default_fuzziness")]
    pub fuzziness: u8,

    /// Result cap for joint author+title queries
    #[serde(default = "default_joint_size")]
    pub joint_size: usize,

    /// Result cap for single-field (boosted) queries
    #[serde(default = "default_single_field_size")]
    pub single_field_size: usize,

    /// Per-query timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of backend requests in flight at once
    #[serde(default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: usize,
}

/// Spine extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Fragments whose extent times this ratio is below the mean extent are pruned
    #[serde(default = "default_prune_ratio")]
    pub prune_ratio: u32,
}

/// Identification engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Word-mangled healing is skipped when a window holds more words than this
    #[serde(default = "default_mangle_word_limit")]
    pub mangle_word_limit: usize,

    /// Largest window of adjacent spines tried by adjacent/permuted healing
    #[serde(default = "default_max_heal_window")]
    pub max_heal_window: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_search_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_search_index() -> String {
    "booktastic".to_string()
}

fn default_fuzziness() -> u8 {
    2
}

fn default_joint_size() -> usize {
    5
}

fn default_single_field_size() -> usize {
    100
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_concurrent_queries() -> usize {
    16
}

fn default_prune_ratio() -> u32 {
    4
}

fn default_mangle_word_limit() -> usize {
    4
}

fn default_max_heal_window() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_search_url(),
            index: default_search_index(),
            fuzziness: default_fuzziness(),
            joint_size: default_joint_size(),
            single_field_size: default_single_field_size(),
            timeout_ms: default_timeout_ms(),
            max_concurrent_queries: default_max_concurrent_queries(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            prune_ratio: default_prune_ratio(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mangle_word_limit: default_mangle_word_limit(),
            max_heal_window: default_max_heal_window(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Apply `SHELFSCAN_SEARCH_URL` / `SHELFSCAN_SEARCH_INDEX` on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(SEARCH_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                debug!(url = %url, "Search URL overridden from environment");
                self.search.url = url;
            }
        }

        if let Ok(index) = std::env::var(SEARCH_INDEX_ENV_VAR) {
            if !index.trim().is_empty() {
                debug!(index = %index, "Search index overridden from environment");
                self.search.index = index;
            }
        }
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.search.url.trim().is_empty() {
            return Err(Error::Config("search.url must not be empty".to_string()));
        }
        if self.search.index.trim().is_empty() {
            return Err(Error::Config("search.index must not be empty".to_string()));
        }
        if self.search.max_concurrent_queries == 0 {
            return Err(Error::Config(
                "search.max_concurrent_queries must be at least 1".to_string(),
            ));
        }
        if self.search.joint_size == 0 || self.search.single_field_size == 0 {
            return Err(Error::Config("search result sizes must be at least 1".to_string()));
        }
        if self.extract.prune_ratio == 0 {
            return Err(Error::Config("extract.prune_ratio must be at least 1".to_string()));
        }
        if self.engine.max_heal_window < 2 {
            return Err(Error::Config("engine.max_heal_window must be at least 2".to_string()));
        }
        Ok(())
    }
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Locate the config file to load
///
/// Returns `None` when nothing was requested and no default file exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform default, only if present
    default_config_path().filter(|p| p.exists())
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Resolve, load, override from environment and validate
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let mut config = match resolve_config_path(cli_arg) {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            load_toml_config(&path)?
        }
        None => {
            debug!("No configuration file found, using built-in defaults");
            TomlConfig::default()
        }
    };

    config.apply_env_overrides();
    config.validate()?;

    Ok(config)
}
