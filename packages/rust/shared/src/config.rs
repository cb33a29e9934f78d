//! Application configuration for ProfileScout.
//!
//! User config lives at `~/.profilescout/profilescout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "profilescout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".profilescout";

/// Reply channel that is always part of the known-channel set, on top of the
/// configured lookup channel. The resolver bot mirrors replies here.
pub const BUILTIN_REPLY_CHANNEL: &str = "1135707897964265620";

// ---------------------------------------------------------------------------
// Config structs (matching profilescout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gateway transport settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Command channel and resolver bot.
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Notification sinks.
    #[serde(default)]
    pub webhooks: WebhookConfig,

    /// Subject list source.
    #[serde(default)]
    pub subjects: SubjectsConfig,

    /// Profile page scraping.
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Fixed pipeline delays.
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Routing decision thresholds.
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// `[gateway]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the chat gateway.
    #[serde(default = "default_gateway_url")]
    pub url: String,

    /// Name of the env var holding the gateway token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Interval between inbound-feed polls, in ms.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            token_env: default_token_env(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_gateway_url() -> String {
    "https://gateway.example.com".into()
}
fn default_token_env() -> String {
    "PROFILESCOUT_TOKEN".into()
}
fn default_poll_interval() -> u64 {
    1000
}

/// `[channels]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// Channel the lookup command is issued on.
    #[serde(default)]
    pub lookup_channel: String,

    /// Identifier of the external resolver bot whose replies we correlate.
    #[serde(default)]
    pub bot_id: String,
}

impl ChannelsConfig {
    /// The full set of channels eligible for correlation: the configured
    /// lookup channel plus the built-in reply channel.
    pub fn known_channels(&self) -> Vec<String> {
        vec![self.lookup_channel.clone(), BUILTIN_REPLY_CHANNEL.to_string()]
    }
}

/// `[webhooks]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Sink for high-value hits.
    #[serde(default)]
    pub standard_url: String,

    /// Sink for private-inventory hits.
    #[serde(default)]
    pub private_inventory_url: String,
}

/// `[subjects]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectsConfig {
    /// Inline subject list. Takes precedence over `file` when non-empty.
    #[serde(default)]
    pub list: Vec<String>,

    /// Fallback file with one subject per line (`#` comments, blanks skipped).
    #[serde(default = "default_subjects_file")]
    pub file: String,
}

fn default_subjects_file() -> String {
    "subjects.txt".into()
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Base URL of the profile site; profiles live at `<base>/player/<id>`.
    #[serde(default = "default_profile_base")]
    pub profile_base_url: String,

    /// Settle delay after navigation, in ms, for dynamic content to render.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            profile_base_url: default_profile_base(),
            settle_ms: default_settle_ms(),
        }
    }
}

fn default_profile_base() -> String {
    "https://www.rolimons.com".into()
}
fn default_settle_ms() -> u64 {
    3000
}

/// `[pacing]` section — fixed delays, deliberately not tunable per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Delay between lookup dispatches, in ms.
    #[serde(default = "default_inter_request_ms")]
    pub inter_request_ms: u64,

    /// Delay before advancing past a failed dispatch, in ms.
    #[serde(default = "default_failure_advance_ms")]
    pub failure_advance_ms: u64,

    /// Delay between login and the first dispatch, in ms.
    #[serde(default = "default_startup_ms")]
    pub startup_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            inter_request_ms: default_inter_request_ms(),
            failure_advance_ms: default_failure_advance_ms(),
            startup_ms: default_startup_ms(),
        }
    }
}

fn default_inter_request_ms() -> u64 {
    5000
}
fn default_failure_advance_ms() -> u64 {
    2000
}
fn default_startup_ms() -> u64 {
    2000
}

/// `[routing]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Minimum appraised value (inclusive) for the high-value sink.
    #[serde(default = "default_value_threshold")]
    pub value_threshold: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            value_threshold: default_value_threshold(),
        }
    }
}

fn default_value_threshold() -> u64 {
    100_000
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.profilescout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.profilescout/profilescout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ScoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the gateway token from the configured env var. Missing or empty is fatal.
pub fn gateway_token(config: &AppConfig) -> Result<String> {
    let var_name = &config.gateway.token_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(ScoutError::config(format!(
            "gateway token not found. Set the {var_name} environment variable."
        ))),
    }
}
