//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.clospots/config.json`) and environment.
//! Secrets (channel access token, channel secret, places API key) are normally supplied
//! through the environment; the file only needs to exist when overriding defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_CHANNEL_ACCESS_TOKEN: &str = "LINE_CHANNEL_ACCESS_TOKEN";
pub const ENV_CHANNEL_SECRET: &str = "LINE_CHANNEL_SECRET_KEY";
pub const ENV_PLACES_API_KEY: &str = "GOOGLE_PLACES_API_KEY";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LINE Messaging API settings.
    #[serde(default)]
    pub line: LineConfig,

    /// Places search settings.
    #[serde(default)]
    pub places: PlacesConfig,

    /// Reply composition settings.
    #[serde(default)]
    pub reply: ReplyConfig,
}

/// Server bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for the webhook endpoint (default 8000).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    8000
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// LINE channel config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Channel access token. Overridden by LINE_CHANNEL_ACCESS_TOKEN env when set.
    #[serde(default)]
    pub channel_access_token: Option<String>,
    /// Channel secret used to verify X-Line-Signature. Overridden by LINE_CHANNEL_SECRET_KEY env when set.
    #[serde(default)]
    pub channel_secret: Option<String>,
    /// Messaging API root (default "https://api.line.me").
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
    /// Request timeout for the reply API. Unset means the HTTP client default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            channel_secret: None,
            api_base: default_line_api_base(),
            timeout_secs: None,
        }
    }
}

/// What the bot tells the user when the places lookup fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupFailurePolicy {
    /// Treat the failure as zero results; the user gets the "not found" message.
    #[default]
    Empty,

    /// Tell the user the search failed, distinct from "not found".
    Report,
}

/// Google Places Nearby Search config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacesConfig {
    /// API key. Overridden by GOOGLE_PLACES_API_KEY env when set.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Places API root; `/nearbysearch/json` is appended.
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
    /// Search radius in meters (default 2000).
    #[serde(default = "default_places_radius")]
    pub radius: u32,
    /// Response language (default "ja").
    #[serde(default = "default_places_language")]
    pub language: String,
    /// Place type filter (default "cafe").
    #[serde(default = "default_places_type")]
    pub place_type: String,
    /// Request timeout. Unset means the HTTP client default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub on_failure: LookupFailurePolicy,
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

fn default_places_radius() -> u32 {
    2000
}

fn default_places_language() -> String {
    "ja".to_string()
}

fn default_places_type() -> String {
    "cafe".to_string()
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_places_base_url(),
            radius: default_places_radius(),
            language: default_places_language(),
            place_type: default_places_type(),
            timeout_secs: None,
            on_failure: LookupFailurePolicy::default(),
        }
    }
}

/// Carousel composition config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyConfig {
    /// Maximum carousel columns (LINE allows at most 10).
    #[serde(default = "default_max_columns")]
    pub max_columns: usize,
}

fn default_max_columns() -> usize {
    crate::reply::MAX_CAROUSEL_COLUMNS
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            max_columns: default_max_columns(),
        }
    }
}

/// Secrets the server cannot start without.
#[derive(Clone)]
pub struct Credentials {
    pub channel_access_token: String,
    pub channel_secret: String,
    pub places_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

impl Credentials {
    /// Resolve credentials from the process environment, falling back to the config file.
    pub fn resolve(config: &Config) -> Result<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve credentials using `lookup` for environment values. Fails listing every missing name.
    pub fn resolve_with<F>(config: &Config, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = env_or_config(&lookup, ENV_CHANNEL_ACCESS_TOKEN, &config.line.channel_access_token);
        let secret = env_or_config(&lookup, ENV_CHANNEL_SECRET, &config.line.channel_secret);
        let api_key = env_or_config(&lookup, ENV_PLACES_API_KEY, &config.places.api_key);

        match (token, secret, api_key) {
            (Some(channel_access_token), Some(channel_secret), Some(places_api_key)) => Ok(Self {
                channel_access_token,
                channel_secret,
                places_api_key,
            }),
            (token, secret, api_key) => {
                let missing: Vec<&str> = [
                    (token.is_none(), ENV_CHANNEL_ACCESS_TOKEN),
                    (secret.is_none(), ENV_CHANNEL_SECRET),
                    (api_key.is_none(), ENV_PLACES_API_KEY),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();
                anyhow::bail!("missing required settings: {}", missing.join(", "))
            }
        }
    }
}

/// Env value wins over the config value; blank values count as unset.
fn env_or_config<F>(lookup: &F, name: &str, configured: &Option<String>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            configured
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CLOSPOTS_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".clospots").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path (or the default). Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}
