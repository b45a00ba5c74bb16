//! Shared configuration for Ecovacs tools.
//!
//! TOML profiles, API key resolution (env + keyring + plaintext), and
//! translation to `ecovacs_core::AccountConfig`. The CLI layers its global
//! flags on top of this.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ecovacs_core::config::{DEFAULT_API_URL, DEFAULT_EXPIRY_WARNING_DAYS};
use ecovacs_core::{AccountConfig, Capabilities, CapabilityTable, Credential};

/// Keyring service name under which API keys are stored.
pub const KEYRING_SERVICE: &str = "ecovacs-cn";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    ProfileNotFound { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Polling interval in seconds.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    #[serde(default = "default_expiry_warning_days")]
    pub expiry_warning_days: i64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            scan_interval: default_scan_interval(),
            expiry_warning_days: default_expiry_warning_days(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    ecovacs_core::config::DEFAULT_TIMEOUT.as_secs()
}
fn default_scan_interval() -> u64 {
    ecovacs_core::config::DEFAULT_SCAN_INTERVAL.as_secs()
}
fn default_expiry_warning_days() -> i64 {
    DEFAULT_EXPIRY_WARNING_DAYS
}

/// A named account profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Open platform base URL. Defaults to the domestic endpoint.
    pub api_url: Option<String>,

    /// API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// When the API key was issued on the open platform.
    pub issued_at: Option<DateTime<Utc>>,

    pub timeout: Option<u64>,
    pub scan_interval: Option<u64>,
    pub expiry_warning_days: Option<i64>,

    /// Log redacted HTTP traffic at debug level.
    #[serde(default)]
    pub log_http: bool,

    /// Per-model capability overrides, keyed by model name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub models: HashMap<String, Capabilities>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("cn", "ecovacs", "ecovacs").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ecovacs");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layered as defaults → file → `ECOVACS_*` env.
///
/// Nested keys use a double underscore, e.g.
/// `ECOVACS_PROFILES__HOME__TIMEOUT=20`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ECOVACS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key"))
}

/// Store an API key in the system keyring for `profile_name`.
pub fn store_api_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(key)?;
    Ok(())
}

/// Resolve an API key from the credential chain (no CLI flag step).
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Pair a key with the profile's recorded issue time.
pub fn credential_with_key(profile: &Profile, key: SecretString) -> Result<Credential, ConfigError> {
    let issued_at = profile.issued_at.ok_or_else(|| ConfigError::Validation {
        field: "issued_at".into(),
        reason: "not recorded; run `ecovacs config set-key` or pass --issued-at".into(),
    })?;
    Ok(Credential::new(key, issued_at))
}

/// Resolve the profile's full credential (key + issue time).
pub fn resolve_credential(profile: &Profile, profile_name: &str) -> Result<Credential, ConfigError> {
    let key = resolve_api_key(profile, profile_name)?;
    credential_with_key(profile, key)
}

/// Build an `AccountConfig` from a profile and a resolved credential.
pub fn account_config(
    profile: &Profile,
    defaults: &Defaults,
    credential: Credential,
) -> Result<AccountConfig, ConfigError> {
    let raw_url = profile.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
    let api_url: url::Url = raw_url.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw_url}"),
    })?;

    let scan_interval = profile.scan_interval.unwrap_or(defaults.scan_interval);
    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    for (field, secs) in [("scan_interval", scan_interval), ("timeout", timeout)] {
        if secs == 0 {
            return Err(ConfigError::Validation {
                field: field.into(),
                reason: "must be at least 1 second".into(),
            });
        }
    }

    let mut config = AccountConfig::new(api_url, credential);
    config.timeout = Duration::from_secs(timeout);
    config.scan_interval = Duration::from_secs(scan_interval);
    config.expiry_warning_days = profile
        .expiry_warning_days
        .unwrap_or(defaults.expiry_warning_days);
    config.log_http = profile.log_http;
    config.capabilities = profile
        .models
        .iter()
        .map(|(model, caps)| (model.clone(), *caps))
        .collect::<CapabilityTable>();
    Ok(config)
}

/// Build an `AccountConfig` from a profile, no CLI flag overrides.
///
/// Suitable for non-CLI hosts that only have the config file.
pub fn profile_to_account_config(
    cfg: &Config,
    profile_name: &str,
) -> Result<AccountConfig, ConfigError> {
    let profile = cfg
        .profiles
        .get(profile_name)
        .ok_or_else(|| ConfigError::ProfileNotFound {
            profile: profile_name.into(),
        })?;
    let credential = resolve_credential(profile, profile_name)?;
    account_config(profile, &cfg.defaults, credential)
}
