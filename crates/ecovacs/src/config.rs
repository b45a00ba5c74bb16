//! CLI configuration: thin wrapper around `ecovacs_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --api-key, --issued-at, --timeout).

use secrecy::SecretString;

use ecovacs_core::AccountConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use ecovacs_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Build an `AccountConfig` from the config file, profile, and CLI overrides.
///
/// Without a matching profile, `--api-key` and `--issued-at` alone are enough.
pub fn resolve_account_config(global: &GlobalOpts) -> Result<AccountConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.api_key.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // Flag > env > profile
    if let Some(ref url) = global.api_url {
        profile.api_url = Some(url.clone());
    }
    if let Some(issued_at) = global.issued_at {
        profile.issued_at = Some(issued_at);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let key = match global.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => ecovacs_config::resolve_api_key(&profile, &profile_name)?,
    };
    let credential = ecovacs_config::credential_with_key(&profile, key)?;

    Ok(ecovacs_config::account_config(
        &profile,
        &cfg.defaults,
        credential,
    )?)
}
