//! Config subcommand handlers.

use chrono::{DateTime, Utc};
use dialoguer::{Input, Select};

use ecovacs_core::Credential;
use ecovacs_core::config::DEFAULT_API_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

const MASK: &str = "****";

/// Copy of `cfg` with plaintext keys masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(MASK.into());
        }
    }
    cfg
}

/// Format config for display. Expects an already redacted config.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "scan_interval = {}", cfg.defaults.scan_interval);
    let _ = writeln!(out, "expiry_warning_days = {}", cfg.defaults.expiry_warning_days);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(ref url) = p.api_url {
            let _ = writeln!(out, "api_url = \"{url}\"");
        }
        if let Some(ref key) = p.api_key {
            let _ = writeln!(out, "api_key = \"{key}\"");
        }
        if let Some(ref env) = p.api_key_env {
            let _ = writeln!(out, "api_key_env = \"{env}\"");
        }
        if let Some(issued_at) = p.issued_at {
            let remaining = Credential::new(String::new().into(), issued_at).remaining_days();
            let _ = writeln!(
                out,
                "issued_at = \"{}\"  # {remaining} day(s) left",
                issued_at.to_rfc3339()
            );
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(interval) = p.scan_interval {
            let _ = writeln!(out, "scan_interval = {interval}");
        }
        if p.log_http {
            let _ = writeln!(out, "log_http = true");
        }
        let mut models: Vec<_> = p.models.iter().collect();
        models.sort_by_key(|(model, _)| model.as_str());
        for (model, caps) in models {
            let _ = writeln!(
                out,
                "models.\"{model}\" = {{ clean = {}, charge = {} }}",
                caps.clean, caps.charge
            );
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_api_key() -> Result<String, CliError> {
    let key = rpassword::prompt_password("API key: ").map_err(prompt_err)?;
    if key.trim().is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }
    Ok(key.trim().to_owned())
}

/// Store the key in the keyring, or return it for plaintext config.
///
/// Returns `Some(key)` when it belongs in the config file.
fn store_key(profile_name: &str, key: String, plaintext: bool) -> Result<Option<String>, CliError> {
    if plaintext {
        return Ok(Some(key));
    }
    ecovacs_config::store_api_key(profile_name, &key).map_err(|e| CliError::Validation {
        field: "keyring".into(),
        reason: format!("failed to store API key in keyring: {e}"),
    })?;
    eprintln!("   ✓ API key stored in system keyring");
    Ok(None)
}

fn report_expiry(issued_at: DateTime<Utc>) {
    let credential = Credential::new(String::new().into(), issued_at);
    eprintln!(
        "  Key valid until {} ({} day(s) left)",
        credential.expires_at().format("%Y-%m-%d %H:%M UTC"),
        credential.remaining_days()
    );
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("✨ Ecovacs CLI configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("API URL")
                .default(DEFAULT_API_URL.into())
                .interact_text()
                .map_err(prompt_err)?;

            let key = prompt_api_key()?;

            let issued_at: DateTime<Utc> = Input::new()
                .with_prompt("Key issued at (RFC 3339)")
                .default(Utc::now())
                .interact_text()
                .map_err(prompt_err)?;

            let storage = Select::new()
                .with_prompt("Where to store the API key?")
                .items(&[
                    "Store in system keyring (recommended)",
                    "Save to config file (plaintext)",
                ])
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            let api_key = store_key(&profile_name, key, storage == 1)?;

            let profile = Profile {
                api_url: (api_url != DEFAULT_API_URL).then_some(api_url),
                api_key,
                issued_at: Some(issued_at),
                ..Profile::default()
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            report_expiry(issued_at);
            eprintln!("\n  Test it: ecovacs devices list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetKey: rotate to a newly issued key ────────────────────
        ConfigCommand::SetKey { plaintext } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let key = match global.api_key {
                Some(ref key) => key.clone(),
                None => prompt_api_key()?,
            };
            let issued_at = global.issued_at.unwrap_or_else(Utc::now);
            let api_key = store_key(&profile_name, key, plaintext)?;

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            profile.api_key = api_key;
            profile.issued_at = Some(issued_at);
            if cfg.profiles.len() == 1 && cfg.default_profile.is_none() {
                cfg.default_profile = Some(profile_name.clone());
            }
            config::save_config(&cfg)?;

            eprintln!("✓ API key updated for profile '{profile_name}'");
            report_expiry(issued_at);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}
