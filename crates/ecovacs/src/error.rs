//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable
//! help text and stable exit codes.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use thiserror::Error;

use ecovacs_config::ConfigError;
use ecovacs_core::{AuthError, CommandError, TransportError};

/// Process exit codes. Success is 0.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const REJECTED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the Ecovacs cloud")]
    #[diagnostic(
        code(ecovacs::connection_failed),
        help(
            "Check your network connection and the API URL.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(ecovacs::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("API key expired at {expired_at}")]
    #[diagnostic(
        code(ecovacs::key_expired),
        help(
            "Keys from the Ecovacs open platform are valid for 90 days.\n\
             Issue a new key on the platform, then run: ecovacs config set-key"
        )
    )]
    KeyExpired { expired_at: DateTime<Utc> },

    #[error("API key rejected: {message}")]
    #[diagnostic(
        code(ecovacs::auth_failed),
        help(
            "Verify the key on the Ecovacs open platform.\n\
             Run: ecovacs config set-key"
        )
    )]
    AuthFailed { message: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(ecovacs::no_credentials),
        help(
            "Configure a key with: ecovacs config init\n\
             Or set the ECOVACS_API_KEY and ECOVACS_ISSUED_AT environment variables."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(ecovacs::not_found),
        help("Run: ecovacs {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Commands ─────────────────────────────────────────────────────

    #[error("'{command}' is not supported by model {model}")]
    #[diagnostic(
        code(ecovacs::unsupported),
        help("Capability overrides live under [profiles.<name>.models] in the config file.")
    )]
    Unsupported { command: String, model: String },

    #[error("Command rejected by the robot ({code}): {message}")]
    #[diagnostic(code(ecovacs::rejected))]
    Rejected { code: String, message: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(ecovacs::api_error))]
    ApiError { code: String, message: String },

    #[error("Unexpected response from the Ecovacs cloud: {message}")]
    #[diagnostic(code(ecovacs::invalid_response))]
    InvalidResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ecovacs::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ecovacs::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ecovacs config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(ecovacs::no_config),
        help(
            "Create one with: ecovacs config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(ecovacs::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::KeyExpired { .. } | Self::AuthFailed { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } | Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Core / config → CliError mapping ─────────────────────────────────

impl From<ecovacs_core::Error> for CliError {
    fn from(err: ecovacs_core::Error) -> Self {
        use ecovacs_core::Error as CoreError;

        match err {
            CoreError::Auth(AuthError::Expired { expired_at }) => Self::KeyExpired { expired_at },
            CoreError::Auth(AuthError::Rejected { message }) => Self::AuthFailed { message },

            CoreError::Transport(t) | CoreError::Command(CommandError::Transport(t)) => {
                transport(t)
            }

            CoreError::Command(CommandError::Unsupported { command, model }) => {
                Self::Unsupported {
                    command: command.to_string(),
                    model,
                }
            }
            CoreError::Command(CommandError::Rejected { code, message }) => {
                Self::Rejected { code, message }
            }

            CoreError::Api { code, message } => Self::ApiError { code, message },
            CoreError::InvalidResponse { message } => Self::InvalidResponse { message },
            CoreError::DeviceNotFound { id } => Self::NotFound {
                resource_type: "device".into(),
                identifier: id,
                list_command: "devices list".into(),
            },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

fn transport(err: TransportError) -> CliError {
    match err {
        TransportError::Timeout => CliError::Timeout,
        TransportError::Unreachable { reason } => CliError::ConnectionFailed { reason },
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
