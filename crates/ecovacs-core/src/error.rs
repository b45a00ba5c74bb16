// ── Core error types ──
//
// The taxonomy hosts act on: authentication, transport, and command
// failures. Wire-level `ecovacs_api::Error`s are folded in here; consumers
// never match on HTTP status codes or JSON parse failures directly.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::Command;

/// The API key cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Past the 90-day window. Only issuing a new key on the open platform fixes this.
    #[error("API key expired at {expired_at}; issue a new key on the Ecovacs open platform")]
    Expired { expired_at: DateTime<Utc> },

    #[error("API key rejected by the Ecovacs cloud: {message}")]
    Rejected { message: String },
}

/// The cloud endpoint could not be reached in time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request to the Ecovacs cloud timed out")]
    Timeout,

    #[error("Ecovacs cloud unreachable: {reason}")]
    Unreachable { reason: String },
}

/// A control action did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{command} is not supported by model {model}")]
    Unsupported { command: Command, model: String },

    /// Business-logic refusal (e.g. `ALREADY_DOCKED`). Terminal for this call.
    #[error("command rejected ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error(transparent)]
    Transport(TransportError),
}

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Command(#[from] CommandError),

    /// Business failure outside a command (e.g. device list refused).
    #[error("Ecovacs API error ({code}): {message}")]
    Api { code: String, message: String },

    #[error("invalid response from the Ecovacs cloud: {message}")]
    InvalidResponse { message: String },

    #[error("device not found: {id}")]
    DeviceNotFound { id: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl Error {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// `true` for failures the host's own retry/backoff may clear.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Command(CommandError::Transport(_))
        )
    }

    /// Map a wire error raised while dispatching a command.
    ///
    /// Business failures become [`CommandError::Rejected`] and network
    /// failures [`CommandError::Transport`]; everything else maps as usual.
    pub fn from_command(err: ecovacs_api::Error) -> Self {
        match err {
            ecovacs_api::Error::Api { code, message } => {
                CommandError::Rejected { code, message }.into()
            }
            ecovacs_api::Error::ControlRejected { ret } => CommandError::Rejected {
                message: format!("robot replied ret={ret:?}"),
                code: ret,
            }
            .into(),
            other => match Self::from(other) {
                Self::Transport(t) => CommandError::Transport(t).into(),
                mapped => mapped,
            },
        }
    }

    /// Map a wire error raised during the authentication handshake, where
    /// any business refusal means the key itself was turned down.
    pub fn from_handshake(err: ecovacs_api::Error) -> Self {
        match err {
            ecovacs_api::Error::Api { code, message } => AuthError::Rejected {
                message: format!("{code}: {message}"),
            }
            .into(),
            other => Self::from(other),
        }
    }
}

// ── Conversion from wire-level errors ───────────────────────────────

impl From<ecovacs_api::Error> for Error {
    fn from(err: ecovacs_api::Error) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout.into();
        }
        match err {
            ecovacs_api::Error::Authentication { message } => AuthError::Rejected { message }.into(),
            ecovacs_api::Error::Transport(e) => TransportError::Unreachable {
                reason: e.to_string(),
            }
            .into(),
            ecovacs_api::Error::Http { status, body } => TransportError::Unreachable {
                reason: format!("HTTP {status}: {body}"),
            }
            .into(),
            ecovacs_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid API URL: {e}"),
            },
            ecovacs_api::Error::Api { code, message } => Self::Api { code, message },
            ecovacs_api::Error::ControlRejected { ret } => Self::Api {
                message: format!("robot replied ret={ret:?}"),
                code: ret,
            },
            ecovacs_api::Error::Deserialization { message, body: _ } => {
                Self::InvalidResponse { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_failure_during_command_is_rejected() {
        let err = Error::from_command(ecovacs_api::Error::Api {
            code: "ALREADY_DOCKED".into(),
            message: "docked".into(),
        });
        assert!(matches!(
            err,
            Error::Command(CommandError::Rejected { ref code, .. }) if code == "ALREADY_DOCKED"
        ));
    }

    #[test]
    fn http_failure_during_command_is_command_transport() {
        let err = Error::from_command(ecovacs_api::Error::Http {
            status: 503,
            body: String::new(),
        });
        assert!(matches!(
            err,
            Error::Command(CommandError::Transport(TransportError::Unreachable { .. }))
        ));
        assert!(err.is_transient());
    }

    #[test]
    fn business_failure_during_handshake_rejects_key() {
        let err = Error::from_handshake(ecovacs_api::Error::Api {
            code: "10001".into(),
            message: "invalid ak".into(),
        });
        assert!(matches!(err, Error::Auth(AuthError::Rejected { .. })));
        assert!(err.is_auth());
    }

    #[test]
    fn malformed_payload_is_invalid_response() {
        let err = Error::from(ecovacs_api::Error::Deserialization {
            message: "missing field `code`".into(),
            body: "{}".into(),
        });
        assert!(matches!(err, Error::InvalidResponse { .. }));
    }
}
