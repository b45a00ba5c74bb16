use thiserror::Error;

/// Top-level error type for the `ecovacs-api` crate.
///
/// Mirrors what can go wrong on the wire. `ecovacs-core` folds these into
/// the auth / transport / command taxonomy that callers act on.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The endpoint refused the key at the HTTP layer (401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    ///
    /// Never carries the request URL: GET calls put `ak` in the query string.
    #[error("HTTP transport error: {0}")]
    Transport(reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success HTTP status other than 401/403.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── Vendor ──────────────────────────────────────────────────────
    /// The `{code, msg}` envelope reported a business failure (HTTP 200).
    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    /// The robot answered a control request with something other than `ret: "ok"`.
    #[error("Control request rejected by device (ret={ret:?})")]
    ControlRejected { ret: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

impl Error {
    /// Returns `true` if the request hit the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` for network-level failures a caller may retry later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The vendor's business error code, if this is a business failure.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            Self::ControlRejected { ret } => Some(ret),
            _ => None,
        }
    }
}
