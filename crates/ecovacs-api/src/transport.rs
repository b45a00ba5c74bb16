// Transport configuration for building the reqwest::Client.
//
// The open platform is a single public HTTPS endpoint, so the only knobs
// are the per-request timeout and whether to trace request/response bodies.

use std::time::Duration;

use crate::error::Error;

/// Request timeout used by the original integration.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    /// Emit `[HTTP_REQUEST]` / `[HTTP_RESPONSE]` debug events with
    /// sensitive fields redacted.
    pub log_http: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            log_http: false,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("ecovacs-cn/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Transport)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_http_logging(mut self, enabled: bool) -> Self {
        self.log_http = enabled;
        self
    }
}
