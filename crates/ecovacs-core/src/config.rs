// ── Runtime account configuration ──
//
// Describes *how* to talk to the cloud for one account. Carries the
// credential and tuning knobs but never touches disk; `ecovacs-config`
// (or any other host) builds an `AccountConfig` and hands it in.

use std::collections::HashMap;
use std::time::Duration;

use ecovacs_api::Credential;
use url::Url;

use crate::model::Capabilities;

/// Domestic (Mainland China) open platform endpoint.
pub const DEFAULT_API_URL: &str = "https://open.ecovacs.cn";
pub const DEFAULT_TIMEOUT: Duration = ecovacs_api::transport::DEFAULT_TIMEOUT;
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(15);
/// Start warning this many days before the key expires.
pub const DEFAULT_EXPIRY_WARNING_DAYS: i64 = 14;

/// Per-model capability overrides. Models not listed support every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityTable {
    overrides: HashMap<String, Capabilities>,
}

impl CapabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, model: impl Into<String>, caps: Capabilities) -> Self {
        self.overrides.insert(model.into(), caps);
        self
    }

    pub fn lookup(&self, model: &str) -> Capabilities {
        self.overrides.get(model).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl FromIterator<(String, Capabilities)> for CapabilityTable {
    fn from_iter<I: IntoIterator<Item = (String, Capabilities)>>(iter: I) -> Self {
        Self {
            overrides: iter.into_iter().collect(),
        }
    }
}

/// Configuration for one Ecovacs account.
///
/// Passed explicitly to [`CloudClient`](crate::CloudClient) and
/// [`Coordinator`](crate::Coordinator) so several accounts can run side by
/// side in one process.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub api_url: Url,
    pub credential: Credential,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Polling interval for the coordinator.
    pub scan_interval: Duration,
    pub expiry_warning_days: i64,
    /// Trace redacted request/response bodies at debug level.
    pub log_http: bool,
    pub capabilities: CapabilityTable,
}

impl AccountConfig {
    /// Defaults from the original integration for everything but the
    /// endpoint and credential.
    pub fn new(api_url: Url, credential: Credential) -> Self {
        Self {
            api_url,
            credential,
            timeout: DEFAULT_TIMEOUT,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
            log_http: false,
            capabilities: CapabilityTable::default(),
        }
    }

    /// `true` once the credential is inside the warning window (or expired).
    pub fn credential_expiring(&self) -> bool {
        self.credential.remaining_days() <= self.expiry_warning_days
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{TimeDelta, Utc};
    use secrecy::SecretString;

    use super::*;

    fn config_issued_days_ago(days: i64) -> AccountConfig {
        let cred = Credential::new(
            SecretString::from("ak".to_string()),
            Utc::now() - TimeDelta::days(days),
        );
        AccountConfig::new(Url::parse(DEFAULT_API_URL).unwrap(), cred)
    }

    #[test]
    fn unknown_models_support_everything() {
        let table = CapabilityTable::new().with_override(
            "DEEBOT MINI",
            Capabilities {
                clean: true,
                charge: false,
            },
        );
        assert!(!table.lookup("DEEBOT MINI").charge);
        assert_eq!(table.lookup("DEEBOT T8"), Capabilities::default());
    }

    #[test]
    fn expiry_warning_window() {
        assert!(!config_issued_days_ago(1).credential_expiring());
        assert!(config_issued_days_ago(80).credential_expiring());
        assert!(config_issued_days_ago(200).credential_expiring());
    }
}
