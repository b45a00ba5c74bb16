use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;

/// How long an API key stays usable after the vendor portal issues it.
pub const CREDENTIAL_LIFETIME_DAYS: i64 = 90;

/// An API key ("AK") issued by the Ecovacs open platform.
///
/// The vendor offers no refresh flow: once the key ages past
/// [`CREDENTIAL_LIFETIME_DAYS`] the user has to issue a new one on the
/// portal. This type only answers validity questions and never touches the
/// network. It is immutable; reconfiguration replaces it wholesale.
#[derive(Debug, Clone)]
pub struct Credential {
    key: SecretString,
    issued_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(key: SecretString, issued_at: DateTime<Utc>) -> Self {
        Self { key, issued_at }
    }

    /// A key pasted in just now.
    pub fn issued_now(key: SecretString) -> Self {
        Self::new(key, Utc::now())
    }

    /// The secret key material. Callers must never log it.
    pub fn key(&self) -> &SecretString {
        &self.key
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + TimeDelta::days(CREDENTIAL_LIFETIME_DAYS)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// `true` iff `now` is strictly before the expiry instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }

    /// Whole days left before expiry, for user-facing warnings.
    pub fn remaining_days(&self) -> i64 {
        self.remaining_days_at(Utc::now())
    }

    /// Whole days left at `now`; `0` once the key has expired.
    pub fn remaining_days_at(&self, now: DateTime<Utc>) -> i64 {
        if self.is_valid_at(now) {
            (self.expires_at() - now).num_days()
        } else {
            0
        }
    }
}
