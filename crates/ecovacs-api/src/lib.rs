// ecovacs-api: Async Rust client for the Ecovacs domestic open cloud API
//
// Wire-level only: request construction, `{code, msg, data}` envelope
// unwrapping, and the vendor's control-command vocabulary. Domain types and
// the error taxonomy callers act on live in `ecovacs-core`.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
mod redact;
pub mod robot;
pub mod transport;

pub use auth::{CREDENTIAL_LIFETIME_DAYS, Credential};
pub use client::EcovacsClient;
pub use error::Error;
pub use models::{CtlPayload, DeviceEntry, DeviceRecord};
pub use robot::{ChargeAction, CleanAction};
pub use transport::TransportConfig;
