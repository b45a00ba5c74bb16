// ── Cloud client ──
//
// Authentication handshake, device discovery, and command dispatch against
// the Ecovacs open platform. Holds no credential of its own: every call is
// authorized by the `Session` the caller passes in.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ecovacs_api::{CtlPayload, Credential, DeviceEntry, EcovacsClient, TransportConfig};
use futures_util::{Stream, TryStreamExt};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::config::{AccountConfig, CapabilityTable};
use crate::convert::{self, WireAction};
use crate::error::{AuthError, CommandError, Error};
use crate::model::{Ack, Command, Device, DeviceId, DeviceInfo};

// ── Session ──────────────────────────────────────────────────────

/// A credential that passed the authentication handshake.
///
/// The vendor issues no token, so the session is the validated key plus
/// the time it was accepted. It stops authorizing calls the moment the
/// key's 90-day window closes.
#[derive(Debug, Clone)]
pub struct Session {
    credential: Credential,
    established_at: DateTime<Utc>,
}

impl Session {
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }

    pub fn is_valid(&self) -> bool {
        self.credential.is_valid()
    }

    /// Fail with [`AuthError::Expired`] once the underlying key has aged out.
    pub fn ensure_valid(&self) -> Result<(), Error> {
        if self.credential.is_valid() {
            Ok(())
        } else {
            Err(expired(&self.credential))
        }
    }

    fn key(&self) -> &SecretString {
        self.credential.key()
    }
}

fn expired(credential: &Credential) -> Error {
    AuthError::Expired {
        expired_at: credential.expires_at(),
    }
    .into()
}

// ── CloudClient ──────────────────────────────────────────────────

/// Stateless-per-call client for one account's robots.
///
/// The only state kept between calls is the model of each device seen in
/// the latest device list, used to gate commands by capability.
#[derive(Debug)]
pub struct CloudClient {
    api: EcovacsClient,
    capabilities: CapabilityTable,
    models: DashMap<DeviceId, String>,
}

impl CloudClient {
    pub fn new(config: &AccountConfig) -> Result<Self, Error> {
        let transport = TransportConfig::default()
            .with_timeout(config.timeout)
            .with_http_logging(config.log_http);
        let api = EcovacsClient::new(config.api_url.as_str(), &transport)?;
        Ok(Self::with_api(api, config.capabilities.clone()))
    }

    /// Wrap an existing wire client (custom `reqwest::Client`, test server).
    pub fn with_api(api: EcovacsClient, capabilities: CapabilityTable) -> Self {
        Self {
            api,
            capabilities,
            models: DashMap::new(),
        }
    }

    pub fn api(&self) -> &EcovacsClient {
        &self.api
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// Model of a device from the most recent device list, if seen.
    pub fn model_of(&self, id: &DeviceId) -> Option<String> {
        self.models.get(id).map(|m| m.value().clone())
    }

    // ── Authentication ───────────────────────────────────────────

    /// Validate a credential and open a session.
    ///
    /// An expired key fails with [`AuthError::Expired`] before anything is
    /// sent. Otherwise the key is probed with a device-list request; any
    /// refusal from the vendor is [`AuthError::Rejected`].
    pub async fn authenticate(&self, credential: &Credential) -> Result<Session, Error> {
        if !credential.is_valid() {
            warn!(expired_at = %credential.expires_at(), "API key expired");
            return Err(expired(credential));
        }

        let entries = self
            .api
            .device_list(credential.key())
            .await
            .map_err(Error::from_handshake)?;
        let devices = self.learn(entries);
        info!(
            devices = devices.len(),
            remaining_days = credential.remaining_days(),
            "authenticated with Ecovacs cloud"
        );

        Ok(Session {
            credential: credential.clone(),
            established_at: Utc::now(),
        })
    }

    // ── Discovery ────────────────────────────────────────────────

    /// Every bound robot with its current status.
    ///
    /// Lazy: nothing is requested until the stream is polled, and each
    /// poll-to-completion is one full refresh (device list, then clean and
    /// charge state per robot). Drop and call again to restart.
    pub fn list_devices<'a>(
        &'a self,
        session: &'a Session,
    ) -> impl Stream<Item = Result<Device, Error>> + Send + 'a {
        async_stream::try_stream! {
            session.ensure_valid()?;
            let entries = self.api.device_list(session.key()).await.map_err(Error::from)?;
            for (info, battery) in self.learn(entries) {
                let device = self.poll_device(session.key(), info, battery).await?;
                yield device;
            }
        }
    }

    /// [`list_devices`](Self::list_devices), collected.
    pub async fn fetch_devices(&self, session: &Session) -> Result<Vec<Device>, Error> {
        self.list_devices(session).try_collect().await
    }

    /// Current status of one robot.
    pub async fn device(&self, session: &Session, id: &DeviceId) -> Result<Device, Error> {
        session.ensure_valid()?;
        let entries = self.api.device_list(session.key()).await?;
        let (info, battery) = self
            .learn(entries)
            .into_iter()
            .find(|(info, _)| &info.id == id)
            .ok_or_else(|| Error::DeviceNotFound { id: id.to_string() })?;
        self.poll_device(session.key(), info, battery).await
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Dispatch a control command.
    ///
    /// A command the device's model does not support fails with
    /// [`CommandError::Unsupported`] without touching the network. Devices
    /// not yet seen in a device list are dispatched unchecked.
    pub async fn send_command(
        &self,
        session: &Session,
        device_id: &DeviceId,
        command: Command,
    ) -> Result<Ack, Error> {
        session.ensure_valid()?;

        if let Some(model) = self.model_of(device_id) {
            if !self.capabilities.lookup(&model).supports(command) {
                debug!(device = %device_id, %command, %model, "command not supported");
                return Err(CommandError::Unsupported { command, model }.into());
            }
        }

        let nick = device_id.as_str();
        let result = match convert::wire_action(command) {
            WireAction::Clean(action) => self.api.set_cleaning(session.key(), nick, action).await,
            WireAction::Charge(action) => {
                self.api.set_charging(session.key(), nick, action).await
            }
        };
        result.map_err(Error::from_command)?;

        info!(device = %device_id, %command, "command acknowledged");
        Ok(Ack {
            device_id: device_id.clone(),
            command,
            acknowledged_at: Utc::now(),
        })
    }

    // ── Internals ────────────────────────────────────────────────

    /// Convert list entries and replace the model registry with them.
    fn learn(&self, entries: Vec<DeviceEntry>) -> Vec<(DeviceInfo, Option<u8>)> {
        let devices: Vec<_> = entries.into_iter().map(convert::device_info).collect();
        self.models
            .retain(|id, _| devices.iter().any(|(info, _)| &info.id == id));
        for (info, _) in &devices {
            self.models.insert(info.id.clone(), info.model.clone());
        }
        devices
    }

    async fn poll_device(
        &self,
        ak: &SecretString,
        info: DeviceInfo,
        battery: Option<u8>,
    ) -> Result<Device, Error> {
        let nick = info.id.as_str();
        let (clean, charge) = tokio::join!(
            self.api.clean_state(ak, nick),
            self.api.charge_state(ak, nick)
        );
        let clean = state_reading(&info.id, "clean", clean)?;
        let charge = state_reading(&info.id, "charge", charge)?;
        Ok(convert::device_from_states(
            info,
            battery,
            clean.as_ref(),
            charge.as_ref(),
        ))
    }
}

/// A robot refusing a state query (offline, asleep) is a reading, not a
/// failure of the whole refresh.
fn state_reading(
    id: &DeviceId,
    query: &'static str,
    result: Result<CtlPayload, ecovacs_api::Error>,
) -> Result<Option<CtlPayload>, Error> {
    match result {
        Ok(payload) => Ok(Some(payload)),
        Err(e @ (ecovacs_api::Error::Api { .. } | ecovacs_api::Error::ControlRejected { .. })) => {
            warn!(device = %id, query, error = %e, "state query refused");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
