// ── Polling coordinator ──
//
// Owns one account's session and keeps a published snapshot of its robots
// fresh. The vendor offers no push channel, so every update is a poll.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cloud::{CloudClient, Session};
use crate::config::AccountConfig;
use crate::error::Error;
use crate::model::{Ack, Command, Device, DeviceId};

// ── Snapshot ─────────────────────────────────────────────────────

/// The result of the latest poll, as seen by hosts and entities.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub devices: Vec<Device>,
    pub last_update_success: bool,
    pub last_error: Option<Error>,
    pub updated_at: Option<DateTime<Utc>>,
    pub credential_remaining_days: i64,
    /// Refreshes published so far, successful or not.
    ///
    /// `watch` receivers only see the latest value, so readers that fall
    /// behind compare this counter to learn how many polls they missed.
    pub refreshes: u64,
}

impl Snapshot {
    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }
}

// ── Coordinator ──────────────────────────────────────────────────

/// Shared entry point for hosts. Cheaply cloneable.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: AccountConfig,
    cloud: CloudClient,
    session: Mutex<Option<Session>>,
    snapshot: watch::Sender<Snapshot>,
    cancel: CancellationToken,
}

impl Coordinator {
    pub fn new(config: AccountConfig) -> Result<Self, Error> {
        let cloud = CloudClient::new(&config)?;
        Ok(Self::with_cloud(config, cloud))
    }

    pub fn with_cloud(config: AccountConfig, cloud: CloudClient) -> Self {
        let (snapshot, _) = watch::channel(Snapshot {
            credential_remaining_days: config.credential.remaining_days(),
            ..Snapshot::default()
        });
        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                cloud,
                session: Mutex::new(None),
                snapshot,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &AccountConfig {
        &self.inner.config
    }

    pub fn cloud(&self) -> &CloudClient {
        &self.inner.cloud
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.snapshot.borrow().clone()
    }

    // ── Session ──────────────────────────────────────────────────

    /// The cached session, authenticating first if there is none or the
    /// cached one has expired. The lock is held only for this call.
    pub async fn session(&self) -> Result<Session, Error> {
        let mut guard = self.inner.session.lock().await;
        if let Some(session) = guard.as_ref().filter(|s| s.is_valid()) {
            return Ok(session.clone());
        }
        *guard = None;
        let session = self.inner.cloud.authenticate(&self.inner.config.credential).await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    /// Forget the cached session; the next call re-authenticates.
    pub async fn invalidate_session(&self) {
        *self.inner.session.lock().await = None;
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Poll every robot once and publish the result.
    ///
    /// Failures are published too (`last_update_success = false`) and then
    /// returned. Nothing is retried; the next tick is the retry.
    pub async fn refresh(&self) -> Result<(), Error> {
        let remaining_days = self.inner.config.credential.remaining_days();
        if self.inner.config.credential_expiring() {
            warn!(
                remaining_days,
                "Ecovacs API key expires soon; issue a new one on the open platform"
            );
        }

        let result = match self.session().await {
            Ok(session) => self.inner.cloud.fetch_devices(&session).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(devices) => {
                debug!(count = devices.len(), "refresh complete");
                self.inner.snapshot.send_modify(|snap| {
                    snap.devices = devices;
                    snap.last_update_success = true;
                    snap.last_error = None;
                    snap.updated_at = Some(Utc::now());
                    snap.credential_remaining_days = remaining_days;
                    snap.refreshes += 1;
                });
                Ok(())
            }
            Err(e) => {
                if e.is_auth() {
                    self.invalidate_session().await;
                }
                self.inner.snapshot.send_modify(|snap| {
                    snap.last_update_success = false;
                    snap.last_error = Some(e.clone());
                    snap.credential_remaining_days = remaining_days;
                    snap.refreshes += 1;
                });
                Err(e)
            }
        }
    }

    /// Dispatch a command through the cached session.
    pub async fn send_command(&self, device_id: &DeviceId, command: Command) -> Result<Ack, Error> {
        let session = self.session().await?;
        let result = self
            .inner
            .cloud
            .send_command(&session, device_id, command)
            .await;
        if matches!(&result, Err(e) if e.is_auth()) {
            self.invalidate_session().await;
        }
        result
    }

    // ── Background loop ──────────────────────────────────────────

    /// Poll every `interval` (the first poll runs immediately) until
    /// [`shutdown`](Self::shutdown) is called.
    pub fn spawn(&self, interval: Duration) -> JoinHandle<()> {
        let coordinator = self.clone();
        let cancel = self.inner.cancel.clone();
        info!(interval_secs = interval.as_secs(), "starting refresh loop");
        tokio::spawn(refresh_task(coordinator, interval, cancel))
    }

    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }
}

async fn refresh_task(coordinator: Coordinator, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = coordinator.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
    debug!("refresh loop stopped");
}
