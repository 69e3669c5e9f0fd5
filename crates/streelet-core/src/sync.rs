// ── Device sync engine ──
//
// Keeps a DeviceStore in step with the dashboard backend: periodic
// refreshes guarded by a sequence number, power toggles that commit
// locally only after the backend acknowledges them, and deletes followed
// by a full resync.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use streelet_api::{DashboardClient, NewDevice, PowerAction, RawDevice};
use tokio::sync::{Mutex, broadcast};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::convert::devices_from_raw;
use crate::error::CoreError;
use crate::model::{Device, DeviceId, DeviceStatus};
use crate::palette::{ColorAssigner, ColorToken};
use crate::store::{DeviceStore, Snapshot};
use crate::stream::SnapshotStream;

const EVENT_CHANNEL_SIZE: usize = 64;

// ── Public result types ──────────────────────────────────────────────

/// Notifications about sync activity, for UIs that show toasts or logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Refreshed { sequence: u64, devices: usize },
    StaleRefreshDiscarded { sequence: u64 },
    RefreshFailed { message: String },
    PowerChanged { id: DeviceId, status: DeviceStatus, message: String },
    PowerFailed { id: DeviceId, message: String },
    DeviceDeleted { id: DeviceId, message: String },
    DeleteFailed { id: DeviceId, message: String },
    DeviceAdded { id: DeviceId, message: String },
}

/// What a single refresh did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The snapshot was replaced.
    Applied { sequence: u64, devices: usize },
    /// A newer refresh had already landed; this response was dropped.
    Stale { sequence: u64 },
    /// The request failed; the previous snapshot is untouched.
    Failed { message: String },
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// An acknowledged power command.
#[derive(Debug, Clone)]
pub struct PowerChange {
    pub id: DeviceId,
    pub action: PowerAction,
    /// Acknowledgment text from the backend.
    pub message: String,
    /// The updated device, if it was still in the snapshot.
    pub device: Option<Arc<Device>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { message: String },
    /// The confirmation was declined; no request was sent.
    Cancelled,
}

/// Gate asked before a destructive operation.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

// ── DeviceSync ───────────────────────────────────────────────────────

/// Owner of the device snapshot and everything that writes to it.
///
/// Cheaply cloneable via `Arc<SyncInner>`. Dropping the last clone stops
/// polling: the poll task only holds a weak reference.
#[derive(Clone)]
pub struct DeviceSync {
    inner: Arc<SyncInner>,
}

struct SyncInner {
    client: DashboardClient,
    store: Arc<DeviceStore>,
    colors: ColorAssigner,
    next_sequence: AtomicU64,
    event_tx: broadcast::Sender<SyncEvent>,
    poller: Mutex<Option<Poller>>,
}

struct Poller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl DeviceSync {
    /// Build a sync engine for the dashboard described by `config`.
    pub fn new(config: &DashboardConfig) -> Result<Self, CoreError> {
        Ok(Self::with_client(config.client()?, ColorAssigner::default()))
    }

    pub fn with_client(client: DashboardClient, colors: ColorAssigner) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            inner: Arc::new(SyncInner {
                client,
                store: Arc::new(DeviceStore::new()),
                colors,
                next_sequence: AtomicU64::new(0),
                event_tx,
                poller: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &Arc<DeviceStore> {
        &self.inner.store
    }

    pub fn client(&self) -> &DashboardClient {
        &self.inner.client
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.event_tx.subscribe()
    }

    /// The gradient a device with this status and id is drawn with.
    pub fn color_for(&self, status: DeviceStatus, id: &DeviceId) -> ColorToken {
        self.inner.colors.color_for(status, id)
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Fetch `/devices` and replace the snapshot.
    ///
    /// Never fails: on error the previous snapshot stays in place and the
    /// failure is logged, published as [`SyncEvent::RefreshFailed`] and
    /// reported in the outcome.
    pub async fn refresh(&self) -> RefreshOutcome {
        let sequence = self.inner.issue_sequence();
        let result = self.inner.client.list_devices().await;
        self.inner.apply_fetch(sequence, result)
    }

    /// Like [`refresh`](Self::refresh), but hands a failed fetch back as
    /// the error itself, for callers that cannot go on without a list.
    pub async fn try_refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let sequence = self.inner.issue_sequence();
        match self.inner.client.list_devices().await {
            Ok(raw) => {
                self.inner.apply_fetch(sequence, Ok(raw));
                Ok(self.snapshot())
            }
            Err(e) => {
                let err = CoreError::from(e);
                self.inner.record_refresh_failure(sequence, &err);
                Err(err)
            }
        }
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Refresh now and then every `interval` until stopped.
    ///
    /// Ticks do not wait for earlier refreshes; a slow response that
    /// arrives after a newer one is discarded. Calling this while already
    /// polling restarts the timer with the new interval.
    pub async fn start_polling(&self, interval: Duration) -> Result<(), CoreError> {
        if interval.is_zero() {
            return Err(CoreError::validation("poll interval must be greater than zero"));
        }

        let mut poller = self.inner.poller.lock().await;
        if let Some(previous) = poller.take() {
            previous.stop().await;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(
            Arc::downgrade(&self.inner),
            interval,
            cancel.clone(),
        ));
        *poller = Some(Poller { cancel, handle });
        info!(?interval, "device polling started");
        Ok(())
    }

    /// Stop the poll timer and abort poll refreshes still in flight.
    ///
    /// Once this returns no poll response can reach the store.
    pub async fn stop_polling(&self) {
        let poller = self.inner.poller.lock().await.take();
        if let Some(poller) = poller {
            poller.stop().await;
            info!("device polling stopped");
        }
    }

    pub async fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Send the complement of the device's current power state.
    ///
    /// The snapshot changes only after the backend acknowledges with a
    /// `message`; on any failure local state is untouched and the error is
    /// returned for display.
    pub async fn toggle_power(&self, device: &Device) -> Result<PowerChange, CoreError> {
        let action = device.toggle_action();
        let id = device.id.clone();
        debug!(device = %id, %action, "sending power command");

        match self.inner.client.set_power(id.as_str(), action).await {
            Ok(message) => {
                let status = DeviceStatus::after(action);
                let colors = &self.inner.colors;
                let updated = self
                    .inner
                    .store
                    .update_device(&id, |d| d.set_status(status, colors));
                if updated.is_none() {
                    debug!(device = %id, "acknowledged device no longer in snapshot");
                }
                self.inner.publish(SyncEvent::PowerChanged {
                    id: id.clone(),
                    status,
                    message: message.clone(),
                });
                Ok(PowerChange {
                    id,
                    action,
                    message,
                    device: updated,
                })
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(device = %id, error = %err, "power command failed");
                self.inner.publish(SyncEvent::PowerFailed {
                    id,
                    message: display_message(&err),
                });
                Err(err)
            }
        }
    }

    /// Toggle the device with `id` as it appears in the current snapshot.
    pub async fn toggle_power_by_id(&self, id: &DeviceId) -> Result<PowerChange, CoreError> {
        let device = self
            .inner
            .store
            .device_by_id(id)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: id.to_string(),
            })?;
        self.toggle_power(&device).await
    }

    /// Delete a device after `confirmation` agrees, then resync.
    pub async fn delete_device(
        &self,
        id: &DeviceId,
        confirmation: &impl Confirm,
    ) -> Result<DeleteOutcome, CoreError> {
        let prompt = format!("Are you sure you want to delete the device with ID: {id}?");
        if !confirmation.confirm(&prompt) {
            debug!(device = %id, "delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.inner.client.delete_device(id.as_str()).await {
            Ok(message) => {
                info!(device = %id, "device deleted");
                self.inner.publish(SyncEvent::DeviceDeleted {
                    id: id.clone(),
                    message: message.clone(),
                });
                self.refresh().await;
                Ok(DeleteOutcome::Deleted { message })
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(device = %id, error = %err, "delete failed");
                self.inner.publish(SyncEvent::DeleteFailed {
                    id: id.clone(),
                    message: display_message(&err),
                });
                Err(err)
            }
        }
    }

    /// Register a device by hand, then resync.
    pub async fn add_device(&self, device: NewDevice) -> Result<String, CoreError> {
        if device.device_id.trim().is_empty() {
            return Err(CoreError::validation("device id must not be empty"));
        }
        if device.topic.trim().is_empty() {
            return Err(CoreError::validation("MQTT topic must not be empty"));
        }

        let message = self.inner.client.add_device(&device).await?;
        let id = DeviceId::from(device.device_id);
        info!(device = %id, "device registered");
        self.inner.publish(SyncEvent::DeviceAdded {
            id,
            message: message.clone(),
        });
        self.refresh().await;
        Ok(message)
    }

    /// Hand WiFi credentials to the dashboard host.
    ///
    /// Until this succeeds every other endpoint answers with a redirect to
    /// the setup page ([`CoreError::WifiSetupRequired`]).
    pub async fn set_wifi_credentials(
        &self,
        ssid: &str,
        password: &SecretString,
    ) -> Result<(), CoreError> {
        if ssid.trim().is_empty() || password.expose_secret().is_empty() {
            return Err(CoreError::validation("both SSID and password are required"));
        }
        self.inner.client.set_wifi_credentials(ssid, password).await?;
        info!(ssid, "WiFi credentials sent");
        Ok(())
    }
}

// ── Internals ────────────────────────────────────────────────────────

impl SyncInner {
    fn issue_sequence(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, event: SyncEvent) {
        let _ = self.event_tx.send(event);
    }

    fn apply_fetch(
        &self,
        sequence: u64,
        result: Result<Vec<RawDevice>, streelet_api::Error>,
    ) -> RefreshOutcome {
        match result {
            Ok(raw) => {
                let devices = devices_from_raw(raw, &self.colors);
                let count = devices.len();
                if self.store.apply_refresh(sequence, devices) {
                    debug!(sequence, devices = count, "device snapshot replaced");
                    self.publish(SyncEvent::Refreshed {
                        sequence,
                        devices: count,
                    });
                    RefreshOutcome::Applied {
                        sequence,
                        devices: count,
                    }
                } else {
                    debug!(sequence, "discarding stale device list");
                    self.publish(SyncEvent::StaleRefreshDiscarded { sequence });
                    RefreshOutcome::Stale { sequence }
                }
            }
            Err(e) => RefreshOutcome::Failed {
                message: self.record_refresh_failure(sequence, &CoreError::from(e)),
            },
        }
    }

    fn record_refresh_failure(&self, sequence: u64, err: &CoreError) -> String {
        warn!(sequence, error = %err, "device refresh failed");
        let message = display_message(err);
        self.publish(SyncEvent::RefreshFailed {
            message: message.clone(),
        });
        message
    }
}

impl Drop for SyncInner {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.get_mut().take() {
            poller.cancel.cancel();
            poller.handle.abort();
        }
    }
}

impl Poller {
    async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

/// The backend's own wording when it sent one, the formatted error
/// otherwise.
fn display_message(err: &CoreError) -> String {
    err.server_message()
        .map_or_else(|| err.to_string(), str::to_owned)
}

/// Periodic refresh loop.
///
/// Holds the engine weakly so a dropped `DeviceSync` ends the loop. Each
/// tick's fetch runs as its own task in `in_flight`; on exit the ones still
/// waiting on the backend are aborted and reaped.
async fn poll_task(sync: Weak<SyncInner>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            _ = ticker.tick() => {
                let Some(inner) = sync.upgrade() else { break };
                let sequence = inner.issue_sequence();
                let client = inner.client.clone();
                drop(inner);

                let sync = sync.clone();
                in_flight.spawn(async move {
                    let result = client.list_devices().await;
                    if let Some(inner) = sync.upgrade() {
                        inner.apply_fetch(sequence, result);
                    }
                });
            }
        }
    }

    in_flight.abort_all();
    while in_flight.join_next().await.is_some() {}
    debug!("poll task exiting");
}
