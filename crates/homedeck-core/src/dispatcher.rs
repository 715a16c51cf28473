// ── Control dispatcher ──
//
// Sends control commands to the hub (through the backend) and schedules
// one delayed full refresh after each accepted command. Local state is
// never changed optimistically; only that refresh updates the cache.

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use homedeck_api::ControlRequest;

use crate::controls::{ControlCommand, Service, ServiceData};
use crate::error::CoreError;
use crate::model::{Device, DeviceId, EntityId};
use crate::session::Session;

// ── Busy tracking ────────────────────────────────────────────────

/// Per-entity count of commands in flight. Local only.
#[derive(Debug, Default)]
pub(crate) struct BusyTracker {
    in_flight: DashMap<EntityId, usize>,
}

impl BusyTracker {
    fn mark(&self, entity_id: &EntityId) -> BusyGuard<'_> {
        *self.in_flight.entry(entity_id.clone()).or_insert(0) += 1;
        BusyGuard {
            tracker: self,
            entity_id: entity_id.clone(),
        }
    }

    fn is_busy(&self, entity_id: &EntityId) -> bool {
        self.in_flight.contains_key(entity_id)
    }
}

/// Clears one busy mark when dropped, whether the call succeeded,
/// failed or was abandoned.
struct BusyGuard<'a> {
    tracker: &'a BusyTracker,
    entity_id: EntityId,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.tracker
            .in_flight
            .remove_if_mut(&self.entity_id, |_, count| {
                *count = count.saturating_sub(1);
                *count == 0
            });
    }
}

// ── Reconciliation ───────────────────────────────────────────────

/// How a scheduled reconciliation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReconciliationOutcome {
    /// The device list was re-fetched and the cache replaced.
    Refreshed,
    /// The refresh ran and failed; the cache was left alone.
    Failed,
    /// Cancelled before the delay elapsed.
    Cancelled,
}

/// Handle to the delayed refresh scheduled by an accepted command.
///
/// Dropping the handle neither cancels nor awaits the refresh.
#[derive(Debug)]
pub struct Reconciliation {
    token: CancellationToken,
    handle: JoinHandle<ReconciliationOutcome>,
}

impl Reconciliation {
    /// Wait for the refresh to run (or be cancelled).
    pub async fn wait(self) -> ReconciliationOutcome {
        self.handle.await.unwrap_or_else(|e| {
            warn!(error = %e, "reconciliation task aborted");
            ReconciliationOutcome::Failed
        })
    }

    /// Cancel the refresh if its delay has not elapsed yet.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

// ── Dispatcher ───────────────────────────────────────────────────

/// Control operations of a [`Session`].
#[derive(Clone)]
pub struct ControlDispatcher {
    session: Session,
}

impl ControlDispatcher {
    pub(crate) fn new(session: Session) -> Self {
        Self { session }
    }

    /// Send `service` to `entity_id` with `service_data`.
    ///
    /// The entity is busy only while the control call is in flight. On
    /// success a single refresh is scheduled after the session's
    /// reconciliation delay; on failure nothing is scheduled and the
    /// cache is untouched.
    pub async fn dispatch(
        &self,
        entity_id: &EntityId,
        service: Service,
        service_data: ServiceData,
    ) -> Result<Reconciliation, CoreError> {
        self.send(ControlCommand {
            target: entity_id.clone(),
            service,
            service_data,
        })
        .await
    }

    /// Send an already-built command.
    pub async fn send(&self, command: ControlCommand) -> Result<Reconciliation, CoreError> {
        self.session.connection().ensure_configured()?;

        let request = command.to_request();
        {
            let _busy = self.session.busy().mark(&command.target);
            self.session
                .client()
                .control_entity(command.target.as_str(), &request)
                .await?;
        }

        info!(entity_id = %command.target, service = %command.service, "control accepted");
        Ok(self.schedule_reconciliation())
    }

    /// Press the device's toggle.
    pub async fn toggle(&self, device: &Device) -> Result<Reconciliation, CoreError> {
        let command = device.toggle_command().ok_or_else(|| {
            CoreError::validation(
                "control",
                format!("{} ({}) has no on/off control", device.entity_id(), device.domain()),
            )
        })?;
        self.send(command).await
    }

    /// Commit the brightness slider at `value` (rounded, clamped to 0–255).
    pub async fn set_brightness(
        &self,
        device: &Device,
        value: f64,
    ) -> Result<Reconciliation, CoreError> {
        let command = device.brightness_command(value).ok_or_else(|| {
            CoreError::validation(
                "brightness",
                format!(
                    "{} offers no brightness control in state '{}'",
                    device.entity_id(),
                    device.state
                ),
            )
        })?;
        self.send(command).await
    }

    /// Send a command addressed by backend id instead of entity id.
    ///
    /// The entity is marked busy when the device is cached.
    pub async fn dispatch_by_id(
        &self,
        id: &DeviceId,
        service: Service,
        service_data: ServiceData,
    ) -> Result<Reconciliation, CoreError> {
        self.session.connection().ensure_configured()?;

        let request = ControlRequest {
            service: service.as_str().to_owned(),
            service_data,
        };
        let cached = self.session.store().get(id);
        {
            let _busy = cached.as_ref().map(|d| self.session.busy().mark(d.entity_id()));
            self.session
                .client()
                .control_device(id.as_str(), &request)
                .await?;
        }

        info!(%id, service = %request.service, "control accepted");
        Ok(self.schedule_reconciliation())
    }

    /// Whether a command for `entity_id` is currently in flight.
    pub fn is_busy(&self, entity_id: &EntityId) -> bool {
        self.session.busy().is_busy(entity_id)
    }

    fn schedule_reconciliation(&self) -> Reconciliation {
        let token = self.session.reconciliation_token();
        let delay = self.session.config().reconcile_delay;
        let registry = self.session.registry();
        let cancel = token.clone();

        debug!(delay_ms = delay.as_millis(), "scheduling reconciliation");
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("reconciliation cancelled");
                    ReconciliationOutcome::Cancelled
                }
                () = tokio::time::sleep(delay) => match registry.load().await {
                    Ok(_) => ReconciliationOutcome::Refreshed,
                    Err(e) => {
                        warn!(error = %e, "reconciliation refresh failed");
                        ReconciliationOutcome::Failed
                    }
                },
            }
        });

        Reconciliation { token, handle }
    }
}
